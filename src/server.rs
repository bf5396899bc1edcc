use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use tracing::error;

use crate::models::{DescribePartRequest, DescribeResponse};
use crate::strategy::Retriever;

#[derive(Clone)]
pub struct SimpleServer {
    tool_router: ToolRouter<Self>,
    retriever: Arc<Retriever>,
}

impl SimpleServer {
    pub fn new(retriever: Retriever) -> Self {
        Self {
            tool_router: Self::tool_router(),
            retriever: Arc::new(retriever),
        }
    }
}

#[tool_router]
impl SimpleServer {
    #[tool(description = "Looks up a Siemens part number (MLFB) and returns its product description as JSON")]
    async fn describe_part(
        &self,
        Parameters(request): Parameters<DescribePartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = match self.retriever.describe(&request.mlfb).await {
            Ok(lookup) => DescribeResponse::found(lookup),
            Err(e) => {
                error!("lookup for {} failed: {:#}", request.mlfb, e);
                DescribeResponse::failed(e.to_string())
            }
        };
        let body = serde_json::to_string(&response)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(body)]))
    }
}

#[tool_handler]
impl ServerHandler for SimpleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some("Call describe_part with an MLFB to get its catalog description.".into()),
            ..Default::default()
        }
    }
}
