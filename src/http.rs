use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{RawQuery, State};
use axum::http::{Method, StatusCode, header};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::DescribeResponse;
use crate::strategy::Retriever;

pub const DESCRIBE_PATH: &str = "/api/industry-mall";
const PARAM_NAMES: &[&str] = &["mlfb", "partNumber"];

#[derive(Clone)]
pub struct AppState {
    pub retriever: Arc<Retriever>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(DESCRIBE_PATH, get(describe).options(preflight))
        .route("/healthz", get(|| async { "ok" }))
        .layer(cors)
        .with_state(state)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// The part number, when the query carries exactly one non-blank value for it.
pub fn part_number(query: Option<&str>) -> Option<String> {
    let query = query?;
    let values: Vec<String> = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| PARAM_NAMES.contains(&key.as_ref()))
        .map(|(_, value)| value.trim().to_string())
        .collect();
    match values.as_slice() {
        [value] if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

async fn describe(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<DescribeResponse>) {
    let Some(mlfb) = part_number(query.as_deref()) else {
        warn!("rejecting request without a single part number");
        return (
            StatusCode::BAD_REQUEST,
            Json(DescribeResponse::failed("missing parameter")),
        );
    };

    // A panic inside the lookup must still produce a JSON body
    let retriever = state.retriever.clone();
    let task = tokio::spawn(async move { retriever.describe(&mlfb).await });

    let body = match task.await {
        Ok(Ok(lookup)) => DescribeResponse::found(lookup),
        Ok(Err(e)) => {
            error!("lookup failed: {:#}", e);
            DescribeResponse::failed(e.to_string())
        }
        Err(e) => {
            error!("lookup task aborted: {}", e);
            DescribeResponse::failed("internal error")
        }
    };
    (StatusCode::OK, Json(body))
}

pub async fn serve(config: &Config, retriever: Retriever) -> Result<()> {
    let state = AppState {
        retriever: Arc::new(retriever),
    };
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("listening on http://{}{}", config.bind_addr, DESCRIBE_PATH);
    axum::serve(listener, router(state))
        .await
        .context("http server stopped")
}
