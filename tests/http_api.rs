mod common;

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use tower::ServiceExt;

use common::{FakePages, product_page, retriever, technical_text};
use mlfb_describe::DescribeResponse;
use mlfb_describe::http::{AppState, router};

const MLFB: &str = "6ES7131-6BF01-0BA0";

fn app(pages: Arc<FakePages>) -> axum::Router {
    router(AppState {
        retriever: Arc::new(retriever(pages)),
    })
}

async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ORIGIN, "https://erp.example")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn missing_parameter_is_a_client_error() {
    let pages = Arc::new(FakePages::new());
    for uri in [
        "/api/industry-mall",
        "/api/industry-mall?mlfb=",
        "/api/industry-mall?mlfb=%20",
        "/api/industry-mall?mlfb=A&mlfb=B",
    ] {
        let (status, _, body) = call(app(pages.clone()), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "ok": false, "msg": "missing parameter", "description": "" })
        );
    }
    assert!(pages.requested().is_empty());
}

#[tokio::test]
async fn found_description_is_returned_with_cors() {
    let pages = Arc::new(FakePages::new().with_page(
        &format!("https://sieportal.siemens.com/en-ww/product/{MLFB}"),
        product_page(MLFB, &technical_text(420)),
    ));

    let (status, headers, body) =
        call(app(pages), get(&format!("/api/industry-mall?mlfb={MLFB}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body: DescribeResponse = serde_json::from_slice(&body).unwrap();
    assert!(body.ok);
    assert_eq!(
        body.source.as_deref(),
        Some("https://sieportal.siemens.com/en-ww/product/6ES7131-6BF01-0BA0")
    );
    assert_eq!(body.description, technical_text(420));
}

#[tokio::test]
async fn part_number_alias_and_placeholder() {
    let pages = Arc::new(FakePages::new());

    let (status, _, body) =
        call(app(pages), get(&format!("/api/industry-mall?partNumber={MLFB}"))).await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "ok": true,
            "source": "",
            "description": format!("{MLFB} — ver ficha en Industry Mall."),
        })
    );
}

#[tokio::test]
async fn options_request_is_answered_empty() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/industry-mall")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = call(app(Arc::new(FakePages::new())), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn preflight_allows_get_from_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/industry-mall")
        .header(header::ORIGIN, "https://erp.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = call(app(Arc::new(FakePages::new())), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("GET"));
}

#[tokio::test]
async fn healthz() {
    let (status, _, body) = call(app(Arc::new(FakePages::new())), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}
