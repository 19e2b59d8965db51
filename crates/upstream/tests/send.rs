//! Exercises `UpstreamClient::send` against a local axum server.

use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use orientati_upstream::{HttpMethod, UpstreamClient, UpstreamError};
use serde_json::{json, Map, Value};

async fn spawn_server() -> String {
    let app = Router::new()
        .route(
            "/api/v1/echo",
            get(|Query(q): Query<Map<String, Value>>| async move { Json(json!({ "query": q })) })
                .post(|Json(body): Json<Value>| async move {
                    (StatusCode::CREATED, Json(json!({ "body": body })))
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/api/v1/missing/",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "message": "Not found",
                        "details": { "message": "User 7 not found" },
                        "url": "http://users/api/v1/users/7"
                    })),
                )
            }),
        )
        .route(
            "/api/v1/broken/",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
        .route("/api/v1/plain/", get(|| async { "not json" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> UpstreamClient {
    UpstreamClient::new("/api/v1", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn get_sends_params_as_query_string() {
    let base = spawn_server().await;
    let params = json!({ "search": "Roma", "limit": 5 });

    let (data, status) = client()
        .send(&base, HttpMethod::Get, "/echo", params.as_object(), None)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    let data = data.unwrap();
    assert_eq!(data["query"]["search"], "Roma");
    assert_eq!(data["query"]["limit"], "5");
}

#[tokio::test]
async fn post_sends_params_as_json_body() {
    let base = spawn_server().await;
    let params = json!({ "nome": "Roma", "cap": "00100" });

    let (data, status) = client()
        .send(&base, HttpMethod::Post, "/echo", params.as_object(), None)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(data.unwrap()["body"], params);
}

#[tokio::test]
async fn delete_with_empty_body_returns_no_data() {
    let base = spawn_server().await;
    let empty = Map::new();

    let (data, status) = client()
        .send(&base, HttpMethod::Delete, "/echo", Some(&empty), None)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(data.is_none());
}

#[tokio::test]
async fn client_error_uses_nested_message_and_body_url() {
    let base = spawn_server().await;

    let err = client()
        .send(&base, HttpMethod::Get, "/missing", None, None)
        .await
        .unwrap_err();

    assert_eq!(err.status, 404);
    assert_eq!(err.message, "User 7 not found");
    assert_eq!(err.url, "http://users/api/v1/users/7");
}

#[tokio::test]
async fn server_error_with_text_body() {
    let base = spawn_server().await;

    let err = client()
        .send(&base, HttpMethod::Get, "/broken", None, None)
        .await
        .unwrap_err();

    assert_matches!(err, UpstreamError { status: 503, .. });
    assert_eq!(err.message, "HTTP Error. Unable to fetch. 503");
    assert_eq!(err.details, json!({ "message": "maintenance" }));
    assert_eq!(err.url, format!("{base}/api/v1/broken/"));
}

#[tokio::test]
async fn non_json_success_yields_none() {
    let base = spawn_server().await;

    let (data, status) = client()
        .send(&base, HttpMethod::Get, "/plain", None, None)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(data.is_none());
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client()
        .send(&format!("http://{addr}"), HttpMethod::Get, "/echo", None, None)
        .await
        .unwrap_err();

    assert_eq!(err.status, 500);
    assert_eq!(err.message, "HTTP Error. Unable to fetch.");
}
