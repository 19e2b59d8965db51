#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use http_body_util::BodyExt;
use orientati_api::config::ServerConfig;
use orientati_api::router::{build_app_router, App};
use orientati_api::state::AppState;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// Build the full application router, with the production middleware
/// stack, over the given database pool.
pub fn build_test_app(pool: PgPool) -> App {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: App,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: App, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: App, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: App, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: App, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: App, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a city through the API and return its id.
pub async fn create_citta(pool: &PgPool, nome: &str, cap: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/citta",
        serde_json::json!({
            "nome": nome,
            "provincia": "TO",
            "cap": cap,
            "regione": "Piemonte",
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a school in `citta_id` through the API and return its id.
pub async fn create_scuola(pool: &PgPool, nome: &str, citta_id: i64) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/schools",
        serde_json::json!({
            "nome": nome,
            "tipo": "Liceo",
            "indirizzo": "Via Roma 1",
            "email_contatto": "info@example.it",
            "telefono_contatto": "011123456",
            "citta_id": citta_id,
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a study track for `scuola_id` and return its id.
pub async fn create_indirizzo(pool: &PgPool, nome: &str, scuola_id: i64) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/indirizzi",
        serde_json::json!({ "nome": nome, "id_scuola": scuola_id }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a subject and return its id.
pub async fn create_materia(pool: &PgPool, nome: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/materie",
        serde_json::json!({ "nome": nome }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_i64().unwrap()
}
