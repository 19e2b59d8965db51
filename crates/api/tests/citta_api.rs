//! HTTP-level integration tests for the `/citta` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_citta, create_scuola, delete, get, post_json, put_json};
use sqlx::PgPool;

fn torino() -> serde_json::Value {
    serde_json::json!({
        "nome": "Torino",
        "provincia": "TO",
        "cap": "10100",
        "regione": "Piemonte",
    })
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_citta_returns_201(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/citta", torino()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["nome"], "Torino");
    assert_eq!(json["cap"], "10100");
    assert!(json["id"].is_number());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn created_citta_is_readable_by_id(pool: PgPool) {
    let id = create_citta(&pool, "Torino", "10100").await;

    let response = get(common::build_test_app(pool), &format!("/api/v1/citta/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["nome"], "Torino");
    assert_eq!(json["provincia"], "TO");
    assert_eq!(json["regione"], "Piemonte");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_missing_citta_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/citta/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Citta with id 999999 not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_numeric_id_returns_400(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/citta/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_nome_fails_validation(pool: PgPool) {
    let mut body = torino();
    body["nome"] = serde_json::json!("");

    let response = post_json(common::build_test_app(pool), "/api/v1/citta", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_body_returns_400(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/citta",
        serde_json::json!({ "nome": "Torino" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_nome_returns_409(pool: PgPool) {
    create_citta(&pool, "Torino", "10100").await;

    let response = post_json(common::build_test_app(pool), "/api/v1/citta", torino()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Lookup by postal code
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn zipcode_lookup_finds_citta(pool: PgPool) {
    let id = create_citta(&pool, "Torino", "10100").await;

    let response = get(common::build_test_app(pool), "/api/v1/citta/zipcode/10100").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_zipcode_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/citta/zipcode/00000").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Citta with cap 00000 not found"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn nul_zipcode_returns_400(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/citta/zipcode/%00").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn nul_in_body_returns_400(pool: PgPool) {
    let mut body = torino();
    body["nome"] = serde_json::json!("Tor\u{0}ino");

    let response = post_json(common::build_test_app(pool), "/api/v1/citta", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn update_replaces_fields(pool: PgPool) {
    let id = create_citta(&pool, "Torino", "10100").await;

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/v1/citta/{id}"),
        serde_json::json!({
            "nome": "Torino Centro",
            "provincia": "TO",
            "cap": "10121",
            "regione": "Piemonte",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["nome"], "Torino Centro");
    assert_eq!(json["cap"], "10121");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_missing_citta_returns_404(pool: PgPool) {
    let response = put_json(common::build_test_app(pool), "/api/v1/citta/424242", torino()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_then_get_returns_404(pool: PgPool) {
    let id = create_citta(&pool, "Torino", "10100").await;

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/citta/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        format!("Citta {id} deleted")
    );

    let response = get(common::build_test_app(pool), &format!("/api/v1/citta/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_citta_with_schools_returns_409(pool: PgPool) {
    let id = create_citta(&pool, "Torino", "10100").await;
    create_scuola(&pool, "Liceo Galileo", id).await;

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/citta/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    let response = get(common::build_test_app(pool), &format!("/api/v1/citta/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}
