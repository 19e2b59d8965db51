//! List envelope, pagination bounds, search and sorting over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_citta, get, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Parameter validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn out_of_range_parameters_return_400(pool: PgPool) {
    for query in [
        "limit=0",
        "limit=101",
        "offset=-1",
        "order=sideways",
        "limit=abc",
    ] {
        for resource in ["citta", "schools", "indirizzi", "materie"] {
            let uri = format!("/api/v1/{resource}?{query}");
            let response = get(common::build_test_app(pool.clone()), &uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn limit_bounds_are_inclusive(pool: PgPool) {
    for limit in [1, 100] {
        let uri = format!("/api/v1/citta?limit={limit}");
        let response = get(common::build_test_app(pool.clone()), &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["limit"], limit);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn nul_in_search_returns_400(pool: PgPool) {
    for resource in ["citta", "schools", "indirizzi", "materie"] {
        let uri = format!("/api/v1/{resource}?search=%00");
        let response = get(common::build_test_app(pool.clone()), &uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

// ---------------------------------------------------------------------------
// Trailing slashes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn collection_routes_accept_trailing_slash(pool: PgPool) {
    for resource in ["citta", "schools", "indirizzi", "materie"] {
        let uri = format!("/api/v1/{resource}/");
        let response = get(common::build_test_app(pool.clone()), &uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_json(response).await["total"], 0);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_and_read_through_trailing_slash(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/citta/",
        serde_json::json!({
            "nome": "Torino",
            "provincia": "TO",
            "cap": "10100",
            "regione": "Piemonte",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["id"].as_i64().unwrap();

    let uri = format!("/api/v1/citta/{id}/");
    let response = get(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["nome"], "Torino");

    let response = get(common::build_test_app(pool), "/api/v1/citta/").await;
    assert_eq!(body_json(response).await["total"], 1);
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_list_has_defaults(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/materie").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["items"], serde_json::json!([]));
    assert_eq!(json["total"], 0);
    assert_eq!(json["limit"], 10);
    assert_eq!(json["offset"], 0);
    assert_eq!(json["order"], "asc");
    assert!(json["filter_search"].is_null());
    assert!(json["sort_by"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn total_ignores_pagination(pool: PgPool) {
    for (nome, cap) in [("Asti", "14100"), ("Biella", "13900"), ("Cuneo", "12100")] {
        create_citta(&pool, nome, cap).await;
    }

    let response = get(common::build_test_app(pool), "/api/v1/citta?limit=1&offset=1").await;
    let json = body_json(response).await;

    assert_eq!(json["total"], 3);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["nome"], "Biella");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn search_and_sort_are_echoed(pool: PgPool) {
    for (nome, cap) in [("Torino", "10100"), ("Torre Pellice", "10066"), ("Ivrea", "10015")] {
        create_citta(&pool, nome, cap).await;
    }

    let response = get(
        common::build_test_app(pool),
        "/api/v1/citta?search=tor&sort_by=name&order=desc",
    )
    .await;
    let json = body_json(response).await;

    assert_eq!(json["total"], 2);
    assert_eq!(json["filter_search"], "tor");
    assert_eq!(json["sort_by"], "name");
    assert_eq!(json["order"], "desc");
    assert_eq!(json["items"][0]["nome"], "Torre Pellice");
    assert_eq!(json["items"][1]["nome"], "Torino");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_sort_key_falls_back_to_name(pool: PgPool) {
    for (nome, cap) in [("Novara", "28100"), ("Alba", "12051")] {
        create_citta(&pool, nome, cap).await;
    }

    let response = get(common::build_test_app(pool), "/api/v1/citta?sort_by=nope").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["sort_by"], "nope");
    assert_eq!(json["items"][0]["nome"], "Alba");
}
