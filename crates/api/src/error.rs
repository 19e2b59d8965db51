use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orientati_core::error::CoreError;
use orientati_upstream::UpstreamError;
use serde_json::{json, Value};

/// Generic message returned for 500 responses.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Whether 500 bodies carry the internal message under `details.message`.
/// Off by default; the binary turns it on outside production.
static EXPOSE_INTERNAL: AtomicBool = AtomicBool::new(false);

/// Set once at startup from the deployment environment.
pub fn set_expose_internal(expose: bool) {
    EXPOSE_INTERNAL.store(expose, Ordering::Relaxed);
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `orientati_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failed call to another service.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, code and body fields for one error.
struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
    url: Option<String>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            url: None,
        }
    }

    /// A 500 whose real cause is logged and, if allowed, attached as details.
    fn internal(cause: String, expose_internal: bool) -> Self {
        tracing::error!(error = %cause, "Internal error");
        let mut parts = Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        );
        if expose_internal {
            parts.details = Some(json!({ "message": cause }));
        }
        parts
    }
}

impl AppError {
    /// Build the response, attaching internal details only if
    /// `expose_internal` is set.
    pub fn render(&self, expose_internal: bool) -> Response {
        let parts = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorParts::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::NotFoundBy {
                    entity,
                    field,
                    value,
                } => ErrorParts::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with {field} {value} not found"),
                ),
                CoreError::Validation(msg) => {
                    ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => {
                    ErrorParts::new(StatusCode::CONFLICT, "CONFLICT", msg.clone())
                }
                CoreError::Internal(msg) => ErrorParts::internal(msg.clone(), expose_internal),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err, expose_internal),

            // --- Other services ---
            AppError::Upstream(err) => {
                let status = if err.status >= 500 {
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::from_u16(err.status).unwrap_or(StatusCode::BAD_GATEWAY)
                };
                ErrorParts {
                    status,
                    code: "UPSTREAM_ERROR",
                    message: err.message.clone(),
                    details: Some(err.details.clone()),
                    url: Some(err.url.clone()),
                }
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                ErrorParts::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => ErrorParts::internal(msg.clone(), expose_internal),
        };

        let mut body = json!({
            "error": parts.message,
            "code": parts.code,
        });
        if let Some(details) = parts.details {
            body["details"] = details;
        }
        if let Some(url) = parts.url {
            body["url"] = Value::String(url);
        }

        (parts.status, axum::Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.render(EXPOSE_INTERNAL.load(Ordering::Relaxed))
    }
}

/// Classify a sqlx error into response parts.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints map to 409.
/// - Foreign-key violations map to 409 (the row is still referenced, or
///   references a row that no longer exists).
/// - Input Postgres cannot store as text (NUL bytes) maps to 400.
/// - Everything else maps to 500.
fn classify_sqlx_error(err: &sqlx::Error, expose_internal: bool) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique_violation
                Some("23505") if constraint.starts_with("uq_") => ErrorParts::new(
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                ),
                // PostgreSQL foreign_key_violation
                Some("23503") => ErrorParts::new(
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Operation violates foreign key constraint: {constraint}"),
                ),
                // PostgreSQL character_not_in_repertoire / untranslatable_character
                Some("22021") | Some("22P05") => ErrorParts::new(
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    "Input contains characters that cannot be stored",
                ),
                _ => ErrorParts::internal(format!("Database error: {db_err}"), expose_internal),
            }
        }
        other => ErrorParts::internal(format!("Database error: {other}"), expose_internal),
    }
}
