use serde_json::Value;

/// Message used when the request never produced a response.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "HTTP Error. Unable to fetch.";

/// A failed call to another service.
///
/// `status` is the upstream HTTP status, or 500 when the request could not
/// be sent at all.
#[derive(Debug, thiserror::Error)]
#[error("{message} (status {status}, url {url})")]
pub struct UpstreamError {
    pub message: String,
    pub status: u16,
    pub details: Value,
    pub url: String,
}

impl UpstreamError {
    /// The request failed before any response arrived.
    pub fn transport(url: String, source: &reqwest::Error) -> Self {
        tracing::error!(url = %url, error = %source, "Upstream request failed");
        Self {
            message: TRANSPORT_FAILURE_MESSAGE.to_string(),
            status: 500,
            details: serde_json::json!({ "message": source.to_string() }),
            url,
        }
    }

    /// Build an error from a response with status >= 400.
    ///
    /// For 4xx responses `details.message` takes precedence over the
    /// top-level `message`. `details` and `url` fall back to the raw body
    /// text and the request URL.
    pub fn from_response(status: u16, body: &str, request_url: &str) -> Self {
        let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);

        let nested_message = json
            .get("details")
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .filter(|_| status < 500);
        let message = nested_message
            .or_else(|| json.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("{TRANSPORT_FAILURE_MESSAGE} {status}"));

        let details = json
            .get("details")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({ "message": body }));

        let url = json
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or(request_url)
            .to_string();

        let err = Self {
            message,
            status,
            details,
            url,
        };
        if status >= 500 {
            tracing::error!(
                status,
                url = %err.url,
                message = %err.message,
                "Upstream server error"
            );
        } else {
            tracing::warn!(
                status,
                url = %err.url,
                message = %err.message,
                "Upstream client error"
            );
        }
        err
    }
}
