//! Shared [`reqwest::Client`] wrapper with the service's request conventions.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::error::UpstreamError;

/// HTTP verbs supported by [`UpstreamClient::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Client for JSON calls to other services under a common API prefix.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    api_prefix: String,
}

impl UpstreamClient {
    /// Build a client with the given per-request timeout. Redirects are
    /// followed.
    pub fn new(api_prefix: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_prefix))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_prefix: impl Into<String>) -> Self {
        Self {
            client,
            api_prefix: api_prefix.into(),
        }
    }

    /// Full URL for an endpoint: `base_url + api_prefix + endpoint`, with a
    /// trailing `/` added when there are no params.
    pub fn url_for(&self, base_url: &str, endpoint: &str, has_params: bool) -> String {
        let mut url = format!("{base_url}{}{endpoint}", self.api_prefix);
        if !has_params && !url.ends_with('/') {
            url.push('/');
        }
        url
    }

    /// Send a request and decode the JSON response.
    ///
    /// GET sends `params` as the query string; POST, PUT and PATCH send them
    /// as the JSON body; DELETE sends neither. `headers` override the
    /// default JSON `Content-Type` and `Accept`.
    ///
    /// Returns `None` data for an empty or non-JSON success body.
    pub async fn send(
        &self,
        base_url: &str,
        method: HttpMethod,
        endpoint: &str,
        params: Option<&Map<String, Value>>,
        headers: Option<HeaderMap>,
    ) -> Result<(Option<Value>, StatusCode), UpstreamError> {
        let url = self.url_for(base_url, endpoint, params.is_some());

        let mut all_headers = default_headers();
        if let Some(extra) = headers {
            all_headers.extend(extra);
        }

        let empty = Map::new();
        let params = params.unwrap_or(&empty);
        let mut request = self
            .client
            .request(method.as_reqwest(), &url)
            .headers(all_headers);
        request = match method {
            HttpMethod::Get => request.query(&query_pairs(params)),
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => request.json(params),
            HttpMethod::Delete => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::transport(url.clone(), &e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::transport(url.clone(), &e))?;

        if status.as_u16() >= 400 {
            return Err(UpstreamError::from_response(status.as_u16(), &body, &url));
        }

        if body.is_empty() {
            return Ok((None, status));
        }
        match serde_json::from_str(&body) {
            Ok(data) => Ok((Some(data), status)),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Upstream returned a non-JSON body");
                Ok((None, status))
            }
        }
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Flatten JSON params into query pairs. Strings are sent without quotes.
fn query_pairs(params: &Map<String, Value>) -> Vec<(&str, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.as_str(), value)
        })
        .collect()
}
