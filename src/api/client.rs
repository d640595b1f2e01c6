//! API client for the customer backend
//!
//! Handles all HTTP communication with the backend API.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::form::{Field, FieldErrors};
use crate::submission::{SubmissionPayload, Transport};

/// API base URL used when the configured one is blank
const DEFAULT_API_URL: &str = "http://localhost:4000";
const MAX_MESSAGE_CHARS: usize = 200;

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        field_errors: FieldErrors,
    },
}

impl ApiError {
    /// Field errors the server echoed back, empty for transport failures.
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            ApiError::Api { field_errors, .. } => field_errors.clone(),
            ApiError::Network(_) => FieldErrors::new(),
        }
    }
}

/// API client for the customer endpoint
pub struct ApiClient {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    pub fn from_config(api: &ApiConfig) -> Self {
        Self::with_settings(&api.base_url, &api.path, api.timeout_seconds, api.verify_ssl)
    }

    /// Create with custom base URL and path
    #[cfg(test)]
    pub fn with_url(base_url: &str, path: &str) -> Self {
        Self::with_settings(base_url, path, ApiConfig::default().timeout_seconds, true)
    }

    fn with_settings(base_url: &str, path: &str, timeout_seconds: u64, verify_ssl: bool) -> Self {
        let timeout = Duration::from_secs(timeout_seconds.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .unwrap_or_else(|_| Client::new());

        ApiClient {
            client,
            endpoint: join_endpoint(base_url, path),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for ApiClient {
    async fn send(&self, payload: &SubmissionPayload) -> Result<(), ApiError> {
        debug!(endpoint = %self.endpoint, "POST customer");
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(error_from_body(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Request failed"),
            &error_body,
        ))
    }
}

/// Best-effort read of an error response. Understands
/// `{"errors": {"emailAddress": ["..."]}}`, `{"field": "...", "message": "..."}`
/// and plain `{"message": "..."}` / `{"error": "..."}` bodies.
fn error_from_body(status: u16, reason: &str, body: &str) -> ApiError {
    let mut field_errors = FieldErrors::new();
    let mut message = None;

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = value.get("errors").and_then(Value::as_object) {
            for (name, entry) in errors {
                let Some(field) = Field::from_wire_name(name) else {
                    continue;
                };
                match entry {
                    Value::String(text) => field_errors.push(field, text.as_str()),
                    Value::Array(items) => {
                        for text in items.iter().filter_map(Value::as_str) {
                            field_errors.push(field, text);
                        }
                    }
                    _ => {}
                }
            }
        }

        message = ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string);

        if let (Some(field), Some(text)) = (
            value
                .get("field")
                .and_then(Value::as_str)
                .and_then(Field::from_wire_name),
            message.as_deref(),
        ) {
            field_errors.push(field, text);
        }
    }

    let message = message
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{'))
                .then(|| trimmed.chars().take(MAX_MESSAGE_CHARS).collect())
        })
        .unwrap_or_else(|| reason.to_string());

    ApiError::Api {
        status,
        message,
        field_errors,
    }
}

fn join_endpoint(base_url: &str, path: &str) -> String {
    let base = normalize_base_url(base_url);
    let path = path.trim();
    if path.is_empty() {
        return base;
    }
    format!("{}/{}", base, path.trim_start_matches('/'))
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return DEFAULT_API_URL.to_string();
    }
    trimmed.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::form::tests::ivan;
    use crate::form::validate;

    fn payload() -> SubmissionPayload {
        SubmissionPayload::from_record(&validate(&ivan()).unwrap())
    }

    #[test]
    fn test_custom_url() {
        let client = ApiClient::with_url("https://api.example.com/", "/api/customers");
        assert_eq!(client.endpoint(), "https://api.example.com/api/customers");
    }

    #[test]
    fn test_from_config_uses_loaded_api_section() {
        let config: crate::config::Config = toml::from_str(
            r#"
            [api]
            base_url = "https://crm.example.com/"
            path = "v2/customers"
            "#,
        )
        .unwrap();
        let client = ApiClient::from_config(&config.api);
        assert_eq!(client.endpoint(), "https://crm.example.com/v2/customers");

        let client = ApiClient::from_config(&ApiConfig::default());
        assert_eq!(client.endpoint(), "http://localhost:4000/api/customers");
    }

    #[test]
    fn test_join_endpoint() {
        assert_eq!(
            join_endpoint("http://localhost:4000", "formData"),
            "http://localhost:4000/formData"
        );
        assert_eq!(join_endpoint("", "/api/customers"), "http://localhost:4000/api/customers");
        assert_eq!(join_endpoint("http://h/", ""), "http://h");
    }

    #[test]
    fn test_error_body_with_field_map() {
        let err = error_from_body(
            422,
            "Unprocessable Entity",
            r#"{"message":"Validation failed","errors":{"emailAddress":["Email already registered"],"egn":"Duplicate EGN","unknown":["x"]}}"#,
        );
        assert_eq!(err.to_string(), "API error: 422 - Validation failed");
        let fields = err.field_errors();
        assert_eq!(fields.get(Field::EmailAddress), ["Email already registered"]);
        assert_eq!(fields.get(Field::NationalId), ["Duplicate EGN"]);
        assert_eq!(fields.fields().count(), 2);
    }

    #[test]
    fn test_error_body_with_single_field() {
        let err = error_from_body(
            409,
            "Conflict",
            r#"{"field":"phoneNumber","message":"Phone already in use"}"#,
        );
        assert_eq!(
            err.field_errors().get(Field::PhoneNumber),
            ["Phone already in use"]
        );
    }

    #[test]
    fn test_error_body_fallbacks() {
        let err = error_from_body(502, "Bad Gateway", "upstream down");
        assert_eq!(err.to_string(), "API error: 502 - upstream down");

        let err = error_from_body(500, "Internal Server Error", "");
        assert_eq!(err.to_string(), "API error: 500 - Internal Server Error");

        let err = error_from_body(500, "Internal Server Error", r#"{"detail":1}"#);
        assert_eq!(err.to_string(), "API error: 500 - Internal Server Error");
        assert!(err.field_errors().is_empty());
    }

    #[tokio::test]
    async fn test_posts_json_with_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/customers")
            .match_header("accept", "application/json")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "type": "INDIVIDUAL",
                "firstName": "Ivan",
                "middleName": "",
                "lastName": "Petrov",
                "egn": "",
                "phoneNumber": "",
                "emailAddress": "a@b.com",
                "address": "1 Main St",
                "postcode": "1000"
            })))
            .with_status(201)
            .with_body(r#"{"id":1}"#)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::with_url(&server.url(), "/api/customers");
        client.send(&payload()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/customers")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":{"postcode":["Unknown postcode"]}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::with_url(&server.url(), "/api/customers");
        let err = client.send(&payload()).await.unwrap_err();
        match &err {
            ApiError::Api { status, .. } => assert_eq!(*status, 400),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.field_errors().get(Field::Postcode), ["Unknown postcode"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = ApiClient::with_url("http://127.0.0.1:9", "/api/customers");
        let err = client.send(&payload()).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
