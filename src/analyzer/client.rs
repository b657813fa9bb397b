//! Analysis API Client
//!
//! Handles the single exchange with the remote analysis service:
//! - Multipart upload of a document or pasted text
//! - Translation of failures into transport vs. service errors
//! - Health check of the backend
//!
//! There is no retry here. Retrying is the caller's decision.

use super::submission::{SubmissionPayload, SubmissionRequest};
use super::types::{AnalysisResult, HealthStatus, ServiceErrorBody};
use super::validator::Document;
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, GENERIC_SERVICE_FAILURE_MESSAGE};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Timeout for health checks when no request timeout is configured
const HEALTH_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client for the analysis service
///
/// No global timeout: analysis may take arbitrarily long, so a limit is only
/// applied per request when configured.
static ANALYSIS_HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("[AnalysisClient] Falling back to default HTTP client: {}", e);
            Client::new()
        })
});

/// Anything that can turn a submission into an analysis result
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Perform exactly one exchange for this request
    async fn submit(&self, request: &SubmissionRequest) -> Result<AnalysisResult, AnalysisError>;
}

/// HTTP client for the lease analysis API
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    config: AnalyzerConfig,
}

impl AnalysisClient {
    /// Client backed by the shared connection pool
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_client(ANALYSIS_HTTP_CLIENT.clone(), config)
    }

    pub fn with_client(client: Client, config: AnalyzerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Query the service health endpoint
    pub async fn health(&self) -> Result<HealthStatus, AnalysisError> {
        let response = self
            .client
            .get(self.config.health_url())
            .timeout(self.config.request_timeout.unwrap_or(HEALTH_TIMEOUT))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<HealthStatus>(&body) {
            Ok(health) => Ok(health),
            Err(_) if !status.is_success() => Err(AnalysisError::Service {
                status: status.as_u16(),
                message: service_message(&body),
            }),
            Err(e) => Err(AnalysisError::Transport(format!(
                "Malformed health response: {}",
                e
            ))),
        }
    }

    /// Build the multipart form for a request
    fn build_form(request: &SubmissionRequest) -> Form {
        let form = match &request.payload {
            SubmissionPayload::Document(doc) => Form::new().part("file", document_part(doc)),
            SubmissionPayload::Text(text) => Form::new().text("text", text.clone()),
        };

        let form = match &request.jurisdiction_tag {
            Some(state) => form.text("state", state.clone()),
            None => form,
        };

        match &request.identity_tag {
            Some(email) => form.text("email", email.clone()),
            None => form,
        }
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<AnalysisResult, AnalysisError> {
        tracing::info!(
            "[AnalysisClient] Submitting {} (attempt {})",
            request.describe(),
            request.attempt_id
        );

        let mut builder = self
            .client
            .post(self.config.analyze_url())
            .multipart(Self::build_form(request));
        if let Some(timeout) = self.config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("[AnalysisClient] Request failed: {}", e);
            AnalysisError::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        let result = parse_response(status, &body);
        match &result {
            Ok(_) => tracing::info!(
                "[AnalysisClient] Attempt {} completed ({})",
                request.attempt_id,
                status
            ),
            Err(e) => tracing::warn!("[AnalysisClient] Attempt {} failed: {}", request.attempt_id, e),
        }
        result
    }
}

/// Turn a raw response into a result or a classified error
pub fn parse_response(status: StatusCode, body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    if !status.is_success() {
        return Err(AnalysisError::Service {
            status: status.as_u16(),
            message: service_message(body),
        });
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AnalysisError::Transport(format!("Malformed analysis response: {}", e)))?;

    let Some(object) = value.as_object() else {
        return Err(AnalysisError::Transport(
            "Malformed analysis response: expected a JSON object".to_string(),
        ));
    };

    // A success status carrying only an error message is still a rejection
    let has_score = object.contains_key("ratingScore") || object.contains_key("riskScore");
    if !has_score {
        if let Some(message) = object.get("error").and_then(Value::as_str) {
            if !message.trim().is_empty() {
                return Err(AnalysisError::Service {
                    status: status.as_u16(),
                    message: message.to_string(),
                });
            }
        }
    }

    serde_json::from_value(value)
        .map_err(|e| AnalysisError::Transport(format!("Malformed analysis response: {}", e)))
}

/// Service-provided error message, or the generic fallback
fn service_message(body: &[u8]) -> String {
    serde_json::from_slice::<ServiceErrorBody>(body)
        .ok()
        .and_then(ServiceErrorBody::into_message)
        .unwrap_or_else(|| GENERIC_SERVICE_FAILURE_MESSAGE.to_string())
}

fn document_part(doc: &Document) -> Part {
    let part = || Part::bytes(doc.bytes.clone()).file_name(doc.display_name.clone());
    part()
        .mime_str(&doc.declared_mime_type)
        .unwrap_or_else(|_| part())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::submission::SubmissionBuilder;
    use crate::analyzer::validator::{Payload, TextInput};
    use crate::error::FailureKind;
    use axum::extract::{Multipart, State};
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct ReceivedField {
        name: String,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    }

    type Received = Arc<Mutex<Vec<ReceivedField>>>;

    async fn spawn_service(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> AnalysisClient {
        AnalysisClient::new(AnalyzerConfig::default().with_base_url(base_url).unwrap())
    }

    fn text_request(text: &str) -> SubmissionRequest {
        SubmissionBuilder::new(&Payload::Text(TextInput::new(text)))
            .build()
            .unwrap()
    }

    async fn record_fields(State(received): State<Received>, mut multipart: Multipart) -> Json<Value> {
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.unwrap().to_vec();
            received.lock().unwrap().push(ReceivedField {
                name,
                file_name,
                content_type,
                data,
            });
        }
        Json(json!({"ratingScore": 35, "ratingText": "Low Risk"}))
    }

    #[tokio::test]
    async fn test_text_submission_fields() {
        let received = Received::default();
        let app = Router::new()
            .route("/api/analyze", post(record_fields))
            .with_state(Arc::clone(&received));
        let client = client_for(&spawn_service(app).await);

        let payload = Payload::Text(TextInput::new("Tenant pays all repairs."));
        let request = SubmissionBuilder::new(&payload)
            .jurisdiction(Some("Kerala"))
            .identity(Some("tenant@example.com".to_string()))
            .build()
            .unwrap();

        let result = client.submit(&request).await.unwrap();
        assert_eq!(result.risk_score, Some(35));

        let fields = received.lock().unwrap().clone();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["text", "state", "email"]);
        assert_eq!(fields[0].data, b"Tenant pays all repairs.");
        assert_eq!(fields[1].data, b"Kerala");
        assert_eq!(fields[2].data, b"tenant@example.com");
    }

    #[tokio::test]
    async fn test_anonymous_document_submission() {
        let received = Received::default();
        let app = Router::new()
            .route("/api/analyze", post(record_fields))
            .with_state(Arc::clone(&received));
        let client = client_for(&spawn_service(app).await);

        let payload = Payload::Document(Document::new(
            "lease.pdf",
            "application/pdf",
            b"%PDF-1.4 lease".to_vec(),
        ));
        let request = SubmissionBuilder::new(&payload).build().unwrap();
        client.submit(&request).await.unwrap();

        let fields = received.lock().unwrap().clone();
        assert_eq!(fields.len(), 1, "no state or email fields expected");
        assert_eq!(fields[0].name, "file");
        assert_eq!(fields[0].file_name.as_deref(), Some("lease.pdf"));
        assert_eq!(fields[0].content_type.as_deref(), Some("application/pdf"));
        assert_eq!(fields[0].data, b"%PDF-1.4 lease");
    }

    #[tokio::test]
    async fn test_service_error_message_surfaces_verbatim() {
        let app = Router::new().route(
            "/api/analyze",
            post(|| async {
                (AxumStatus::BAD_REQUEST, Json(json!({"error": "File corrupted"})))
            }),
        );
        let client = client_for(&spawn_service(app).await);

        let err = client.submit(&text_request("lease")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Service);
        assert_eq!(err.user_message(), "File corrupted");
    }

    #[tokio::test]
    async fn test_unparsable_error_body_uses_fallback() {
        let app = Router::new().route(
            "/api/analyze",
            post(|| async {
                (AxumStatus::INTERNAL_SERVER_ERROR, "<html>Bad Gateway</html>").into_response()
            }),
        );
        let client = client_for(&spawn_service(app).await);

        let err = client.submit(&text_request("lease")).await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Service {
                status: 500,
                message: GENERIC_SERVICE_FAILURE_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_success_is_transport_error() {
        let app = Router::new().route("/api/analyze", post(|| async { "definitely not json" }));
        let client = client_for(&spawn_service(app).await);

        let err = client.submit(&text_request("lease")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr));
        let err = client.submit(&text_request("lease")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_request_timeout_is_transport_error() {
        let app = Router::new().route(
            "/api/analyze",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"ratingScore": 10}))
            }),
        );
        let base = spawn_service(app).await;
        let client = AnalysisClient::new(
            AnalyzerConfig::default()
                .with_base_url(&base)
                .unwrap()
                .with_timeout(Some(Duration::from_millis(100))),
        );

        let err = client.submit(&text_request("lease")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = Router::new().route(
            "/api/health",
            get(|| async {
                Json(json!({"status": "healthy", "database": "connected", "message": "All systems operational"}))
            }),
        );
        let client = client_for(&spawn_service(app).await);

        let health = client.health().await.unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.database.as_deref(), Some("connected"));
    }

    #[tokio::test]
    async fn test_unhealthy_status_is_reported() {
        let app = Router::new().route(
            "/api/health",
            get(|| async {
                (
                    AxumStatus::INTERNAL_SERVER_ERROR,
                    Json(json!({"status": "unhealthy", "database": "disconnected"})),
                )
            }),
        );
        let client = client_for(&spawn_service(app).await);

        let health = client.health().await.unwrap();
        assert!(!health.is_healthy());
    }

    #[test]
    fn test_parse_response_error_only_success_body() {
        let err = parse_response(StatusCode::OK, br#"{"error": "Gemini quota exceeded"}"#).unwrap_err();
        assert_eq!(err.user_message(), "Gemini quota exceeded");
    }

    #[test]
    fn test_parse_response_non_object() {
        let err = parse_response(StatusCode::OK, b"[1, 2, 3]").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }
}
