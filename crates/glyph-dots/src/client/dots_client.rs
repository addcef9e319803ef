//! OCR service HTTP client implementation.

use std::time::Instant;

use async_trait::async_trait;
use glyph_core::{OcrProvider, RawDetections, RecognitionRequest, ServiceHealth};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use tracing::{debug, info, warn};

use crate::{DotsConfig, Error, Result, TRACING_TARGET_CLIENT, wire};

/// Longest upstream body kept for logging.
const MAX_LOGGED_BODY: usize = 1024;

/// HTTP client for a dots.ocr-compatible service.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct DotsClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: DotsConfig,
}

impl DotsClient {
    /// Creates a client with the given configuration.
    pub fn new(config: DotsConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in config.custom_headers() {
            let header_name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::config(format!("Invalid header name '{key}': {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("Invalid header value for '{key}': {e}")))?;
            headers.insert(header_name, header_value);
        }

        if let Some(api_key) = config.api_key() {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| Error::config(format!("Invalid API key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.base_url(),
            timeout_ms = config.timeout().as_millis(),
            "OCR service client initialized"
        );

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Get a reference to the client configuration.
    pub fn config(&self) -> &DotsConfig {
        &self.config
    }

    fn build_form(request: &RecognitionRequest) -> Result<Form> {
        let length = request.bytes.len() as u64;
        let file = Part::stream_with_length(Body::from(request.bytes.clone()), length)
            .file_name(request.filename.clone())
            .mime_str(&request.mime_type)
            .map_err(|e| {
                Error::config(format!("Invalid MIME type '{}': {e}", request.mime_type))
            })?;

        let options = &request.options;
        Ok(Form::new()
            .part("file", file)
            .text("language", options.language.clone())
            .text("include_confidence", options.include_confidence.to_string())
            .text(
                "include_bounding_boxes",
                options.include_bounding_boxes.to_string(),
            ))
    }

    /// Converts a non-success status into an error.
    fn status_error(status: StatusCode, body: &str) -> Error {
        let code = status.as_u16();
        match status {
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                Error::upstream_timeout(format!("OCR service returned status {code}"))
            }
            StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE => {
                Error::upstream_unavailable(format!("OCR service returned status {code}"))
            }
            _ => Error::upstream_error(code, truncate(body)),
        }
    }

    /// Reads the body, failing once it grows past `max_response_size`.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let limit = self.config.max_response_size();
        let too_large =
            || Error::malformed_response(format!("Response body exceeds {limit} bytes"), None);

        if response
            .content_length()
            .is_some_and(|length| length > limit as u64)
        {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if body.len() + chunk.len() > limit {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<RawDetections> {
        let status = response.status();
        let body = self.read_body(response).await?;

        debug!(
            target: TRACING_TARGET_CLIENT,
            status = status.as_u16(),
            size = body.len(),
            "Received response from OCR service"
        );

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            warn!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                body = %truncate(&text),
                "OCR service returned an error status"
            );
            return Err(Self::status_error(status, &text));
        }

        let value: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            let text = truncate(&String::from_utf8_lossy(&body));
            Error::malformed_response(format!("Response is not valid JSON: {e}"), Some(text))
        })?;

        wire::parse_detections(status.as_u16(), &value)
    }
}

#[async_trait]
impl OcrProvider for DotsClient {
    async fn recognize(&self, request: RecognitionRequest) -> Result<RawDetections> {
        let url = self.config.endpoint("ocr")?;
        let form = Self::build_form(&request)?;

        debug!(
            target: TRACING_TARGET_CLIENT,
            url = %url,
            filename = %request.filename,
            size = request.len(),
            mime_type = %request.mime_type,
            language = %request.options.language,
            "Sending image to OCR service"
        );

        let started = Instant::now();
        let response = self
            .http_client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let detections = self.handle_response(response).await?;

        info!(
            target: TRACING_TARGET_CLIENT,
            filename = %request.filename,
            detections = detections.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "OCR service call completed"
        );

        Ok(detections)
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        let url = self.config.endpoint("health")?;
        let started = Instant::now();

        let health = match self.http_client.get(url).send().await {
            Ok(response) if response.status().is_success() => ServiceHealth::healthy(),
            Ok(response) => ServiceHealth::degraded(format!(
                "OCR service returned status {}",
                response.status().as_u16()
            )),
            Err(e) => {
                warn!(
                    target: TRACING_TARGET_CLIENT,
                    error = %e,
                    "OCR service health check failed"
                );
                let message = if e.is_timeout() {
                    "OCR service health check timed out"
                } else {
                    "OCR service is unreachable"
                };
                ServiceHealth::unhealthy(message)
            }
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok(health.with_response_time_ms(elapsed_ms))
    }
}

/// Maps a transport failure into the upstream error taxonomy.
fn transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::upstream_timeout(error.to_string())
    } else if error.is_builder() {
        Error::config(error.to_string())
    } else {
        Error::upstream_unavailable(error.to_string())
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_LOGGED_BODY) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::Router;
    use axum::extract::Multipart;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use glyph_core::{ErrorKind, ImageUpload, ProcessingOptions, ServiceStatus};
    use serde_json::{Value, json};

    use super::*;

    async fn spawn_stub(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> DotsClient {
        let config = DotsConfig::new(format!("http://{addr}"))
            .unwrap()
            .with_timeout(Duration::from_millis(500));
        DotsClient::new(config).unwrap()
    }

    fn request() -> RecognitionRequest {
        RecognitionRequest {
            bytes: vec![0x89, b'P', b'N', b'G'].into(),
            filename: "scan.png".to_owned(),
            mime_type: "image/png".to_owned(),
            options: ProcessingOptions::default()
                .with_language("en")
                .with_bounding_boxes(true),
        }
    }

    /// Echoes every multipart field back as one detection per field.
    async fn echo(mut multipart: Multipart) -> axum::Json<Value> {
        let mut predictions = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_owned();
            let meta = format!(
                "{}|{}",
                field.file_name().unwrap_or_default(),
                field.content_type().unwrap_or_default()
            );
            let data = field.bytes().await.unwrap();
            let text = if name == "file" {
                format!("file={meta}|{}", data.len())
            } else {
                format!("{name}={}", String::from_utf8_lossy(&data))
            };
            predictions.push(json!({"text": text, "confidence": 0.9}));
        }

        axum::Json(json!({ "predictions": predictions }))
    }

    #[tokio::test]
    async fn sends_multipart_request() {
        let addr = spawn_stub(Router::new().route("/ocr", post(echo))).await;

        let detections = client_for(addr).recognize(request()).await.unwrap();
        let texts: Vec<_> = detections
            .iter()
            .filter_map(|d| d.text.clone())
            .collect();

        assert_eq!(
            texts,
            [
                "file=scan.png|image/png|4",
                "language=en",
                "include_confidence=true",
                "include_bounding_boxes=true",
            ]
        );
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let router = Router::new()
            .route("/ocr", post(|| async { (AxumStatus::BAD_REQUEST, "bad image") }));
        let addr = spawn_stub(router).await;

        let err = client_for(addr).recognize(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        assert!(!err.is_retryable());

        let router = Router::new()
            .route("/ocr", post(|| async { AxumStatus::SERVICE_UNAVAILABLE }));
        let addr = spawn_stub(router).await;

        let err = client_for(addr).recognize(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let router = Router::new().route("/ocr", post(|| async { "<html>oops</html>" }));
        let addr = spawn_stub(router).await;

        let err = client_for(addr).recognize(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamResponse);
    }

    #[tokio::test]
    async fn oversized_body_is_refused() {
        let router = Router::new().route(
            "/ocr",
            post(|| async {
                let prediction = json!({ "text": "x".repeat(4096), "confidence": 0.9 });
                json!({ "predictions": [prediction] }).to_string()
            }),
        );
        let addr = spawn_stub(router).await;

        let config = DotsConfig::new(format!("http://{addr}"))
            .unwrap()
            .with_max_response_size(1024);
        let err = DotsClient::new(config)
            .unwrap()
            .recognize(request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamResponse);

        let detections = client_for(addr).recognize(request()).await.unwrap();
        assert_eq!(detections.len(), 1);
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let router = Router::new().route(
            "/ocr",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let addr = spawn_stub(router).await;

        let err = client_for(addr).recognize(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(addr).recognize(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn health_reflects_upstream() {
        let router = Router::new().route("/health", get(|| async { "ok" }));
        let addr = spawn_stub(router).await;
        let health = client_for(addr).health_check().await.unwrap();
        assert_eq!(health.status, ServiceStatus::Healthy);
        assert!(health.response_time_ms.is_some());

        let router = Router::new()
            .route("/health", get(|| async { AxumStatus::INTERNAL_SERVER_ERROR }));
        let addr = spawn_stub(router).await;
        let health = client_for(addr).health_check().await.unwrap();
        assert_eq!(health.status, ServiceStatus::Degraded);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let health = client_for(addr).health_check().await.unwrap();
        assert_eq!(health.status, ServiceStatus::Unhealthy);
    }

    #[test]
    fn validated_upload_fits_the_wire() {
        let upload = ImageUpload::new(vec![1u8; 8], "a.jpg");
        let request = glyph_core::FormatValidator::default().check(upload).unwrap();
        assert!(DotsClient::build_form(&request).is_ok());
    }
}
