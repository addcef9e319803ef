//! OCR endpoints: recognition, supported formats, stats and health.

use std::time::Instant;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use bytes::BytesMut;
use glyph_core::{
    BoxedOcrProvider, FormatValidator, ImageUpload, ProcessingOptions, ServiceStatus,
    ValidationError,
};
use jiff::Timestamp;
use validator::Validate;

use crate::extract::{Json, Multipart, ValidateJson, describe_validation_errors};
use crate::handler::Result;
use crate::handler::request::{ProcessImageRequest, UploadOptions, parse_flag};
use crate::handler::response::{
    Endpoints, OcrHealth, OcrResponse, ServiceStats, SupportedFormats,
};
use crate::service::{HealthCache, OcrOrchestrator, ServiceState, StatsRecorder};

/// Tracing target for OCR endpoint operations.
const TRACING_TARGET: &str = "glyph_server::handler::ocr";

/// Path prefix of every OCR endpoint.
pub const OCR_PREFIX: &str = "/api/v1/ocr";

const MIB: usize = 1024 * 1024;

/// The file part of a multipart upload.
struct FilePart {
    bytes: BytesMut,
    filename: Option<String>,
    content_type: Option<String>,
}

/// Recognizes text in an image uploaded as `multipart/form-data`.
#[tracing::instrument(skip_all)]
async fn upload_image(
    State(orchestrator): State<OcrOrchestrator>,
    State(validator): State<FormatValidator>,
    Multipart(mut multipart): Multipart,
) -> Result<OcrResponse> {
    let started = Instant::now();
    let max_size = validator.config().max_upload_size();

    let mut file: Option<FilePart> = None;
    let mut base = UploadOptions::default();
    let mut fields = UploadOptions::default();
    let mut invalid: Option<ValidationError> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let mut bytes = BytesMut::new();

                while let Some(chunk) = field.chunk().await? {
                    bytes.extend_from_slice(&chunk);
                    if bytes.len() > max_size {
                        tracing::debug!(
                            target: TRACING_TARGET,
                            received = bytes.len(),
                            max_size,
                            "Upload exceeded the size ceiling while streaming"
                        );

                        let error = ValidationError::FileTooLarge {
                            size: bytes.len(),
                            max_size,
                        };
                        let options = base
                            .overlay(fields)
                            .into_options(ProcessingOptions::default());
                        let report = orchestrator.reject(
                            started,
                            filename.as_deref(),
                            bytes.len(),
                            options,
                            error.into(),
                        );
                        return Ok(OcrResponse::from(report));
                    }
                }

                file = Some(FilePart {
                    bytes,
                    filename,
                    content_type,
                });
            }
            "language" => fields.language = Some(field.text().await?),
            "include_confidence" | "include_bounding_boxes" => {
                let value = field.text().await?;
                match parse_flag(&name, &value) {
                    Ok(flag) if name == "include_confidence" => {
                        fields.include_confidence = Some(flag)
                    }
                    Ok(flag) => fields.include_bounding_boxes = Some(flag),
                    Err(error) => {
                        invalid.get_or_insert(error);
                    }
                }
            }
            "options" => {
                let value = field.text().await?;
                match serde_json::from_str::<UploadOptions>(&value) {
                    Ok(options) => base = options,
                    Err(err) => {
                        invalid.get_or_insert(ValidationError::invalid_request(format!(
                            "Field 'options' is not valid JSON: {err}"
                        )));
                    }
                }
            }
            other => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    field = other,
                    "Ignoring unknown form field"
                );
            }
        }
    }

    let merged = base.overlay(fields);
    if let Err(errors) = merged.validate() {
        invalid.get_or_insert(ValidationError::invalid_request(describe_validation_errors(
            &errors,
        )));
    }
    let options = merged.into_options(ProcessingOptions::default());

    let Some(file) = file else {
        let error = invalid
            .unwrap_or_else(|| ValidationError::invalid_request("Missing form field 'file'"));
        let report = orchestrator.reject(started, None, 0, options, error.into());
        return Ok(OcrResponse::from(report));
    };

    if let Some(error) = invalid {
        let report = orchestrator.reject(
            started,
            file.filename.as_deref(),
            file.bytes.len(),
            options,
            error.into(),
        );
        return Ok(OcrResponse::from(report));
    }

    let filename = file.filename.unwrap_or_default();
    let mut upload = ImageUpload::new(file.bytes.freeze(), filename).with_options(options);
    if let Some(content_type) = file.content_type {
        upload = upload.with_mime_type(content_type);
    }

    let report = orchestrator.process(upload).await;
    Ok(OcrResponse::from(report))
}

fn upload_image_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Upload an image for OCR")
        .description(
            "Accepts multipart/form-data with a `file` part and optional `language`, \
             `include_confidence` and `include_bounding_boxes` fields. Booleans accept \
             true/false, 1/0, yes/no and on/off. An `options` field holding a JSON object \
             with the same keys is accepted as well; individual fields take precedence.",
        )
        .response::<200, OcrResponse>()
        .response::<400, OcrResponse>()
        .response::<413, OcrResponse>()
        .response::<415, OcrResponse>()
        .response::<422, OcrResponse>()
        .response::<502, OcrResponse>()
        .response::<503, OcrResponse>()
}

/// Recognizes text in a base64-encoded image sent as JSON.
#[tracing::instrument(skip_all)]
async fn process_image(
    State(orchestrator): State<OcrOrchestrator>,
    ValidateJson(request): ValidateJson<ProcessImageRequest>,
) -> OcrResponse {
    let started = Instant::now();
    let options = request.options();
    let filename = request.filename.clone();

    let report = match request.into_upload() {
        Ok(upload) => orchestrator.process(upload).await,
        Err(error) => {
            orchestrator.reject(started, filename.as_deref(), 0, options, error.into())
        }
    };

    OcrResponse::from(report)
}

fn process_image_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Process a base64 image")
        .description(
            "Accepts a JSON body with a base64 `image` (plain or as a data URL) and the \
             same options as the upload endpoint.",
        )
        .response::<200, OcrResponse>()
        .response::<400, OcrResponse>()
        .response::<415, OcrResponse>()
        .response::<422, OcrResponse>()
        .response::<503, OcrResponse>()
}

/// Lists accepted formats, the size ceiling and languages.
#[tracing::instrument(skip_all)]
async fn supported_formats(
    State(validator): State<FormatValidator>,
) -> (StatusCode, Json<SupportedFormats>) {
    let config = validator.config();
    let response = SupportedFormats {
        supported_formats: config.allowed_mime_types().to_vec(),
        max_file_size_mb: config.max_upload_size() / MIB,
        max_file_size_bytes: config.max_upload_size(),
        supported_languages: config.supported_languages().to_vec(),
    };

    (StatusCode::OK, Json(response))
}

fn supported_formats_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List supported formats")
        .description("Returns the MIME allow-list, the upload size ceiling and accepted languages.")
        .response::<200, Json<SupportedFormats>>()
}

/// Returns request counters and the OCR service status.
#[tracing::instrument(skip_all)]
async fn service_stats(
    State(stats): State<StatsRecorder>,
    State(health_cache): State<HealthCache>,
    State(provider): State<BoxedOcrProvider>,
) -> (StatusCode, Json<ServiceStats>) {
    let ocr_health = health_cache.get_or_update(provider.as_ref()).await;

    let response = ServiceStats {
        service_status: ServiceStatus::Healthy,
        ocr_service_status: ocr_health.status,
        timestamp: Timestamp::now(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime_secs: stats.uptime().as_secs(),
        requests: stats.snapshot(),
        endpoints: Endpoints::under(OCR_PREFIX),
    };

    (StatusCode::OK, Json(response))
}

fn service_stats_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get service statistics")
        .description(
            "Returns accumulated request counters, average latency, uptime, the OCR \
             service status and the endpoint map.",
        )
        .response::<200, Json<ServiceStats>>()
}

/// Reports gateway health together with the OCR service behind it.
#[tracing::instrument(skip_all)]
async fn ocr_health(
    State(health_cache): State<HealthCache>,
    State(provider): State<BoxedOcrProvider>,
) -> (StatusCode, Json<OcrHealth>) {
    let ocr_service = health_cache.get_or_update(provider.as_ref()).await;

    let (status, status_code) = match ocr_service.status {
        ServiceStatus::Healthy => (ServiceStatus::Healthy, StatusCode::OK),
        ServiceStatus::Degraded => (ServiceStatus::Degraded, StatusCode::OK),
        ServiceStatus::Unhealthy => (ServiceStatus::Degraded, StatusCode::SERVICE_UNAVAILABLE),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        status = status.as_str(),
        ocr_service_status = ocr_service.status.as_str(),
        "OCR health status prepared"
    );

    let response = OcrHealth {
        status,
        checked_at: Timestamp::now(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ocr_service,
    };

    (status_code, Json(response))
}

fn ocr_health_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get OCR health")
        .description(
            "Returns gateway health and the cached health report of the OCR service. \
             Answers 503 when the OCR service is unreachable.",
        )
        .response::<200, Json<OcrHealth>>()
        .response::<503, Json<OcrHealth>>()
}

/// Returns routes for the OCR endpoints.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            &format!("{OCR_PREFIX}/upload"),
            post_with(upload_image, upload_image_docs),
        )
        .api_route(
            &format!("{OCR_PREFIX}/process"),
            post_with(process_image, process_image_docs),
        )
        .api_route(
            &format!("{OCR_PREFIX}/supported-formats"),
            get_with(supported_formats, supported_formats_docs),
        )
        .api_route(
            &format!("{OCR_PREFIX}/stats"),
            get_with(service_stats, service_stats_docs),
        )
        .api_route(
            &format!("{OCR_PREFIX}/health"),
            get_with(ocr_health, ocr_health_docs),
        )
        .with_path_items(|item| item.tag("OCR"))
}
