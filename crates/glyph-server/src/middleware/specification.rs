//! OpenAPI document built by `aide` from the documented routes, plus a
//! Scalar page rendering it.

use aide::axum::ApiRouter;
use aide::openapi::{Info, License, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Where the API description is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path of the OpenAPI JSON document.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Path of the Scalar reference page.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

fn gateway_info() -> Info {
    Info {
        title: "Glyph OCR Gateway".to_owned(),
        summary: Some("HTTP gateway in front of an OCR inference service".to_owned()),
        description: Some(
            "Upload an image as multipart form data or base64 JSON and receive \
             normalized text blocks with confidence levels."
                .to_owned(),
        ),
        license: Some(License {
            name: "MIT".to_owned(),
            identifier: Some("MIT".to_owned()),
            ..License::default()
        }),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ..Info::default()
    }
}

async fn serve_document(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
    Json(api)
}

/// Extension trait for [`ApiRouter`] to publish its OpenAPI document.
pub trait RouterOpenApiExt<S> {
    /// Finishes the router, serving the document and the Scalar page at the
    /// configured paths.
    fn with_open_api(self, config: OpenApiConfig) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: OpenApiConfig) -> Router<S> {
        let mut api = OpenApi {
            info: gateway_info(),
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json).axum_route();
        self.route(&config.scalar_ui, scalar)
            .route(&config.open_api_json, get(serve_document))
            .finish_api(&mut api)
            .layer(Extension(api))
    }
}
