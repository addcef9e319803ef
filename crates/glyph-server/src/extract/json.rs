//! `Json` that answers rejections with an [`ErrorResponse`] body.
//!
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Drop-in for [`axum::Json`] with readable rejections.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        let detail = truncate_detail(&rejection.body_text());
        match rejection {
            JsonRejection::JsonDataError(_) => ErrorKind::BadRequest
                .with_message("The JSON body does not match the expected shape")
                .with_context(detail)
                .with_suggestion("Send `image` as a base64 string"),
            JsonRejection::JsonSyntaxError(_) => ErrorKind::BadRequest
                .with_message("The body is not valid JSON")
                .with_context(detail),
            JsonRejection::MissingJsonContentType(_) => ErrorKind::UnsupportedMediaType
                .with_message("Expected a JSON body")
                .with_suggestion("Set `Content-Type: application/json`"),
            JsonRejection::BytesRejection(_) if detail.contains("length limit") => {
                ErrorKind::PayloadTooLarge
                    .with_message("The encoded image exceeds the body limit")
                    .with_suggestion("Shrink the image before encoding it")
            }
            _ => ErrorKind::BadRequest
                .with_message("The body could not be read")
                .with_context(detail),
        }
    }
}

/// First three lines of a rejection, capped at 200 characters.
fn truncate_detail(message: &str) -> String {
    let joined = message.lines().take(3).collect::<Vec<_>>().join(" ");
    joined.chars().take(200).collect()
}

impl<T> aide::OperationInput for Json<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumJson::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumJson::<T>::inferred_early_responses(ctx, operation)
    }
}

impl<T> aide::OperationOutput for Json<T>
where
    T: schemars::JsonSchema + Serialize,
{
    type Inner = T;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        AxumJson::<T>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumJson::<T>::inferred_responses(ctx, operation)
    }
}
