//! `Multipart` that answers rejections with an [`ErrorResponse`] body.
//!
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart as AxumMultipart, Request};
use axum::http::StatusCode;
use derive_more::{Deref, DerefMut, From};

use crate::handler::{Error, ErrorKind};

#[must_use]
#[derive(Debug, Deref, DerefMut, From)]
pub struct Multipart(pub AxumMultipart);

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = AxumMultipart::from_request(req, state).await?;
        Ok(Self(multipart))
    }
}

impl From<MultipartRejection> for Error<'static> {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection {
            MultipartRejection::InvalidBoundary(_) => ErrorKind::UnsupportedMediaType
                .with_message("Expected a multipart/form-data body")
                .with_suggestion("Upload the image in a form field named `file`"),
            other => ErrorKind::BadRequest
                .with_message("The form could not be read")
                .with_context(other.body_text()),
        }
    }
}

/// A field that fails mid-stream; 413 when the body limit was hit.
impl From<MultipartError> for Error<'static> {
    fn from(error: MultipartError) -> Self {
        match error.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ErrorKind::PayloadTooLarge
                .with_message("The upload exceeds the body limit"),
            _ => ErrorKind::BadRequest
                .with_message("A form field could not be read")
                .with_context(error.body_text()),
        }
    }
}

impl aide::OperationInput for Multipart {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumMultipart::operation_input(ctx, operation);
    }
}
