//! [`Json`] followed by `validator` checks on the decoded body.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// JSON extractor that also runs [`Validate`] on the body.
///
/// Shape errors are answered like [`Json`] rejections; constraint
/// violations become a 400 naming every offending field.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self(data))
    }
}

fn length_message(field: &str, params: &HashMap<Cow<'static, str>, serde_json::Value>) -> String {
    let bound = |key: &str| params.get(key).and_then(serde_json::Value::as_u64);
    match (bound("min"), bound("max")) {
        (Some(1), None) => format!("Field '{field}' must not be empty"),
        (Some(min), Some(max)) => {
            format!("Field '{field}' must be between {min} and {max} characters long")
        }
        (Some(min), None) => format!("Field '{field}' must be at least {min} characters long"),
        (None, Some(max)) => format!("Field '{field}' must be at most {max} characters long"),
        (None, None) => format!("Field '{field}' has an invalid length"),
    }
}

fn field_message(field: &str, error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("Field '{field}': {message}");
    }

    match error.code.as_ref() {
        "length" => length_message(field, &error.params),
        "required" => format!("Field '{field}' is required"),
        code => format!("Field '{field}' failed validation: {code}"),
    }
}

/// One sentence per violated constraint, ordered by field name.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    let messages: Vec<String> = fields
        .iter()
        .flat_map(|(field, errors)| errors.iter().map(move |error| field_message(field, error)))
        .collect();

    if messages.is_empty() {
        "Validation failed".to_owned()
    } else {
        messages.join(". ")
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        tracing::warn!(errors = ?errors.field_errors(), "Request validation failed");
        ErrorKind::BadRequest.with_message(describe_validation_errors(&errors))
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1))]
        image: String,
        #[validate(length(max = 4))]
        language: Option<String>,
    }

    #[test]
    fn valid_values_pass() {
        let sample = Sample {
            image: "aGk=".to_owned(),
            language: Some("en".to_owned()),
        };
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn every_violation_is_described() {
        let sample = Sample {
            image: String::new(),
            language: Some("klingon".to_owned()),
        };
        let errors = sample.validate().unwrap_err();

        assert_eq!(
            describe_validation_errors(&errors),
            "Field 'image' must not be empty. \
             Field 'language' must be at most 4 characters long"
        );

        let error = Error::from(errors);
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}
