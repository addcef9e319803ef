//! [`Error`], [`ErrorKind`] and [`Result`].

mod http_error;
mod ocr_error;

pub use http_error::{Error, ErrorKind, Result};
pub use ocr_error::status_code;
