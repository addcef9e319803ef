#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Logging target for client lifecycle and requests.
pub const TRACING_TARGET_CLIENT: &str = "glyph_dots::client";

/// Logging target for response decoding.
pub const TRACING_TARGET_WIRE: &str = "glyph_dots::wire";

mod client;
pub mod wire;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MAX_RESPONSE_SIZE, DotsClient, DotsConfig};
pub use glyph_core::{Error, Result};
