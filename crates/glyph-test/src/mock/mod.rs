//! Mock implementations of the OCR provider for testing.
//!
//! The mock returns scripted outcomes and sensible defaults, and is useful
//! for unit and integration testing as well as for running the gateway
//! without an OCR service.

mod optical;

pub use optical::{MockOcrConfig, MockOcrProvider, MockOutcome};
