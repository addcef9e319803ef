//! Lenient decoding of the OCR service response body.
//!
//! The service is a separately versioned dependency whose payload shape has
//! drifted over time, so every field is looked up under each of its known
//! aliases and unusable items are skipped rather than failing the request.

use glyph_core::{BoundingBox, Error, RawDetection, RawDetections, Result};
use serde_json::{Map, Value};

use crate::TRACING_TARGET_WIRE;

/// Keys that may hold the detection list, in priority order.
const LIST_KEYS: [&str; 3] = ["predictions", "results", "text_blocks"];

const TEXT_KEYS: [&str; 2] = ["text", "content"];
const SCORE_KEYS: [&str; 2] = ["confidence", "score"];
const BOX_KEYS: [&str; 2] = ["bbox", "bounding_box"];

/// Keys that may carry a failure description when `success` is `false`.
const MESSAGE_KEYS: [&str; 3] = ["message", "error", "detail"];

/// Decodes a response body into detections.
///
/// `status` is the HTTP status of the response and is only used to describe
/// a body that reports `"success": false`.
pub fn parse_detections(status: u16, body: &Value) -> Result<RawDetections> {
    match body {
        Value::Array(items) => Ok(parse_items(items)),
        Value::Object(object) => {
            if object.get("success") == Some(&Value::Bool(false)) {
                let message = first_str(object, &MESSAGE_KEYS)
                    .unwrap_or("OCR service reported failure")
                    .to_owned();
                return Err(Error::upstream_error(status, message));
            }

            match LIST_KEYS.iter().find_map(|key| object.get(*key)) {
                Some(Value::Array(items)) => Ok(parse_items(items)),
                Some(Value::Null) => Ok(RawDetections::default()),
                Some(other) => Err(Error::malformed_response(
                    format!("Detection list has unexpected type: {}", type_name(other)),
                    None,
                )),
                None => Ok(parse_item(object).into_iter().collect()),
            }
        }
        other => Err(Error::malformed_response(
            format!("Expected a JSON object or array, got {}", type_name(other)),
            None,
        )),
    }
}

fn parse_items(items: &[Value]) -> RawDetections {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(object) => parse_item(object),
            other => {
                tracing::warn!(
                    target: TRACING_TARGET_WIRE,
                    index,
                    kind = type_name(other),
                    "Skipping detection that is not an object"
                );
                None
            }
        })
        .collect()
}

fn parse_item(object: &Map<String, Value>) -> Option<RawDetection> {
    let text = first_str(object, &TEXT_KEYS).map(str::to_owned);
    let confidence = SCORE_KEYS
        .iter()
        .find_map(|key| object.get(*key))
        .and_then(lenient_f64);
    let bounding_box = BOX_KEYS
        .iter()
        .find_map(|key| object.get(*key))
        .and_then(parse_box);

    // Nothing here resembles a detection.
    if text.is_none() && confidence.is_none() && bounding_box.is_none() {
        return None;
    }

    Some(RawDetection {
        text,
        confidence,
        bounding_box,
    })
}

fn parse_box(value: &Value) -> Option<BoundingBox> {
    let Value::Object(object) = value else {
        tracing::warn!(target: TRACING_TARGET_WIRE, "Ignoring bounding box that is not an object");
        return None;
    };

    let field = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| object.get(*key))
            .and_then(lenient_f64)
            .unwrap_or(0.0)
    };

    Some(BoundingBox::new(
        field(&["x"]),
        field(&["y"]),
        field(&["width", "w"]),
        field(&["height", "h"]),
    ))
}

fn first_str<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| object.get(*key)?.as_str())
}

/// Reads a number, accepting numeric strings such as `"0.93"`.
fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
