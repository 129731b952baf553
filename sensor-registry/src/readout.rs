//! Sensor readout values and their presentation.
//!
//! Drivers return one of three shapes: a single scalar, an ordered list of
//! integer samples, or a structured channel reading. [`describe_readout`]
//! turns each shape into display text. Opaque values (e.g. readings relayed
//! as JSON) are classified with [`ReadResult::from_value`]; a value matching
//! none of the shapes is reported, never fatal.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;

use crate::error::ReadoutError;
use crate::tracing::prelude::*;

/// A single sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadResult {
    Scalar(f64),
    List(Vec<i64>),
    Structured {
        triggered: bool,
        channel: i64,
        value: f64,
    },
}

impl ReadResult {
    /// Classify an opaque value.
    ///
    /// Numbers are scalars, arrays of integers are lists, and objects
    /// carrying exactly `triggered` (bool), `channel` (integer) and `value`
    /// (number) are structured readings.
    pub fn from_value(value: &Value) -> Result<Self, ReadoutError> {
        let unrecognized = || ReadoutError::UnrecognizedReadoutShape(value.to_string());

        match value {
            Value::Number(n) => n.as_f64().map(ReadResult::Scalar).ok_or_else(unrecognized),
            Value::Array(items) => items
                .iter()
                .map(Value::as_i64)
                .collect::<Option<Vec<_>>>()
                .map(ReadResult::List)
                .ok_or_else(unrecognized),
            Value::Object(fields) if fields.len() == 3 => {
                let triggered = fields.get("triggered").and_then(Value::as_bool);
                let channel = fields.get("channel").and_then(Value::as_i64);
                let reading = fields.get("value").and_then(Value::as_f64);
                match (triggered, channel, reading) {
                    (Some(triggered), Some(channel), Some(value)) => Ok(ReadResult::Structured {
                        triggered,
                        channel,
                        value,
                    }),
                    _ => Err(unrecognized()),
                }
            }
            _ => Err(unrecognized()),
        }
    }
}

/// Render a reading for display.
///
/// Scalars become one numeric line, lists one line per element with its
/// index, structured readings one line per named field.
pub fn describe_readout(result: &ReadResult) -> String {
    match result {
        ReadResult::Scalar(v) => format!("Value: {}", v),
        ReadResult::List(values) => {
            let mut out = String::from("Value list:");
            for (idx, v) in values.iter().enumerate() {
                // Writing to a String cannot fail
                let _ = write!(out, "\nValue no.{} = {}", idx, v);
            }
            out
        }
        ReadResult::Structured {
            triggered,
            channel,
            value,
        } => format!(
            "Complex value:\nTriggered: {}\nChannel no: {}\nValue: {}",
            triggered, channel, value
        ),
    }
}

/// Classify and render an opaque readout value.
///
/// An unrecognized shape is logged and returned as an error for the caller
/// to report; it never affects the registry.
pub fn dispatch_value(value: &Value) -> Result<String, ReadoutError> {
    match ReadResult::from_value(value) {
        Ok(result) => Ok(describe_readout(&result)),
        Err(e) => {
            warn!(error = %e, "Cannot dispatch sensor readout");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_describe_scalar() {
        assert_eq!(describe_readout(&ReadResult::Scalar(1.12345)), "Value: 1.12345");
    }

    #[test]
    fn test_describe_list_enumerates_elements() {
        let text = describe_readout(&ReadResult::List(vec![3, 4, 5]));
        assert_eq!(
            text,
            "Value list:\nValue no.0 = 3\nValue no.1 = 4\nValue no.2 = 5"
        );
    }

    #[test]
    fn test_describe_empty_list() {
        assert_eq!(describe_readout(&ReadResult::List(vec![])), "Value list:");
    }

    #[test]
    fn test_describe_structured_names_fields() {
        let text = describe_readout(&ReadResult::Structured {
            triggered: true,
            channel: 7,
            value: 8.765,
        });
        assert!(text.contains("Triggered: true"));
        assert!(text.contains("Channel no: 7"));
        assert!(text.contains("Value: 8.765"));
    }

    #[test]
    fn test_classify_known_shapes() {
        assert_eq!(
            ReadResult::from_value(&json!(5.555)).unwrap(),
            ReadResult::Scalar(5.555)
        );
        assert_eq!(
            ReadResult::from_value(&json!(3)).unwrap(),
            ReadResult::Scalar(3.0)
        );
        assert_eq!(
            ReadResult::from_value(&json!([3, 4, 5])).unwrap(),
            ReadResult::List(vec![3, 4, 5])
        );
        assert_eq!(
            ReadResult::from_value(&json!({"triggered": false, "channel": -1, "value": 0.0}))
                .unwrap(),
            ReadResult::Structured {
                triggered: false,
                channel: -1,
                value: 0.0
            }
        );
    }

    #[test_case(json!("text") ; "string")]
    #[test_case(json!(null) ; "null")]
    #[test_case(json!(true) ; "bool")]
    #[test_case(json!([1.5, 2.5]) ; "list of floats")]
    #[test_case(json!({"triggered": true, "channel": 1}) ; "partial structure")]
    #[test_case(json!({"triggered": 1, "channel": 1, "value": 2.0}) ; "mistyped field")]
    #[test_case(json!({"triggered": true, "channel": 1, "value": 2.0, "extra": 0}) ; "extra field")]
    fn test_unrecognized_shapes(value: Value) {
        assert!(matches!(
            ReadResult::from_value(&value),
            Err(ReadoutError::UnrecognizedReadoutShape(_))
        ));
        assert!(dispatch_value(&value).is_err());
    }

    #[test]
    fn test_dispatch_value_renders_known_shape() {
        assert_eq!(dispatch_value(&json!([7])).unwrap(), "Value list:\nValue no.0 = 7");
    }

    #[test]
    fn test_serialize_round_trips_through_classifier() {
        let results = [
            ReadResult::Scalar(1.5),
            ReadResult::List(vec![1, 2]),
            ReadResult::Structured {
                triggered: true,
                channel: 7,
                value: 8.765,
            },
        ];
        for result in results {
            let value = serde_json::to_value(&result).unwrap();
            assert_eq!(ReadResult::from_value(&value).unwrap(), result);
        }
    }
}
