//! Tool output envelope
//!
//! The transport stores a tool result as JSON text of
//! `{"output": {"type": ..., "value": <JSON text of the result>}}`.
//! Either layer may also arrive already decoded. This is the only place
//! that peels it.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Tool part has no output")]
    MissingOutput,
    #[error("Tool output envelope has no output.value")]
    MissingValue,
    #[error("Tool output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decode a layer that is either JSON text or an already-decoded value
fn decode_layer(layer: &Value) -> Result<Value, RenderError> {
    match layer {
        Value::String(text) => Ok(serde_json::from_str(text)?),
        Value::Null => Err(RenderError::MissingOutput),
        other => Ok(other.clone()),
    }
}

/// Peel both layers and return the operation's structured result
pub fn unwrap_tool_output(output: Option<&Value>) -> Result<Value, RenderError> {
    let envelope = decode_layer(output.ok_or(RenderError::MissingOutput)?)?;
    let value = envelope
        .pointer("/output/value")
        .ok_or(RenderError::MissingValue)?;
    match decode_layer(value) {
        Err(RenderError::MissingOutput) => Err(RenderError::MissingValue),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn double_encoded(result: &Value) -> Value {
        let envelope = json!({"output": {"type": "text", "value": result.to_string()}});
        Value::String(envelope.to_string())
    }

    #[test]
    fn test_unwraps_both_string_layers() {
        let result = json!({"caseId": "DCABCDEFGHIJ", "status": "Pending Review"});
        let unwrapped = unwrap_tool_output(Some(&double_encoded(&result))).unwrap();
        assert_eq!(unwrapped, result);
    }

    #[test]
    fn test_accepts_decoded_layers() {
        let result = json!({"documentId": "DOC12345678"});
        let outer_object = json!({"output": {"type": "json", "value": result}});
        assert_eq!(unwrap_tool_output(Some(&outer_object)).unwrap(), result);

        let inner_string = json!({"output": {"value": result.to_string()}});
        assert_eq!(unwrap_tool_output(Some(&inner_string)).unwrap(), result);
    }

    #[test]
    fn test_malformed_outputs_are_errors() {
        assert!(matches!(unwrap_tool_output(None), Err(RenderError::MissingOutput)));
        assert!(matches!(
            unwrap_tool_output(Some(&json!("not json"))),
            Err(RenderError::Decode(_))
        ));
        assert!(matches!(
            unwrap_tool_output(Some(&json!({"result": 1}))),
            Err(RenderError::MissingValue)
        ));
        assert!(matches!(
            unwrap_tool_output(Some(&json!({"output": {"value": null}}))),
            Err(RenderError::MissingValue)
        ));
    }
}
