//! Conversation messages and their parts
//!
//! Parts are a tagged union keyed by `type`. Tool parts use a dynamic tag
//! (`tool-<operation>`), so the wire form is handled through `Value` rather
//! than a derived tag. Fields this client does not model are kept in `extra`
//! and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TOOL_PREFIX: &str = "tool-";
const DATA_PREFIX: &str = "data-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            parts: vec![Part::Text(TextPart::done(text))],
            metadata: Some(MessageMetadata { created_at }),
        }
    }

    pub fn assistant(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            parts: Vec::new(),
            metadata: None,
        }
    }

    pub fn has_text(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, Part::Text(_)))
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn tool_part_mut(&mut self, tool_call_id: &str) -> Option<&mut ToolPart> {
        self.parts.iter_mut().find_map(|p| match p {
            Part::Tool(t) if t.tool_call_id == tool_call_id => Some(t),
            _ => None,
        })
    }
}

// ============================================================================
// Parts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Part {
    Text(TextPart),
    /// `data-<name>` custom event, e.g. the workflow status ping
    Data(DataPart),
    Tool(ToolPart),
    /// Anything else (`step-start`, `reasoning`, ...) kept verbatim
    Other(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextState {
    Streaming,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TextState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextPart {
    pub fn streaming() -> Self {
        Self {
            text: String::new(),
            state: Some(TextState::Streaming),
            extra: Map::new(),
        }
    }

    pub fn done(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPart {
    /// Suffix of the `data-` tag
    #[serde(skip)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataPart {
    pub const WORKFLOW: &'static str = "workflow";

    /// Status line carried by workflow pings
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

/// Lifecycle of a tool invocation as seen by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    #[serde(alias = "error")]
    OutputError,
}

impl ToolState {
    fn rank(self) -> u8 {
        match self {
            ToolState::InputStreaming => 0,
            ToolState::InputAvailable => 1,
            ToolState::OutputAvailable | ToolState::OutputError => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ToolState::OutputAvailable | ToolState::OutputError)
    }

    /// Forward-only; nothing leaves a terminal state
    pub fn can_advance_to(self, next: ToolState) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolState::InputStreaming => "Pending",
            ToolState::InputAvailable => "Running",
            ToolState::OutputAvailable => "Completed",
            ToolState::OutputError => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPart {
    /// Operation name, the suffix of the `tool-` tag
    #[serde(skip)]
    pub tool_name: String,
    pub tool_call_id: String,
    pub state: ToolState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolPart {
    pub fn new(tool_name: impl Into<String>, tool_call_id: impl Into<String>, state: ToolState) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_call_id: tool_call_id.into(),
            state,
            input: None,
            output: None,
            error_text: None,
            extra: Map::new(),
        }
    }

    /// Wire tag, e.g. `tool-createCase`
    pub fn part_type(&self) -> String {
        format!("{TOOL_PREFIX}{}", self.tool_name)
    }
}

impl Part {
    pub fn part_type(&self) -> String {
        match self {
            Part::Text(_) => "text".to_string(),
            Part::Data(d) => format!("{DATA_PREFIX}{}", d.name),
            Part::Tool(t) => t.part_type(),
            Part::Other(v) => v
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl TryFrom<Value> for Part {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Ok(Part::Other(value));
        };
        let tag = match fields.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            _ => return Ok(Part::Other(Value::Object(fields))),
        };
        fields.remove("type");

        if tag == "text" {
            return serde_json::from_value(Value::Object(fields)).map(Part::Text);
        }
        if let Some(name) = tag.strip_prefix(TOOL_PREFIX) {
            let mut part: ToolPart = serde_json::from_value(Value::Object(fields))?;
            part.tool_name = name.to_string();
            return Ok(Part::Tool(part));
        }
        if let Some(name) = tag.strip_prefix(DATA_PREFIX) {
            let mut part: DataPart = serde_json::from_value(Value::Object(fields))?;
            part.name = name.to_string();
            return Ok(Part::Data(part));
        }

        fields.insert("type".to_string(), Value::String(tag));
        Ok(Part::Other(Value::Object(fields)))
    }
}

impl From<Part> for Value {
    fn from(part: Part) -> Self {
        let tag = part.part_type();
        let body = match part {
            Part::Text(t) => serde_json::to_value(t),
            Part::Data(d) => serde_json::to_value(d),
            Part::Tool(t) => serde_json::to_value(t),
            Part::Other(v) => return v,
        };
        // Plain structs with string keys always serialize to objects
        let mut fields = match body {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        fields.insert("type".to_string(), Value::String(tag));
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_tool_part_wire_form() {
        let raw = json!({
            "type": "tool-createCase",
            "toolCallId": "call_1",
            "state": "output-available",
            "input": {"applicantName": "Jane"},
            "output": "{\"output\":{\"value\":\"{}\"}}",
            "providerExecuted": false
        });
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        let Part::Tool(tool) = &part else {
            panic!("expected tool part, got {part:?}");
        };
        assert_eq!(tool.tool_name, "createCase");
        assert_eq!(tool.state, ToolState::OutputAvailable);
        assert_eq!(tool.extra["providerExecuted"], false);

        assert_eq!(serde_json::to_value(&part).unwrap(), raw);
    }

    #[test]
    fn test_error_state_alias() {
        let part: Part = serde_json::from_value(json!({
            "type": "tool-updateCase",
            "toolCallId": "c",
            "state": "error",
            "errorText": "locked"
        }))
        .unwrap();
        let Part::Tool(tool) = part else { panic!() };
        assert_eq!(tool.state, ToolState::OutputError);
    }

    #[test]
    fn test_data_and_unknown_parts() {
        let data: Part = serde_json::from_value(json!({
            "type": "data-workflow",
            "id": "status",
            "data": {"message": "Running step 2"}
        }))
        .unwrap();
        let Part::Data(d) = &data else { panic!() };
        assert_eq!(d.name, DataPart::WORKFLOW);
        assert_eq!(d.message(), Some("Running step 2"));

        let step = json!({"type": "step-start"});
        let part: Part = serde_json::from_value(step.clone()).unwrap();
        assert_eq!(part, Part::Other(step.clone()));
        assert_eq!(serde_json::to_value(&part).unwrap(), step);
    }

    #[test]
    fn test_non_string_type_is_kept() {
        let odd = json!({"type": 5, "payload": "x"});
        let part: Part = serde_json::from_value(odd.clone()).unwrap();
        assert_eq!(part, Part::Other(odd.clone()));
        assert_eq!(serde_json::to_value(&part).unwrap(), odd);
    }

    #[test]
    fn test_message_round_trip() {
        let messages = vec![
            ChatMessage::user_text("I need to file a new disability claim", 1_700_000_000_000),
            ChatMessage {
                id: "a1".to_string(),
                role: Role::Assistant,
                parts: vec![
                    Part::Other(json!({"type": "step-start"})),
                    Part::Tool(ToolPart::new("checkCaseStatus", "t1", ToolState::OutputError)),
                    Part::Text(TextPart::done("Sorry, try again.")),
                ],
                metadata: None,
            },
        ];
        let json = serde_json::to_string(&messages).unwrap();
        let back: Vec<ChatMessage> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, messages);
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in [ToolState::OutputAvailable, ToolState::OutputError] {
            for to in [
                ToolState::InputStreaming,
                ToolState::InputAvailable,
                ToolState::OutputAvailable,
                ToolState::OutputError,
            ] {
                assert!(!from.can_advance_to(to), "{from:?} -> {to:?}");
            }
        }
        assert!(ToolState::InputStreaming.can_advance_to(ToolState::OutputError));
    }

    fn any_state() -> impl Strategy<Value = ToolState> {
        prop_oneof![
            Just(ToolState::InputStreaming),
            Just(ToolState::InputAvailable),
            Just(ToolState::OutputAvailable),
            Just(ToolState::OutputError),
        ]
    }

    proptest! {
        #[test]
        fn prop_transitions_never_go_backwards(path in proptest::collection::vec(any_state(), 0..12)) {
            let mut state = ToolState::InputStreaming;
            for next in path {
                if state.can_advance_to(next) {
                    prop_assert!(next.rank() > state.rank());
                    state = next;
                }
            }
        }
    }
}
