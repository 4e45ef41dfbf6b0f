//! Conversation state reconciler
//!
//! Merges streamed chunks into the ordered message list. Pure state: no I/O,
//! no clock. The session feeds it chunks and persists what it produces.

use super::chunk::UiChunk;
use super::message::{ChatMessage, DataPart, Part, Role, TextPart, TextState, ToolPart, ToolState};
use super::ChatError;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    /// Waiting for user input
    Ready,
    /// Request sent, no chunk received yet
    Submitted,
    Streaming,
    /// Last turn ended with an error chunk or transport failure
    Error,
}

/// What applying a chunk did to the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkEffect {
    Applied,
    /// Stopped, idle, or a chunk kind with no effect
    Ignored,
    /// Normal end of turn
    Finished,
    /// The producer aborted the turn
    Aborted,
    /// The producer reported an error
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    status: ChatStatus,
    stopped: bool,
    last_error: Option<String>,
    /// Index of the assistant message the current turn writes into
    turn_message: Option<usize>,
    /// Open text parts by stream text id, as part indices
    open_text: HashMap<String, usize>,
    /// Raw partial tool input by tool call id
    input_buffers: HashMap<String, String>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::restore(Vec::new())
    }
}

impl Conversation {
    /// Resume from a persisted message list, verbatim
    pub fn restore(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            status: ChatStatus::Ready,
            stopped: false,
            last_error: None,
            turn_message: None,
            open_text: HashMap::new(),
            input_buffers: HashMap::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.status, ChatStatus::Submitted | ChatStatus::Streaming)
    }

    /// Trailing assistant message of an in-flight turn has no text yet
    pub fn is_processing(&self) -> bool {
        self.is_in_flight()
            && self
                .messages
                .last()
                .is_some_and(|m| m.role == Role::Assistant && !m.has_text())
    }

    /// Append a user message and open a new turn
    pub fn submit_user_text(&mut self, text: &str, created_at: i64) -> Result<&ChatMessage, ChatError> {
        if self.is_in_flight() {
            return Err(ChatError::Busy);
        }
        self.begin_turn();
        self.messages.push(ChatMessage::user_text(text, created_at));
        let last = self.messages.len() - 1;
        Ok(&self.messages[last])
    }

    /// Open a turn that re-attaches to a run already in progress
    pub fn begin_resume(&mut self) -> Result<(), ChatError> {
        if self.is_in_flight() {
            return Err(ChatError::Busy);
        }
        self.begin_turn();
        Ok(())
    }

    /// Halt chunk application. The partial state is kept as is.
    pub fn stop(&mut self) {
        if self.is_in_flight() {
            tracing::debug!(messages = self.messages.len(), "Conversation stopped");
        }
        self.stopped = true;
        self.status = ChatStatus::Ready;
        self.close_turn();
    }

    /// Mark the turn failed for reasons outside the stream itself
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ChatStatus::Error;
        self.last_error = Some(message.into());
        self.close_turn();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn apply_chunk(&mut self, chunk: UiChunk) -> Result<ChunkEffect, ChatError> {
        if self.stopped || !self.is_in_flight() {
            tracing::debug!(?chunk, "Ignoring chunk outside an active turn");
            return Ok(ChunkEffect::Ignored);
        }
        if self.status == ChatStatus::Submitted {
            self.status = ChatStatus::Streaming;
        }

        match chunk {
            UiChunk::Start { message_id } => {
                self.start_message(message_id);
            }
            UiChunk::StartStep => {
                self.assistant_mut()
                    .parts
                    .push(Part::Other(serde_json::json!({"type": "step-start"})));
            }
            UiChunk::FinishStep => {
                self.open_text.clear();
                self.input_buffers.clear();
            }

            UiChunk::TextStart { id } => {
                let message = self.assistant_mut();
                message.parts.push(Part::Text(TextPart::streaming()));
                let index = message.parts.len() - 1;
                self.open_text.insert(id, index);
            }
            UiChunk::TextDelta { id, delta } => {
                self.with_text(id, |part| part.text.push_str(&delta));
            }
            UiChunk::TextEnd { id } => {
                if let Some(index) = self.open_text.remove(&id) {
                    if let Some(Part::Text(part)) = self.assistant_mut().parts.get_mut(index) {
                        part.state = Some(TextState::Done);
                    }
                }
            }

            UiChunk::ToolInputStart {
                tool_call_id,
                tool_name,
            } => {
                let part = ToolPart::new(tool_name, tool_call_id, ToolState::InputStreaming);
                self.assistant_mut().parts.push(Part::Tool(part));
            }
            UiChunk::ToolInputDelta {
                tool_call_id,
                input_text_delta,
            } => {
                let buffer = self.input_buffers.entry(tool_call_id.clone()).or_default();
                buffer.push_str(&input_text_delta);
                // Partial JSON stays unparsed until it closes
                let parsed = serde_json::from_str::<Value>(buffer).ok();
                let part = self.tool_part_mut(&tool_call_id)?;
                if parsed.is_some() {
                    part.input = parsed;
                }
            }
            UiChunk::ToolInputAvailable {
                tool_call_id,
                tool_name,
                input,
            } => {
                self.input_buffers.remove(&tool_call_id);
                let message = self.assistant_mut();
                if message.tool_part_mut(&tool_call_id).is_none() {
                    let part = ToolPart::new(tool_name, tool_call_id.clone(), ToolState::InputStreaming);
                    message.parts.push(Part::Tool(part));
                }
                let part = self.tool_part_mut(&tool_call_id)?;
                advance(part, ToolState::InputAvailable)?;
                part.input = Some(input);
            }
            UiChunk::ToolOutputAvailable { tool_call_id, output } => {
                let part = self.tool_part_mut(&tool_call_id)?;
                advance(part, ToolState::OutputAvailable)?;
                part.output = Some(output);
            }
            UiChunk::ToolOutputError {
                tool_call_id,
                error_text,
            } => {
                let part = self.tool_part_mut(&tool_call_id)?;
                advance(part, ToolState::OutputError)?;
                part.error_text = Some(error_text);
            }

            UiChunk::DataWorkflow { id, data } => {
                self.upsert_data(DataPart::WORKFLOW, id, data);
            }

            UiChunk::Error { error_text } => {
                self.fail(error_text.clone());
                return Ok(ChunkEffect::Failed(error_text));
            }
            UiChunk::Finish => {
                self.status = ChatStatus::Ready;
                self.close_turn();
                return Ok(ChunkEffect::Finished);
            }
            UiChunk::Abort => {
                self.status = ChatStatus::Ready;
                self.close_turn();
                return Ok(ChunkEffect::Aborted);
            }
            UiChunk::Unknown => return Ok(ChunkEffect::Ignored),
        }

        Ok(ChunkEffect::Applied)
    }

    fn begin_turn(&mut self) {
        self.status = ChatStatus::Submitted;
        self.stopped = false;
        self.last_error = None;
        self.close_turn();
    }

    fn close_turn(&mut self) {
        self.turn_message = None;
        self.open_text.clear();
        self.input_buffers.clear();
    }

    fn start_message(&mut self, message_id: Option<String>) {
        if self.turn_message.is_some() {
            return;
        }
        // A replayed run restarts the message it already produced
        if let (Some(id), Some(last)) = (message_id.as_deref(), self.messages.last_mut()) {
            if last.role == Role::Assistant && last.id == id {
                last.parts.clear();
                self.turn_message = Some(self.messages.len() - 1);
                return;
            }
        }
        let id = message_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.messages.push(ChatMessage::assistant(id));
        self.turn_message = Some(self.messages.len() - 1);
    }

    fn assistant_mut(&mut self) -> &mut ChatMessage {
        if self.turn_message.is_none() {
            self.start_message(None);
        }
        let index = self.turn_message.unwrap_or(self.messages.len() - 1);
        &mut self.messages[index]
    }

    /// Apply `f` to the text part for a stream text id. A delta that arrives
    /// without its start opens the part.
    fn with_text(&mut self, id: String, f: impl FnOnce(&mut TextPart)) {
        let known = self.open_text.get(&id).copied();
        let message = self.assistant_mut();
        if let Some(Part::Text(text)) = known.and_then(|i| message.parts.get_mut(i)) {
            f(text);
            return;
        }
        let mut text = TextPart::streaming();
        f(&mut text);
        message.parts.push(Part::Text(text));
        let index = message.parts.len() - 1;
        self.open_text.insert(id, index);
    }

    fn tool_part_mut(&mut self, tool_call_id: &str) -> Result<&mut ToolPart, ChatError> {
        self.assistant_mut()
            .tool_part_mut(tool_call_id)
            .ok_or_else(|| ChatError::UnknownToolCall(tool_call_id.to_string()))
    }

    fn upsert_data(&mut self, name: &str, id: Option<String>, data: Value) {
        let message = self.assistant_mut();
        if let Some(id) = id.as_deref() {
            let existing = message.parts.iter_mut().find_map(|p| match p {
                Part::Data(d) if d.name == name && d.id.as_deref() == Some(id) => Some(d),
                _ => None,
            });
            if let Some(existing) = existing {
                existing.data = data;
                return;
            }
        }
        message.parts.push(Part::Data(DataPart {
            name: name.to_string(),
            id,
            data,
            extra: serde_json::Map::new(),
        }));
    }
}

fn advance(part: &mut ToolPart, next: ToolState) -> Result<(), ChatError> {
    if !part.state.can_advance_to(next) {
        return Err(ChatError::InvalidTransition {
            tool_call_id: part.tool_call_id.clone(),
            from: part.state,
            to: next,
        });
    }
    part.state = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submitted(text: &str) -> Conversation {
        let mut conv = Conversation::default();
        conv.submit_user_text(text, 1).unwrap();
        conv
    }

    fn chunk(value: Value) -> UiChunk {
        serde_json::from_value(value).unwrap()
    }

    fn assistant(conv: &Conversation) -> &ChatMessage {
        let last = conv.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        last
    }

    #[test]
    fn test_text_deltas_concatenate() {
        let mut conv = submitted("hi");
        assert_eq!(conv.status(), ChatStatus::Submitted);

        for c in [
            json!({"type": "start", "messageId": "m1"}),
            json!({"type": "text-start", "id": "t"}),
            json!({"type": "text-delta", "id": "t", "delta": "Hello"}),
            json!({"type": "text-delta", "id": "t", "delta": ", Jane"}),
            json!({"type": "text-end", "id": "t"}),
        ] {
            assert_eq!(conv.apply_chunk(chunk(c)).unwrap(), ChunkEffect::Applied);
        }
        assert_eq!(conv.status(), ChatStatus::Streaming);
        assert_eq!(assistant(&conv).id, "m1");
        assert_eq!(assistant(&conv).text(), "Hello, Jane");

        assert_eq!(conv.apply_chunk(UiChunk::Finish).unwrap(), ChunkEffect::Finished);
        assert_eq!(conv.status(), ChatStatus::Ready);
        assert_eq!(conv.messages().len(), 2);
    }

    #[test]
    fn test_parts_keep_arrival_order() {
        let mut conv = submitted("check DC1");
        for c in [
            json!({"type": "start"}),
            json!({"type": "start-step"}),
            json!({"type": "data-workflow", "data": {"message": "Starting"}}),
            json!({"type": "tool-input-start", "toolCallId": "c1", "toolName": "checkCaseStatus"}),
            json!({"type": "tool-input-delta", "toolCallId": "c1", "inputTextDelta": "{\"caseId\":"}),
            json!({"type": "tool-input-delta", "toolCallId": "c1", "inputTextDelta": "\"DC1\"}"}),
            json!({"type": "tool-input-available", "toolCallId": "c1", "toolName": "checkCaseStatus", "input": {"caseId": "DC1"}}),
            json!({"type": "tool-output-available", "toolCallId": "c1", "output": "{}"}),
            json!({"type": "text-delta", "id": "x", "delta": "Done"}),
        ] {
            conv.apply_chunk(chunk(c)).unwrap();
        }
        let types: Vec<String> = assistant(&conv).parts.iter().map(Part::part_type).collect();
        assert_eq!(
            types,
            ["step-start", "data-workflow", "tool-checkCaseStatus", "text"]
        );
        let Part::Tool(tool) = &assistant(&conv).parts[2] else { panic!() };
        assert_eq!(tool.state, ToolState::OutputAvailable);
        assert_eq!(tool.input, Some(json!({"caseId": "DC1"})));
    }

    #[test]
    fn test_terminal_tool_state_rejects_further_transitions() {
        let mut conv = submitted("update");
        conv.apply_chunk(chunk(json!({
            "type": "tool-input-available", "toolCallId": "c1", "toolName": "updateCase", "input": {}
        })))
        .unwrap();
        conv.apply_chunk(chunk(json!({
            "type": "tool-output-error", "toolCallId": "c1", "errorText": "locked"
        })))
        .unwrap();

        let err = conv
            .apply_chunk(chunk(json!({"type": "tool-output-available", "toolCallId": "c1", "output": "{}"})))
            .unwrap_err();
        assert!(matches!(
            err,
            ChatError::InvalidTransition {
                from: ToolState::OutputError,
                ..
            }
        ));
    }

    #[test]
    fn test_output_for_unknown_call_is_an_error() {
        let mut conv = submitted("x");
        let err = conv
            .apply_chunk(chunk(json!({"type": "tool-output-available", "toolCallId": "nope", "output": 1})))
            .unwrap_err();
        assert!(matches!(err, ChatError::UnknownToolCall(id) if id == "nope"));
    }

    #[test]
    fn test_data_parts_with_same_id_are_replaced() {
        let mut conv = submitted("x");
        conv.apply_chunk(chunk(json!({"type": "data-workflow", "id": "s", "data": {"message": "one"}})))
            .unwrap();
        conv.apply_chunk(chunk(json!({"type": "data-workflow", "id": "s", "data": {"message": "two"}})))
            .unwrap();
        conv.apply_chunk(chunk(json!({"type": "data-workflow", "data": {"message": "three"}})))
            .unwrap();

        let messages: Vec<_> = assistant(&conv)
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Data(d) => d.message(),
                _ => None,
            })
            .collect();
        assert_eq!(messages, ["two", "three"]);
    }

    #[test]
    fn test_stop_freezes_partial_state() {
        let mut conv = submitted("x");
        conv.apply_chunk(chunk(json!({"type": "text-delta", "id": "t", "delta": "Part"})))
            .unwrap();
        conv.stop();
        let snapshot = conv.messages().to_vec();

        let effect = conv
            .apply_chunk(chunk(json!({"type": "text-delta", "id": "t", "delta": "ial"})))
            .unwrap();
        assert_eq!(effect, ChunkEffect::Ignored);
        assert_eq!(conv.apply_chunk(UiChunk::Finish).unwrap(), ChunkEffect::Ignored);
        assert_eq!(conv.messages(), snapshot.as_slice());
        assert_eq!(assistant(&conv).text(), "Part");
    }

    #[test]
    fn test_busy_while_in_flight() {
        let mut conv = submitted("first");
        assert!(matches!(conv.submit_user_text("second", 2), Err(ChatError::Busy)));
        assert_eq!(conv.messages().len(), 1);
    }

    #[test]
    fn test_error_chunk_fails_turn() {
        let mut conv = submitted("x");
        let effect = conv
            .apply_chunk(UiChunk::Error {
                error_text: "model overloaded".to_string(),
            })
            .unwrap();
        assert_eq!(effect, ChunkEffect::Failed("model overloaded".to_string()));
        assert_eq!(conv.status(), ChatStatus::Error);
        assert_eq!(conv.last_error(), Some("model overloaded"));

        // A failed turn does not block the next one
        conv.submit_user_text("again", 3).unwrap();
        assert_eq!(conv.last_error(), None);
    }

    #[test]
    fn test_processing_until_text_arrives() {
        let mut conv = submitted("x");
        conv.apply_chunk(chunk(json!({"type": "start"}))).unwrap();
        assert!(conv.is_processing());
        conv.apply_chunk(chunk(json!({"type": "text-delta", "id": "t", "delta": "ok"})))
            .unwrap();
        assert!(!conv.is_processing());
    }

    #[test]
    fn test_replayed_start_restarts_same_message() {
        let mut conv = submitted("x");
        conv.apply_chunk(chunk(json!({"type": "start", "messageId": "m1"}))).unwrap();
        conv.apply_chunk(chunk(json!({"type": "text-delta", "id": "t", "delta": "Hel"})))
            .unwrap();
        conv.stop();

        conv.begin_resume().unwrap();
        for c in [
            json!({"type": "start", "messageId": "m1"}),
            json!({"type": "text-delta", "id": "t", "delta": "Hello"}),
        ] {
            conv.apply_chunk(chunk(c)).unwrap();
        }
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(assistant(&conv).text(), "Hello");
    }
}
