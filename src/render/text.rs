//! Terminal formatting for messages and rendering plans

use super::plan::{Block, RenderPlan, Tone};
use super::{render_tool_part, ToolBlock, ToolBody};
use crate::chat::{ChatMessage, Part, Role};
use colored::{ColoredString, Colorize};
use std::fmt::{self, Write as _};

const INDENT: &str = "  ";

fn paint(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Plain => text.normal(),
        Tone::Success => text.green(),
        Tone::Warning => text.yellow(),
        Tone::Danger => text.red(),
        Tone::Muted => text.dimmed(),
    }
}

impl fmt::Display for RenderPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            match block {
                Block::Banner { text, tone } => writeln!(f, "{}", paint(text, *tone).bold())?,
                Block::Field { label, value, tone } => {
                    writeln!(f, "{label}: {}", paint(value, *tone))?;
                }
                Block::Text { text, .. } if text.is_empty() => {}
                Block::Text { text, tone } => writeln!(f, "{}", paint(text, *tone))?,
                Block::List { title, items } => {
                    writeln!(f, "{}", format!("{title}:").bold())?;
                    for item in items {
                        writeln!(f, "{INDENT}- {}", item.dimmed())?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ToolBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tone = match self.body {
            ToolBody::Error(_) => Tone::Danger,
            ToolBody::Plan(_) | ToolBody::Empty => Tone::Success,
            ToolBody::Pending => Tone::Muted,
        };
        writeln!(f, "[{}]", paint(&self.header(), tone))?;
        if let Some(input) = &self.input {
            writeln!(f, "{}", format!("input: {input}").dimmed())?;
        }
        match &self.body {
            ToolBody::Plan(plan) => write!(f, "{plan}"),
            ToolBody::Error(text) => writeln!(f, "{}", text.red()),
            ToolBody::Pending | ToolBody::Empty => Ok(()),
        }
    }
}

fn indented(out: &mut String, body: &str) {
    for line in body.lines() {
        let _ = writeln!(out, "{INDENT}{line}");
    }
}

/// Format one message for the terminal. `processing` shows the in-flight
/// indicator while the message has no text.
pub fn render_message(message: &ChatMessage, processing: bool) -> String {
    let mut out = String::new();
    let speaker = match message.role {
        Role::User => "You".cyan().bold(),
        Role::Assistant => "Assistant".green().bold(),
        Role::System => "System".dimmed(),
    };
    let _ = writeln!(out, "{speaker}:");

    if processing && message.role == Role::Assistant && !message.has_text() {
        indented(&mut out, &"Processing...".dimmed().italic().to_string());
    }

    for part in &message.parts {
        match part {
            Part::Text(text) => indented(&mut out, &text.text),
            Part::Data(data) => {
                if let Some(status) = data.message() {
                    indented(&mut out, &status.blue().to_string());
                }
            }
            Part::Tool(tool) => {
                if let Some(block) = render_tool_part(tool) {
                    indented(&mut out, &block.to_string());
                }
            }
            Part::Other(_) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{DataPart, TextPart, ToolPart, ToolState};
    use serde_json::json;

    fn plain() {
        colored::control::set_override(false);
    }

    fn assistant(parts: Vec<Part>) -> ChatMessage {
        let mut message = ChatMessage::assistant("a1");
        message.parts = parts;
        message
    }

    #[test]
    fn test_plan_lines() {
        plain();
        let data = json!({
            "caseId": "DC1",
            "status": "Approved",
            "pendingActions": ["Prepare for hearing", "Review case documents"]
        });
        let text = crate::render::plan_for(crate::cases::CaseOperation::CheckCaseStatus, &data).to_string();
        assert!(text.starts_with("Case DC1\nStatus: Approved\n"));
        assert!(text.contains("Pending Actions:\n  - Prepare for hearing\n  - Review case documents\n"));
    }

    #[test]
    fn test_processing_indicator_only_without_text() {
        plain();
        let empty = assistant(vec![]);
        assert!(render_message(&empty, true).contains("Processing..."));
        assert!(!render_message(&empty, false).contains("Processing..."));

        let answered = assistant(vec![Part::Text(TextPart::done("Your case is approved."))]);
        let text = render_message(&answered, true);
        assert!(!text.contains("Processing..."));
        assert!(text.contains("  Your case is approved."));
    }

    #[test]
    fn test_workflow_and_tool_parts() {
        plain();
        let mut tool = ToolPart::new("updateCase", "c1", ToolState::OutputError);
        tool.input = Some(json!({"caseId": "DC1"}));
        tool.error_text = Some("Case locked".to_string());
        let message = assistant(vec![
            Part::Data(DataPart {
                name: DataPart::WORKFLOW.to_string(),
                id: None,
                data: json!({"message": "Calling updateCase"}),
                extra: serde_json::Map::new(),
            }),
            Part::Tool(tool),
            Part::Other(json!({"type": "step-start"})),
        ]);

        let text = render_message(&message, false);
        assert!(text.contains("  Calling updateCase\n"));
        assert!(text.contains("  [updateCase - Error]\n"));
        assert!(text.contains("  input: {\"caseId\":\"DC1\"}\n"));
        assert!(text.contains("  Case locked\n"));
        assert!(!text.contains("step-start"));
    }

    #[test]
    fn test_user_message() {
        plain();
        let text = render_message(&ChatMessage::user_text("Check DC123ABC", 0), false);
        assert_eq!(text, "You:\n  Check DC123ABC\n");
    }
}
