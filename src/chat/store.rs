//! Client-local persisted chat state
//!
//! A two-key store: the message history and the run id of an in-flight
//! turn. Writes overwrite (last writer wins); nothing coordinates two
//! clients sharing a file.

use super::message::ChatMessage;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const HISTORY_KEY: &str = "chat-history";
pub const RUN_ID_KEY: &str = "active-workflow-run-id";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt chat history: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Failed to create state directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe handle to the key-value file
#[derive(Clone)]
pub struct ChatStore {
    conn: Arc<Mutex<Connection>>,
}

impl ChatStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ==================== History ====================

    /// Persisted messages, or empty when nothing was saved
    pub fn load_history(&self) -> StoreResult<Vec<ChatMessage>> {
        match self.get(HISTORY_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn save_history(&self, messages: &[ChatMessage]) -> StoreResult<()> {
        let json = serde_json::to_string(messages)?;
        self.set(HISTORY_KEY, &json)?;
        tracing::debug!(messages = messages.len(), "Saved chat history");
        Ok(())
    }

    pub fn clear_history(&self) -> StoreResult<()> {
        self.remove(HISTORY_KEY)
    }

    // ==================== Run id ====================

    pub fn load_run_id(&self) -> StoreResult<Option<String>> {
        self.get(RUN_ID_KEY)
    }

    pub fn save_run_id(&self, run_id: &str) -> StoreResult<()> {
        self.set(RUN_ID_KEY, run_id)
    }

    pub fn clear_run_id(&self) -> StoreResult<()> {
        self.remove(RUN_ID_KEY)
    }

    /// Run to re-attach to on startup, if a turn was interrupted
    pub fn resume_target(&self) -> StoreResult<Option<String>> {
        Ok(self.load_run_id()?.filter(|id| !id.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::{Part, Role, ToolPart, ToolState};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_history() -> Vec<ChatMessage> {
        let mut tool = ToolPart::new("createCase", "call_1", ToolState::OutputAvailable);
        tool.input = Some(json!({"applicantName": "John Smith"}));
        tool.output = Some(json!("{\"output\":{\"value\":\"{\\\"caseId\\\":\\\"DCABC\\\"}\"}}"));
        vec![
            ChatMessage::user_text("Create a case for John Smith", 1_700_000_000_000),
            ChatMessage {
                id: "m-2".to_string(),
                role: Role::Assistant,
                parts: vec![Part::Tool(tool)],
                metadata: None,
            },
        ]
    }

    #[test]
    fn test_history_round_trip() {
        let store = ChatStore::open_in_memory().unwrap();
        assert!(store.load_history().unwrap().is_empty());

        let history = sample_history();
        store.save_history(&history).unwrap();
        assert_eq!(store.load_history().unwrap(), history);

        store.clear_history().unwrap();
        assert!(store.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_run_id_independent_of_history() {
        let store = ChatStore::open_in_memory().unwrap();
        store.save_history(&sample_history()).unwrap();
        store.save_run_id("wrun_01").unwrap();
        assert_eq!(store.resume_target().unwrap().as_deref(), Some("wrun_01"));

        store.clear_run_id().unwrap();
        assert_eq!(store.resume_target().unwrap(), None);
        assert_eq!(store.load_history().unwrap().len(), 2);
    }

    #[test]
    fn test_last_writer_wins() {
        let store = ChatStore::open_in_memory().unwrap();
        store.save_run_id("first").unwrap();
        store.save_run_id("second").unwrap();
        assert_eq!(store.load_run_id().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("chat.db");
        let history = sample_history();
        {
            let store = ChatStore::open(&path).unwrap();
            store.save_history(&history).unwrap();
            store.save_run_id("wrun_02").unwrap();
        }
        let store = ChatStore::open(&path).unwrap();
        assert_eq!(store.load_history().unwrap(), history);
        assert_eq!(store.resume_target().unwrap().as_deref(), Some("wrun_02"));
    }

    #[test]
    fn test_corrupt_history_is_an_error() {
        let store = ChatStore::open_in_memory().unwrap();
        store.set(HISTORY_KEY, "not json").unwrap();
        assert!(matches!(store.load_history(), Err(StoreError::Serde(_))));
    }
}
