//! Chat session: conversation + persisted state + transport
//!
//! Persistence follows the turn lifecycle. Sending saves the history with
//! the new user message and records the run id. A turn that finishes,
//! aborts or fails in-stream saves the full history and forgets the run id.
//! A stopped turn saves nothing and keeps the run id, so the next start can
//! re-attach to the run.

use super::chunk::UiChunk;
use super::reconciler::{ChunkEffect, Conversation};
use super::store::ChatStore;
use super::transport::{ChatTransport, ChunkStream, TransportError};
use super::ChatError;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Finished,
    Aborted,
    /// Stopped by the user; partial output kept
    Stopped,
    /// The agent reported an error in-stream
    Failed(String),
}

pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    store: ChatStore,
    conversation: Conversation,
    max_consecutive_errors: u32,
}

impl ChatSession {
    /// Restore the persisted history and attach a transport
    pub fn open(transport: Arc<dyn ChatTransport>, store: ChatStore) -> Result<Self, ChatError> {
        let messages = store.load_history()?;
        tracing::info!(messages = messages.len(), "Restored chat history");
        Ok(Self {
            transport,
            store,
            conversation: Conversation::restore(messages),
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
        })
    }

    #[must_use]
    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max.max(1);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run id left behind by an interrupted turn
    pub fn pending_resume(&self) -> Result<Option<String>, ChatError> {
        Ok(self.store.resume_target()?)
    }

    /// Submit user text and stream the agent's reply
    pub async fn send(
        &mut self,
        text: &str,
        stop: &CancellationToken,
        on_update: &mut dyn FnMut(&Conversation),
    ) -> Result<TurnOutcome, ChatError> {
        let created_at = chrono::Utc::now().timestamp_millis();
        self.conversation.submit_user_text(text, created_at)?;
        on_update(&self.conversation);

        let started = match self.transport.send_messages(self.conversation.messages()).await {
            Ok(started) => started,
            Err(e) => {
                self.conversation.fail(e.to_string());
                return Err(e.into());
            }
        };

        self.store.save_history(self.conversation.messages())?;
        self.store.save_run_id(&started.run_id)?;

        self.pump(&started.run_id, started.chunks, stop, on_update).await
    }

    /// Re-attach to the persisted run. Fails at once when there is none.
    pub async fn resume(
        &mut self,
        stop: &CancellationToken,
        on_update: &mut dyn FnMut(&Conversation),
    ) -> Result<TurnOutcome, ChatError> {
        let run_id = self
            .store
            .resume_target()?
            .ok_or(TransportError::NoActiveRun)?;
        self.conversation.begin_resume()?;

        let chunks = match self.transport.reconnect(&run_id, 0).await {
            Ok(chunks) => chunks,
            Err(e) => {
                self.conversation.fail(e.to_string());
                return Err(e.into());
            }
        };
        self.pump(&run_id, chunks, stop, on_update).await
    }

    /// Forget the history and any pending run
    pub fn clear(&mut self) -> Result<(), ChatError> {
        self.conversation.clear();
        self.store.clear_history()?;
        self.store.clear_run_id()?;
        Ok(())
    }

    async fn pump(
        &mut self,
        run_id: &str,
        mut chunks: ChunkStream,
        stop: &CancellationToken,
        on_update: &mut dyn FnMut(&Conversation),
    ) -> Result<TurnOutcome, ChatError> {
        let mut received = 0usize;
        let mut consecutive_errors = 0u32;

        loop {
            let next = tokio::select! {
                biased;
                () = stop.cancelled() => None,
                next = chunks.next() => Some(next),
            };
            // A chunk that was ready alongside the stop is dropped
            let Some(next) = next.filter(|_| !stop.is_cancelled()) else {
                self.conversation.stop();
                on_update(&self.conversation);
                tracing::info!(run_id, "Turn stopped by user");
                return Ok(TurnOutcome::Stopped);
            };

            let interruption = match next {
                Some(Ok(chunk)) => {
                    received += 1;
                    consecutive_errors = 0;
                    if let Some(outcome) = self.apply(chunk, on_update)? {
                        return Ok(outcome);
                    }
                    continue;
                }
                Some(Err(e)) => e.to_string(),
                None => "stream ended before the turn finished".to_string(),
            };

            // Re-attach until the cap, picking up after the last chunk seen
            consecutive_errors += 1;
            tracing::warn!(
                run_id,
                attempt = consecutive_errors,
                error = %interruption,
                "Chat stream interrupted"
            );
            if consecutive_errors >= self.max_consecutive_errors {
                self.conversation.fail(interruption.clone());
                on_update(&self.conversation);
                return Err(ChatError::ReconnectLimit {
                    attempts: consecutive_errors,
                    last: interruption,
                });
            }

            chunks = match self.transport.reconnect(run_id, received).await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(run_id, error = %e, "Reconnect failed");
                    futures::stream::once(async move { Err(e) }).boxed()
                }
            };
        }
    }

    fn apply(
        &mut self,
        chunk: UiChunk,
        on_update: &mut dyn FnMut(&Conversation),
    ) -> Result<Option<TurnOutcome>, ChatError> {
        let effect = match self.conversation.apply_chunk(chunk) {
            Ok(effect) => effect,
            Err(e) => {
                self.conversation.fail(e.to_string());
                on_update(&self.conversation);
                return Err(e);
            }
        };
        if effect != ChunkEffect::Ignored {
            on_update(&self.conversation);
        }

        let outcome = match effect {
            ChunkEffect::Finished => TurnOutcome::Finished,
            ChunkEffect::Aborted => TurnOutcome::Aborted,
            ChunkEffect::Failed(message) => TurnOutcome::Failed(message),
            ChunkEffect::Applied | ChunkEffect::Ignored => return Ok(None),
        };
        // The run is over whichever way it ended; nothing left to resume
        self.store.save_history(self.conversation.messages())?;
        self.store.clear_run_id()?;
        Ok(Some(outcome))
    }
}
