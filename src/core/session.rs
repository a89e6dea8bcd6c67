//! The message-exchange state machine.
//!
//! A [`ChatSession`] moves between two states: idle, and waiting for a reply
//! to exactly one outstanding request. Submitting is split in two so that
//! callers can run the remote call wherever they like (inline, or on a
//! spawned task) and hand the result back later:
//!
//! 1. [`ChatSession::begin_submit`] validates input, appends the user
//!    message and issues a [`PendingReply`] carrying a request token.
//! 2. [`ChatSession::complete`] appends the bot message for that token and
//!    returns to idle.
//!
//! A second submission while waiting is rejected with [`SubmitOutcome::Busy`].
//! Results whose token is no longer outstanding (for example after a reset)
//! are dropped.

use tracing::{debug, warn};

use crate::core::completion::{CompletionClient, CompletionError};
use crate::core::message::Message;
use crate::core::storage::{SnapshotStorage, StorageError};
use crate::core::store::ConversationStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub waiting_for_reply: bool,
    /// Text typed but not yet submitted.
    pub draft: String,
}

/// A dispatched request awaiting its completion result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub token: u64,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// A reply is still outstanding; nothing changed.
    Busy,
    Dispatched(PendingReply),
}

pub struct ChatSession<S> {
    store: ConversationStore<S>,
    state: ConversationState,
    next_token: u64,
    pending_token: Option<u64>,
}

impl<S: SnapshotStorage> ChatSession<S> {
    /// Open a session over `store`, restoring whatever it last persisted.
    pub fn open(store: ConversationStore<S>) -> Self {
        let messages = store.load();
        Self {
            store,
            state: ConversationState {
                messages,
                ..Default::default()
            },
            next_token: 1,
            pending_token: None,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn is_waiting_for_reply(&self) -> bool {
        self.state.waiting_for_reply
    }

    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    pub fn draft(&self) -> &str {
        &self.state.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.state.draft
    }

    /// Submit the current draft. The draft is kept when the submission is
    /// rejected as busy.
    pub fn submit_draft(&mut self) -> SubmitOutcome {
        let draft = self.state.draft.clone();
        self.begin_submit(&draft)
    }

    pub fn begin_submit(&mut self, raw_input: &str) -> SubmitOutcome {
        let text = raw_input.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }
        if self.pending_token.is_some() {
            debug!("submission rejected while awaiting reply");
            return SubmitOutcome::Busy;
        }

        let token = self.next_token;
        self.next_token += 1;
        self.pending_token = Some(token);

        self.state.messages.push(Message::user(text));
        self.state.draft.clear();
        self.state.waiting_for_reply = true;
        self.persist();

        debug!(token, "dispatched user message");
        SubmitOutcome::Dispatched(PendingReply {
            token,
            prompt: text.to_string(),
        })
    }

    /// Apply the result of the request identified by `token`.
    ///
    /// Returns the appended bot message, or `None` when the token is stale.
    pub fn complete(
        &mut self,
        token: u64,
        result: Result<Option<String>, CompletionError>,
    ) -> Option<&Message> {
        if self.pending_token != Some(token) {
            debug!(token, "dropping result for request that is no longer outstanding");
            return None;
        }
        self.pending_token = None;

        let reply = match result {
            Ok(Some(text)) if !text.is_empty() => Message::bot(text),
            Ok(_) => Message::fallback_reply(),
            Err(err) => {
                warn!(token, error = %err, "completion request failed");
                Message::error_reply()
            }
        };

        self.state.messages.push(reply);
        self.state.waiting_for_reply = false;
        self.persist();
        self.state.messages.last()
    }

    /// Submit and wait for the reply in one step.
    pub async fn submit<C>(&mut self, client: &C, raw_input: &str) -> SubmitOutcome
    where
        C: CompletionClient + ?Sized,
    {
        let outcome = self.begin_submit(raw_input);
        if let SubmitOutcome::Dispatched(pending) = &outcome {
            let result = client.complete(&pending.prompt).await;
            self.complete(pending.token, result);
        }
        outcome
    }

    /// Forget the conversation, both in memory and in storage. Any
    /// outstanding request is abandoned.
    ///
    /// Memory is cleared even when removing the snapshot fails; the error is
    /// returned so callers can tell the user the old history will come back.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.state.messages.clear();
        self.state.waiting_for_reply = false;
        self.pending_token = None;
        self.store.clear().inspect_err(|err| {
            warn!(key = %self.store.key(), error = %err, "failed to remove conversation snapshot");
        })
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.state.messages) {
            warn!(key = %self.store.key(), error = %err, "failed to save conversation snapshot");
        }
    }
}

#[cfg(test)]
mod tests;
