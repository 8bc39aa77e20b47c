use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::constants::{FALLBACK_REPLY, GREETINGS};
use crate::error::ExchangeError;
use crate::exchange::ReadingTransport;

/// One line of the conversation, either typed by the user or spoken by the cat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub text: String,
    pub is_user: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
        }
    }

    pub fn cat(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
        }
    }
}

/// A submission that has been accepted and must be settled with [`Conversation::complete`].
#[derive(Debug)]
#[must_use = "an accepted submission leaves the conversation waiting until it is completed"]
pub struct PendingExchange {
    message: String,
}

impl PendingExchange {
    /// The trimmed text to send to the reading service.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Conversation state owned by a single front-end.
///
/// History is append-only and starts with the two greeting lines. At most one
/// exchange is in flight: while waiting, submissions are dropped, not queued.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    draft: String,
    waiting: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: GREETINGS.iter().map(|line| Message::cat(*line)).collect(),
            draft: String::new(),
            waiting: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Replaces the pending input verbatim.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// First half of a submit: appends the user's line as typed, clears the
    /// draft and starts waiting. Only the trimmed text goes on the wire.
    /// Returns `None` without touching anything when the trimmed draft is
    /// empty or an exchange is already in flight.
    pub fn begin_submit(&mut self) -> Option<PendingExchange> {
        if self.waiting {
            debug!("Submit ignored: a reading is already in flight");
            return None;
        }
        let message = self.draft.trim().to_string();
        if message.is_empty() {
            return None;
        }

        let typed = std::mem::take(&mut self.draft);
        self.messages.push(Message::user(typed));
        self.waiting = true;
        Some(PendingExchange { message })
    }

    /// Second half of a submit: appends exactly one cat message (the reply, or
    /// the fallback line on any failure) and always stops waiting.
    pub fn complete(
        &mut self,
        pending: PendingExchange,
        outcome: Result<String, ExchangeError>,
    ) -> &Message {
        let text = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, question = %pending.message, "Reading failed, showing fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };
        self.messages.push(Message::cat(text));
        self.waiting = false;
        &self.messages[self.messages.len() - 1]
    }

    /// Submits the current draft and waits for the reading. Returns `false`
    /// if the submission was dropped. Dropping the returned future mid-flight
    /// settles the exchange with the fallback line.
    pub async fn submit<T: ReadingTransport>(&mut self, transport: &T) -> bool {
        let Some(pending) = self.begin_submit() else {
            return false;
        };
        info!("Asking for a reading");
        let question = pending.message().to_string();
        let guard = CompletionGuard::new(pending, |pending, outcome| {
            self.complete(pending, outcome);
        });
        let outcome = transport.exchange(&question).await;
        guard.finish(outcome);
        true
    }
}

/// Point-in-time copy of what a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub waiting: bool,
}

/// A `Conversation` readable from several tasks at once (the web widget).
///
/// The lock is never held across the exchange; the waiting flag alone keeps
/// a second submission out. An accepted submission is always settled, even
/// when the future awaiting it is dropped: the reply then becomes the
/// fallback line.
#[derive(Debug, Clone, Default)]
pub struct SharedConversation {
    inner: Arc<Mutex<Conversation>>,
}

impl SharedConversation {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        let conversation = self.lock();
        ConversationSnapshot {
            messages: conversation.messages().to_vec(),
            waiting: conversation.is_waiting(),
        }
    }

    pub fn update_draft(&self, text: impl Into<String>) {
        self.lock().update_draft(text);
    }

    pub async fn submit<T: ReadingTransport>(&self, transport: &T) -> bool {
        let pending = self.lock().begin_submit();
        self.settle(pending, transport).await
    }

    /// Sets the draft and submits it under one lock, so another request
    /// cannot swap the draft in between.
    pub async fn submit_text<T: ReadingTransport>(&self, text: impl Into<String>, transport: &T) -> bool {
        let pending = {
            let mut conversation = self.lock();
            conversation.update_draft(text);
            conversation.begin_submit()
        };
        self.settle(pending, transport).await
    }

    /// Accepts the submission now and runs the exchange on its own task, so
    /// the caller going away cannot leave the conversation waiting.
    /// Returns `None` if the submission was dropped.
    pub fn submit_text_in_background<T>(&self, text: impl Into<String>, transport: Arc<T>) -> Option<JoinHandle<()>>
    where
        T: ReadingTransport + Send + Sync + 'static,
    {
        let pending = {
            let mut conversation = self.lock();
            conversation.update_draft(text);
            conversation.begin_submit()
        }?;
        let shared = self.clone();
        Some(tokio::spawn(async move {
            shared.settle(Some(pending), &*transport).await;
        }))
    }

    async fn settle<T: ReadingTransport>(&self, pending: Option<PendingExchange>, transport: &T) -> bool {
        let Some(pending) = pending else {
            return false;
        };
        info!("Asking for a reading");
        let question = pending.message().to_string();
        let guard = CompletionGuard::new(pending, |pending, outcome| {
            self.lock().complete(pending, outcome);
        });
        let outcome = transport.exchange(&question).await;
        guard.finish(outcome);
        true
    }
}

// Runs `complete` exactly once: with the outcome passed to `finish`, or with
// `ExchangeError::Abandoned` if dropped first.
struct CompletionGuard<F>
where
    F: FnMut(PendingExchange, Result<String, ExchangeError>),
{
    complete: F,
    pending: Option<PendingExchange>,
}

impl<F> CompletionGuard<F>
where
    F: FnMut(PendingExchange, Result<String, ExchangeError>),
{
    fn new(pending: PendingExchange, complete: F) -> Self {
        Self {
            complete,
            pending: Some(pending),
        }
    }

    fn finish(mut self, outcome: Result<String, ExchangeError>) {
        if let Some(pending) = self.pending.take() {
            (self.complete)(pending, outcome);
        }
    }
}

impl<F> Drop for CompletionGuard<F>
where
    F: FnMut(PendingExchange, Result<String, ExchangeError>),
{
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            (self.complete)(pending, Err(ExchangeError::Abandoned));
        }
    }
}
