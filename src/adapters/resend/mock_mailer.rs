//! Mock mailer for testing.
//!
//! Configurable mock implementation of `Mailer` with error injection and
//! a log of every message handed to it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::ports::{EmailMessage, Mailer, MailerError, SentEmail};

#[derive(Debug, Default)]
struct MockState {
    /// Error to return on the next send. Consumed once.
    next_error: Option<MailerError>,
    /// Error to return on every send until cleared.
    persistent_error: Option<MailerError>,
    /// Every message passed to `send`, in order.
    sent: Vec<EmailMessage>,
}

/// Configurable mock implementation of [`Mailer`].
///
/// Cloning shares state, so tests can hold one handle for assertions while
/// the clone is wired into the code under test.
#[derive(Debug, Default)]
pub struct MockMailer {
    inner: Arc<Mutex<MockState>>,
}

impl Clone for MockMailer {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that fails every send with the given error.
    pub fn failing(error: MailerError) -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().persistent_error = Some(error);
        mock
    }

    /// Sets an error returned by the next send only.
    pub fn set_error(&self, error: MailerError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Clears all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.persistent_error = None;
    }

    /// Returns all sent messages in order.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.inner.lock().unwrap().sent.clone()
    }

    /// Returns how many messages were sent.
    pub fn sent_count(&self) -> usize {
        self.inner.lock().unwrap().sent.len()
    }

    /// Returns the most recent message, if any.
    pub fn last_sent(&self) -> Option<EmailMessage> {
        self.inner.lock().unwrap().sent.last().cloned()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailerError> {
        let mut state = self.inner.lock().unwrap();
        state.sent.push(message.clone());

        if let Some(err) = state.persistent_error.clone() {
            return Err(err);
        }
        if let Some(err) = state.next_error.take() {
            return Err(err);
        }

        Ok(SentEmail {
            provider_message_id: format!("mock_{}", Uuid::new_v4()),
        })
    }
}
