//! Type definitions for chat primitives
//!
//! A [`Transcript`] is the rendered chat history: an ordered list of [`Message`]s
//! exchanged between the user taking the screenshot (`me`) and the contact (`them`).
//! Messages are never mutated once created; transcripts only grow by appending, or
//! are replaced wholesale by a fresh generation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use lazy_static::lazy_static;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The time shown for messages which were produced "just now".
pub(crate) const NOW: &str = "Now";

/// The author of a `Message`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Sender {
    /// The user taking the screenshot
    Me,
    /// The contact the user is chatting with
    Them,
}

/// A single bubble in a chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Message {
    /// Unique within a transcript. Always assigned locally, never by the model.
    pub id: String,
    /// The author of the message
    pub sender: Sender,
    /// The text of the message, never empty
    pub content: String,
    /// A free-form time label such as "10:30 AM" or "Now"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

lazy_static! {
    static ref SESSION_TAG: u32 = rand::thread_rng().gen();
}

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Produces fresh message ids of the form `<prefix>-<session>-<seq>`. The session
/// tag is drawn once per process so that transcripts written by an earlier run can be
/// extended without colliding ids.
pub(crate) struct MessageIds;

impl MessageIds {
    pub(crate) fn next(prefix: &str) -> String {
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);

        format!("{}-{:08x}-{}", prefix, *SESSION_TAG, seq)
    }
}

impl Message {
    pub(crate) fn new(sender: Sender, content: String, time: Option<String>) -> Message {
        Message {
            id: MessageIds::next("msg"),
            sender,
            content,
            time,
        }
    }

    /// A message typed by the user. The text is kept exactly as supplied.
    pub(crate) fn mine(content: String) -> Message {
        Message::new(Sender::Me, content, Some(NOW.to_string()))
    }

    pub(crate) fn theirs(content: String, time: Option<String>) -> Message {
        Message::new(Sender::Them, content, time)
    }
}

#[derive(Error, Debug)]
pub(crate) enum TranscriptError {
    #[error("message {0} has an empty id")]
    EmptyId(usize),
    #[error("message id \"{0}\" appears more than once")]
    DuplicateId(String),
    #[error("message \"{0}\" has no content")]
    EmptyContent(String),
}

/// An ordered chat history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub(crate) fn new() -> Transcript {
        Transcript::default()
    }

    /// Validates a transcript which was not produced by this process, e.g. one read
    /// back from a JSON file.
    pub(crate) fn from_messages(messages: Vec<Message>) -> Result<Transcript, TranscriptError> {
        let mut seen = HashSet::new();

        for (i, msg) in messages.iter().enumerate() {
            if msg.id.is_empty() {
                return Err(TranscriptError::EmptyId(i));
            }

            if !seen.insert(msg.id.as_str()) {
                return Err(TranscriptError::DuplicateId(msg.id.clone()));
            }

            if msg.content.trim().is_empty() {
                return Err(TranscriptError::EmptyContent(msg.id.clone()));
            }
        }

        Ok(Transcript { messages })
    }

    pub(crate) fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub(crate) fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub(crate) fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}

impl From<Transcript> for Vec<Message> {
    fn from(value: Transcript) -> Self {
        value.messages
    }
}
