//! Fixed content substituted when a generation fails

use crate::chat::{Message, MessageIds, Sender, Transcript, NOW};

pub(crate) const FALLBACK_CONVERSATION: [(Sender, &str); 3] = [
    (Sender::Them, "Hey, did you get my message?"),
    (Sender::Me, "Sorry, connection error. Try again!"),
    (Sender::Them, "No worries!"),
];

pub(crate) const FALLBACK_REPLY: &str = "Haha, nice one! ❤️";

pub(crate) fn conversation() -> Transcript {
    let mut transcript = Transcript::new();

    for (sender, content) in FALLBACK_CONVERSATION {
        transcript.push(Message {
            id: MessageIds::next("err"),
            sender,
            content: content.to_string(),
            time: Some(NOW.to_string()),
        });
    }

    transcript
}

pub(crate) fn reply() -> Message {
    Message {
        id: MessageIds::next("err-reply"),
        sender: Sender::Them,
        content: FALLBACK_REPLY.to_string(),
        time: Some(NOW.to_string()),
    }
}
