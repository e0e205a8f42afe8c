//! Response schemas for schema-constrained decoding, and the shapes they decode into.

use lazy_static::lazy_static;
use serde::Deserialize;
use serde_json::json;

use crate::chat::Sender;
use crate::providers::ResponseSchema;

/// Bounds on the length of a generated opening conversation
pub(crate) const MIN_MESSAGES: usize = 5;
pub(crate) const MAX_MESSAGES: usize = 8;

lazy_static! {
    pub(crate) static ref CONVERSATION_SCHEMA: ResponseSchema = ResponseSchema {
        name: "conversation",
        schema: json!({
            "type": "object",
            "properties": {
                "messages": {
                    "type": "array",
                    "minItems": MIN_MESSAGES,
                    "maxItems": MAX_MESSAGES,
                    "items": {
                        "type": "object",
                        "properties": {
                            "sender": {
                                "type": "string",
                                "enum": ["me", "them"]
                            },
                            "content": {
                                "type": "string"
                            },
                            "time": {
                                "type": "string",
                                "description": "Time string like '10:30 AM' or 'Now'"
                            }
                        },
                        "required": ["sender", "content"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["messages"],
            "additionalProperties": false
        }),
    };

    pub(crate) static ref REPLY_SCHEMA: ResponseSchema = ResponseSchema {
        name: "reply",
        schema: json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string"
                },
                "time": {
                    "type": "string"
                }
            },
            "required": ["content"],
            "additionalProperties": false
        }),
    };
}

#[derive(Deserialize, Debug)]
pub(crate) struct GeneratedMessage {
    pub sender: Sender,
    pub content: String,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GeneratedConversation {
    pub messages: Vec<GeneratedMessage>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GeneratedReply {
    pub content: String,
    #[serde(default)]
    pub time: Option<String>,
}
