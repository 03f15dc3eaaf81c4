//! Chat message decoders: a JSON envelope (message fields with an optional
//! `room`/`sourceId` alongside) and a fixed binary frame of length-prefixed
//! strings.

use serde::Deserialize;

use crate::common::{ChatMessage, DEFAULT_ROOM};

use super::{ByteReader, ChatEncoding, DecodeError};

/// A decoded chat event: the message plus the room it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatIngest {
    pub message: ChatMessage,
    pub room: String,
}

pub fn decode(encoding: ChatEncoding, data: &[u8]) -> Result<ChatIngest, DecodeError> {
    match encoding {
        ChatEncoding::Json => decode_json(data),
        ChatEncoding::Binary => decode_binary(data),
    }
}

#[derive(Deserialize)]
struct ChatEnvelope {
    #[serde(flatten)]
    message: ChatMessage,
    #[serde(default)]
    room: String,
}

/// JSON object with message fields at the top level; `room` optional,
/// `sourceId` and other extras ignored.
pub fn decode_json(data: &[u8]) -> Result<ChatIngest, DecodeError> {
    let envelope: ChatEnvelope = serde_json::from_slice(data)?;
    let room = if envelope.room.is_empty() {
        DEFAULT_ROOM.to_string()
    } else {
        envelope.room
    };
    Ok(ChatIngest {
        message: envelope.message,
        room,
    })
}

/// Binary frame: four `u32`-length-prefixed strings (messageId, userId,
/// username, message) followed by a `u32` little-endian unix timestamp.
/// The frame carries no room; the default applies.
pub fn decode_binary(data: &[u8]) -> Result<ChatIngest, DecodeError> {
    let mut reader = ByteReader::new(data);
    let id = reader.length_prefixed_str()?.to_string();
    let user_id = reader.length_prefixed_str()?.to_string();
    let username = reader.length_prefixed_str()?.to_string();
    let message = reader.length_prefixed_str()?.to_string();
    let timestamp = i64::from(reader.u32_le()?);
    Ok(ChatIngest {
        message: ChatMessage {
            id,
            user_id,
            username,
            message,
            timestamp,
        },
        room: DEFAULT_ROOM.to_string(),
    })
}
