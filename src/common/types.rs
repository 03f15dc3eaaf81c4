use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CANVAS_WIDTH: usize = 90;
pub const CANVAS_HEIGHT: usize = 90;

/// Color every cell starts from when a canvas is rebuilt.
pub const BACKGROUND_COLOR: &str = "#ffffff";

pub const DEFAULT_ROOM: &str = "default";

/// One canvas cell update. Wire and stored form share the same JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
    pub color: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
}

impl Pixel {
    /// Whether the pixel falls inside the fixed canvas bounds.
    pub fn in_bounds(&self) -> bool {
        self.x >= 0
            && (self.x as usize) < CANVAS_WIDTH
            && self.y >= 0
            && (self.y as usize) < CANVAS_HEIGHT
    }
}

/// A chat message as stored and returned to clients. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "messageId")]
    pub id: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    pub message: String,
    pub timestamp: i64,
}

/// Normalized pixel batch, whatever wire format it arrived in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelBatch {
    pub pixels: Vec<Pixel>,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "batchId", default)]
    pub batch_id: String,
    #[serde(rename = "sourceId", default)]
    pub source_id: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid room name `{0}`: must not contain '/'")]
pub struct RoomError(pub String);

/// Applies the default room and rejects names that would collide with the
/// key delimiter. Rooms are embedded verbatim in store keys.
pub fn normalize_room(room: &str) -> Result<String, RoomError> {
    let room = if room.is_empty() { DEFAULT_ROOM } else { room };
    if room.contains('/') {
        return Err(RoomError(room.to_string()));
    }
    Ok(room.to_string())
}
