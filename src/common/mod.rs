pub mod commands;
pub mod events;
pub mod types;

pub use commands::NetworkCommand;
pub use events::NetworkEvent;
pub use types::{
    BACKGROUND_COLOR, CANVAS_HEIGHT, CANVAS_WIDTH, ChatMessage, DEFAULT_ROOM, Pixel, PixelBatch,
    RoomError, normalize_room,
};
