pub mod database;
pub mod room_store;

pub use database::{Database, StoreError};
pub use room_store::{
    CANVAS_NAMESPACE, CHAT_NAMESPACE, RoomStore, Stores, parse_pixel_suffix, pixel_suffix,
};
