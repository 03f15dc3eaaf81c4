pub mod chat;
pub mod pixel;
pub mod reader;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use reader::ByteReader;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("truncated payload: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed field: {0}")]
    MalformedField(&'static str),
    #[error("payload did not match any known {0} format")]
    Unrecognized(&'static str),
}

/// Wire format bound to a pixel channel. Channels never auto-sniff between
/// JSON and binary framing; the binding is fixed in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PixelEncoding {
    /// Ordered JSON strategies: compressed, batch object, bare array.
    #[default]
    Json,
    /// `u32 count` then repeated `u16 x, u16 y, u32 rgb`, little-endian.
    Binary,
    /// Binary layout prefixed with a length-framed batch id.
    FramedBinary,
}

/// Wire format bound to a chat channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatEncoding {
    #[default]
    Json,
    /// Four length-prefixed strings then a `u32` unix timestamp.
    Binary,
}
