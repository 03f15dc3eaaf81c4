//! Pubsub subscription handlers. A malformed payload aborts the event
//! silently: non-zero status to the dispatcher, no response body.

use crate::codec::{self, ChatEncoding, PixelEncoding};
use crate::service::{self, WriteMode};
use crate::storage::Stores;

/// Pixel-channel handler: decode with the channel's bound format, drop
/// out-of-range pixels, persist the rest.
pub fn on_pixel_update(
    stores: &Stores,
    mode: WriteMode,
    encoding: PixelEncoding,
    payload: &[u8],
) -> u32 {
    log::debug!("pixel payload: {} bytes", payload.len());
    let batch = match codec::pixel::decode(encoding, payload) {
        Ok(batch) => batch,
        Err(err) => {
            log::warn!("dropping pixel payload: {err}");
            return 1;
        }
    };
    match service::ingest_pixels(stores, mode, batch) {
        Ok(task) => {
            task.detach();
            0
        }
        Err(err) => {
            log::warn!("dropping pixel batch: {err}");
            1
        }
    }
}

/// Chat-channel handler.
pub fn on_chat_message(
    stores: &Stores,
    mode: WriteMode,
    encoding: ChatEncoding,
    payload: &[u8],
) -> u32 {
    log::debug!("chat payload: {} bytes", payload.len());
    let ingest = match codec::chat::decode(encoding, payload) {
        Ok(ingest) => ingest,
        Err(err) => {
            log::warn!("dropping chat payload: {err}");
            return 1;
        }
    };
    match service::ingest_message(stores, mode, ingest) {
        Ok(task) => {
            task.detach();
            0
        }
        Err(err) => {
            log::warn!("dropping chat message: {err}");
            1
        }
    }
}
