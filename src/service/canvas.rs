//! Pixel ingest and canvas reconstruction.

use crate::common::{
    BACKGROUND_COLOR, CANVAS_HEIGHT, CANVAS_WIDTH, Pixel, PixelBatch, RoomError, normalize_room,
};
use crate::storage::{RoomStore, Stores, parse_pixel_suffix, pixel_suffix};

use super::{WriteMode, WriteTask};

/// Validates and persists a decoded pixel batch. Out-of-range pixels are
/// silently dropped, not reported; that is the contract, not a bug. Returns
/// a completion signal for the store writes.
pub fn ingest_pixels(
    stores: &Stores,
    mode: WriteMode,
    batch: PixelBatch,
) -> Result<WriteTask, RoomError> {
    let room = normalize_room(&batch.room)?;
    let total = batch.pixels.len();
    let pixels: Vec<Pixel> = batch
        .pixels
        .into_iter()
        .filter(|pixel| pixel.in_bounds())
        .collect();
    log::debug!(
        "room {room}: ingesting {} of {total} pixels (batch {})",
        pixels.len(),
        batch.batch_id
    );

    let store = stores.canvas.clone();
    match mode {
        WriteMode::Sync => Ok(WriteTask::Done(store_pixels(&store, &room, &pixels))),
        WriteMode::Detached => Ok(WriteTask::Detached(tokio::task::spawn_blocking(
            move || store_pixels(&store, &room, &pixels),
        ))),
    }
}

fn store_pixels(store: &RoomStore, room: &str, pixels: &[Pixel]) -> usize {
    let mut saved = 0;
    for pixel in pixels {
        let data = match serde_json::to_vec(pixel) {
            Ok(data) => data,
            Err(err) => {
                log::error!("failed to encode pixel ({},{}): {err}", pixel.x, pixel.y);
                continue;
            }
        };
        match store.put(room, &pixel_suffix(pixel.x, pixel.y), &data) {
            Ok(()) => saved += 1,
            Err(err) => {
                log::error!("failed to save pixel ({},{}): {err}", pixel.x, pixel.y);
            }
        }
    }
    log::debug!("room {room}: saved {saved} of {} pixels", pixels.len());
    saved
}

/// Rebuilds the dense grid for a room from its sparse records. Always
/// returns a complete grid: list/read failures and unparsable or corrupt
/// records degrade to background cells, never to an error.
pub fn build_canvas(stores: &Stores, room: &str) -> Vec<Vec<String>> {
    let mut canvas = vec![vec![BACKGROUND_COLOR.to_string(); CANVAS_WIDTH]; CANVAS_HEIGHT];
    let prefix = RoomStore::room_prefix(room);
    let keys = match stores.canvas.list(room) {
        Ok(keys) => keys,
        Err(err) => {
            log::error!("canvas list failed for room {room}: {err}");
            return canvas;
        }
    };
    log::debug!("room {room}: {} pixel keys", keys.len());
    for key in keys {
        let Some(suffix) = key.strip_prefix(&prefix) else {
            continue;
        };
        if suffix.is_empty() {
            continue;
        }
        let Some((x, y)) = parse_pixel_suffix(suffix) else {
            log::warn!("skipping unparsable pixel key {key}");
            continue;
        };
        if x < 0 || x as usize >= CANVAS_WIDTH || y < 0 || y as usize >= CANVAS_HEIGHT {
            log::warn!("skipping out-of-range pixel key {key}");
            continue;
        }
        let data = match stores.canvas.get(&key) {
            Ok(Some(data)) => data,
            Ok(None) => continue,
            Err(err) => {
                log::warn!("failed to read pixel {key}: {err}");
                continue;
            }
        };
        match serde_json::from_slice::<Pixel>(&data) {
            Ok(pixel) => canvas[y as usize][x as usize] = pixel.color,
            Err(err) => log::warn!("skipping corrupt pixel record {key}: {err}"),
        }
    }
    canvas
}
