//! Chat ingest and the per-room message archive.

use crate::codec::chat::ChatIngest;
use crate::common::{ChatMessage, RoomError, normalize_room};
use crate::storage::{RoomStore, Stores};

use super::{WriteMode, WriteTask};

/// Persists one decoded chat message under `/{room}/{messageId}`. Returns a
/// completion signal for the store write.
pub fn ingest_message(
    stores: &Stores,
    mode: WriteMode,
    ingest: ChatIngest,
) -> Result<WriteTask, RoomError> {
    let room = normalize_room(&ingest.room)?;
    log::debug!("room {room}: ingesting message {}", ingest.message.id);

    let store = stores.chat.clone();
    let message = ingest.message;
    let write = move || store_message(&store, &room, &message);
    match mode {
        WriteMode::Sync => Ok(WriteTask::Done(write())),
        WriteMode::Detached => Ok(WriteTask::Detached(tokio::task::spawn_blocking(write))),
    }
}

fn store_message(store: &RoomStore, room: &str, message: &ChatMessage) -> usize {
    let data = match serde_json::to_vec(message) {
        Ok(data) => data,
        Err(err) => {
            log::error!("failed to encode message {}: {err}", message.id);
            return 0;
        }
    };
    match store.put(room, &message.id, &data) {
        Ok(()) => 1,
        Err(err) => {
            log::error!("failed to save message {}: {err}", message.id);
            0
        }
    }
}

/// The room's chat history, ascending by timestamp. Records that fail to
/// decode are skipped; list/read failures degrade to an empty history.
/// Equal timestamps order by message id so listing order never shows
/// through.
pub fn list_messages(stores: &Stores, room: &str) -> Vec<ChatMessage> {
    let prefix = RoomStore::room_prefix(room);
    let keys = match stores.chat.list(room) {
        Ok(keys) => keys,
        Err(err) => {
            log::error!("chat list failed for room {room}: {err}");
            return Vec::new();
        }
    };
    log::debug!("room {room}: {} chat keys", keys.len());
    let mut messages = Vec::new();
    for key in keys {
        if key.len() <= prefix.len() {
            continue;
        }
        let data = match stores.chat.get(&key) {
            Ok(Some(data)) => data,
            Ok(None) => continue,
            Err(err) => {
                log::warn!("failed to read message {key}: {err}");
                continue;
            }
        };
        match serde_json::from_slice::<ChatMessage>(&data) {
            Ok(message) => messages.push(message),
            Err(err) => log::warn!("skipping corrupt chat record {key}: {err}"),
        }
    }
    messages.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
    messages
}
