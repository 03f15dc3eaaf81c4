pub mod canvas;
pub mod chat;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::storage::{RoomStore, StoreError, Stores};

pub use canvas::{build_canvas, ingest_pixels};
pub use chat::{ingest_message, list_messages};

/// How ingest handlers persist: wait for the store write, or hand it to a
/// background task and report success immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    #[default]
    Sync,
    /// Best-effort: no retry, no backpressure, failure visible only in logs.
    Detached,
}

/// Completion signal for a persistence request. Sync writes are already
/// finished when this is returned; detached writes can still be awaited,
/// which is how tests observe them deterministically.
pub enum WriteTask {
    Done(usize),
    Detached(JoinHandle<usize>),
}

impl WriteTask {
    /// Waits for the write and returns how many records reached the store.
    pub async fn wait(self) -> usize {
        match self {
            WriteTask::Done(saved) => saved,
            WriteTask::Detached(handle) => match handle.await {
                Ok(saved) => saved,
                Err(err) => {
                    log::error!("detached write task failed: {err}");
                    0
                }
            },
        }
    }

    /// Drops the completion signal; the write continues on its own.
    pub fn detach(self) {}
}

/// Which namespace a clear operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Canvas,
    Chat,
}

impl FromStr for ClearTarget {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canvas" => Ok(ClearTarget::Canvas),
            "chat" => Ok(ClearTarget::Chat),
            _ => Err(()),
        }
    }
}

/// Deletes every record stored under the room, one key at a time. Not
/// atomic: a concurrent reader may observe a partially cleared room.
pub fn clear_room(stores: &Stores, target: ClearTarget, room: &str) -> Result<usize, StoreError> {
    let store: &RoomStore = match target {
        ClearTarget::Canvas => &stores.canvas,
        ClearTarget::Chat => &stores.chat,
    };
    let keys = store.list(room)?;
    let mut deleted = 0;
    for key in keys {
        match store.delete(&key) {
            Ok(()) => deleted += 1,
            Err(err) => log::warn!("failed to delete {key}: {err}"),
        }
    }
    log::info!("cleared {deleted} keys for room {room}");
    Ok(deleted)
}
