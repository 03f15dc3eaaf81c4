use std::path::Path;
use std::sync::Arc;

use super::database::{Database, StoreError};

pub const CANVAS_NAMESPACE: &str = "/canvas";
pub const CHAT_NAMESPACE: &str = "/chat";

/// Room-scoped view of one KV namespace, mapping rooms and entity keys onto
/// the `/{room}/{suffix}` key scheme.
#[derive(Clone)]
pub struct RoomStore {
    db: Arc<Database>,
    namespace: &'static str,
}

impl RoomStore {
    fn new(db: Arc<Database>, namespace: &'static str) -> Self {
        Self { db, namespace }
    }

    pub fn room_prefix(room: &str) -> String {
        format!("/{room}/")
    }

    pub fn put(&self, room: &str, suffix: &str, value: &[u8]) -> Result<(), StoreError> {
        let key = format!("/{room}/{suffix}");
        self.db.put(self.namespace, &key, value)
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.db.get(self.namespace, key)
    }

    /// Keys of every record stored under the room.
    pub fn list(&self, room: &str) -> Result<Vec<String>, StoreError> {
        self.db.list_keys(self.namespace, &Self::room_prefix(room))
    }

    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.db.delete(self.namespace, key)
    }
}

/// Store key suffix for a pixel cell.
pub fn pixel_suffix(x: i32, y: i32) -> String {
    format!("{x}:{y}")
}

/// Strict parse of a `"{x}:{y}"` key suffix. Anything that is not exactly
/// two integers is rejected; callers skip such keys.
pub fn parse_pixel_suffix(suffix: &str) -> Option<(i32, i32)> {
    let (x, y) = suffix.split_once(':')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

/// The canvas and chat store handles the pipeline works against. Created
/// once at startup and injected (`Arc<Stores>`); never mutated afterwards.
pub struct Stores {
    pub canvas: RoomStore,
    pub chat: RoomStore,
}

impl Stores {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::from_database(Arc::new(Database::open(path)?)))
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_database(Arc::new(Database::in_memory()?)))
    }

    pub(crate) fn from_database(db: Arc<Database>) -> Self {
        Self {
            canvas: RoomStore::new(Arc::clone(&db), CANVAS_NAMESPACE),
            chat: RoomStore::new(db, CHAT_NAMESPACE),
        }
    }
}
