//! The in-memory presence directory.
//!
//! Presence is deliberately ephemeral. Entries exist only while a connection is open, nothing is persisted, and a
//! server restart empties the directory. Message delivery never depends on it: messages are persisted first, and
//! the directory is only consulted for the best-effort live push afterwards.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
        MutexGuard,
    },
};

use actix_ws::Session;

struct PresenceEntry<S> {
    conn_id: u64,
    session: S,
}

/// Maps online user ids to their live WebSocket session.
///
/// Each connection gets a unique ordinal so that when a user reconnects (new tab, flaky network), the cleanup of
/// the old connection cannot evict the new one. The directory is generic over the session handle; the server
/// always uses [`actix_ws::Session`].
pub struct PresenceDirectory<S = Session> {
    next_conn_id: AtomicU64,
    online: Mutex<HashMap<String, PresenceEntry<S>>>,
}

impl<S> Default for PresenceDirectory<S> {
    fn default() -> Self {
        Self { next_conn_id: AtomicU64::new(0), online: Mutex::new(HashMap::new()) }
    }
}

impl<S> PresenceDirectory<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `user_id` as online and returns the connection ordinal the caller must present when
    /// disconnecting. A join for an already-online user replaces the previous session.
    pub fn join(&self, user_id: &str, session: S) -> u64 {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let mut online = self.lock();
        online.insert(user_id.to_string(), PresenceEntry { conn_id, session });
        conn_id
    }

    /// Removes `user_id` from the directory, but only if the entry still belongs to connection `conn_id`. Returns
    /// `true` if an entry was removed. A disconnect that raced a reconnect leaves the newer entry alone.
    pub fn remove_if_current(&self, user_id: &str, conn_id: u64) -> bool {
        let mut online = self.lock();
        match online.get(user_id) {
            Some(entry) if entry.conn_id == conn_id => {
                online.remove(user_id);
                true
            },
            _ => false,
        }
    }

    pub fn online_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PresenceEntry<S>>> {
        // A poisoned lock means a panic elsewhere; the map itself is still sound.
        self.online.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S: Clone> PresenceDirectory<S> {
    /// A clone of the live session for `user_id`, if they are online. The guard is released before the caller
    /// awaits anything on the session.
    pub fn session_for(&self, user_id: &str) -> Option<S> {
        let online = self.lock();
        online.get(user_id).map(|entry| entry.session.clone())
    }
}
