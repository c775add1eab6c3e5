//! # Session Store
//!
//! Keeps one `ConversationContext` per session key. Each context sits behind its
//! own async mutex, so turns within a session run one at a time while different
//! sessions proceed independently.
//!
//! The store holds at most `capacity` sessions. Opening a new session when full
//! evicts the least recently used one.

use crate::{
    constants::DEFAULT_MAX_SESSIONS,
    context::{ContextSnapshot, ConversationContext},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

pub type SharedContext = Arc<AsyncMutex<ConversationContext>>;

#[derive(Debug)]
struct SessionEntry {
    context: SharedContext,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<String, SessionEntry>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recently_used(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            debug!(session_id = %id, "[sessions] Evicting least recently used session");
            self.entries.remove(&id);
        }
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<Sessions>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that keeps at most `capacity` sessions (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the context for `session_id`, creating an empty one on first use.
    pub fn session(&self, session_id: &str) -> SharedContext {
        let mut sessions = self.lock();
        let now = sessions.tick();
        if let Some(entry) = sessions.entries.get_mut(session_id) {
            entry.last_used = now;
            return Arc::clone(&entry.context);
        }

        if sessions.entries.len() >= self.capacity {
            sessions.evict_least_recently_used();
        }
        let context = SharedContext::default();
        sessions.entries.insert(
            session_id.to_string(),
            SessionEntry {
                context: Arc::clone(&context),
                last_used: now,
            },
        );
        context
    }

    pub async fn snapshot(&self, session_id: &str) -> Option<ContextSnapshot> {
        let session = self
            .lock()
            .entries
            .get(session_id)
            .map(|entry| Arc::clone(&entry.context))?;
        let context = session.lock().await;
        Some(context.snapshot())
    }

    /// Drops a session. Returns whether it existed.
    pub fn remove(&self, session_id: &str) -> bool {
        self.lock().entries.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}
