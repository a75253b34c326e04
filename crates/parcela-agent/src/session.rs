// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation sessions.
//!
//! A session is the time a user was last active plus an activity sequence
//! number. Every inbound message bumps the sequence, so a delayed inactivity
//! check can tell whether anything happened since it was armed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Result of recording activity for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touch {
    /// No live session existed, or the previous one had expired.
    pub is_new: bool,
    /// Activity sequence number assigned to this message.
    pub seq: u64,
}

/// Storage for active sessions and per-user ordering locks.
pub trait SessionStore: Send + Sync {
    /// Lock that serializes message handling for `user_id`.
    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>>;

    /// Record activity at `now`. A session idle longer than `expiry` counts as new.
    fn touch(&self, user_id: &str, now: Instant, expiry: Duration) -> Touch;

    /// Sequence number of the user's latest activity, if a session exists.
    fn activity_seq(&self, user_id: &str) -> Option<u64>;

    /// Remove the session if its latest activity is still `seq`.
    fn evict_if_idle(&self, user_id: &str, seq: u64) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    last_seen: Instant,
    seq: u64,
}

/// Process-local [`SessionStore`]; sessions do not survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionEntry>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    next_seq: AtomicU64,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn touch(&self, user_id: &str, now: Instant, expiry: Duration) -> Touch {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let previous = self
            .sessions
            .insert(user_id.to_string(), SessionEntry { last_seen: now, seq });
        let is_new = match previous {
            None => true,
            Some(entry) => now.saturating_duration_since(entry.last_seen) > expiry,
        };
        debug!(user = user_id, seq, is_new, "session activity");
        Touch { is_new, seq }
    }

    fn activity_seq(&self, user_id: &str) -> Option<u64> {
        self.sessions.get(user_id).map(|e| e.seq)
    }

    fn evict_if_idle(&self, user_id: &str, seq: u64) -> bool {
        let evicted = self
            .sessions
            .remove_if(user_id, |_, entry| entry.seq == seq)
            .is_some();
        if evicted {
            // Only the map holds the lock when nobody is mid-message.
            self.locks
                .remove_if(user_id, |_, lock| Arc::strong_count(lock) == 1);
            debug!(user = user_id, "session evicted");
        }
        evicted
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
