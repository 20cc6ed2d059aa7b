//! One-time server seeds for the commit-reveal flow.
//!
//! A commitment is issued as `(id, sha256(seed))` before the player picks a
//! client seed, and redeemed exactly once by the spin that uses it. Reveal
//! removes the entry under the same lock that finds it, so concurrent spins
//! on one id see exactly one success.
//!
//! Unredeemed entries expire after `ttl` and the store never holds more than
//! `capacity` of them; when full, expired entries are swept first and then
//! the oldest live one is dropped.

use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::rng::{derive_hash_hex, generate_server_seed, random_hex};

pub const COMMIT_ID_BYTES: usize = 8;
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_CAPACITY: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: String,
    pub server_hash: String,
}

#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

struct Pending {
    server_seed: String,
    created_at: Instant,
}

#[derive(Default)]
struct Inner {
    pending: HashMap<String, Pending>,
    // Insertion order; may hold ids already revealed, skipped on eviction.
    order: VecDeque<(String, Instant)>,
}

impl Inner {
    fn sweep(&mut self, ttl: Duration, now: Instant) -> usize {
        let mut removed = 0;
        while let Some((_, created_at)) = self.order.front() {
            if now.duration_since(*created_at) < ttl {
                break;
            }
            if let Some((id, _)) = self.order.pop_front() {
                if self.pending.remove(&id).is_some() {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Drops queue entries whose id was already revealed.
    fn compact(&mut self) {
        let Inner { pending, order } = self;
        order.retain(|(id, _)| pending.contains_key(id));
    }

    fn evict_oldest(&mut self) -> Option<String> {
        while let Some((id, _)) = self.order.pop_front() {
            if self.pending.remove(&id).is_some() {
                return Some(id);
            }
        }
        None
    }
}

pub struct CommitmentStore {
    limits: StoreLimits,
    inner: Mutex<Inner>,
}

impl Default for CommitmentStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

impl CommitmentStore {
    pub fn new(limits: StoreLimits) -> Self {
        info!(ttl_secs = limits.ttl.as_secs(), capacity = limits.capacity, "commitment store ready");
        Self {
            limits,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Issues a fresh 256-bit seed and returns only its id and hash.
    pub fn create(&self) -> Commitment {
        let server_seed = generate_server_seed();
        let server_hash = derive_hash_hex(server_seed.as_bytes());
        let id = random_hex(&mut OsRng, COMMIT_ID_BYTES);
        let now = Instant::now();

        let mut inner = self.inner.lock();
        if inner.pending.len() >= self.limits.capacity {
            inner.sweep(self.limits.ttl, now);
            while inner.pending.len() >= self.limits.capacity {
                match inner.evict_oldest() {
                    Some(evicted) => warn!(%evicted, "commitment store full, evicted oldest"),
                    None => break,
                }
            }
        }
        inner.order.push_back((id.clone(), now));
        if inner.order.len() > 2 * self.limits.capacity {
            inner.compact();
        }
        inner.pending.insert(
            id.clone(),
            Pending {
                server_seed,
                created_at: now,
            },
        );
        drop(inner);

        debug!(%id, "commitment created");
        Commitment { id, server_hash }
    }

    /// Removes and returns the seed for `id`. Unknown, already revealed and
    /// expired ids all yield `None`.
    pub fn reveal(&self, id: &str) -> Option<String> {
        let pending = self.inner.lock().pending.remove(id)?;
        if pending.created_at.elapsed() >= self.limits.ttl {
            debug!(%id, "commitment expired before reveal");
            return None;
        }
        Some(pending.server_seed)
    }

    /// Drops expired entries; returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.inner.lock().sweep(self.limits.ttl, Instant::now());
        if removed > 0 {
            debug!(removed, "swept expired commitments");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
