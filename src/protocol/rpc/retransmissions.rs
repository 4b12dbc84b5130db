//! Duplicate-request detection for UDP transport.
//!
//! Clients retransmit a datagram when a reply is slow or lost, reusing
//! the transaction id. Replaying a non-idempotent operation (a WRITE, a
//! LOCK) for a request the server already ran would corrupt state, so
//! processed `(xid, peer)` pairs are remembered for a retention window
//! and repeats within it are dropped without a reply.
//!
//! The cache is owned by the dispatcher and mutated only between
//! requests, so unlike a per-connection tracker it needs no interior
//! locking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Remembers recently processed transaction ids per peer.
pub struct RetransmissionCache {
    retention: Duration,
    seen: HashMap<(u32, String), Instant>,
}

impl RetransmissionCache {
    pub fn new(retention: Duration) -> Self {
        RetransmissionCache { retention, seen: HashMap::new() }
    }

    /// Records a transaction and reports whether it was already seen
    /// within the retention window. Expired entries are swept on the
    /// way through.
    pub fn observe(&mut self, xid: u32, peer: &str) -> bool {
        let now = Instant::now();
        let retention = self.retention;
        self.seen.retain(|_, seen_at| now.duration_since(*seen_at) < retention);

        match self.seen.entry((xid, peer.to_string())) {
            std::collections::hash_map::Entry::Occupied(_) => true,
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(now);
                false
            }
        }
    }
}
