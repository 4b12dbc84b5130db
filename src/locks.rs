//! The byte-range lock table behind the KLM procedures.
//!
//! Locks are advisory and keyed by the raw file-handle bytes as the
//! client sent them; the lock manager never resolves handles, so locking
//! works (and fails) uniformly for live and stale handles alike.
//!
//! A record holds one exclusivity flag and a list of `(owner, offset,
//! length)` ranges, newest first. Ranges from the same owner may overlap
//! freely. Blocking requests are accepted but never block: a conflicting
//! request is denied immediately.

use std::collections::HashMap;

/// One granted byte range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockRange {
    /// Lock owner identity, conventionally the client process id.
    pub owner: i32,
    pub offset: u32,
    pub length: u32,
}

/// The lock state of one file handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockRecord {
    pub exclusive: bool,
    /// Granted ranges, most recent first.
    pub ranges: Vec<LockRange>,
}

/// Outcome of a TEST probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestResult {
    /// No conflicting range; the probed lock would be granted.
    Granted,
    /// A conflicting range exists; carries the holder the client should
    /// be told about.
    Denied { exclusive: bool, owner: i32, offset: u32, length: u32 },
}

/// Per-handle byte-range locks with owner-aware overlap tests.
#[derive(Default)]
pub struct LockTable {
    locks: HashMap<Vec<u8>, LockRecord>,
}

/// Closed-interval overlap: `[a_off, a_off+a_len-1]` against
/// `[b_off, b_off+b_len-1]`, in u64 so the interval arithmetic cannot
/// wrap. Zero-length ranges overlap nothing.
fn overlaps(a_off: u32, a_len: u32, b_off: u32, b_len: u32) -> bool {
    if a_len == 0 || b_len == 0 {
        return false;
    }
    let a_end = u64::from(a_off) + u64::from(a_len) - 1;
    let b_end = u64::from(b_off) + u64::from(b_len) - 1;
    u64::from(a_off.max(b_off)) <= a_end.min(b_end)
}

impl LockTable {
    pub fn new() -> Self {
        LockTable::default()
    }

    /// Probes whether `owner` could lock `[offset, offset+length)`.
    ///
    /// The scan reports the first overlapping range; an overlap with the
    /// probing owner itself is not a conflict. The probe's own
    /// exclusivity does not enter the decision.
    pub fn test(&self, fh: &[u8], owner: i32, offset: u32, length: u32) -> TestResult {
        let Some(record) = self.locks.get(fh) else {
            return TestResult::Granted;
        };

        match record.ranges.iter().find(|r| overlaps(r.offset, r.length, offset, length)) {
            None => TestResult::Granted,
            Some(range) if range.owner == owner => TestResult::Granted,
            Some(range) => TestResult::Denied {
                exclusive: record.exclusive,
                owner: range.owner,
                offset: range.offset,
                length: range.length,
            },
        }
    }

    /// Attempts to take a lock; returns whether it was granted.
    ///
    /// A fresh or emptied record adopts the request's exclusivity. An
    /// exclusive record only stacks further ranges from the owner of its
    /// first (most recent) range. A shared record grants when nothing
    /// overlaps the request, or when any of the overlapping ranges
    /// already belongs to the requesting owner; only overlaps held
    /// exclusively by other owners deny. Grants prepend the range.
    pub fn lock(
        &mut self,
        fh: &[u8],
        owner: i32,
        exclusive: bool,
        offset: u32,
        length: u32,
    ) -> bool {
        let range = LockRange { owner, offset, length };
        let record = self.locks.entry(fh.to_vec()).or_default();

        // A fresh record and an emptied one behave the same: the request
        // is granted and stamps its exclusivity on the record.
        if record.ranges.is_empty() {
            record.exclusive = exclusive;
            record.ranges.insert(0, range);
            return true;
        }

        let granted = if record.exclusive {
            record.ranges[0].owner == owner
        } else {
            let mut conflict = false;
            let mut own = false;
            for r in
                record.ranges.iter().filter(|r| overlaps(r.offset, r.length, offset, length))
            {
                conflict = true;
                if r.owner == owner {
                    own = true;
                    break;
                }
            }
            !conflict || own
        };

        if granted {
            record.ranges.insert(0, range);
        }
        granted
    }

    /// Releases every range of `owner` overlapping the given interval.
    /// Returns whether anything was actually released; a miss (including
    /// an unknown handle) is the denied-nolock case.
    pub fn unlock(&mut self, fh: &[u8], owner: i32, offset: u32, length: u32) -> bool {
        let Some(record) = self.locks.get_mut(fh) else {
            return false;
        };

        let before = record.ranges.len();
        record
            .ranges
            .retain(|r| !(r.owner == owner && overlaps(r.offset, r.length, offset, length)));
        record.ranges.len() != before
    }

    /// Acknowledges a cancel request. No lock request ever waits, so
    /// there is nothing to unwind.
    pub fn cancel(&mut self, _fh: &[u8], _owner: i32, _offset: u32, _length: u32) {}

    /// The current record for a handle, if any ranges were ever granted
    /// on it.
    pub fn record(&self, fh: &[u8]) -> Option<&LockRecord> {
        self.locks.get(fh)
    }
}
