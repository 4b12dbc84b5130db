//! The mount table: exported paths and their mount lifecycle state.
//!
//! Entries are appended by the administrative `add_mountpoint` call and
//! never removed; unmounting resets an entry to the unmounted state, so
//! remounting the same path needs no reconfiguration. Duplicate paths
//! are allowed, but path lookup always returns the first match, so later
//! duplicates are effectively shadowed.

use std::sync::Arc;

use crate::protocol::xdr::nfs2::fhandle;
use crate::vfs::{BackendFactory, MountOpts};

/// The mounted half of an entry's state.
#[derive(Clone, Copy, Debug)]
pub struct MountedFs {
    pub root_fh: fhandle,
    pub fs_id: u32,
}

/// One exported path and the backend that serves it.
pub struct MountEntry {
    pub path: String,
    pub factory: Arc<dyn BackendFactory>,
    pub opts: MountOpts,
    /// Set while mounted; `None` is the unmounted state.
    pub mounted: Option<MountedFs>,
}

/// Ordered list of export entries.
#[derive(Default)]
pub struct MountTable {
    entries: Vec<MountEntry>,
}

impl MountTable {
    pub fn new() -> Self {
        MountTable::default()
    }

    /// Appends an entry in the unmounted state.
    pub fn add(&mut self, path: &str, factory: Arc<dyn BackendFactory>, opts: MountOpts) {
        self.entries.push(MountEntry {
            path: path.to_string(),
            factory,
            opts,
            mounted: None,
        });
    }

    /// Index of the first entry whose path matches `path` byte-for-byte.
    pub fn find(&self, path: &[u8]) -> Option<usize> {
        self.entries.iter().position(|e| e.path.as_bytes() == path)
    }

    pub fn entry(&self, index: usize) -> &MountEntry {
        &self.entries[index]
    }

    pub fn entry_mut(&mut self, index: usize) -> &mut MountEntry {
        &mut self.entries[index]
    }

    pub fn entries(&self) -> &[MountEntry] {
        &self.entries
    }

    /// Indices of every currently mounted entry.
    pub fn mounted_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.mounted.is_some())
            .map(|(i, _)| i)
            .collect()
    }
}
