//! The backend registry: filesystem-id allocation and the two maps that
//! realize the module/state split of the mount lifecycle.
//!
//! Mounting allocates a fresh fs_id (monotone, starting at 1) and stores
//! both the factory that produced the instance and the instance itself.
//! Unmounting drops only the instance: the factory entry stays for the
//! whole server run so a stale handle still decodes to a known, now
//! inactive filesystem rather than to nothing at all. Dispatch treats
//! "known fs_id, no live instance" as the stale-handle case.

use std::collections::HashMap;
use std::sync::Arc;

use crate::vfs::{Backend, BackendFactory};

/// Maps filesystem ids to backend factories and live instances.
#[derive(Default)]
pub struct BackendRegistry {
    /// Retained for the server lifetime, even after unmount.
    modules: HashMap<u32, Arc<dyn BackendFactory>>,
    /// Present only while the filesystem is mounted. The instance is the
    /// backend-local state.
    live: HashMap<u32, Arc<dyn Backend>>,
    last_fs_id: u32,
}

impl BackendRegistry {
    pub fn new() -> Self {
        BackendRegistry::default()
    }

    /// Allocates the next filesystem id and registers the factory and
    /// live instance under it.
    pub fn allocate(
        &mut self,
        factory: Arc<dyn BackendFactory>,
        instance: Arc<dyn Backend>,
    ) -> u32 {
        self.last_fs_id += 1;
        let fs_id = self.last_fs_id;
        self.modules.insert(fs_id, factory);
        self.live.insert(fs_id, instance);
        fs_id
    }

    /// The live instance serving `fs_id`, if it is currently mounted.
    pub fn live(&self, fs_id: u32) -> Option<Arc<dyn Backend>> {
        self.live.get(&fs_id).cloned()
    }

    /// The factory that produced `fs_id`, mounted or not.
    pub fn module(&self, fs_id: u32) -> Option<Arc<dyn BackendFactory>> {
        self.modules.get(&fs_id).cloned()
    }

    /// Whether `fs_id` was ever allocated.
    pub fn is_known(&self, fs_id: u32) -> bool {
        self.modules.contains_key(&fs_id)
    }

    /// Removes and returns the live instance, keeping the factory entry.
    pub fn detach(&mut self, fs_id: u32) -> Option<Arc<dyn Backend>> {
        self.live.remove(&fs_id)
    }

    /// Number of currently mounted filesystems.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
