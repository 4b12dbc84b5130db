//! The file-handle registry: the bidirectional mapping between the
//! opaque 32-byte handles clients hold and the backend node identifiers
//! they stand for.
//!
//! A handle packs three fields: a per-filesystem 32-bit file id (minted
//! from a counter that starts at 1; 0 is reserved), the 32-bit id of the
//! owning filesystem instance, and a 24-byte suffix drawn once per server
//! run. The suffix makes handles from a previous server instance
//! unresolvable, so clients holding them get the stale-handle status
//! instead of someone else's file.
//!
//! Registrations are never removed. A handle minted before an unmount
//! still decodes after a remount of the same export, but its fs_id no
//! longer names a live backend instance and dispatch reports it stale.
//! The registry therefore grows with the number of distinct objects ever
//! exposed; that is the cost of the handles-never-lie contract.

use std::collections::HashMap;

use rand::RngCore;

use crate::protocol::xdr::nfs2::{fhandle, FHSIZE};
use crate::vfs::NodeId;

/// Length of the per-server-instance handle suffix.
pub const SUFFIX_LEN: usize = 24;

/// Handle state of one filesystem instance.
#[derive(Default)]
struct FsHandles {
    /// Most recently minted file id; the next mint uses `last + 1`.
    last_file_id: u32,
    by_id: HashMap<NodeId, fhandle>,
}

/// Mints, looks up, and reverse-looks-up file handles, partitioned by
/// filesystem id.
pub struct HandleRegistry {
    suffix: [u8; SUFFIX_LEN],
    by_fs: HashMap<u32, FsHandles>,
    by_handle: HashMap<fhandle, (u32, NodeId)>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        let mut suffix = [0_u8; SUFFIX_LEN];
        rand::thread_rng().fill_bytes(&mut suffix);
        HandleRegistry { suffix, by_fs: HashMap::new(), by_handle: HashMap::new() }
    }

    /// Starts the file-id counter for a freshly allocated filesystem id.
    pub fn init_fs(&mut self, fs_id: u32) {
        self.by_fs.entry(fs_id).or_default();
    }

    /// Returns the handle for `id` under `fs_id`, minting one on first
    /// sight. Minting is the only mutation; an id that was ever handed a
    /// handle gets the same handle back forever.
    pub fn handle_for(&mut self, id: &NodeId, fs_id: u32) -> fhandle {
        let fs = self.by_fs.entry(fs_id).or_default();
        if let Some(fh) = fs.by_id.get(id) {
            return *fh;
        }

        fs.last_file_id += 1;
        let fh = pack(fs.last_file_id, fs_id, &self.suffix);
        fs.by_id.insert(id.clone(), fh);
        self.by_handle.insert(fh, (fs_id, id.clone()));
        fh
    }

    /// Resolves a handle to the filesystem id and node id it was minted
    /// for. `None` means the handle is stale: unknown to this server
    /// instance.
    pub fn lookup(&self, fh: &fhandle) -> Option<(u32, &NodeId)> {
        self.by_handle.get(fh).map(|(fs_id, id)| (*fs_id, id))
    }

    /// Structural decode of the packed `(file_id, fs_id)` prefix.
    pub fn parse(fh: &fhandle) -> (u32, u32) {
        let file_id = u32::from_be_bytes(fh[0..4].try_into().unwrap());
        let fs_id = u32::from_be_bytes(fh[4..8].try_into().unwrap());
        (file_id, fs_id)
    }

    /// The server-instance suffix shared by every handle minted here.
    pub fn suffix(&self) -> &[u8; SUFFIX_LEN] {
        &self.suffix
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        HandleRegistry::new()
    }
}

fn pack(file_id: u32, fs_id: u32, suffix: &[u8; SUFFIX_LEN]) -> fhandle {
    let mut fh: fhandle = [0; FHSIZE];
    fh[0..4].copy_from_slice(&file_id.to_be_bytes());
    fh[4..8].copy_from_slice(&fs_id.to_be_bytes());
    fh[8..].copy_from_slice(suffix);
    fh
}
