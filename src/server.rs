//! Process-wide server state and the operations that tie the tables
//! together.
//!
//! [`ServerState`] owns the handle registry, lock table, backend
//! registry, mount table, and retransmission cache. It is designed for a
//! single owner: the UDP transport funnels every datagram and every
//! administrative call through one FIFO queue into one task, which runs
//! each request to completion before touching the next. That total order
//! is what lets the tables live here without any locking; see the
//! transport in [`crate::udp`].
//!
//! The crash barrier also lives here: every backend callback the server
//! makes goes through [`guard`], which converts a panicking backend into
//! an I/O error instead of a dead dispatcher.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::handles::HandleRegistry;
use crate::locks::LockTable;
use crate::mounts::{MountTable, MountedFs};
use crate::protocol::rpc::{self, RetransmissionCache};
use crate::protocol::xdr::mount::fhstatus;
use crate::protocol::xdr::nfs2::{fhandle, nfsstat};
use crate::registry::BackendRegistry;
use crate::vfs::{Backend, BackendError, BackendFactory, MountOpts, NodeId};

/// How long processed transaction ids are remembered for duplicate
/// detection.
const RETRANSMISSION_RETENTION: Duration = Duration::from_secs(60);

/// Server configuration. Only `debug` is interpreted by the core; it
/// raises per-request tracing from `trace` to `debug` level.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub debug: bool,
    pub nfs_port: u16,
    pub mount_port: u16,
    pub nlm_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            debug: false,
            nfs_port: crate::udp::NFS_PORT,
            mount_port: crate::udp::MOUNT_PORT,
            nlm_port: crate::udp::NLM_PORT,
        }
    }
}

/// A file handle resolved against the registries: the decoded ids, the
/// node the backend knows, and the live instance serving it.
pub struct Resolved {
    pub fs_id: u32,
    pub file_id: u32,
    pub node: NodeId,
    pub backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("fs_id", &self.fs_id)
            .field("file_id", &self.file_id)
            .field("node", &self.node)
            .finish()
    }
}

/// The five tables plus counters, owned by the dispatcher task.
pub struct ServerState {
    pub handles: HandleRegistry,
    pub locks: LockTable,
    pub backends: BackendRegistry,
    pub mounts: MountTable,
    pub(crate) retransmissions: RetransmissionCache,
    debug: bool,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        ServerState {
            handles: HandleRegistry::new(),
            locks: LockTable::new(),
            backends: BackendRegistry::new(),
            mounts: MountTable::new(),
            retransmissions: RetransmissionCache::new(RETRANSMISSION_RETENTION),
            debug: config.debug,
        }
    }

    /// Administrative call: registers an export path in the unmounted
    /// state.
    pub fn add_mountpoint(
        &mut self,
        path: &str,
        factory: Arc<dyn BackendFactory>,
        opts: MountOpts,
    ) {
        debug!("add_mountpoint({:?})", path);
        self.mounts.add(path, factory, opts);
    }

    /// Administrative call: toggles per-request debug tracing.
    pub fn set_debug(&mut self, on: bool) {
        self.debug = on;
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// Resolves a wire handle to a live backend node.
    ///
    /// Both failure modes are the stale-handle status: a handle this
    /// server never minted, and a handle whose filesystem has been
    /// unmounted (the registry still knows the fs_id, but no live
    /// instance serves it).
    pub fn resolve(&self, fh: &fhandle) -> Result<Resolved, nfsstat> {
        let Some((fs_id, node)) = self.handles.lookup(fh) else {
            return Err(nfsstat::NFSERR_STALE);
        };
        let Some(backend) = self.backends.live(fs_id) else {
            return Err(nfsstat::NFSERR_STALE);
        };
        let (file_id, _) = HandleRegistry::parse(fh);
        Ok(Resolved { fs_id, file_id, node: node.clone(), backend })
    }

    /// MOUNT `mnt`: mounts the first export entry matching `path`.
    ///
    /// Remounting an already mounted path is idempotent and returns the
    /// existing root handle. A fresh mount runs the factory's `init`
    /// behind the crash barrier, allocates a filesystem id, and mints
    /// the root handle.
    pub async fn mount_path(&mut self, path: &[u8]) -> fhstatus {
        let Some(index) = self.mounts.find(path) else {
            debug!("mnt: no export matches {:?}", String::from_utf8_lossy(path));
            return fhstatus { status: 1, fhandle: None };
        };

        if let Some(mounted) = self.mounts.entry(index).mounted {
            return fhstatus { status: 0, fhandle: Some(mounted.root_fh) };
        }

        let factory = self.mounts.entry(index).factory.clone();
        let opts = self.mounts.entry(index).opts.clone();
        let (root_id, instance) = match guard(factory.init(&opts)).await {
            Ok(res) => res,
            Err(e) => {
                warn!("backend init failed for {:?}: {}", String::from_utf8_lossy(path), e);
                return fhstatus { status: 1, fhandle: None };
            }
        };

        let fs_id = self.backends.allocate(factory, instance);
        self.handles.init_fs(fs_id);
        let root_fh = self.handles.handle_for(&root_id, fs_id);
        self.mounts.entry_mut(index).mounted = Some(MountedFs { root_fh, fs_id });
        debug!("mounted {:?} as fs {}", String::from_utf8_lossy(path), fs_id);
        fhstatus { status: 0, fhandle: Some(root_fh) }
    }

    /// MOUNT `umnt`: unmounts the first entry matching `path`, if it is
    /// mounted. Void either way.
    pub async fn unmount_path(&mut self, path: &[u8]) {
        if let Some(index) = self.mounts.find(path) {
            self.unmount_index(index).await;
        }
    }

    /// MOUNT `umntall`: unmounts every mounted entry.
    pub async fn unmount_all(&mut self) {
        for index in self.mounts.mounted_indices() {
            self.unmount_index(index).await;
        }
    }

    async fn unmount_index(&mut self, index: usize) {
        let Some(mounted) = self.mounts.entry(index).mounted else {
            return;
        };
        if let Some(instance) = self.backends.detach(mounted.fs_id) {
            if AssertUnwindSafe(instance.terminate()).catch_unwind().await.is_err() {
                error!("backend terminate panicked for fs {}", mounted.fs_id);
            }
        }
        self.mounts.entry_mut(index).mounted = None;
        debug!("unmounted fs {}", mounted.fs_id);
    }

    /// Runs one datagram to completion and returns the encoded reply,
    /// or `None` when no reply should be sent (retransmissions, or
    /// input mangled beyond even a GARBAGE_ARGS reply).
    pub async fn process(&mut self, datagram: &[u8], peer: &str) -> Option<Vec<u8>> {
        let mut input = std::io::Cursor::new(datagram);
        let mut output = Vec::new();
        match rpc::handle_rpc(&mut input, &mut output, peer, self).await {
            Ok(true) => Some(output),
            Ok(false) => None,
            Err(e) => {
                warn!("dropping undecodable datagram from {}: {:?}", peer, e);
                None
            }
        }
    }
}

/// The crash barrier: runs a backend callback and converts a panic into
/// `BackendError::Io` so a misbehaving backend cannot take the
/// dispatcher down with it.
pub(crate) async fn guard<T, F>(fut: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => {
            error!("backend callback panicked: {}", describe_panic(&payload));
            Err(BackendError::Io)
        }
    }
}

fn describe_panic(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
