//! The backend contract: the interface between the NFS server core and
//! the filesystem implementations it exports.
//!
//! This module provides:
//! - The [`Backend`] trait with the filesystem operations the NFSv2
//!   dispatcher invokes, and the [`BackendFactory`] trait that creates a
//!   live instance per mount
//! - [`NodeId`], the backend-chosen object identifier
//! - [`BackendError`], the POSIX-like failure vocabulary backends report
//!
//! The server is stateless toward backends in the NFS sense: operations
//! carry node identifiers, not open-file state. A backend instance is
//! created by `init` when its export is mounted and dropped after
//! `terminate` when it is unmounted; the instance itself carries whatever
//! local state the backend needs, so every operation takes `&self`.
//!
//! Node identifiers are opaque to the server. They are compared and
//! hashed by the handle registry but never interpreted, so a backend may
//! use inode numbers, path hashes, or database keys alike.
//!
//! `getattr` should be fast; the dispatcher calls it after nearly every
//! mutating operation to fill the attribute side of the reply.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::attr::Attr;
use crate::protocol::xdr::nfs2;

/// Backend-chosen identifier for a filesystem object.
///
/// The server never looks inside the value; it only stores it in the
/// handle registry as an equality/hash key. Backends with integer inodes
/// can use the `From<u64>` conversion.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeId(pub Vec<u8>);

impl NodeId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        NodeId(value.to_be_bytes().to_vec())
    }
}

impl From<Vec<u8>> for NodeId {
    fn from(value: Vec<u8>) -> Self {
        NodeId(value)
    }
}

impl From<&[u8]> for NodeId {
    fn from(value: &[u8]) -> Self {
        NodeId(value.to_vec())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId(")?;
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

/// Options attached to a mount entry, passed through to `init` verbatim.
///
/// The server recognizes none of the keys; interpretation is entirely up
/// to the backend.
pub type MountOpts = HashMap<String, String>;

/// Failure reasons a backend may report.
///
/// The dispatcher translates these to NFSv2 status codes; several
/// variants are descriptive aliases that map to the same wire status,
/// kept distinct so backend log output stays meaningful. Anything not
/// covered can be reported as `Other` and surfaces as an I/O error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("not owner")]
    Perm,
    #[error("no such file or directory")]
    NoEnt,
    #[error("no such file")]
    NoSuchFile,
    #[error("no such path")]
    NoSuchPath,
    #[error("i/o error")]
    Io,
    #[error("operation failed")]
    Failure,
    #[error("bad message")]
    BadMessage,
    #[error("no connection to storage")]
    NoConnection,
    #[error("connection lost")]
    ConnectionLost,
    #[error("unknown principle")]
    UnknownPrinciple,
    #[error("lock conflict")]
    LockConflict,
    #[error("end of file")]
    Eof,
    #[error("operation timed out")]
    Timeout,
    #[error("no such device or address")]
    Nxio,
    #[error("operation unsupported")]
    OpUnsupported,
    #[error("no media")]
    NoMedia,
    #[error("access denied")]
    Acces,
    #[error("permission denied")]
    PermissionDenied,
    #[error("medium is write protected")]
    WriteProtect,
    #[error("cannot delete")]
    CannotDelete,
    #[error("file exists")]
    Exist,
    #[error("file already exists")]
    FileAlreadyExists,
    #[error("no such device")]
    Nodev,
    #[error("not a directory")]
    NotDir,
    #[error("not a directory")]
    NotADirectory,
    #[error("is a directory")]
    IsDir,
    #[error("file is a directory")]
    FileIsADirectory,
    #[error("file too large")]
    Fbig,
    #[error("no space left on device")]
    NoSpc,
    #[error("no space on filesystem")]
    NoSpaceOnFilesystem,
    #[error("read-only filesystem")]
    Rofs,
    #[error("name too long")]
    NameTooLong,
    #[error("directory not empty")]
    NotEmpty,
    #[error("quota hard limit exceeded")]
    Dquot,
    #[error("quota exceeded")]
    QuotaExceeded,
    #[error("stale identifier")]
    Stale,
    #[error("invalid handle")]
    InvalidHandle,
    #[error("write cache flushed")]
    Wflush,
    #[error("{0}")]
    Other(String),
}

/// Creates one live [`Backend`] instance per mount of an export.
///
/// The factory is registered with a mount entry and survives for the
/// whole server lifetime; `init` runs on every transition from unmounted
/// to mounted, so a remount after unmount yields a fresh instance.
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Brings up the filesystem and returns the identifier of its root
    /// directory together with the instance that will serve operations.
    async fn init(&self, opts: &MountOpts) -> Result<(NodeId, Arc<dyn Backend>), BackendError>;
}

/// The filesystem operations behind the NFSv2 procedures.
///
/// Each method corresponds to one protocol operation; the instance
/// itself is the backend-local state. Implementations may suspend inside
/// any method (this is where the server's file I/O happens), but must
/// not assume calls are concurrent: the dispatcher serializes them.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Called once when the export is unmounted, before the instance is
    /// dropped. The result is ignored.
    async fn terminate(&self);

    /// Returns the attributes of the object as a list of attribute
    /// options; unspecified fields take the server's defaults.
    async fn getattr(&self, id: &NodeId) -> Result<Vec<Attr>, BackendError>;

    /// Applies the requested attribute changes to the object.
    async fn setattr(&self, id: &NodeId, attrs: &nfs2::sattr) -> Result<(), BackendError>;

    /// Resolves `name` within the directory `dir` to an object id.
    async fn lookup(&self, dir: &NodeId, name: &nfs2::filename) -> Result<NodeId, BackendError>;

    /// Returns the target path of a symbolic link.
    async fn readlink(&self, id: &NodeId) -> Result<nfs2::path, BackendError>;

    /// Reads up to `count` bytes at `offset`. `total_count` is the
    /// client's transfer-total hint and may be ignored.
    async fn read(
        &self,
        id: &NodeId,
        offset: u32,
        count: u32,
        total_count: u32,
    ) -> Result<Vec<u8>, BackendError>;

    /// Writes `data` at `offset`. `begin_offset` and `total_count` are
    /// the client's transfer hints and may be ignored.
    async fn write(
        &self,
        id: &NodeId,
        begin_offset: u32,
        offset: u32,
        total_count: u32,
        data: &[u8],
    ) -> Result<(), BackendError>;

    /// Creates a regular file and returns its id.
    async fn create(
        &self,
        dir: &NodeId,
        name: &nfs2::filename,
        attrs: &nfs2::sattr,
    ) -> Result<NodeId, BackendError>;

    /// Removes a non-directory entry.
    async fn remove(&self, dir: &NodeId, name: &nfs2::filename) -> Result<(), BackendError>;

    /// Moves an entry; both directories belong to this instance.
    async fn rename(
        &self,
        from_dir: &NodeId,
        from_name: &nfs2::filename,
        to_dir: &NodeId,
        to_name: &nfs2::filename,
    ) -> Result<(), BackendError>;

    /// Creates a hard link to `from` named `to_name` in `to_dir`.
    async fn link(
        &self,
        from: &NodeId,
        to_dir: &NodeId,
        to_name: &nfs2::filename,
    ) -> Result<(), BackendError>;

    /// Creates a symbolic link pointing at `target`.
    async fn symlink(
        &self,
        dir: &NodeId,
        name: &nfs2::filename,
        target: &nfs2::path,
        attrs: &nfs2::sattr,
    ) -> Result<(), BackendError>;

    /// Creates a directory and returns its id.
    async fn mkdir(
        &self,
        dir: &NodeId,
        name: &nfs2::filename,
        attrs: &nfs2::sattr,
    ) -> Result<NodeId, BackendError>;

    /// Removes an empty directory.
    async fn rmdir(&self, dir: &NodeId, name: &nfs2::filename) -> Result<(), BackendError>;

    /// Lists the entry names of a directory. `count` is the client's
    /// reply byte budget; backends may ignore it and return the full
    /// listing.
    async fn readdir(&self, id: &NodeId, count: u32) -> Result<Vec<nfs2::filename>, BackendError>;

    /// Reports filesystem-wide usage counters.
    async fn statfs(&self, id: &NodeId) -> Result<nfs2::statfsokres, BackendError>;
}
