//! Attribute assembly and backend status translation.
//!
//! Backends describe objects as a list of [`Attr`] options rather than a
//! full wire record; [`assemble_fattr`] folds that list, in order, onto a
//! base record whose `fsid`/`fileid` come from the file handle. Setting
//! the file type ORs the matching `S_IF*` bits into `mode`, and setting
//! the mode ORs its bits into whatever is already there, so a backend may
//! report `Type(NFDIR)` and `Mode(Bits(0o755))` in either order and end
//! up with `0o040755`.
//!
//! The second half of the module maps [`BackendError`] to the NFSv2
//! status vocabulary. Anything without a defined mapping degrades to
//! `NFSERR_IO`.

use crate::protocol::xdr::nfs2::{fattr, ftype, nfsstat, timeval};
use crate::vfs::BackendError;

/// Block size reported when a backend does not specify one.
pub const DEFAULT_BLOCKSIZE: u32 = 1024;

/// One rwx permission set of a symbolic mode triple.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Perms {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Perms {
    pub const fn new(read: bool, write: bool, execute: bool) -> Self {
        Perms { read, write, execute }
    }

    /// All three permission letters.
    pub const fn rwx() -> Self {
        Perms::new(true, true, true)
    }

    /// Read and execute, the usual directory permission set.
    pub const fn rx() -> Self {
        Perms::new(true, false, true)
    }

    /// Read and write.
    pub const fn rw() -> Self {
        Perms::new(true, true, false)
    }

    fn bits(self) -> u32 {
        (u32::from(self.read) << 2) | (u32::from(self.write) << 1) | u32::from(self.execute)
    }
}

/// Named mode roles a backend may use instead of raw bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModeRole {
    Regular,
    Directory,
    Device,
    Block,
    Symlink,
    Socket,
    Setuid,
    Setgid,
}

/// A mode value: raw bits, a symbolic user/group/other triple, or a
/// named role. All forms OR into the existing mode on assembly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModeSpec {
    Bits(u32),
    Symbolic { user: Perms, group: Perms, other: Perms },
    Role(ModeRole),
}

impl ModeSpec {
    fn bits(&self) -> u32 {
        match self {
            ModeSpec::Bits(bits) => *bits,
            ModeSpec::Symbolic { user, group, other } => {
                (user.bits() << 6) | (group.bits() << 3) | other.bits()
            }
            ModeSpec::Role(role) => match role {
                ModeRole::Regular => 0o100000,
                ModeRole::Directory => 0o040000,
                ModeRole::Device => 0o020000,
                ModeRole::Block => 0o060000,
                ModeRole::Symlink => 0o120000,
                ModeRole::Socket => 0o140000,
                ModeRole::Setuid => 0o4000,
                ModeRole::Setgid => 0o2000,
            },
        }
    }
}

/// One attribute option as reported by a backend `getattr`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attr {
    Type(ftype),
    Mode(ModeSpec),
    Nlink(u32),
    Uid(u32),
    Gid(u32),
    Size(u32),
    Blocksize(u32),
    Rdev(u32),
    Blocks(u32),
    Fsid(u32),
    Fileid(u32),
    Atime(timeval),
    Mtime(timeval),
    Ctime(timeval),
}

/// The `S_IFMT` bits implied by a file type.
fn type_bits(ftype: ftype) -> u32 {
    match ftype {
        ftype::NFNON | ftype::NFBAD => 0,
        ftype::NFREG => 0o100000,
        ftype::NFDIR => 0o040000,
        ftype::NFBLK => 0o060000,
        ftype::NFCHR => 0o020000,
        ftype::NFLNK => 0o120000,
        ftype::NFSOCK => 0o140000,
        ftype::NFFIFO => 0o010000,
    }
}

/// Folds backend attribute options onto the base record.
///
/// `file_id` and `fs_id` are the values decoded from the file handle and
/// seed `fileid`/`fsid`; a backend may still override both explicitly.
pub fn assemble_fattr(attrs: &[Attr], file_id: u32, fs_id: u32) -> fattr {
    let mut out = fattr {
        ftype: ftype::NFNON,
        mode: 0,
        nlink: 1,
        uid: 0,
        gid: 0,
        size: 0,
        blocksize: DEFAULT_BLOCKSIZE,
        rdev: 0,
        blocks: 1,
        fsid: fs_id,
        fileid: file_id,
        atime: timeval::default(),
        mtime: timeval::default(),
        ctime: timeval::default(),
    };

    for attr in attrs {
        match attr {
            Attr::Type(t) => {
                out.ftype = *t;
                out.mode |= type_bits(*t);
            }
            Attr::Mode(m) => out.mode |= m.bits(),
            Attr::Nlink(v) => out.nlink = *v,
            Attr::Uid(v) => out.uid = *v,
            Attr::Gid(v) => out.gid = *v,
            Attr::Size(v) => out.size = *v,
            Attr::Blocksize(v) => out.blocksize = *v,
            Attr::Rdev(v) => out.rdev = *v,
            Attr::Blocks(v) => out.blocks = *v,
            Attr::Fsid(v) => out.fsid = *v,
            Attr::Fileid(v) => out.fileid = *v,
            Attr::Atime(t) => out.atime = *t,
            Attr::Mtime(t) => out.mtime = *t,
            Attr::Ctime(t) => out.ctime = *t,
        }
    }

    out
}

impl BackendError {
    /// The NFSv2 status a backend failure is reported as.
    pub fn nfs_stat(&self) -> nfsstat {
        match self {
            BackendError::Perm => nfsstat::NFSERR_PERM,
            BackendError::NoEnt | BackendError::NoSuchFile | BackendError::NoSuchPath => {
                nfsstat::NFSERR_NOENT
            }
            BackendError::Io
            | BackendError::Failure
            | BackendError::BadMessage
            | BackendError::NoConnection
            | BackendError::ConnectionLost
            | BackendError::UnknownPrinciple
            | BackendError::LockConflict
            | BackendError::Eof
            | BackendError::Timeout
            | BackendError::Other(_) => nfsstat::NFSERR_IO,
            BackendError::Nxio | BackendError::OpUnsupported | BackendError::NoMedia => {
                nfsstat::NFSERR_NXIO
            }
            BackendError::Acces
            | BackendError::PermissionDenied
            | BackendError::WriteProtect
            | BackendError::CannotDelete => nfsstat::NFSERR_ACCES,
            BackendError::Exist | BackendError::FileAlreadyExists => nfsstat::NFSERR_EXIST,
            BackendError::Nodev => nfsstat::NFSERR_NODEV,
            BackendError::NotDir | BackendError::NotADirectory => nfsstat::NFSERR_NOTDIR,
            BackendError::IsDir | BackendError::FileIsADirectory => nfsstat::NFSERR_ISDIR,
            BackendError::Fbig => nfsstat::NFSERR_FBIG,
            BackendError::NoSpc | BackendError::NoSpaceOnFilesystem => nfsstat::NFSERR_NOSPC,
            BackendError::Rofs => nfsstat::NFSERR_ROFS,
            BackendError::NameTooLong => nfsstat::NFSERR_NAMETOOLONG,
            BackendError::NotEmpty => nfsstat::NFSERR_NOTEMPTY,
            BackendError::Dquot | BackendError::QuotaExceeded => nfsstat::NFSERR_DQUOT,
            BackendError::Stale | BackendError::InvalidHandle => nfsstat::NFSERR_STALE,
            BackendError::Wflush => nfsstat::NFSERR_WFLUSH,
        }
    }
}
