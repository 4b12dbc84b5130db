//! XDR data types and constants for NFS version 2 as defined in RFC 1094.
//!
//! NFSv2 is the original widely deployed revision of the protocol: 32-bit
//! sizes and offsets, a fixed 32-byte opaque file handle, and a flat
//! attribute record. This module defines the constants, basic types, and
//! argument/result structures for all seventeen server procedures.
//!
//! Result unions in v2 discriminate on [`nfsstat`]; the procedure handlers
//! serialize the status followed by the success arm, so only the argument
//! side appears here as structs.

// Allow unused code since the full protocol surface is defined here
#![allow(dead_code)]
// Preserve original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use std::fmt;
use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::{Deserialize, DeserializeEnum, Serialize, SerializeEnum};
use super::{DeserializeStruct, SerializeStruct};

/// The RPC program number for the NFS service.
pub const PROGRAM: u32 = 100003;
/// The NFS version served by this implementation.
pub const VERSION: u32 = 2;

/// Size in bytes of the opaque file handle.
pub const FHSIZE: usize = 32;
/// Maximum number of bytes of data in a READ or WRITE request.
pub const MAXDATA: u32 = 8192;
/// Maximum number of bytes in a pathname argument.
pub const MAXPATHLEN: u32 = 1024;
/// Maximum number of bytes in a file name argument.
pub const MAXNAMLEN: u32 = 255;
/// Size in bytes of the opaque readdir cookie.
pub const COOKIESIZE: usize = 4;

/// Byte string used for file names and paths.
///
/// NFS names are octet sequences with no mandated character set, so this
/// wraps raw bytes rather than `String`.
#[derive(Default, Clone, PartialEq, Eq, Hash)]
pub struct nfsstring(pub Vec<u8>);

impl nfsstring {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for nfsstring {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for nfsstring {
    fn from(value: &[u8]) -> Self {
        Self(value.into())
    }
}

impl From<&str> for nfsstring {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().into())
    }
}

impl AsRef<[u8]> for nfsstring {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::Deref for nfsstring {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for nfsstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for nfsstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for nfsstring {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for nfsstring {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

/// A component of a pathname.
pub type filename = nfsstring;
/// A pathname or symbolic link target.
pub type path = nfsstring;
/// The opaque 32-byte file handle.
pub type fhandle = [u8; FHSIZE];
/// The opaque readdir position cookie, a big-endian u32 on the wire.
pub type nfscookie = [u8; COOKIESIZE];

/// Procedure numbers for NFS version 2.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum NFSProgram {
    NFSPROC_NULL = 0,
    NFSPROC_GETATTR = 1,
    NFSPROC_SETATTR = 2,
    /// Obsolete in RFC 1094; never dispatched.
    NFSPROC_ROOT = 3,
    NFSPROC_LOOKUP = 4,
    NFSPROC_READLINK = 5,
    NFSPROC_READ = 6,
    /// Obsolete in RFC 1094; never dispatched.
    NFSPROC_WRITECACHE = 7,
    NFSPROC_WRITE = 8,
    NFSPROC_CREATE = 9,
    NFSPROC_REMOVE = 10,
    NFSPROC_RENAME = 11,
    NFSPROC_LINK = 12,
    NFSPROC_SYMLINK = 13,
    NFSPROC_MKDIR = 14,
    NFSPROC_RMDIR = 15,
    NFSPROC_READDIR = 16,
    NFSPROC_STATFS = 17,
    INVALID = 18,
}

/// Status codes returned by NFS version 2 operations.
///
/// The values are the subset of UNIX errno the protocol committed to,
/// plus the NFS-specific stale-handle and write-flush codes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfsstat {
    #[default]
    NFS_OK = 0,
    /// Not owner.
    NFSERR_PERM = 1,
    /// No such file or directory.
    NFSERR_NOENT = 2,
    /// A hard error occurred while processing the operation.
    NFSERR_IO = 5,
    /// No such device or address.
    NFSERR_NXIO = 6,
    /// Permission denied.
    NFSERR_ACCES = 13,
    /// File exists.
    NFSERR_EXIST = 17,
    /// No such device; also reported for cross-filesystem operations.
    NFSERR_NODEV = 19,
    /// Not a directory.
    NFSERR_NOTDIR = 20,
    /// Is a directory.
    NFSERR_ISDIR = 21,
    /// File too large.
    NFSERR_FBIG = 27,
    /// No space left on device.
    NFSERR_NOSPC = 28,
    /// Write attempted on a read-only file system.
    NFSERR_ROFS = 30,
    /// File name too long.
    NFSERR_NAMETOOLONG = 63,
    /// Directory not empty.
    NFSERR_NOTEMPTY = 66,
    /// Disk quota exceeded.
    NFSERR_DQUOT = 69,
    /// The file handle given in the arguments is no longer valid.
    NFSERR_STALE = 70,
    /// The server's write cache was flushed to disk.
    NFSERR_WFLUSH = 99,
}
impl SerializeEnum for nfsstat {}
impl DeserializeEnum for nfsstat {}

/// File type as reported in [`fattr`].
///
/// NFSOCK, NFBAD, and NFFIFO are the conventional extensions used by
/// SunOS-lineage servers beyond the five types RFC 1094 names.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum ftype {
    #[default]
    NFNON = 0,
    /// Regular file.
    NFREG = 1,
    /// Directory.
    NFDIR = 2,
    /// Block special device.
    NFBLK = 3,
    /// Character special device.
    NFCHR = 4,
    /// Symbolic link.
    NFLNK = 5,
    /// Socket.
    NFSOCK = 6,
    /// Unused placeholder.
    NFBAD = 7,
    /// Named pipe.
    NFFIFO = 8,
}
impl SerializeEnum for ftype {}
impl DeserializeEnum for ftype {}

/// Timestamp with microsecond resolution.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct timeval {
    pub seconds: u32,
    pub useconds: u32,
}
SerializeStruct!(timeval, seconds, useconds);
DeserializeStruct!(timeval, seconds, useconds);

/// File attributes as returned to clients.
///
/// `mode` carries both the permission bits and the file-type bits, ORed
/// together the way `stat(2)` reports `st_mode`.
#[derive(Copy, Clone, Debug, Default)]
pub struct fattr {
    pub ftype: ftype,
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    pub blocksize: u32,
    pub rdev: u32,
    pub blocks: u32,
    pub fsid: u32,
    pub fileid: u32,
    pub atime: timeval,
    pub mtime: timeval,
    pub ctime: timeval,
}
SerializeStruct!(
    fattr, ftype, mode, nlink, uid, gid, size, blocksize, rdev, blocks, fsid, fileid, atime,
    mtime, ctime
);
DeserializeStruct!(
    fattr, ftype, mode, nlink, uid, gid, size, blocksize, rdev, blocks, fsid, fileid, atime,
    mtime, ctime
);

/// Requested attribute values for SETATTR, CREATE, MKDIR, and SYMLINK.
///
/// A field holding `u32::MAX` (or a timeval of all ones) means "do not
/// set"; backends are expected to honor that convention.
#[derive(Copy, Clone, Debug)]
pub struct sattr {
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    pub atime: timeval,
    pub mtime: timeval,
}
SerializeStruct!(sattr, mode, uid, gid, size, atime, mtime);
DeserializeStruct!(sattr, mode, uid, gid, size, atime, mtime);

impl sattr {
    /// Sentinel for a field the client does not want changed.
    pub const UNSET: u32 = u32::MAX;
}

impl Default for sattr {
    fn default() -> sattr {
        sattr {
            mode: sattr::UNSET,
            uid: sattr::UNSET,
            gid: sattr::UNSET,
            size: sattr::UNSET,
            atime: timeval { seconds: sattr::UNSET, useconds: sattr::UNSET },
            mtime: timeval { seconds: sattr::UNSET, useconds: sattr::UNSET },
        }
    }
}

/// Arguments naming an entry within a directory.
#[derive(Clone, Debug, Default)]
pub struct diropargs {
    pub dir: fhandle,
    pub name: filename,
}
SerializeStruct!(diropargs, dir, name);
DeserializeStruct!(diropargs, dir, name);

/// Success body of LOOKUP, CREATE, and MKDIR replies.
#[derive(Clone, Debug, Default)]
pub struct diropok {
    pub file: fhandle,
    pub attributes: fattr,
}
SerializeStruct!(diropok, file, attributes);
DeserializeStruct!(diropok, file, attributes);

/// Arguments of the READ procedure.
#[derive(Clone, Debug, Default)]
pub struct readargs {
    pub file: fhandle,
    pub offset: u32,
    pub count: u32,
    /// Unused by the protocol; decoded and passed through to backends.
    pub totalcount: u32,
}
SerializeStruct!(readargs, file, offset, count, totalcount);
DeserializeStruct!(readargs, file, offset, count, totalcount);

/// Arguments of the WRITE procedure.
#[derive(Clone, Debug, Default)]
pub struct writeargs {
    pub file: fhandle,
    /// Unused by the protocol; decoded and passed through to backends.
    pub beginoffset: u32,
    pub offset: u32,
    /// Unused by the protocol; decoded and passed through to backends.
    pub totalcount: u32,
    pub data: Vec<u8>,
}
SerializeStruct!(writeargs, file, beginoffset, offset, totalcount, data);
DeserializeStruct!(writeargs, file, beginoffset, offset, totalcount, data);

/// Arguments of CREATE and MKDIR.
#[derive(Clone, Debug, Default)]
pub struct createargs {
    pub where_: diropargs,
    pub attributes: sattr,
}
SerializeStruct!(createargs, where_, attributes);
DeserializeStruct!(createargs, where_, attributes);

/// Arguments of SETATTR.
#[derive(Clone, Debug, Default)]
pub struct sattrargs {
    pub file: fhandle,
    pub attributes: sattr,
}
SerializeStruct!(sattrargs, file, attributes);
DeserializeStruct!(sattrargs, file, attributes);

/// Arguments of RENAME.
#[derive(Clone, Debug, Default)]
pub struct renameargs {
    pub from: diropargs,
    pub to: diropargs,
}
SerializeStruct!(renameargs, from, to);
DeserializeStruct!(renameargs, from, to);

/// Arguments of LINK.
#[derive(Clone, Debug, Default)]
pub struct linkargs {
    pub from: fhandle,
    pub to: diropargs,
}
SerializeStruct!(linkargs, from, to);
DeserializeStruct!(linkargs, from, to);

/// Arguments of SYMLINK.
#[derive(Clone, Debug, Default)]
pub struct symlinkargs {
    pub from: diropargs,
    pub to: path,
    pub attributes: sattr,
}
SerializeStruct!(symlinkargs, from, to, attributes);
DeserializeStruct!(symlinkargs, from, to, attributes);

/// Arguments of READDIR.
#[derive(Clone, Debug, Default)]
pub struct readdirargs {
    pub dir: fhandle,
    pub cookie: nfscookie,
    /// Reply byte budget requested by the client. Decoded but not
    /// enforced; the full listing is always returned in one reply.
    pub count: u32,
}
SerializeStruct!(readdirargs, dir, cookie, count);
DeserializeStruct!(readdirargs, dir, cookie, count);

/// One entry of a READDIR reply. Entries form an XDR linked list: each
/// is preceded by a TRUE marker and the list ends with FALSE plus the
/// eof flag.
#[derive(Clone, Debug, Default)]
pub struct entry {
    pub fileid: u32,
    pub name: filename,
    pub cookie: nfscookie,
}
SerializeStruct!(entry, fileid, name, cookie);
DeserializeStruct!(entry, fileid, name, cookie);

/// Success body of the STATFS reply.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct statfsokres {
    /// Optimum transfer size in bytes.
    pub tsize: u32,
    /// Filesystem block size in bytes.
    pub bsize: u32,
    /// Total number of blocks.
    pub blocks: u32,
    /// Number of free blocks.
    pub bfree: u32,
    /// Free blocks available to non-privileged users.
    pub bavail: u32,
}
SerializeStruct!(statfsokres, tsize, bsize, blocks, bfree, bavail);
DeserializeStruct!(statfsokres, tsize, bsize, blocks, bfree, bavail);

/// Encodes a readdir cookie as the protocol's big-endian u32.
pub fn cookie_from_index(index: u32) -> nfscookie {
    index.to_be_bytes()
}

/// Decodes a readdir cookie back to its integer value.
pub fn cookie_to_index(cookie: &nfscookie) -> u32 {
    u32::from_be_bytes(*cookie)
}
