//! XDR data structures for the MOUNT protocol version 1 (RFC 1094
//! Appendix A).
//!
//! MOUNT is the companion program that hands out the initial file handle
//! for an exported path; everything after that first handle travels over
//! the NFS program proper.

// Allow unused code since the full protocol surface is defined here
#![allow(dead_code)]
// Preserve original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::nfs2::fhandle;
use super::{Deserialize, Serialize};
use super::{DeserializeStruct, SerializeStruct};

/// The RPC program number for the MOUNT service.
pub const PROGRAM: u32 = 100005;
/// MOUNT protocol version 1, the revision paired with NFSv2.
pub const VERSION: u32 = 1;

/// Maximum bytes in a directory path argument.
pub const MNTPATHLEN: u32 = 1024;
/// Maximum bytes in a name argument.
pub const MNTNAMLEN: u32 = 255;

/// Directory path on the server, as raw bytes.
pub type dirpath = Vec<u8>;
/// Group name in an export list entry.
pub type name = Vec<u8>;

/// Procedure numbers for MOUNT version 1.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum MountProgram {
    MOUNTPROC_NULL = 0,
    MOUNTPROC_MNT = 1,
    MOUNTPROC_DUMP = 2,
    MOUNTPROC_UMNT = 3,
    MOUNTPROC_UMNTALL = 4,
    MOUNTPROC_EXPORT = 5,
    INVALID = 6,
}

/// Reply of the MNT procedure: a numeric status followed, on success,
/// by the root file handle of the mounted filesystem. Any nonzero status
/// reports failure; this server only ever emits 0 or 1.
#[derive(Clone, Debug, Default)]
pub struct fhstatus {
    pub status: u32,
    pub fhandle: Option<fhandle>,
}

impl Serialize for fhstatus {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.status.serialize(dest)?;
        if let Some(fh) = &self.fhandle {
            fh.serialize(dest)?;
        }

        Ok(())
    }
}

impl Deserialize for fhstatus {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.status.deserialize(src)?;
        self.fhandle = if self.status == 0 {
            let mut fh: fhandle = Default::default();
            fh.deserialize(src)?;
            Some(fh)
        } else {
            None
        };

        Ok(())
    }
}

/// One node of the EXPORT reply list. `groups` is an XDR linked list of
/// group names; this server always exports to everyone and leaves it
/// empty.
#[derive(Clone, Debug, Default)]
pub struct exportlist {
    pub filesys: dirpath,
    pub groups: Box<Option<grouplist>>,
    pub next: Box<Option<exportlist>>,
}
SerializeStruct!(exportlist, filesys, groups, next);
DeserializeStruct!(exportlist, filesys, groups, next);

/// One node of a group list.
#[derive(Clone, Debug, Default)]
pub struct grouplist {
    pub grname: name,
    pub next: Box<Option<grouplist>>,
}
SerializeStruct!(grouplist, grname, next);
DeserializeStruct!(grouplist, grname, next);
