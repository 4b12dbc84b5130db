//! XDR data structures for the Kernel Lock Manager protocol (KLM
//! version 1), the locking companion of NFSv2.
//!
//! KLM carries byte-range lock requests keyed by the NFS file handle.
//! The handle travels as a counted opaque (`netobj`) rather than the
//! fixed 32-byte form used by the NFS program; the lock manager treats
//! it as an uninterpreted key.

// Allow unused code since the full protocol surface is defined here
#![allow(dead_code)]
// Preserve original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::{Deserialize, DeserializeEnum, Serialize, SerializeEnum};
use super::{DeserializeStruct, SerializeStruct};

/// The RPC program number for the KLM service.
pub const PROGRAM: u32 = 100020;
/// KLM protocol version 1.
pub const VERSION: u32 = 1;

/// Maximum bytes in the server name string.
pub const LM_MAXSTRLEN: u32 = 1024;

/// Procedure numbers for KLM version 1.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum KlmProgram {
    KLM_NULL = 0,
    KLM_TEST = 1,
    KLM_LOCK = 2,
    KLM_CANCEL = 3,
    KLM_UNLOCK = 4,
    INVALID = 5,
}

/// Status codes returned by lock operations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum klm_stats {
    /// The request succeeded (or, for TEST, no conflicting lock exists).
    #[default]
    klm_granted = 0,
    /// A conflicting lock is held by another owner.
    klm_denied = 1,
    /// An UNLOCK found no matching lock to release.
    klm_denied_nolock = 2,
    /// A blocking request is queued; never emitted by this server.
    klm_working = 3,
}
impl SerializeEnum for klm_stats {}
impl DeserializeEnum for klm_stats {}

/// The lock description every KLM procedure carries: which handle, which
/// owner (the client process id), and which byte range.
#[derive(Clone, Debug, Default)]
pub struct klm_lock {
    /// Name of the host the caller believes holds the file; ignored.
    pub server_name: Vec<u8>,
    /// The file handle, as a counted opaque the lock manager never decodes.
    pub fh: Vec<u8>,
    /// Lock owner identity, conventionally the client process id.
    pub pid: i32,
    pub l_offset: u32,
    pub l_len: u32,
}
SerializeStruct!(klm_lock, server_name, fh, pid, l_offset, l_len);
DeserializeStruct!(klm_lock, server_name, fh, pid, l_offset, l_len);

/// The holder of a conflicting lock, reported by a denied TEST.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct klm_holder {
    pub exclusive: bool,
    /// Owner identity of the conflicting lock.
    pub svid: i32,
    pub l_offset: u32,
    pub l_len: u32,
}
SerializeStruct!(klm_holder, exclusive, svid, l_offset, l_len);
DeserializeStruct!(klm_holder, exclusive, svid, l_offset, l_len);

/// Arguments of KLM_TEST.
#[derive(Clone, Debug, Default)]
pub struct klm_testargs {
    pub exclusive: bool,
    pub alock: klm_lock,
}
SerializeStruct!(klm_testargs, exclusive, alock);
DeserializeStruct!(klm_testargs, exclusive, alock);

/// Arguments of KLM_LOCK.
#[derive(Clone, Debug, Default)]
pub struct klm_lockargs {
    /// Whether the caller is willing to wait. Accepted but never
    /// honored; denials are immediate.
    pub block: bool,
    pub exclusive: bool,
    pub alock: klm_lock,
}
SerializeStruct!(klm_lockargs, block, exclusive, alock);
DeserializeStruct!(klm_lockargs, block, exclusive, alock);

/// Arguments of KLM_UNLOCK and KLM_CANCEL.
#[derive(Clone, Debug, Default)]
pub struct klm_unlockargs {
    pub alock: klm_lock,
}
SerializeStruct!(klm_unlockargs, alock);
DeserializeStruct!(klm_unlockargs, alock);

/// Reply of KLM_TEST: the status, and for a denial the conflicting
/// holder.
#[derive(Clone, Debug, Default)]
pub struct klm_testrply {
    pub stat: klm_stats,
    pub holder: Option<klm_holder>,
}

impl Serialize for klm_testrply {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.stat.serialize(dest)?;
        if let Some(holder) = &self.holder {
            holder.serialize(dest)?;
        }

        Ok(())
    }
}

impl Deserialize for klm_testrply {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.stat.deserialize(src)?;
        self.holder = if self.stat == klm_stats::klm_denied {
            let mut holder = klm_holder::default();
            holder.deserialize(src)?;
            Some(holder)
        } else {
            None
        };

        Ok(())
    }
}
