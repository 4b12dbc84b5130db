//! RPC version 2 message structures as defined in RFC 5531 (previously
//! RFC 1057).
//!
//! Every NFS, MOUNT, and KLM exchange is wrapped in an `rpc_msg`: a
//! transaction id followed by a discriminated call or reply body. The
//! server only ever decodes calls and encodes replies; the reply
//! constructors at the bottom of this module cover every accepted and
//! rejected reply shape the dispatcher emits.

// Keep original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]
#![allow(clippy::upper_case_acronyms)]

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::cast::FromPrimitive;

use super::utils::invalid_data;
use super::{deserialize, Deserialize, DeserializeEnum, Serialize, SerializeEnum};
use super::{DeserializeStruct, SerializeStruct};

/// Authentication flavors carried in `opaque_auth`.
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum auth_flavor {
    AUTH_NULL = 0,
    /// UNIX-style credentials (also known as AUTH_SYS).
    AUTH_UNIX = 1,
    AUTH_SHORT = 2,
    AUTH_DES = 3,
}
impl SerializeEnum for auth_flavor {}
impl DeserializeEnum for auth_flavor {}

/// AUTH_SYS credential body: machine name plus uid/gid identity.
///
/// The server accepts these as-is; they are decoded for tracing and
/// otherwise passed through without enforcement.
#[derive(Clone, Debug, Default)]
pub struct auth_unix {
    pub stamp: u32,
    pub machinename: Vec<u8>,
    pub uid: u32,
    pub gid: u32,
    pub gids: Vec<u32>,
}
SerializeStruct!(auth_unix, stamp, machinename, uid, gid, gids);
DeserializeStruct!(auth_unix, stamp, machinename, uid, gid, gids);

/// An authentication field: flavor discriminant plus opaque body.
#[derive(Clone, Debug)]
pub struct opaque_auth {
    pub flavor: auth_flavor,
    pub body: Vec<u8>,
}
SerializeStruct!(opaque_auth, flavor, body);
DeserializeStruct!(opaque_auth, flavor, body);

impl Default for opaque_auth {
    fn default() -> opaque_auth {
        opaque_auth { flavor: auth_flavor::AUTH_NULL, body: Vec::new() }
    }
}

/// Authentication failure reasons for MSG_DENIED/AUTH_ERROR replies.
#[derive(Copy, Clone, Debug, Default, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum auth_stat {
    #[default]
    AUTH_BADCRED = 1,
    AUTH_REJECTEDCRED = 2,
    AUTH_BADVERF = 3,
    AUTH_REJECTEDVERF = 4,
    AUTH_TOOWEAK = 5,
}
impl SerializeEnum for auth_stat {}
impl DeserializeEnum for auth_stat {}

/// An RPC message: transaction id plus a call or reply body.
///
/// The xid ties replies to the calls that produced them and lets the
/// server spot retransmitted requests; it carries no ordering meaning.
#[derive(Clone, Debug, Default)]
pub struct rpc_msg {
    pub xid: u32,
    pub body: rpc_body,
}
SerializeStruct!(rpc_msg, xid, body);
DeserializeStruct!(rpc_msg, xid, body);

#[derive(Clone, Debug)]
#[repr(u32)]
pub enum rpc_body {
    CALL(call_body),
    REPLY(reply_body),
}

impl Default for rpc_body {
    fn default() -> rpc_body {
        rpc_body::CALL(call_body::default())
    }
}

impl Serialize for rpc_body {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            rpc_body::CALL(v) => {
                0_u32.serialize(dest)?;
                v.serialize(dest)?;
            }
            rpc_body::REPLY(v) => {
                1_u32.serialize(dest)?;
                v.serialize(dest)?;
            }
        }
        Ok(())
    }
}

impl Deserialize for rpc_body {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = rpc_body::CALL(deserialize(src)?),
            1 => *self = rpc_body::REPLY(deserialize(src)?),
            c => return Err(invalid_data(&format!("invalid rpc_body discriminant {c}"))),
        }

        Ok(())
    }
}

/// The body of an RPC call. Procedure-specific arguments follow this
/// header on the wire.
#[derive(Clone, Debug, Default)]
pub struct call_body {
    /// RPC protocol version, always 2.
    pub rpcvers: u32,
    pub prog: u32,
    pub vers: u32,
    pub proc: u32,
    pub cred: opaque_auth,
    pub verf: opaque_auth,
}
SerializeStruct!(call_body, rpcvers, prog, vers, proc, cred, verf);
DeserializeStruct!(call_body, rpcvers, prog, vers, proc, cred, verf);

#[derive(Clone, Debug)]
pub enum reply_body {
    MSG_ACCEPTED(accepted_reply),
    MSG_DENIED(rejected_reply),
}

impl Default for reply_body {
    fn default() -> reply_body {
        reply_body::MSG_ACCEPTED(accepted_reply::default())
    }
}

impl Serialize for reply_body {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            reply_body::MSG_ACCEPTED(v) => {
                0_u32.serialize(dest)?;
                v.serialize(dest)?;
            }
            reply_body::MSG_DENIED(v) => {
                1_u32.serialize(dest)?;
                v.serialize(dest)?;
            }
        }
        Ok(())
    }
}

impl Deserialize for reply_body {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = reply_body::MSG_ACCEPTED(deserialize(src)?),
            1 => *self = reply_body::MSG_DENIED(deserialize(src)?),
            c => return Err(invalid_data(&format!("invalid reply_body discriminant {c}"))),
        }

        Ok(())
    }
}

/// Supported version range reported on PROG_MISMATCH and RPC_MISMATCH.
#[derive(Clone, Debug, Default)]
pub struct mismatch_info {
    pub low: u32,
    pub high: u32,
}
SerializeStruct!(mismatch_info, low, high);
DeserializeStruct!(mismatch_info, low, high);

/// An accepted reply. Acceptance does not imply success; the nested
/// `accept_body` distinguishes SUCCESS from the program-level failures.
#[derive(Clone, Debug, Default)]
pub struct accepted_reply {
    pub verf: opaque_auth,
    pub reply_data: accept_body,
}
SerializeStruct!(accepted_reply, verf, reply_data);
DeserializeStruct!(accepted_reply, verf, reply_data);

#[derive(Clone, Debug, Default)]
#[repr(u32)]
pub enum accept_body {
    /// Procedure-specific results follow this discriminant on the wire.
    #[default]
    SUCCESS,
    PROG_UNAVAIL,
    PROG_MISMATCH(mismatch_info),
    PROC_UNAVAIL,
    GARBAGE_ARGS,
}

impl Serialize for accept_body {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            accept_body::SUCCESS => 0_u32.serialize(dest)?,
            accept_body::PROG_UNAVAIL => 1_u32.serialize(dest)?,
            accept_body::PROG_MISMATCH(v) => {
                2_u32.serialize(dest)?;
                v.serialize(dest)?;
            }
            accept_body::PROC_UNAVAIL => 3_u32.serialize(dest)?,
            accept_body::GARBAGE_ARGS => 4_u32.serialize(dest)?,
        }

        Ok(())
    }
}

impl Deserialize for accept_body {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = accept_body::SUCCESS,
            1 => *self = accept_body::PROG_UNAVAIL,
            2 => *self = accept_body::PROG_MISMATCH(deserialize(src)?),
            3 => *self = accept_body::PROC_UNAVAIL,
            4 => *self = accept_body::GARBAGE_ARGS,
            c => return Err(invalid_data(&format!("invalid accept_body discriminant {c}"))),
        }

        Ok(())
    }
}

/// A rejected reply: either the RPC version was wrong or authentication
/// failed.
#[derive(Clone, Debug)]
pub enum rejected_reply {
    RPC_MISMATCH(mismatch_info),
    AUTH_ERROR(auth_stat),
}

impl Default for rejected_reply {
    fn default() -> rejected_reply {
        rejected_reply::AUTH_ERROR(auth_stat::default())
    }
}

impl Serialize for rejected_reply {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            rejected_reply::RPC_MISMATCH(v) => {
                0_u32.serialize(dest)?;
                v.serialize(dest)?;
            }
            rejected_reply::AUTH_ERROR(v) => {
                1_u32.serialize(dest)?;
                v.serialize(dest)?;
            }
        }

        Ok(())
    }
}

impl Deserialize for rejected_reply {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = rejected_reply::RPC_MISMATCH(deserialize(src)?),
            1 => {
                let a = deserialize::<u32>(src)?;
                *self = rejected_reply::AUTH_ERROR(
                    FromPrimitive::from_u32(a).unwrap_or(auth_stat::AUTH_BADCRED),
                );
            }
            c => return Err(invalid_data(&format!("invalid rejected_reply discriminant {c}"))),
        }

        Ok(())
    }
}

/// Accepted SUCCESS reply; procedure results are appended by the caller.
pub fn make_success_reply(xid: u32) -> rpc_msg {
    accepted(xid, accept_body::SUCCESS)
}

/// Reply for a procedure number the program does not implement.
pub fn proc_unavail_reply_message(xid: u32) -> rpc_msg {
    accepted(xid, accept_body::PROC_UNAVAIL)
}

/// Reply for a program number this server does not serve.
pub fn prog_unavail_reply_message(xid: u32) -> rpc_msg {
    accepted(xid, accept_body::PROG_UNAVAIL)
}

/// Reply for a known program called with an unsupported version.
pub fn prog_mismatch_reply_message(xid: u32, accepted_ver: u32) -> rpc_msg {
    accepted(
        xid,
        accept_body::PROG_MISMATCH(mismatch_info { low: accepted_ver, high: accepted_ver }),
    )
}

/// Reply for argument bodies that failed to decode.
pub fn garbage_args_reply_message(xid: u32) -> rpc_msg {
    accepted(xid, accept_body::GARBAGE_ARGS)
}

/// Denied reply for calls that are not RPC version 2.
pub fn rpc_vers_mismatch(xid: u32) -> rpc_msg {
    let reply = reply_body::MSG_DENIED(rejected_reply::RPC_MISMATCH(mismatch_info {
        low: 2,
        high: 2,
    }));
    rpc_msg { xid, body: rpc_body::REPLY(reply) }
}

fn accepted(xid: u32, reply_data: accept_body) -> rpc_msg {
    let reply = reply_body::MSG_ACCEPTED(accepted_reply {
        verf: opaque_auth::default(),
        reply_data,
    });
    rpc_msg { xid, body: rpc_body::REPLY(reply) }
}
