//! Protocol module: the NFSv2 suite this server speaks.
//!
//! Three submodules:
//!
//! - `xdr`: External Data Representation (RFC 1014) codecs and the wire
//!   structures of the RPC, NFS v2, MOUNT v1, and KLM v1 protocols.
//!
//! - `nfs`: the procedure handlers for the three programs, one file per
//!   procedure.
//!
//! - `rpc`: the RPC v2 (RFC 5531) entry point that decodes messages,
//!   filters retransmissions, and routes calls to the right program.

pub mod nfs;
pub mod rpc;
pub mod xdr;
