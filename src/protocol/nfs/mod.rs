//! Protocol dispatchers for the three RPC programs the server speaks:
//!
//! - `v2`: the NFS version 2 protocol as specified in RFC 1094, one
//!   handler per procedure.
//!
//! - `mount`: the MOUNT version 1 protocol, which hands out the root
//!   file handle of an exported path and drives the backend
//!   mount/unmount lifecycle.
//!
//! - `nlm`: the KLM version 1 locking protocol, a thin layer over the
//!   byte-range lock table.

pub mod mount;
pub mod nlm;
pub mod v2;
