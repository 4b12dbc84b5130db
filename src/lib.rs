//! nfs2serve - an NFS version 2 (RFC 1094) server library in Rust
//!
//! This library implements the server side of the classic NFS protocol
//! suite: the NFS version 2 program itself, the MOUNT version 1 program
//! that hands out root file handles, and the KLM version 1 program for
//! advisory byte-range locks. All three are served over UDP, on the
//! standard ports shifted up by 20000 so the server runs unprivileged.
//!
//! ## Main Components
//!
//! - `vfs`: the backend contract. Implement [`vfs::Backend`] (and a
//!   [`vfs::BackendFactory`] to create instances at mount time) to
//!   export any tree-shaped thing over NFS.
//!
//! - `udp`: the transport. [`udp::Nfs2Server`] binds the sockets and
//!   runs the dispatcher; [`udp::RunningServer`] is the administrative
//!   handle (add mount points, toggle debug tracing, shut down).
//!
//! - `server`: the process-wide state and the serial dispatch core.
//!
//! - `handles`, `locks`, `registry`, `mounts`: the file-handle
//!   registry, byte-range lock table, backend registry, and mount
//!   table.
//!
//! - `attr`: assembly of wire attribute records from backend attribute
//!   lists, and translation of backend errors to NFS status codes.
//!
//! - `protocol`: XDR codecs and the per-procedure protocol handlers.
//!
//! ## Standards Compliance
//!
//! - RFC 1094: NFS Version 2 Protocol Specification (including the
//!   MOUNT protocol appendix)
//! - RFC 5531: RPC: Remote Procedure Call Protocol Specification
//!   Version 2 (obsoletes RFC 1831)
//! - RFC 1014: XDR: External Data Representation Standard
//!
//! ## Usage
//!
//! Implement the [`vfs::Backend`] trait, register a factory for it with
//! an export path on an [`udp::Nfs2Server`], and call `serve`. Clients
//! mount the path through the MOUNT program and receive 32-byte opaque
//! handles minted by the server's handle registry; every subsequent NFS
//! request resolves through that registry to your backend.

pub mod attr;
pub mod handles;
pub mod locks;
pub mod mounts;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod udp;
pub mod vfs;

pub use protocol::xdr;
