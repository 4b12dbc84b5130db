//! RPC (Remote Procedure Call) request handling as specified in RFC 5531
//! (previously RFC 1057).
//!
//! Over UDP every datagram is one RPC record, so there is no framing
//! layer here: [`handle_rpc`] decodes the message, validates the RPC
//! version, accepts AUTH_SYS credentials as-is, suppresses retransmitted
//! requests, and routes the call to the NFS, MOUNT, or KLM program
//! handler. The reply, if any, is whatever those handlers wrote to the
//! output stream.

use std::io::{Cursor, Read, Write};

use anyhow::anyhow;
use tracing::{debug, error, trace, warn};

use crate::protocol::xdr::{self, deserialize, mount, nfs2, nlm, Serialize};
use crate::protocol::nfs;
use crate::server::ServerState;

mod retransmissions;

pub use retransmissions::RetransmissionCache;

/// Processes a single RPC message against the server state.
///
/// Returns `Ok(true)` when a reply was written, `Ok(false)` when the
/// message was a retransmission and must not be answered again, and an
/// error when the input could not be decoded at all.
pub async fn handle_rpc(
    input: &mut impl Read,
    output: &mut impl Write,
    peer: &str,
    state: &mut ServerState,
) -> Result<bool, anyhow::Error> {
    let recv = deserialize::<xdr::rpc::rpc_msg>(input)?;
    let xid = recv.xid;
    let xdr::rpc::rpc_body::CALL(call) = recv.body else {
        error!("unexpectedly received a Reply instead of a Call");
        return Err(anyhow!("bad RPC call format"));
    };

    if call.rpcvers != 2 {
        warn!("invalid RPC version {} != 2", call.rpcvers);
        xdr::rpc::rpc_vers_mismatch(xid).serialize(output)?;
        return Ok(true);
    }

    if let xdr::rpc::auth_flavor::AUTH_UNIX = call.cred.flavor {
        // AUTH_SYS is accepted and passed through without enforcement.
        match deserialize::<xdr::rpc::auth_unix>(&mut Cursor::new(&call.cred.body)) {
            Ok(auth) => trace!(
                "auth_unix from {}: machine {:?} uid {} gid {}",
                peer,
                String::from_utf8_lossy(&auth.machinename),
                auth.uid,
                auth.gid
            ),
            Err(e) => debug!("undecodable auth_unix credentials from {}: {:?}", peer, e),
        }
    }

    if state.retransmissions.observe(xid, peer) {
        debug!("retransmission detected, xid {} from {}", xid, peer);
        return Ok(false);
    }

    match call.prog {
        nfs2::PROGRAM => {
            if call.vers == nfs2::VERSION {
                nfs::v2::handle_nfs(xid, call, input, output, state).await?;
            } else {
                warn!("unsupported NFS version {} (supported {})", call.vers, nfs2::VERSION);
                xdr::rpc::prog_mismatch_reply_message(xid, nfs2::VERSION).serialize(output)?;
            }
        }
        mount::PROGRAM => {
            if call.vers == mount::VERSION {
                nfs::mount::handle_mount(xid, call, input, output, state).await?;
            } else {
                warn!("unsupported MOUNT version {} (supported {})", call.vers, mount::VERSION);
                xdr::rpc::prog_mismatch_reply_message(xid, mount::VERSION).serialize(output)?;
            }
        }
        nlm::PROGRAM => {
            if call.vers == nlm::VERSION {
                nfs::nlm::handle_klm(xid, call, input, output, state)?;
            } else {
                warn!("unsupported KLM version {} (supported {})", call.vers, nlm::VERSION);
                xdr::rpc::prog_mismatch_reply_message(xid, nlm::VERSION).serialize(output)?;
            }
        }
        unknown => {
            warn!("unknown RPC program number {}", unknown);
            xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
        }
    }

    Ok(true)
}
