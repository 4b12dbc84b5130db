//! Implementation of the `SYMLINK` procedure (procedure 13) for NFS
//! version 2 as defined in RFC 1094 section 2.2.14.
//!
//! Creates a symbolic link. Unlike CREATE and MKDIR the v2 reply is a
//! bare status: the client is expected to LOOKUP the link if it wants
//! the handle.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_symlink(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::symlinkargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_symlink: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_symlink({:?},{:?} -> {:?})", xid, args.from.name, args.to);

    let resolved = match state.resolve(&args.from.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    match guard(resolved.backend.symlink(
        &resolved.node,
        &args.from.name,
        &args.to,
        &args.attributes,
    ))
    .await
    {
        Ok(()) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_symlink error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
