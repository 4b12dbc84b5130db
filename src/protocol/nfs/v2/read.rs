//! Implementation of the `READ` procedure (procedure 6) for NFS
//! version 2 as defined in RFC 1094 section 2.2.7.
//!
//! Reads up to `count` bytes at `offset`. The v2 reply carries the
//! file's attributes alongside the data, so a successful read is
//! followed by a `getattr`; if that fails the read is reported with the
//! attribute error.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::attr::assemble_fattr;
use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_read(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::readargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_read: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_read({:?},{:?})", xid, args);

    let resolved = match state.resolve(&args.file) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    let data = match guard(resolved.backend.read(
        &resolved.node,
        args.offset,
        args.count,
        args.totalcount,
    ))
    .await
    {
        Ok(data) => data,
        Err(e) => {
            error!("nfsproc_read error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
            return Ok(());
        }
    };

    match guard(resolved.backend.getattr(&resolved.node)).await {
        Ok(attrs) => {
            let attributes = assemble_fattr(&attrs, resolved.file_id, resolved.fs_id);
            debug!(" {:?} --> {} bytes", xid, data.len());
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
            attributes.serialize(output)?;
            data.as_slice().serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_read getattr error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
