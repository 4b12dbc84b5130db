//! Implementation of the `WRITE` procedure (procedure 8) for NFS
//! version 2 as defined in RFC 1094 section 2.2.9.
//!
//! Writes the data at `offset` and returns the file's attributes
//! afterwards. `beginoffset` and `totalcount` are transfer hints from
//! the days of the obsolete write cache; they are decoded and handed to
//! the backend untouched.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::attr::assemble_fattr;
use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_write(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::writeargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_write: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_write({:?}, offset {}, {} bytes)", xid, args.offset, args.data.len());

    let resolved = match state.resolve(&args.file) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    if let Err(e) = guard(resolved.backend.write(
        &resolved.node,
        args.beginoffset,
        args.offset,
        args.totalcount,
        &args.data,
    ))
    .await
    {
        error!("nfsproc_write error {:?} --> {}", xid, e);
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        e.nfs_stat().serialize(output)?;
        return Ok(());
    }

    match guard(resolved.backend.getattr(&resolved.node)).await {
        Ok(attrs) => {
            let attributes = assemble_fattr(&attrs, resolved.file_id, resolved.fs_id);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
            attributes.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_write getattr error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
