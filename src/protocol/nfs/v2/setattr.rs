//! Implementation of the `SETATTR` procedure (procedure 2) for NFS
//! version 2 as defined in RFC 1094 section 2.2.3.
//!
//! Applies the requested attribute changes and returns the attributes
//! as they stand afterwards; sattr fields holding the all-ones sentinel
//! are left untouched by convention.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::attr::assemble_fattr;
use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_setattr(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::sattrargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_setattr: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_setattr({:?},{:?})", xid, args);

    let resolved = match state.resolve(&args.file) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    if let Err(e) = guard(resolved.backend.setattr(&resolved.node, &args.attributes)).await {
        error!("nfsproc_setattr error {:?} --> {}", xid, e);
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
            error!("nfsproc_setattr getattr error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
