//! Implementation of the `GETATTR` procedure (procedure 1) for NFS
//! version 2 as defined in RFC 1094 section 2.2.2.
//!
//! Takes a file handle, returns the object's attributes. Clients call
//! this constantly to validate their caches, so the backend `getattr`
//! callback is expected to be cheap.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::attr::assemble_fattr;
use crate::handles::HandleRegistry;
use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_getattr(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let handle = match deserialize::<nfs2::fhandle>(input) {
        Ok(handle) => handle,
        Err(e) => {
            debug!("nfsproc_getattr: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_getattr({:?},{:?})", xid, HandleRegistry::parse(&handle));

    let resolved = match state.resolve(&handle) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    match guard(resolved.backend.getattr(&resolved.node)).await {
        Ok(attrs) => {
            let attributes = assemble_fattr(&attrs, resolved.file_id, resolved.fs_id);
            debug!(" {:?} --> {:?}", xid, attributes);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
            attributes.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_getattr error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
