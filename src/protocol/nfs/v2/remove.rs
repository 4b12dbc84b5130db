//! Implementation of the `REMOVE` procedure (procedure 10) for NFS
//! version 2 as defined in RFC 1094 section 2.2.11. Deletes a
//! non-directory entry; the reply is a bare status.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_remove(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::diropargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_remove: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_remove({:?},{:?})", xid, args.name);

    let resolved = match state.resolve(&args.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    match guard(resolved.backend.remove(&resolved.node, &args.name)).await {
        Ok(()) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_remove error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
