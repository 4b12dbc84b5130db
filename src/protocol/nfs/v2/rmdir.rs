//! Implementation of the `RMDIR` procedure (procedure 15) for NFS
//! version 2 as defined in RFC 1094 section 2.2.16. Removes an empty
//! directory; the reply is a bare status.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_rmdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::diropargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_rmdir: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_rmdir({:?},{:?})", xid, args.name);

    let resolved = match state.resolve(&args.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    match guard(resolved.backend.rmdir(&resolved.node, &args.name)).await {
        Ok(()) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_rmdir error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
