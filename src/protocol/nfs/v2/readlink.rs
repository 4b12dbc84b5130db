//! Implementation of the `READLINK` procedure (procedure 5) for NFS
//! version 2 as defined in RFC 1094 section 2.2.6. Returns the target
//! path stored in a symbolic link.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::handles::HandleRegistry;
use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_readlink(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let handle = match deserialize::<nfs2::fhandle>(input) {
        Ok(handle) => handle,
        Err(e) => {
            debug!("nfsproc_readlink: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_readlink({:?},{:?})", xid, HandleRegistry::parse(&handle));

    let resolved = match state.resolve(&handle) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    match guard(resolved.backend.readlink(&resolved.node)).await {
        Ok(target) => {
            debug!(" {:?} --> {:?}", xid, target);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
            target.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_readlink error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
