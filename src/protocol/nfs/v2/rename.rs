//! Implementation of the `RENAME` procedure (procedure 11) for NFS
//! version 2 as defined in RFC 1094 section 2.2.12.
//!
//! Both directory handles must resolve to the same mounted filesystem;
//! a cross-filesystem rename is refused with `NFSERR_NODEV` before any
//! backend is consulted. Within one filesystem the backend performs the
//! move atomically.

use std::io::{Read, Write};

use tracing::{debug, error, warn};

use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_rename(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::renameargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_rename: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_rename({:?},{:?} -> {:?})", xid, args.from.name, args.to.name);

    let from = match state.resolve(&args.from.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };
    let to = match state.resolve(&args.to.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    if from.fs_id != to.fs_id {
        warn!("cross-filesystem rename refused, fs {} != fs {}", from.fs_id, to.fs_id);
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        nfs2::nfsstat::NFSERR_NODEV.serialize(output)?;
        return Ok(());
    }

    match guard(from.backend.rename(&from.node, &args.from.name, &to.node, &args.to.name)).await {
        Ok(()) => {
            debug!("rename success");
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_rename error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
