//! Implementation of the `LINK` procedure (procedure 12) for NFS
//! version 2 as defined in RFC 1094 section 2.2.13.
//!
//! Creates a hard link. Like RENAME, the source handle and target
//! directory must live on the same mounted filesystem; otherwise the
//! reply is `NFSERR_NODEV` and no backend runs.

use std::io::{Read, Write};

use tracing::{debug, error, warn};

use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_link(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::linkargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_link: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_link({:?},{:?})", xid, args.to.name);

    let from = match state.resolve(&args.from) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };
    let to_dir = match state.resolve(&args.to.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    if from.fs_id != to_dir.fs_id {
        warn!("cross-filesystem link refused, fs {} != fs {}", from.fs_id, to_dir.fs_id);
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        nfs2::nfsstat::NFSERR_NODEV.serialize(output)?;
        return Ok(());
    }

    match guard(from.backend.link(&from.node, &to_dir.node, &args.to.name)).await {
        Ok(()) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_link error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
