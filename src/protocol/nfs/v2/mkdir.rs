//! Implementation of the `MKDIR` procedure (procedure 14) for NFS
//! version 2 as defined in RFC 1094 section 2.2.15.
//!
//! Same reply shape as CREATE: handle plus attributes of the new
//! directory, with a post-creation attribute failure reported as the
//! operation's error.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::attr::assemble_fattr;
use crate::handles::HandleRegistry;
use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_mkdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::createargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_mkdir: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc_mkdir({:?},{:?})", xid, args.where_.name);

    let resolved = match state.resolve(&args.where_.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    let child = match guard(resolved.backend.mkdir(
        &resolved.node,
        &args.where_.name,
        &args.attributes,
    ))
    .await
    {
        Ok(child) => child,
        Err(e) => {
            error!("nfsproc_mkdir error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
            return Ok(());
        }
    };

    let file = state.handles.handle_for(&child, resolved.fs_id);
    let (file_id, _) = HandleRegistry::parse(&file);
    match guard(resolved.backend.getattr(&child)).await {
        Ok(attrs) => {
            let res = nfs2::diropok {
                file,
                attributes: assemble_fattr(&attrs, file_id, resolved.fs_id),
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs2::nfsstat::NFS_OK.serialize(output)?;
            res.serialize(output)?;
        }
        Err(e) => {
            error!("nfsproc_mkdir getattr error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
        }
    }
    Ok(())
}
