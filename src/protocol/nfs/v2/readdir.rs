//! Implementation of the `READDIR` procedure (procedure 16) for NFS
//! version 2 as defined in RFC 1094 section 2.2.17.
//!
//! The backend returns entry names only; each name is resolved with a
//! `lookup` to mint its file id. A name whose lookup fails disappears
//! from the listing instead of failing the whole reply, so a directory
//! mutating under the listing degrades gracefully.
//!
//! Cookies number the backend's listing from 1, skipped names included,
//! and the incoming cookie is decoded but not used for resumption: the
//! entire listing is returned in one reply with eof set. The client's
//! byte budget (`count`) is likewise not enforced; splitting oversized
//! replies is left to the transport.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::handles::HandleRegistry;
use crate::protocol::xdr::{self, deserialize, nfs2, Serialize};
use crate::server::{guard, ServerState};

pub async fn nfsproc_readdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nfs2::readdirargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("nfsproc_readdir: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!(
        "nfsproc_readdir({:?}, cookie {}, count {})",
        xid,
        nfs2::cookie_to_index(&args.cookie),
        args.count
    );

    let resolved = match state.resolve(&args.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    let names = match guard(resolved.backend.readdir(&resolved.node, args.count)).await {
        Ok(names) => names,
        Err(e) => {
            error!("nfsproc_readdir error {:?} --> {}", xid, e);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            e.nfs_stat().serialize(output)?;
            return Ok(());
        }
    };

    let mut entries = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let child = match guard(resolved.backend.lookup(&resolved.node, name)).await {
            Ok(child) => child,
            Err(e) => {
                debug!("  -- skipping {:?}: {}", name, e);
                continue;
            }
        };
        let fh = state.handles.handle_for(&child, resolved.fs_id);
        let (file_id, _) = HandleRegistry::parse(&fh);
        entries.push(nfs2::entry {
            fileid: file_id,
            name: name.clone(),
            cookie: nfs2::cookie_from_index(index as u32 + 1),
        });
    }
    debug!(" {:?} --> {} entries", xid, entries.len());

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs2::nfsstat::NFS_OK.serialize(output)?;
    for entry in &entries {
        true.serialize(output)?;
        entry.serialize(output)?;
    }
    false.serialize(output)?;
    // The full listing always fits in one reply.
    true.serialize(output)?;
    Ok(())
}
