//! NFSv2 (Network File System version 2) protocol implementation as
//! specified in RFC 1094.
//!
//! Each procedure lives in its own module and is routed here by
//! [`handle_nfs`]. The shape of every handler is the same: decode the
//! XDR arguments, resolve the file handles against the registries
//! (unresolvable handles answer `NFSERR_STALE` without touching a
//! backend), run the backend callback behind the crash barrier, and
//! serialize the status plus the success body.
//!
//! Two procedure numbers in the protocol, ROOT (3) and WRITECACHE (7),
//! were already obsolete when RFC 1094 was published; they are answered
//! as unavailable procedures, as is anything out of range.

use std::io::{Read, Write};

use num_traits::cast::FromPrimitive;
use tracing::{debug, trace, warn};

use crate::protocol::xdr::{self, nfs2, Serialize};
use crate::server::ServerState;

mod create;
mod getattr;
mod link;
mod lookup;
mod mkdir;
mod null;
mod read;
mod readdir;
mod readlink;
mod remove;
mod rename;
mod rmdir;
mod setattr;
mod statfs;
mod symlink;
mod write;

use create::nfsproc_create;
use getattr::nfsproc_getattr;
use link::nfsproc_link;
use lookup::nfsproc_lookup;
use mkdir::nfsproc_mkdir;
use null::nfsproc_null;
use read::nfsproc_read;
use readdir::nfsproc_readdir;
use readlink::nfsproc_readlink;
use remove::nfsproc_remove;
use rename::nfsproc_rename;
use rmdir::nfsproc_rmdir;
use setattr::nfsproc_setattr;
use statfs::nfsproc_statfs;
use symlink::nfsproc_symlink;
use write::nfsproc_write;

/// Routes an NFSv2 call to its procedure handler.
///
/// The RPC layer has already validated the program and version numbers;
/// anything left unroutable here is a procedure-level problem and gets a
/// PROC_UNAVAIL reply.
pub async fn handle_nfs(
    xid: u32,
    call: xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let prog = nfs2::NFSProgram::from_u32(call.proc).unwrap_or(nfs2::NFSProgram::INVALID);
    if state.debug_enabled() {
        debug!("NFS request {:?}, xid {}", prog, xid);
    }

    match prog {
        nfs2::NFSProgram::NFSPROC_NULL => nfsproc_null(xid, output)?,
        nfs2::NFSProgram::NFSPROC_GETATTR => nfsproc_getattr(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_SETATTR => nfsproc_setattr(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_LOOKUP => nfsproc_lookup(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_READLINK => nfsproc_readlink(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_READ => nfsproc_read(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_WRITE => nfsproc_write(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_CREATE => nfsproc_create(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_REMOVE => nfsproc_remove(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_RENAME => nfsproc_rename(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_LINK => nfsproc_link(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_SYMLINK => nfsproc_symlink(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_MKDIR => nfsproc_mkdir(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_RMDIR => nfsproc_rmdir(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_READDIR => nfsproc_readdir(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_STATFS => nfsproc_statfs(xid, input, output, state).await?,
        nfs2::NFSProgram::NFSPROC_ROOT | nfs2::NFSProgram::NFSPROC_WRITECACHE => {
            trace!("obsolete procedure {:?}", prog);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
        nfs2::NFSProgram::INVALID => {
            warn!("unimplemented procedure {}", call.proc);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}
