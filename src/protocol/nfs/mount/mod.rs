//! MOUNT protocol version 1 implementation as specified in RFC 1094
//! Appendix A.
//!
//! MOUNT is where the backend lifecycle happens: `mnt` brings an export
//! up (running the backend factory's `init` on first mount) and hands
//! the client the root file handle, `umnt`/`umntall` tear instances
//! down, and `export` lists the configured export paths. DUMP is not
//! provided and answers as an unavailable procedure.

use std::io::{Read, Write};

use num_traits::cast::FromPrimitive;
use tracing::debug;

use crate::protocol::xdr::{self, mount, Serialize};
use crate::server::ServerState;

mod export;
mod mnt;
mod null;
mod umnt;
mod umnt_all;

use export::mountproc_export;
use mnt::mountproc_mnt;
use null::mountproc_null;
use umnt::mountproc_umnt;
use umnt_all::mountproc_umnt_all;

/// Routes a MOUNT v1 call to its procedure handler.
pub async fn handle_mount(
    xid: u32,
    call: xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let prog = mount::MountProgram::from_u32(call.proc).unwrap_or(mount::MountProgram::INVALID);
    if state.debug_enabled() {
        debug!("MOUNT request {:?}, xid {}", prog, xid);
    }

    match prog {
        mount::MountProgram::MOUNTPROC_NULL => mountproc_null(xid, output)?,
        mount::MountProgram::MOUNTPROC_MNT => mountproc_mnt(xid, input, output, state).await?,
        mount::MountProgram::MOUNTPROC_UMNT => mountproc_umnt(xid, input, output, state).await?,
        mount::MountProgram::MOUNTPROC_UMNTALL => {
            mountproc_umnt_all(xid, output, state).await?
        }
        mount::MountProgram::MOUNTPROC_EXPORT => mountproc_export(xid, output, state)?,
        _ => {
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}
