//! KLM protocol version 1 implementation: byte-range lock service for
//! NFSv2 clients.
//!
//! The handlers are a thin layer over the lock table. The file handle in
//! the arguments is deliberately never resolved through the handle
//! registry; its raw bytes are the lock key, so clients can still
//! release locks taken against handles that have since gone stale (an
//! unlock that matches nothing reports `klm_denied_nolock`, never an
//! error).

use std::io::{Read, Write};

use num_traits::cast::FromPrimitive;
use tracing::debug;

use crate::protocol::xdr::{self, nlm, Serialize};
use crate::server::ServerState;

mod cancel;
mod lock;
mod unlock;

use cancel::klmproc_cancel;
use lock::klmproc_lock;
use test::klmproc_test;
use unlock::klmproc_unlock;

/// Routes a KLM v1 call to its procedure handler.
///
/// Lock operations never suspend (the lock table is plain memory), so
/// unlike the NFS and MOUNT paths this dispatcher is synchronous.
pub fn handle_klm(
    xid: u32,
    call: xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let prog = nlm::KlmProgram::from_u32(call.proc).unwrap_or(nlm::KlmProgram::INVALID);
    if state.debug_enabled() {
        debug!("KLM request {:?}, xid {}", prog, xid);
    }

    match prog {
        nlm::KlmProgram::KLM_NULL => {
            debug!("klmproc_null({:?})", xid);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
        }
        nlm::KlmProgram::KLM_TEST => klmproc_test(xid, input, output, state)?,
        nlm::KlmProgram::KLM_LOCK => klmproc_lock(xid, input, output, state)?,
        nlm::KlmProgram::KLM_CANCEL => klmproc_cancel(xid, input, output, state)?,
        nlm::KlmProgram::KLM_UNLOCK => klmproc_unlock(xid, input, output, state)?,
        nlm::KlmProgram::INVALID => {
            debug!("unimplemented KLM procedure {}", call.proc);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}
