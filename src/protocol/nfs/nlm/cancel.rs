//! Implementation of the KLM_CANCEL procedure (procedure 3).
//!
//! Cancels a pending blocking lock request. Since this server never
//! queues blocking requests there is nothing to cancel; the call is
//! acknowledged as granted without touching the table.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::xdr::{self, deserialize, nlm, Serialize};
use crate::server::ServerState;

pub fn klmproc_cancel(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nlm::klm_lockargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("klmproc_cancel: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    let alock = &args.alock;
    debug!("klmproc_cancel({:?}, pid {}, [{}, +{}])", xid, alock.pid, alock.l_offset, alock.l_len);

    state.locks.cancel(&alock.fh, alock.pid, alock.l_offset, alock.l_len);

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nlm::klm_stats::klm_granted.serialize(output)?;
    Ok(())
}
