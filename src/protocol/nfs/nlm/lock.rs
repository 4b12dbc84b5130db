//! Implementation of the KLM_LOCK procedure (procedure 2).
//!
//! Takes a shared or exclusive byte-range lock. The `block` flag is
//! decoded but blocking is not implemented: a conflicting request is
//! denied immediately rather than queued, and the client is expected to
//! retry.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::xdr::{self, deserialize, nlm, Serialize};
use crate::server::ServerState;

pub fn klmproc_lock(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nlm::klm_lockargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("klmproc_lock: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    let alock = &args.alock;
    debug!(
        "klmproc_lock({:?}, pid {}, excl {}, block {}, [{}, +{}])",
        xid, alock.pid, args.exclusive, args.block, alock.l_offset, alock.l_len
    );

    let granted =
        state.locks.lock(&alock.fh, alock.pid, args.exclusive, alock.l_offset, alock.l_len);
    let stat = if granted { nlm::klm_stats::klm_granted } else { nlm::klm_stats::klm_denied };

    debug!(" {:?} --> {:?}", xid, stat);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    Ok(())
}
