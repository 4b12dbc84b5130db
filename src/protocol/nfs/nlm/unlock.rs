//! Implementation of the KLM_UNLOCK procedure (procedure 4).
//!
//! Releases every range of the calling owner that overlaps the given
//! interval. When nothing matched (including a handle that never had a
//! lock) the reply is `klm_denied_nolock`.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::xdr::{self, deserialize, nlm, Serialize};
use crate::server::ServerState;

pub fn klmproc_unlock(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<nlm::klm_unlockargs>(input) {
        Ok(args) => args,
        Err(e) => {
            debug!("klmproc_unlock: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    let alock = &args.alock;
    debug!("klmproc_unlock({:?}, pid {}, [{}, +{}])", xid, alock.pid, alock.l_offset, alock.l_len);

    let removed = state.locks.unlock(&alock.fh, alock.pid, alock.l_offset, alock.l_len);
    let stat =
        if removed { nlm::klm_stats::klm_granted } else { nlm::klm_stats::klm_denied_nolock };

    debug!(" {:?} --> {:?}", xid, stat);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    Ok(())
}
