//! Implementation of the UMNTALL procedure (procedure 4) for MOUNT
//! version 1 as defined in RFC 1094 Appendix A. Applies UMNT semantics
//! to every mounted export; void reply.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, Serialize};
use crate::server::ServerState;

pub async fn mountproc_umnt_all(
    xid: u32,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    debug!("mountproc_umnt_all({:?})", xid);

    state.unmount_all().await;
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    Ok(())
}
