//! Implementation of the UMNT procedure (procedure 3) for MOUNT
//! version 1 as defined in RFC 1094 Appendix A.
//!
//! Tears down the named export if it is mounted: the backend's
//! `terminate` runs and the instance is dropped, while the registry
//! keeps the filesystem id known so outstanding handles decode to the
//! stale state rather than to garbage. The reply is void regardless of
//! whether anything was mounted.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::xdr::{self, deserialize, Serialize};
use crate::server::ServerState;

pub async fn mountproc_umnt(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let path = match deserialize::<Vec<u8>>(input) {
        Ok(path) => path,
        Err(e) => {
            debug!("mountproc_umnt: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("mountproc_umnt({:?},{:?})", xid, String::from_utf8_lossy(&path));

    state.unmount_path(&path).await;
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    Ok(())
}
