//! Implementation of the MNT procedure (procedure 1) for MOUNT
//! version 1 as defined in RFC 1094 Appendix A.
//!
//! Looks up the requested path in the mount table and returns the root
//! file handle. A path that is already mounted returns its existing
//! handle; a path in the unmounted state is brought up through the
//! backend factory first. Failures of either kind collapse to the
//! protocol's numeric status 1.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::xdr::{self, deserialize, Serialize};
use crate::server::ServerState;

pub async fn mountproc_mnt(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    let path = match deserialize::<Vec<u8>>(input) {
        Ok(path) => path,
        Err(e) => {
            debug!("mountproc_mnt: undecodable arguments: {}", e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("mountproc_mnt({:?},{:?})", xid, String::from_utf8_lossy(&path));

    let res = state.mount_path(&path).await;
    debug!(" {:?} --> status {}", xid, res.status);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    res.serialize(output)?;
    Ok(())
}
