//! Implementation of the `NULL` procedure (procedure 0) for NFS
//! version 2 as defined in RFC 1094 section 2.2.1. Does nothing; used by
//! clients to ping the server and measure round-trip time.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, Serialize};

pub fn nfsproc_null(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("nfsproc_null({:?})", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    Ok(())
}
