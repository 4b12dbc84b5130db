//! Implementation of the EXPORT procedure (procedure 5) for MOUNT
//! version 1 as defined in RFC 1094 Appendix A.
//!
//! Returns every configured export path, mounted or not, as the
//! protocol's linked list. The group list of each entry is empty: this
//! server does not restrict exports to named client groups.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, mount, Serialize};
use crate::server::ServerState;

pub fn mountproc_export(
    xid: u32,
    output: &mut impl Write,
    state: &mut ServerState,
) -> Result<(), anyhow::Error> {
    debug!("mountproc_export({:?})", xid);

    let mut exports: Option<mount::exportlist> = None;
    for entry in state.mounts.entries().iter().rev() {
        exports = Some(mount::exportlist {
            filesys: entry.path.as_bytes().to_vec(),
            groups: Box::new(None),
            next: Box::new(exports),
        });
    }

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    exports.serialize(output)?;
    Ok(())
}
