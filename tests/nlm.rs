use std::io::Cursor;

mod support;

use nfs2serve::server::{ServerConfig, ServerState};
use nfs2serve::xdr::{deserialize, nlm, Serialize};

use support::{open_reply, rpc_call};

fn new_state() -> ServerState {
    ServerState::new(&ServerConfig::default())
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.serialize(&mut buf).unwrap();
    buf
}

fn alock(fh: &[u8], pid: i32, offset: u32, len: u32) -> nlm::klm_lock {
    nlm::klm_lock {
        server_name: b"testhost".to_vec(),
        fh: fh.to_vec(),
        pid,
        l_offset: offset,
        l_len: len,
    }
}

async fn klm_request(
    state: &mut ServerState,
    xid: u32,
    proc_: u32,
    args: &[u8],
) -> Cursor<Vec<u8>> {
    let call = rpc_call(xid, nlm::PROGRAM, nlm::VERSION, proc_, args);
    let reply = state.process(&call, "127.0.0.1:700").await.expect("reply");
    open_reply(&reply, xid)
}

#[tokio::test]
async fn lock_conflict_sequence_over_the_wire() {
    let mut state = new_state();
    let fh = [7_u8; 32];

    // TEST against an empty table: granted, no holder.
    let args = nlm::klm_testargs { exclusive: true, alock: alock(&fh, 1, 0, 100) };
    let mut cur = klm_request(&mut state, 1, 1, &encode(&args)).await;
    let reply = deserialize::<nlm::klm_testrply>(&mut cur).unwrap();
    assert_eq!(reply.stat, nlm::klm_stats::klm_granted);
    assert!(reply.holder.is_none());

    // LOCK by owner 1: granted.
    let args =
        nlm::klm_lockargs { block: false, exclusive: true, alock: alock(&fh, 1, 0, 100) };
    let mut cur = klm_request(&mut state, 2, 2, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_granted);

    // Overlapping LOCK by owner 2: denied immediately, block or not.
    let args =
        nlm::klm_lockargs { block: false, exclusive: true, alock: alock(&fh, 2, 50, 100) };
    let mut cur = klm_request(&mut state, 3, 2, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_denied);

    // TEST by owner 2 names the conflicting holder.
    let args = nlm::klm_testargs { exclusive: true, alock: alock(&fh, 2, 50, 100) };
    let mut cur = klm_request(&mut state, 4, 1, &encode(&args)).await;
    let reply = deserialize::<nlm::klm_testrply>(&mut cur).unwrap();
    assert_eq!(reply.stat, nlm::klm_stats::klm_denied);
    assert_eq!(
        reply.holder,
        Some(nlm::klm_holder { exclusive: true, svid: 1, l_offset: 0, l_len: 100 })
    );
}

#[tokio::test]
async fn unlock_without_a_lock_is_denied_nolock() {
    let mut state = new_state();
    let args = nlm::klm_unlockargs { alock: alock(&[9_u8; 32], 1, 0, 100) };
    let mut cur = klm_request(&mut state, 10, 4, &encode(&args)).await;
    assert_eq!(
        deserialize::<nlm::klm_stats>(&mut cur).unwrap(),
        nlm::klm_stats::klm_denied_nolock
    );
}

#[tokio::test]
async fn unlock_releases_the_range() {
    let mut state = new_state();
    let fh = [3_u8; 32];

    let args =
        nlm::klm_lockargs { block: false, exclusive: true, alock: alock(&fh, 1, 0, 100) };
    let mut cur = klm_request(&mut state, 20, 2, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_granted);

    let args = nlm::klm_unlockargs { alock: alock(&fh, 1, 0, 100) };
    let mut cur = klm_request(&mut state, 21, 4, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_granted);

    // Another owner can now lock the same range.
    let args =
        nlm::klm_lockargs { block: false, exclusive: true, alock: alock(&fh, 2, 0, 100) };
    let mut cur = klm_request(&mut state, 22, 2, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_granted);
}

#[tokio::test]
async fn cancel_is_acknowledged_without_effect() {
    let mut state = new_state();
    let fh = [5_u8; 32];

    let args =
        nlm::klm_lockargs { block: false, exclusive: true, alock: alock(&fh, 1, 0, 100) };
    let mut cur = klm_request(&mut state, 30, 2, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_granted);

    let args =
        nlm::klm_lockargs { block: true, exclusive: true, alock: alock(&fh, 2, 0, 100) };
    let mut cur = klm_request(&mut state, 31, 3, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_granted);

    // Owner 1 still holds the lock.
    let args = nlm::klm_testargs { exclusive: true, alock: alock(&fh, 2, 0, 100) };
    let mut cur = klm_request(&mut state, 32, 1, &encode(&args)).await;
    let reply = deserialize::<nlm::klm_testrply>(&mut cur).unwrap();
    assert_eq!(reply.stat, nlm::klm_stats::klm_denied);
}

#[tokio::test]
async fn the_lock_key_is_the_raw_handle_bytes() {
    let mut state = new_state();
    // Not a 32-byte NFS handle and never registered anywhere; the lock
    // manager does not care.
    let fh = b"short-key";

    let args =
        nlm::klm_lockargs { block: false, exclusive: false, alock: alock(fh, 1, 0, 10) };
    let mut cur = klm_request(&mut state, 40, 2, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_granted);

    let args = nlm::klm_unlockargs { alock: alock(fh, 1, 0, 10) };
    let mut cur = klm_request(&mut state, 41, 4, &encode(&args)).await;
    assert_eq!(deserialize::<nlm::klm_stats>(&mut cur).unwrap(), nlm::klm_stats::klm_granted);
}
