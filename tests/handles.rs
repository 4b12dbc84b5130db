use nfs2serve::handles::{HandleRegistry, SUFFIX_LEN};
use nfs2serve::vfs::NodeId;

#[test]
fn mint_and_lookup_are_bijective() {
    let mut reg = HandleRegistry::new();
    reg.init_fs(1);

    let id = NodeId::from(42_u64);
    let fh = reg.handle_for(&id, 1);

    let (fs_id, found) = reg.lookup(&fh).expect("handle resolves");
    assert_eq!(fs_id, 1);
    assert_eq!(found, &id);
}

#[test]
fn handle_for_is_idempotent() {
    let mut reg = HandleRegistry::new();
    reg.init_fs(1);

    let id = NodeId::from(7_u64);
    let first = reg.handle_for(&id, 1);
    let second = reg.handle_for(&id, 1);
    assert_eq!(first, second);
}

#[test]
fn file_ids_are_minted_from_one_per_filesystem() {
    let mut reg = HandleRegistry::new();
    reg.init_fs(1);
    reg.init_fs(2);

    let fh_a = reg.handle_for(&NodeId::from(10_u64), 1);
    let fh_b = reg.handle_for(&NodeId::from(11_u64), 1);
    let fh_c = reg.handle_for(&NodeId::from(10_u64), 2);

    assert_eq!(HandleRegistry::parse(&fh_a), (1, 1));
    assert_eq!(HandleRegistry::parse(&fh_b), (2, 1));
    // Counter is per-filesystem, so fs 2 starts over at 1.
    assert_eq!(HandleRegistry::parse(&fh_c), (1, 2));
}

#[test]
fn handles_are_unique_across_ids_and_filesystems() {
    let mut reg = HandleRegistry::new();
    let mut seen = std::collections::HashSet::new();
    for fs_id in 1..=4_u32 {
        reg.init_fs(fs_id);
        for raw in 0..32_u64 {
            let fh = reg.handle_for(&NodeId::from(raw), fs_id);
            assert!(seen.insert(fh), "duplicate handle for id {} fs {}", raw, fs_id);
        }
    }
}

#[test]
fn suffix_is_constant_across_mints() {
    let mut reg = HandleRegistry::new();
    reg.init_fs(1);
    let suffix = *reg.suffix();
    assert_eq!(suffix.len(), SUFFIX_LEN);

    for raw in 0..8_u64 {
        let fh = reg.handle_for(&NodeId::from(raw), 1);
        assert_eq!(&fh[8..], &suffix[..]);
    }
}

#[test]
fn unknown_handles_do_not_resolve() {
    let reg = HandleRegistry::new();
    let mut fh = [0_u8; 32];
    fh[3] = 9;
    fh[7] = 7;
    assert!(reg.lookup(&fh).is_none());
}
