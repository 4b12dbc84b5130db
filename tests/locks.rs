use nfs2serve::locks::{LockTable, TestResult};

const FH: &[u8] = b"some-opaque-file-handle";

#[test]
fn exclusive_lock_conflict_sequence() {
    let mut table = LockTable::new();

    // Empty table: the probe is granted.
    assert_eq!(table.test(FH, 1, 0, 100), TestResult::Granted);

    assert!(table.lock(FH, 1, true, 0, 100));
    assert!(!table.lock(FH, 2, true, 50, 100));

    assert_eq!(
        table.test(FH, 2, 50, 100),
        TestResult::Denied { exclusive: true, owner: 1, offset: 0, length: 100 }
    );
}

#[test]
fn same_owner_stacks_on_exclusive_record() {
    let mut table = LockTable::new();
    assert!(table.lock(FH, 1, true, 0, 100));
    assert!(table.lock(FH, 1, true, 50, 100));
    assert!(!table.lock(FH, 2, true, 500, 10));
}

#[test]
fn shared_locks_admit_disjoint_owners() {
    let mut table = LockTable::new();
    assert!(table.lock(FH, 1, false, 0, 10));
    assert!(table.lock(FH, 2, false, 20, 10));
    assert!(!table.lock(FH, 2, false, 5, 10));
    assert!(table.lock(FH, 1, false, 5, 10));
}

#[test]
fn shared_lock_is_granted_when_any_overlap_is_the_owners() {
    let mut table = LockTable::new();
    assert!(table.lock(FH, 1, false, 0, 10));
    assert!(table.lock(FH, 2, false, 20, 10));

    // [5, 29] overlaps both owner 2's range and owner 1's own range;
    // the own overlap carries the grant.
    assert!(table.lock(FH, 1, false, 5, 25));

    // The same span from a third owner overlaps only foreign ranges.
    assert!(!table.lock(FH, 3, false, 5, 25));
}

#[test]
fn unlock_restores_the_previous_state() {
    let mut table = LockTable::new();
    assert!(table.lock(FH, 1, true, 0, 100));
    assert!(table.unlock(FH, 1, 0, 100));

    assert_eq!(table.test(FH, 2, 0, 100), TestResult::Granted);
    assert!(table.record(FH).expect("record persists").ranges.is_empty());

    // The emptied record adopts the next request's exclusivity.
    assert!(table.lock(FH, 2, false, 0, 10));
    assert!(!table.record(FH).unwrap().exclusive);
}

#[test]
fn unlock_removes_every_overlapping_range_of_the_owner() {
    let mut table = LockTable::new();
    assert!(table.lock(FH, 1, false, 0, 10));
    assert!(table.lock(FH, 1, false, 5, 10));
    assert!(table.lock(FH, 2, false, 30, 10));

    assert!(table.unlock(FH, 1, 0, 20));

    let record = table.record(FH).unwrap();
    assert!(record.ranges.iter().all(|r| r.owner != 1));
    assert_eq!(record.ranges.len(), 1);
    assert_eq!(record.ranges[0].owner, 2);
}

#[test]
fn unlock_without_a_matching_lock_is_denied_nolock() {
    let mut table = LockTable::new();
    assert!(!table.unlock(FH, 1, 0, 100));

    assert!(table.lock(FH, 1, true, 0, 10));
    // Wrong owner releases nothing.
    assert!(!table.unlock(FH, 2, 0, 10));
    // Disjoint range releases nothing.
    assert!(!table.unlock(FH, 1, 50, 10));
}

#[test]
fn zero_length_ranges_never_overlap() {
    let mut table = LockTable::new();
    assert!(table.lock(FH, 1, true, 0, 0));
    assert_eq!(table.test(FH, 2, 0, 100), TestResult::Granted);

    let mut table = LockTable::new();
    assert!(table.lock(FH, 1, true, 0, 100));
    assert_eq!(table.test(FH, 2, 50, 0), TestResult::Granted);
}

#[test]
fn overlap_is_inclusive_at_range_edges() {
    let mut table = LockTable::new();
    assert!(table.lock(FH, 1, true, 10, 10));
    // [19, 19] is the last locked byte.
    assert_eq!(
        table.test(FH, 2, 19, 5),
        TestResult::Denied { exclusive: true, owner: 1, offset: 10, length: 10 }
    );
    // [20, ...] is past the end.
    assert_eq!(table.test(FH, 2, 20, 5), TestResult::Granted);
}

#[test]
fn locks_are_partitioned_by_handle() {
    let mut table = LockTable::new();
    assert!(table.lock(b"fh-one", 1, true, 0, 100));
    assert!(table.lock(b"fh-two", 2, true, 0, 100));
    assert_eq!(table.test(b"fh-two", 2, 0, 100), TestResult::Granted);
}
