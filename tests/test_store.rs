use camino::{Utf8Path, Utf8PathBuf};
use faultline::mutable::{Mutable, MutableStatus};
use faultline::operators::OperatorKind;
use faultline::store::MutableStore;
use tempfile::TempDir;

fn make_mutable(file: &str, start_byte: usize, operator: OperatorKind) -> Mutable {
    Mutable {
        id: Mutable::stable_id(file, start_byte, operator),
        file_path: Utf8PathBuf::from(file),
        line: 1,
        column: 1,
        token_start: 0,
        token_end: 1,
        start_byte,
        end_byte: start_byte + 1,
        operator,
        original: "+".to_string(),
        replacement: "-".to_string(),
        status: MutableStatus::Pending,
        diff: String::new(),
        context_before: vec![],
        context_after: vec![],
    }
}

fn sample_store() -> MutableStore {
    MutableStore::new(vec![
        make_mutable("a.py", 4, OperatorKind::ArithmeticSwap),
        make_mutable("a.py", 9, OperatorKind::ComparisonBoundary),
        make_mutable("b.py", 4, OperatorKind::ArithmeticSwap),
    ])
}

#[test]
fn pending_indices_follow_store_order() {
    let mut store = sample_store();
    assert_eq!(store.pending_indices(), vec![0, 1, 2]);

    store.record(1, MutableStatus::Killed);
    assert_eq!(store.pending_indices(), vec![0, 2]);
}

#[test]
fn record_sets_a_terminal_status() {
    let mut store = sample_store();
    store.record(0, MutableStatus::Escaped);
    assert_eq!(store.get(0).status, MutableStatus::Escaped);
    assert!(store.get(0).status.is_terminal());
    assert!(!store.get(1).status.is_terminal());
}

#[test]
fn filters_by_file_and_status() {
    let mut store = sample_store();
    store.record(0, MutableStatus::Killed);
    store.record(2, MutableStatus::Killed);

    assert_eq!(store.for_file(Utf8Path::new("a.py")).count(), 2);
    assert_eq!(store.for_file(Utf8Path::new("b.py")).count(), 1);
    assert_eq!(store.with_status(MutableStatus::Killed).count(), 2);
    assert_eq!(store.with_status(MutableStatus::Pending).count(), 1);
}

#[test]
fn save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("state.json")).unwrap();

    let mut store = sample_store();
    store.record(0, MutableStatus::Killed);
    store.record(1, MutableStatus::Escaped);
    store.save(&path).unwrap();

    let loaded = MutableStore::load(&path).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.get(0).status, MutableStatus::Killed);
    assert_eq!(loaded.get(1).status, MutableStatus::Escaped);
    assert_eq!(loaded.get(2).status, MutableStatus::Pending);
    assert_eq!(loaded.get(0).id, store.get(0).id);
}

#[test]
fn load_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).unwrap();
    assert!(MutableStore::load(&path).is_err());
}

#[test]
fn resume_carries_terminal_statuses_by_id() {
    let mut previous = sample_store();
    previous.record(0, MutableStatus::Killed);
    previous.record(1, MutableStatus::TimedOut);

    let mut fresh = sample_store();
    fresh.resume_from(&previous);

    assert_eq!(fresh.get(0).status, MutableStatus::Killed);
    assert_eq!(fresh.get(1).status, MutableStatus::TimedOut);
    assert_eq!(fresh.get(2).status, MutableStatus::Pending);
    assert_eq!(fresh.pending_indices(), vec![2]);
}

#[test]
fn resume_ignores_mutables_unknown_to_the_previous_run() {
    let previous = MutableStore::new(vec![make_mutable("a.py", 4, OperatorKind::ArithmeticSwap)]);

    let mut fresh = sample_store();
    fresh.resume_from(&previous);
    // Previous run never finished anything, so everything stays pending.
    assert_eq!(fresh.pending_indices(), vec![0, 1, 2]);
}

#[test]
fn diff_survives_persistence() {
    let dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("state.json")).unwrap();

    let mut store = sample_store();
    store.record(0, MutableStatus::Escaped);
    store.record_diff(0, "- x = a + b\n+ x = a - b\n".to_string());
    store.save(&path).unwrap();

    let loaded = MutableStore::load(&path).unwrap();
    assert!(loaded.get(0).diff.contains("a - b"));
}
