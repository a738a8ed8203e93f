use camino::Utf8PathBuf;
use faultline::mutable::MutableStatus;
use faultline::operators::OperatorKind;
use faultline::scanner::{self, ExclusionRules};
use std::fs;
use tempfile::TempDir;

fn utf8(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
}

#[test]
fn scan_emits_one_mutable_per_position_operator_pair() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::write(root.join("calc.py"), "def f(a, b):\n    return a < b\n").unwrap();

    let report = scanner::scan(&root, &ExclusionRules::default()).unwrap();
    // "<" matches both boundary and negate; nothing else matches.
    assert_eq!(report.mutables.len(), 2);
    assert_eq!(report.mutables[0].operator, OperatorKind::ComparisonBoundary);
    assert_eq!(report.mutables[1].operator, OperatorKind::ComparisonNegate);
    assert_eq!(report.mutables[0].start_byte, report.mutables[1].start_byte);

    let ids: Vec<&str> = report.mutables.iter().map(|m| m.id.as_str()).collect();
    let mut deduped = ids.clone();
    deduped.dedup();
    assert_eq!(ids, deduped, "ids must be unique");
}

#[test]
fn scan_records_location_and_tokens() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::write(root.join("calc.py"), "def add(a, b):\n    return a + b\n").unwrap();

    let report = scanner::scan(&root, &ExclusionRules::default()).unwrap();
    assert_eq!(report.mutables.len(), 1);
    let m = &report.mutables[0];
    assert_eq!(m.file_path, Utf8PathBuf::from("calc.py"));
    assert_eq!(m.line, 2);
    assert_eq!(m.original, "+");
    assert_eq!(m.replacement, "-");
    assert_eq!(m.status, MutableStatus::Pending);
    assert!(m.token_start < m.token_end);
    assert_eq!(m.end_byte - m.start_byte, 1);
}

#[test]
fn scan_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::write(root.join("a.py"), "x = p + q\ny = p < q\n").unwrap();
    fs::write(root.join("pkg/b.py"), "z = not flag\n").unwrap();

    let first = scanner::scan(&root, &ExclusionRules::default()).unwrap();
    let second = scanner::scan(&root, &ExclusionRules::default()).unwrap();
    let first_ids: Vec<String> = first.mutables.iter().map(|m| m.id.clone()).collect();
    let second_ids: Vec<String> = second.mutables.iter().map(|m| m.id.clone()).collect();
    assert_eq!(first_ids, second_ids);
    assert!(!first_ids.is_empty());
}

#[test]
fn scan_orders_by_file_then_offset() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::write(root.join("b.py"), "x = 1 + 2\n").unwrap();
    fs::write(root.join("a.py"), "y = 3 + 4\nz = 5 + 6\n").unwrap();

    let report = scanner::scan(&root, &ExclusionRules::default()).unwrap();
    let order: Vec<(String, usize)> = report
        .mutables
        .iter()
        .map(|m| (m.file_path.to_string(), m.start_byte))
        .collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
    assert_eq!(report.mutables[0].file_path, Utf8PathBuf::from("a.py"));
}

#[test]
fn malformed_file_becomes_warning_not_error() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::write(root.join("good.py"), "x = a + b\n").unwrap();
    fs::write(root.join("broken.py"), "def broken(:\n").unwrap();

    let report = scanner::scan(&root, &ExclusionRules::default()).unwrap();
    assert_eq!(report.mutables.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].file_path, Utf8PathBuf::from("broken.py"));
}

#[test]
fn excluded_file_is_never_scanned() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::write(root.join("app.py"), "x = a + b\n").unwrap();
    fs::write(root.join("generated.py"), "y = c + d\n").unwrap();

    let rules = ExclusionRules {
        files: vec!["generated.py".into()],
        line_marker: None,
    };
    let report = scanner::scan(&root, &rules).unwrap();
    assert_eq!(report.mutables.len(), 1);
    assert_eq!(report.mutables[0].file_path, Utf8PathBuf::from("app.py"));
}

#[test]
fn marked_lines_are_excluded_before_emission() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::write(
        root.join("app.py"),
        "x = a + b  # no mutate\ny = c + d\n",
    )
    .unwrap();

    let rules = ExclusionRules {
        files: vec![],
        line_marker: Some("no mutate".into()),
    };
    let report = scanner::scan(&root, &rules).unwrap();
    assert_eq!(report.mutables.len(), 1);
    assert_eq!(report.mutables[0].line, 2);
}

#[test]
fn unsupported_and_vendored_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::write(root.join("notes.txt"), "a + b\n").unwrap();
    fs::create_dir_all(root.join("node_modules")).unwrap();
    fs::write(root.join("node_modules/dep.js"), "let x = a + b;\n").unwrap();
    fs::create_dir_all(root.join("__pycache__")).unwrap();
    fs::write(root.join("__pycache__/junk.py"), "x = a + b\n").unwrap();

    let report = scanner::scan(&root, &ExclusionRules::default()).unwrap();
    assert!(report.mutables.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn missing_source_root_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir).join("does-not-exist");
    let err = scanner::scan(&root, &ExclusionRules::default()).unwrap_err();
    assert!(err.to_string().contains("source directory"));
}

#[test]
fn context_lines_surround_the_mutation_site() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    fs::write(
        root.join("app.py"),
        "before2 = 0\nbefore1 = 1\nx = a + b\nafter1 = 2\nafter2 = 3\n",
    )
    .unwrap();

    let report = scanner::scan(&root, &ExclusionRules::default()).unwrap();
    let m = &report.mutables[0];
    assert_eq!(m.context_before, vec!["before2 = 0", "before1 = 1"]);
    assert_eq!(m.context_after, vec!["after1 = 2", "after2 = 3"]);
}
