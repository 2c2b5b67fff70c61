use std::fs;
use std::path::Path;

use sift::scan::{RootStatus, ScanWarning};
use sift::Sift;
use tempfile::tempdir;

fn write_file(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn relative_paths(outcome: &sift::ScanOutcome) -> Vec<&str> {
    outcome.records.iter().map(|r| r.relative_path.as_str()).collect()
}

#[test]
fn vendor_directory_is_pruned() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("src/a.php"), b"<?php echo 'a';\n");
    write_file(&dir.path().join("vendor/b.php"), b"<?php echo 'b';\n");

    let outcome = Sift::new(dir.path()).scan().unwrap();

    assert_eq!(relative_paths(&outcome), vec!["src/a.php"]);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn comment_marker_inside_php_string_survives() {
    let dir = tempdir().unwrap();
    write_file(
        &dir.path().join("a.php"),
        b"<?php\n$x = \"// fake\"; // real\n# gone\n",
    );

    let outcome = Sift::new(dir.path()).strip_comments(true).scan().unwrap();
    let record = &outcome.records[0];

    assert_eq!(record.content, "<?php\n$x = \"// fake\";\n\n");
    assert_eq!(record.line_count, 3);
}

#[test]
fn long_file_is_truncated_with_marker() {
    let dir = tempdir().unwrap();
    let body: String = (1..=50).map(|i| format!("$v{i} = {i};\n")).collect();
    write_file(&dir.path().join("long.php"), body.as_bytes());

    let outcome = Sift::new(dir.path()).max_lines(5).scan().unwrap();
    let record = &outcome.records[0];

    assert_eq!(record.line_count, 6);
    assert!(record.truncated);
    let last = record.content.lines().last().unwrap();
    assert!(last.contains('5'), "marker was {last:?}");
    assert_eq!(record.size_bytes, record.content.len() as u64);
    assert_eq!(outcome.stats.files_truncated, 1);
}

#[test]
fn global_file_limit_spans_roots() {
    let dir = tempdir().unwrap();
    for rel in ["one/a.php", "one/b.php", "two/c.php", "two/d.php"] {
        write_file(&dir.path().join(rel), b"<?php\n");
    }

    let outcome = Sift::new(dir.path())
        .root("one")
        .root("two")
        .max_files(1)
        .scan()
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    let limit_warnings = outcome
        .warnings
        .iter()
        .filter(|w| matches!(w, ScanWarning::FileLimitReached { limit: 1 }))
        .count();
    assert_eq!(limit_warnings, 1);
}

#[test]
fn file_with_nul_byte_never_yields_record() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("data.php"), b"<?php\n\0\0\0");
    write_file(&dir.path().join("ok.php"), b"<?php\n");

    let outcome = Sift::new(dir.path()).scan().unwrap();

    assert_eq!(relative_paths(&outcome), vec!["ok.php"]);
    assert_eq!(outcome.stats.files_binary, 1);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn overlapping_roots_are_not_deduplicated() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("x/y.php"), b"<?php\n");

    let outcome = Sift::new(dir.path()).root(".").root("x").scan().unwrap();

    assert_eq!(relative_paths(&outcome), vec!["x/y.php", "x/y.php"]);
    assert_eq!(outcome.stats.files_accepted, 2);
}

#[test]
fn relative_paths_use_project_root_not_scan_root() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("app/models/user.php"), b"<?php\n");

    let outcome = Sift::new(dir.path()).root("app/models").scan().unwrap();

    assert_eq!(relative_paths(&outcome), vec!["app/models/user.php"]);
}

#[test]
fn size_ceiling_uses_original_size() {
    let dir = tempdir().unwrap();
    let mut big = b"<?php\n/*".to_vec();
    big.extend(std::iter::repeat(b'x').take(3000));
    big.extend(b"*/\n");
    write_file(&dir.path().join("big.php"), &big);
    write_file(&dir.path().join("small.php"), b"<?php\n");

    let outcome = Sift::new(dir.path())
        .max_file_size_kb(2)
        .strip_comments(true)
        .scan()
        .unwrap();

    assert_eq!(relative_paths(&outcome), vec!["small.php"]);
    assert_eq!(outcome.stats.files_too_large, 1);
}

#[test]
fn missing_root_is_a_warning_not_an_error() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("src/a.php"), b"<?php\n");

    let outcome = Sift::new(dir.path()).root("nope").root("src").scan().unwrap();

    assert_eq!(relative_paths(&outcome), vec!["src/a.php"]);
    assert!(matches!(outcome.warnings[0], ScanWarning::RootMissing { .. }));
}

#[test]
fn extension_allow_list_and_extra_patterns() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("src/a.php"), b"<?php\n");
    write_file(&dir.path().join("src/b.js"), b"x;\n");
    write_file(&dir.path().join("src/generated/c.php"), b"<?php\n");
    write_file(&dir.path().join("docs/readme.txt"), b"hi\n");

    let outcome = Sift::new(dir.path())
        .extensions(["php", "js"])
        .exclude("generated/")
        .exclude("**/*.js")
        .scan()
        .unwrap();

    assert_eq!(relative_paths(&outcome), vec!["src/a.php"]);
}

#[test]
fn wildcard_name_pattern_excludes_at_any_depth() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a_test.php"), b"<?php\n");
    write_file(&dir.path().join("src/b_test.php"), b"<?php\n");
    write_file(&dir.path().join("src/keep.php"), b"<?php\n");

    let outcome = Sift::new(dir.path()).exclude("*_test.php").scan().unwrap();

    assert_eq!(relative_paths(&outcome), vec!["src/keep.php"]);
    assert_eq!(outcome.stats.files_excluded, 2);
}

#[test]
fn spent_budget_stops_before_next_root() {
    let dir = tempdir().unwrap();
    for rel in ["one/a.php", "two/b.php", "three/c.php"] {
        write_file(&dir.path().join(rel), b"<?php\n");
    }

    let outcome = Sift::new(dir.path())
        .roots(["one", "two", "three"])
        .max_files(1)
        .scan()
        .unwrap();

    assert_eq!(relative_paths(&outcome), vec!["one/a.php"]);
    let statuses: Vec<_> = outcome.roots.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![RootStatus::Done, RootStatus::Pending, RootStatus::Pending]);
    assert!(outcome.limit_reached());
}
