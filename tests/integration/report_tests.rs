use dupgroups::duplicates::DuplicateFinder;
use dupgroups::output::{write_report, ReportFormat, ReportOutput, ReportSink};
use dupgroups::progress::NoProgress;
use dupgroups::scanner::Digest;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

/// A mixed tree: duplicates across directories, singletons, empty files.
fn mixed_tree() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a/one.txt"), b"alpha");
    write_file(&root.join("b/one.txt"), b"alpha");
    write_file(&root.join("b/two.txt"), b"beta");
    write_file(&root.join("c/d/three.txt"), b"alpha");
    write_file(&root.join("c/empty1"), b"");
    write_file(&root.join("c/d/empty2"), b"");
    write_file(&root.join("solo.bin"), &[0u8, 1, 2, 3]);
    dir
}

fn render(root: &Path, format: &ReportFormat) -> (String, usize) {
    let finder = DuplicateFinder::with_defaults();
    let (buckets, summary) = finder.find_in_path(root, &NoProgress).unwrap();
    (ReportOutput::new(buckets, format).render(), summary.total_files)
}

#[test]
fn test_report_is_complete_partition() {
    let dir = mixed_tree();
    let format = ReportFormat::default();
    let (text, total_files) = render(dir.path(), &format);

    let mut seen = HashSet::new();
    let mut digests = HashSet::new();
    for line in text.lines() {
        let parsed = format.parse_line(line).unwrap();
        assert!(Digest::from_hex(&parsed.digest).is_some());
        assert!(digests.insert(parsed.digest.clone()), "digest repeated");
        for path in parsed.paths {
            assert!(seen.insert(path), "path listed twice");
        }
    }

    assert_eq!(seen.len(), total_files);
    assert_eq!(total_files, 7);
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn test_report_ordering() {
    let dir = mixed_tree();
    let format = ReportFormat::default();
    let (text, _) = render(dir.path(), &format);

    let lines: Vec<_> = text.lines().map(|l| format.parse_line(l).unwrap()).collect();
    for line in &lines {
        let mut sorted = line.paths.clone();
        sorted.sort();
        assert_eq!(line.paths, sorted);
    }
    let firsts: Vec<_> = lines.iter().map(|l| l.paths[0].clone()).collect();
    let mut sorted = firsts.clone();
    sorted.sort();
    assert_eq!(firsts, sorted);
}

#[test]
fn test_report_is_idempotent() {
    let dir = mixed_tree();
    let format = ReportFormat::default();

    let (first, _) = render(dir.path(), &format);
    let (second, _) = render(dir.path(), &format);

    assert_eq!(first, second);
}

#[test]
fn test_report_groups_identical_content() {
    let dir = mixed_tree();
    let format = ReportFormat::default();
    let (text, _) = render(dir.path(), &format);

    let alpha_line = text
        .lines()
        .map(|l| format.parse_line(l).unwrap())
        .find(|l| l.paths.len() == 3)
        .unwrap();
    let expected: Vec<String> = [
        dir.path().join("a").join("one.txt"),
        dir.path().join("b").join("one.txt"),
        dir.path().join("c").join("d").join("three.txt"),
    ]
    .iter()
    .map(|p| p.to_string_lossy().into_owned())
    .collect();
    assert_eq!(alpha_line.paths, expected);
}

#[cfg(unix)]
#[test]
fn test_report_escapes_delimiter_in_file_name() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a|b.txt");
    write_file(&file, b"hi");

    let format = ReportFormat::default();
    let (text, _) = render(&file, &format);

    assert!(text.ends_with("a\\|b.txt\n"));
    let parsed = format.parse_line(text.trim_end()).unwrap();
    assert_eq!(parsed.paths, vec![file.to_string_lossy().into_owned()]);
}

#[test]
fn test_report_custom_markers() {
    let dir = mixed_tree();
    let format = ReportFormat::new("~", ",").unwrap();
    let (text, total_files) = render(dir.path(), &format);

    assert!(text.lines().all(|l| l.as_bytes()[64] == b','));
    let listed: usize = text
        .lines()
        .map(|l| format.parse_line(l).unwrap().paths.len())
        .sum();
    assert_eq!(listed, total_files);
}

#[test]
fn test_write_report_to_file_matches_render() {
    let dir = mixed_tree();
    let out_dir = tempdir().unwrap();
    let target = out_dir.path().join("report.txt");

    let finder = DuplicateFinder::with_defaults();
    let (buckets, _) = finder.find_in_path(dir.path(), &NoProgress).unwrap();
    let format = ReportFormat::default();
    let report = ReportOutput::new(buckets, &format);

    write_report(&report, &ReportSink::File(target.clone())).unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), report.render());
}

#[test]
fn test_empty_input_gives_empty_report() {
    let dir = tempdir().unwrap();
    let format = ReportFormat::default();
    let (text, total_files) = render(dir.path(), &format);

    assert!(text.is_empty());
    assert_eq!(total_files, 0);
}
