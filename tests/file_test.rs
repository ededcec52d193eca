//! Tests for reading and writing documents on disk.

use std::fs;
use std::path::PathBuf;

use pagemark::{check_file, normalize_file, normalize_files, Error, NormalizeOptions};
use tempfile::TempDir;

const PAGE: &str = "<body>\n<section class=\"page\"><p>x</p></section>\n</body>\n";

fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_normalize_file_rewrites_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "index.html", PAGE);
    let options = NormalizeOptions::default();

    let first = normalize_file(&path, &options).unwrap();
    assert!(first.changed());
    assert_eq!(fs::read_to_string(&path).unwrap(), first.content);

    let second = normalize_file(&path, &options).unwrap();
    assert!(!second.changed());
    assert_eq!(fs::read_to_string(&path).unwrap(), first.content);
}

#[test]
fn test_check_file_does_not_write() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "index.html", PAGE);

    let result = check_file(&path, &NormalizeOptions::default()).unwrap();
    assert!(result.changed());
    assert_eq!(result.report.page_count, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), PAGE);
}

#[test]
fn test_non_utf8_file_is_encoding_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.html");
    fs::write(&path, b"<p>caf\xe9</p>").unwrap();

    let result = normalize_file(&path, &NormalizeOptions::default());
    assert!(matches!(result, Err(Error::Encoding(_))));
    assert_eq!(fs::read(&path).unwrap(), b"<p>caf\xe9</p>");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = normalize_file(dir.path().join("missing.html"), &NormalizeOptions::default());
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_normalize_files_keeps_input_order() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_doc(&dir, "a.html", PAGE),
        dir.path().join("missing.html"),
        write_doc(&dir, "c.html", "<p>no pages</p>\n"),
    ];

    let outcomes = normalize_files(&paths, &NormalizeOptions::default()).unwrap();

    assert_eq!(outcomes.len(), 3);
    for (outcome, path) in outcomes.iter().zip(&paths) {
        assert_eq!(&outcome.path, path);
    }
    assert!(outcomes[0].changed());
    assert!(matches!(outcomes[1].result, Err(Error::Io(_))));
    assert!(outcomes[2].is_ok());
    assert!(!outcomes[2].changed());
    assert!(fs::read_to_string(&paths[0]).unwrap().contains("data-page=\"1\""));
}

#[test]
fn test_normalize_files_rejects_invalid_options() {
    let dir = TempDir::new().unwrap();
    let paths = vec![write_doc(&dir, "a.html", PAGE)];
    let options = NormalizeOptions::new().with_max_layout_iterations(0);

    assert!(matches!(
        normalize_files(&paths, &options),
        Err(Error::InvalidOptions(_))
    ));
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), PAGE);
}
