//! Test helpers for writing problem files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use evroute::ProblemDescription;
use evroute::test_support::single_customer;
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

/// A temporary directory that is removed when dropped.
pub(super) fn utf8_workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Serialise `description` as the pretty JSON a caller would send.
pub(super) fn write_problem(path: &Utf8Path, description: &ProblemDescription) {
    let payload = serde_json::to_string_pretty(description).expect("serialise problem");
    write_utf8(path, payload.as_bytes());
}

/// The single-customer fixture carrying a solver label.
pub(super) fn labelled_problem(label: &str) -> ProblemDescription {
    ProblemDescription {
        label: Some(label.to_owned()),
        ..single_customer()
    }
}
