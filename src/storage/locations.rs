//! # Object Key Layout
//!
//! ```text
//! pre-submission-batching/{worker}/{year}/{batch}/{submission}/{file}
//! pre-submission-batching/errors/{worker}/{year}/{batch}/{ordinal}/{submission}/{file}
//! ```
//!
//! Every folder location returned here ends in `/`.

use crate::constants::storage::{
    ERRORS_FOLDER, MANIFEST_FILE, RETURN_FILE, SUBMISSIONS_FOLDER, SUBMITTER_CONTEXT_FILE,
};

pub fn worker_year_location(worker_id: &str, batch_control_year: i32) -> String {
    format!("{SUBMISSIONS_FOLDER}/{worker_id}/{batch_control_year}/")
}

pub fn batch_location(worker_id: &str, batch_control_year: i32, batch_id: u64) -> String {
    format!(
        "{}{batch_id}/",
        worker_year_location(worker_id, batch_control_year)
    )
}

pub fn submission_location(batch_path: &str, submission_id: &str) -> String {
    format!("{}{submission_id}/", with_trailing_slash(batch_path))
}

pub fn manifest_key(batch_path: &str, submission_id: &str) -> String {
    format!("{}{MANIFEST_FILE}", submission_location(batch_path, submission_id))
}

pub fn return_key(batch_path: &str, submission_id: &str) -> String {
    format!("{}{RETURN_FILE}", submission_location(batch_path, submission_id))
}

pub fn submitter_context_key(batch_path: &str, submission_id: &str) -> String {
    format!(
        "{}{SUBMITTER_CONTEXT_FILE}",
        submission_location(batch_path, submission_id)
    )
}

/// Root under which failed batches of one worker/year are split
pub fn error_root(worker_id: &str, batch_control_year: i32) -> String {
    format!("{SUBMISSIONS_FOLDER}/{ERRORS_FOLDER}/{worker_id}/{batch_control_year}/")
}

pub fn split_location(
    worker_id: &str,
    batch_control_year: i32,
    batch_id: u64,
    ordinal: usize,
) -> String {
    format!(
        "{}{batch_id}/{ordinal}/",
        error_root(worker_id, batch_control_year)
    )
}

/// Final path segment, ignoring a trailing `/`
pub fn last_segment(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Parse the final path segment as a batch id or ordinal
pub fn trailing_number(path: &str) -> Option<u64> {
    last_segment(path).parse().ok()
}

/// Split a key under `batch_path` into `(submission_id, file_name)`.
///
/// Keys that are not exactly two levels below the batch are rejected.
pub fn split_submission_key<'a>(batch_path: &str, key: &'a str) -> Option<(&'a str, &'a str)> {
    let relative = key.strip_prefix(with_trailing_slash(batch_path).as_str())?;
    let (submission_id, file_name) = relative.split_once('/')?;
    if submission_id.is_empty() || file_name.is_empty() || file_name.contains('/') {
        return None;
    }
    Some((submission_id, file_name))
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_and_file_locations() {
        let batch = batch_location("w1", 2024, 12);
        assert_eq!(batch, "pre-submission-batching/w1/2024/12/");
        assert_eq!(
            manifest_key(&batch, "sub-9"),
            "pre-submission-batching/w1/2024/12/sub-9/manifest.xml"
        );
        assert_eq!(
            return_key(&batch, "sub-9"),
            "pre-submission-batching/w1/2024/12/sub-9/submission.xml"
        );
        assert_eq!(
            submitter_context_key("pre-submission-batching/w1/2024/12", "sub-9"),
            "pre-submission-batching/w1/2024/12/sub-9/userContext.json"
        );
    }

    #[test]
    fn test_error_locations() {
        assert_eq!(
            error_root("w1", 2024),
            "pre-submission-batching/errors/w1/2024/"
        );
        assert_eq!(
            split_location("w1", 2024, 5, 2),
            "pre-submission-batching/errors/w1/2024/5/2/"
        );
    }

    #[test]
    fn test_trailing_number() {
        assert_eq!(trailing_number("pre-submission-batching/w1/2024/12/"), Some(12));
        assert_eq!(trailing_number("a/b/7"), Some(7));
        assert_eq!(trailing_number("a/b/seven/"), None);
        assert_eq!(last_segment("single"), "single");
    }

    #[test]
    fn test_split_submission_key() {
        let batch = "p/w/2024/3/";
        assert_eq!(
            split_submission_key(batch, "p/w/2024/3/sub-1/manifest.xml"),
            Some(("sub-1", "manifest.xml"))
        );
        assert_eq!(split_submission_key(batch, "p/w/2024/3/stray.txt"), None);
        assert_eq!(split_submission_key(batch, "p/w/2024/3/a/b/c.xml"), None);
        assert_eq!(split_submission_key(batch, "p/w/2024/30/a/c.xml"), None);
    }
}
