//! # Stage Operations
//!
//! Storage-facing work behind the CreateArchive, BundleArchive, and Cleanup
//! actions. The executor decides what happens next; these functions only do
//! the work and report failure.

use crate::constants::storage::{MANIFEST_FILE, MAX_OBJECTS_PER_DELETE, RETURN_FILE};
use crate::models::{Batch, BundledArchives, SubmissionArchive, SubmitterContext};
use crate::storage::{
    locations, read_submitter_context, ObjectStore, StorageError, StorageResult,
};
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, error, warn};

/// Read every submission stored under `batch` and package it for submission.
///
/// Submissions are returned in arrival order; equal positions fall back to
/// submission id.
pub async fn create_archives(
    store: &dyn ObjectStore,
    batch: &Batch,
) -> StorageResult<Vec<SubmissionArchive>> {
    let objects = store.list_by_prefix(&batch.path).await?;
    let submission_ids: BTreeSet<&str> = objects
        .iter()
        .filter_map(|object| {
            let parsed = locations::split_submission_key(&batch.path, &object.key);
            if parsed.is_none() {
                warn!(batch_path = %batch.path, key = %object.key, "⚠️ Ignoring stray object in batch");
            }
            parsed.map(|(submission_id, _)| submission_id)
        })
        .collect();

    let mut sequenced = Vec::with_capacity(submission_ids.len());
    for submission_id in submission_ids {
        sequenced.push(read_archive(store, batch, submission_id).await?);
    }
    sequenced.sort_by_key(|(arrival_sequence, _)| *arrival_sequence);
    let archives: Vec<SubmissionArchive> =
        sequenced.into_iter().map(|(_, archive)| archive).collect();

    debug!(
        batch_id = batch.batch_id,
        batch_path = %batch.path,
        archive_count = archives.len(),
        "Created archives"
    );
    Ok(archives)
}

async fn read_archive(
    store: &dyn ObjectStore,
    batch: &Batch,
    submission_id: &str,
) -> StorageResult<(u64, SubmissionArchive)> {
    let folder = locations::submission_location(&batch.path, submission_id);
    let stored = read_submitter_context(store, &batch.path, submission_id).await?;
    let context = stored.context;

    let manifest_xml = read_text(store, &format!("{folder}{MANIFEST_FILE}")).await?;
    let return_xml = read_text(store, &format!("{folder}{RETURN_FILE}")).await?;
    let postmark = postmark_for(&context);

    Ok((
        stored.arrival_sequence,
        SubmissionArchive {
            context,
            manifest_xml,
            return_xml,
            postmark,
        },
    ))
}

async fn read_text(store: &dyn ObjectStore, key: &str) -> StorageResult<String> {
    let bytes = store.get(key).await?;
    String::from_utf8(bytes).map_err(|e| StorageError::serialization(key, e.to_string()))
}

/// Sign date, or today when the sign date cannot be parsed
pub fn postmark_for(context: &SubmitterContext) -> NaiveDate {
    context.signed_on().unwrap_or_else(|| {
        error!(
            submission_id = %context.submission_id,
            sign_date = %context.sign_date,
            "Unparseable sign date, postmarking with today's date"
        );
        Utc::now().date_naive()
    })
}

/// Combine a batch's archives into one bundle for the filing authority
pub fn bundle_archives(archives: Vec<SubmissionArchive>) -> Result<BundledArchives, String> {
    let mut seen = HashSet::new();
    for archive in &archives {
        let submission_id = archive.context.submission_id.as_str();
        if !seen.insert(submission_id) {
            return Err(format!("duplicate submission id {submission_id} in bundle"));
        }
        if archive.manifest_xml.trim().is_empty() || archive.return_xml.trim().is_empty() {
            return Err(format!("submission {submission_id} has an empty document"));
        }
    }
    Ok(BundledArchives::new(archives))
}

/// Delete everything stored under `batch`, at most 1000 keys per request.
///
/// Returns the number of objects removed.
pub async fn cleanup_batch(store: &dyn ObjectStore, batch: &Batch) -> StorageResult<usize> {
    let keys: Vec<String> = store
        .list_by_prefix(&batch.path)
        .await?
        .into_iter()
        .map(|object| object.key)
        .collect();

    for chunk in keys.chunks(MAX_OBJECTS_PER_DELETE) {
        store.delete_objects(chunk).await?;
    }
    Ok(keys.len())
}
