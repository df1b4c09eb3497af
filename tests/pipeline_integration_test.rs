//! End-to-end pipeline behavior: dispatch → batch → archive → bundle →
//! submit → notify → cleanup, including every filing-authority failure branch.

mod common;

use common::*;
use submit_core::models::Batch;
use submit_core::pipeline::ActionKind;
use submit_core::storage::ObjectStore;
use submit_core::SubmitError;
use tokio_test::assert_err;

fn first_batch() -> Batch {
    Batch::for_worker(WORKER_ID, 2024, 0)
}

#[tokio::test]
async fn test_full_batch_is_submitted_and_cleaned_up() {
    let harness = TestHarness::builder().with_max_batch_size(3).build().await;
    for id in ["sub-3", "sub-1", "sub-2"] {
        harness.dispatch(id).await;
    }

    assert!(harness.service.in_progress().contains(&first_batch()));
    assert_eq!(harness.service.assembler().current_batch_id().await, 1);

    let executed = harness.service.drain().await;
    assert_eq!(executed, 4, "create, bundle, submit, cleanup");

    assert_eq!(
        harness.filing.submitted_bundles(),
        vec![vec!["sub-3".to_string(), "sub-1".to_string(), "sub-2".to_string()]],
        "bundle keeps arrival order"
    );
    assert_eq!(harness.filing.login_count(), 1);
    assert_eq!(harness.filing.logout_count(), 1);

    let pending = harness.pending.json_messages();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["headers"]["version"], "1");
    assert_eq!(
        pending[0]["payload"]["pendingSubmissions"]
            .as_array()
            .unwrap()
            .len(),
        3
    );

    let confirmations = harness.confirmations.json_messages();
    assert_eq!(confirmations.len(), 1);
    assert_eq!(confirmations[0]["headers"]["version"], "2");

    let entries = harness.confirmation_entries();
    assert_eq!(entries.len(), 3);
    for entry in &entries {
        assert_eq!(entry["eventType"], "SUBMITTED");
        assert!(entry["receipt"]["receiptId"].is_string());
        assert_eq!(
            entry["receipt"]["submissionReceivedAt"],
            "2025-03-30T00:00:00Z"
        );
        assert!(entry.get("failureMetadata").is_none());
    }

    assert!(harness.service.in_progress().is_empty());
    assert!(harness.store.is_empty());
    let stats = harness.service.executor().stats();
    assert_eq!(stats.batches_submitted, 1);
    assert_eq!(stats.actions_executed, 4);
}

#[tokio::test]
async fn test_timeout_flushes_partial_batch() {
    let harness = TestHarness::builder().with_max_batch_size(10).build().await;
    harness.dispatch("sub-1").await;
    assert!(harness.service.queue().is_empty());

    let flushed = harness.service.assembler().on_timeout().await;
    assert_eq!(flushed, Some(first_batch()));
    assert_eq!(harness.service.assembler().on_timeout().await, None);

    harness.service.drain().await;
    assert_eq!(harness.filing.submitted_bundles().len(), 1);
    assert!(harness.service.in_progress().is_empty());
}

#[tokio::test]
async fn test_single_submission_rejection_reports_failed() {
    let harness = TestHarness::builder().with_max_batch_size(1).build().await;
    harness.filing.set_reject_submissions(true);
    harness.dispatch("sub-1").await;

    harness.service.drain().await;

    assert!(harness.pending.is_empty());
    let entries = harness.confirmation_entries();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry["eventType"], "FAILED");
    assert_eq!(entry["receipt"]["submissionId"], "sub-1");
    assert!(entry["receipt"]["receiptId"].is_null());
    assert!(entry["receipt"]["submissionReceivedAt"].is_null());
    assert!(entry["failureMetadata"]["errorMessage"]
        .as_str()
        .unwrap()
        .starts_with("Submission to filing authority failed, "));
    assert_eq!(entry["failureMetadata"]["failureCategory"], "processing");
    assert_eq!(
        entry["failureMetadata"]["failureDetail"],
        "submission_processing"
    );

    assert!(harness.service.in_progress().is_empty());
    assert!(harness.store.is_empty());
    assert!(!harness.service.offline_mode().is_enabled());
}

#[tokio::test]
async fn test_multi_submission_rejection_splits_and_retries_individually() {
    let harness = TestHarness::builder().with_max_batch_size(2).build().await;
    harness.filing.set_reject_submissions(true);
    harness.dispatch("sub-b").await;
    harness.dispatch("sub-a").await;

    let executed = harness.service.drain().await;
    assert_eq!(executed, 5, "create, bundle, submit, split, cleanup");
    assert!(harness.confirmations.is_empty());
    assert!(harness.service.in_progress().is_empty());

    let split_root = format!("pre-submission-batching/errors/{WORKER_ID}/2024/0/");
    assert!(harness
        .store
        .contains(&format!("{split_root}0/sub-b/submission.xml")));
    assert!(harness
        .store
        .contains(&format!("{split_root}1/sub-a/userContext.json")));
    assert_eq!(harness.store.len(), 6);

    harness.filing.set_reject_submissions(false);
    assert_eq!(harness.service.recovery().poll().await.unwrap(), 2);
    harness.service.drain().await;

    assert_eq!(
        harness.filing.submitted_bundles(),
        vec![vec!["sub-b".to_string()], vec!["sub-a".to_string()]]
    );
    let entries = harness.confirmation_entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["eventType"] == "SUBMITTED"));

    assert!(harness.store.is_empty());
    assert!(harness.service.in_progress().is_empty());
    assert_eq!(harness.service.recovery().poll().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rejection_with_failed_logout_goes_offline_and_retries_same_submit() {
    let harness = TestHarness::builder().with_max_batch_size(1).build().await;
    harness.filing.set_reject_submissions(true);
    harness.filing.set_fail_logout(true);
    harness.dispatch("sub-1").await;

    let executed = harness.service.drain().await;
    assert_eq!(executed, 3, "drain stops once offline");

    assert!(harness.service.offline_mode().is_enabled());
    let queued = harness.service.queue().snapshot();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].kind(), ActionKind::SubmitBundle);
    assert!(harness.pending.is_empty());
    assert!(harness.confirmations.is_empty());
    assert!(harness.service.in_progress().contains(&first_batch()));
    assert_eq!(harness.service.executor().stats().actions_requeued, 1);

    harness.filing.set_reject_submissions(false);
    harness.filing.set_fail_logout(false);
    assert!(harness.service.executor().probe_filing_authority().await);
    assert!(!harness.service.offline_mode().is_enabled());

    assert_eq!(harness.service.drain().await, 2, "submit, cleanup");
    let entries = harness.confirmation_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["eventType"], "SUBMITTED");
    assert!(harness.service.in_progress().is_empty());
}

#[tokio::test]
async fn test_unreachable_authority_keeps_action_until_probe_succeeds() {
    let harness = TestHarness::builder().with_max_batch_size(1).build().await;
    harness.filing.set_unreachable(true);
    harness.dispatch("sub-1").await;

    harness.service.drain().await;
    assert!(harness.service.offline_mode().is_enabled());
    assert!(!harness.service.executor().probe_filing_authority().await);
    assert!(harness.service.offline_mode().is_enabled());
    assert_eq!(harness.service.queue().len(), 1);

    harness.filing.set_unreachable(false);
    assert!(harness.service.executor().probe_filing_authority().await);
    harness.service.drain().await;

    assert_eq!(harness.filing.submitted_bundles().len(), 1);
    assert!(harness.service.in_progress().is_empty());
}

#[tokio::test]
async fn test_logout_failure_after_successful_submit_requeues_submit() {
    let harness = TestHarness::builder().with_max_batch_size(1).build().await;
    harness.filing.set_fail_logout(true);
    harness.dispatch("sub-1").await;

    harness.service.drain().await;

    assert!(harness.service.offline_mode().is_enabled());
    assert_eq!(harness.filing.submitted_bundles().len(), 1);
    assert!(harness.confirmations.is_empty());
    assert_eq!(
        harness.service.queue().snapshot()[0].kind(),
        ActionKind::SubmitBundle
    );
}

#[tokio::test]
async fn test_login_failure_with_reachable_authority_leaves_batch_in_progress() {
    let harness = TestHarness::builder().with_max_batch_size(1).build().await;
    harness.filing.set_fail_login(true);
    harness.dispatch("sub-1").await;

    let executed = harness.service.drain().await;
    assert_eq!(executed, 3);

    assert_eq!(harness.filing.logout_count(), 1);
    assert_eq!(harness.filing.submit_count(), 0);
    assert!(!harness.service.offline_mode().is_enabled());
    assert!(harness.service.queue().is_empty());
    assert!(harness.service.in_progress().contains(&first_batch()));
    assert!(harness.confirmations.is_empty());
}

#[tokio::test]
async fn test_archive_failure_is_logged_and_batch_stays_in_progress() {
    let harness = TestHarness::builder().with_max_batch_size(1).build().await;
    harness.dispatch("sub-1").await;
    harness
        .store
        .delete_objects(&[format!("{}sub-1/manifest.xml", first_batch().path)])
        .await
        .unwrap();

    assert_eq!(harness.service.drain().await, 1);
    assert!(harness.service.queue().is_empty());
    assert!(harness.service.in_progress().contains(&first_batch()));
    assert!(harness.confirmations.is_empty());
    assert_eq!(harness.filing.login_count(), 0);
}

#[tokio::test]
async fn test_cleanup_storage_failure_keeps_batch_in_progress() {
    let harness = TestHarness::builder().with_max_batch_size(1).build().await;
    harness.dispatch("sub-1").await;
    harness.store.set_fail_deletes(true);

    assert_eq!(harness.service.drain().await, 4);
    assert_eq!(harness.confirmation_entries().len(), 1);
    assert!(harness.service.in_progress().contains(&first_batch()));
    assert_eq!(
        harness
            .service
            .processor()
            .process_old_batches(None)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_bundle_failure_reports_every_submission_failed() {
    let harness = TestHarness::builder().with_max_batch_size(2).build().await;
    harness
        .dispatch_raw(&DispatchBuilder::new("sub-1").with_manifest_xml("").build())
        .await;
    harness.dispatch("sub-2").await;

    let executed = harness.service.drain().await;
    assert_eq!(executed, 3, "create, bundle, cleanup");
    assert_eq!(harness.filing.submit_count(), 0);

    let entries = harness.confirmation_entries();
    assert_eq!(entries.len(), 2);
    for entry in &entries {
        assert_eq!(entry["eventType"], "FAILED");
        assert!(entry["failureMetadata"]["errorMessage"]
            .as_str()
            .unwrap()
            .starts_with("Bundling failed, "));
    }
    assert!(harness.store.is_empty());
    assert!(harness.service.in_progress().is_empty());
}

#[tokio::test]
async fn test_submit_disabled_cleans_up_without_contacting_authority() {
    let harness = TestHarness::builder()
        .with_max_batch_size(2)
        .with_submit_enabled(false)
        .build()
        .await;
    harness.dispatch("sub-1").await;
    harness.dispatch("sub-2").await;

    assert_eq!(harness.service.drain().await, 4);
    assert_eq!(harness.filing.login_count(), 0);
    assert!(harness.pending.is_empty());
    assert!(harness.confirmations.is_empty());
    assert!(harness.store.is_empty());
    assert!(harness.service.in_progress().is_empty());
}

#[tokio::test]
async fn test_publish_flags_suppress_notifications() {
    let harness = TestHarness::builder()
        .with_max_batch_size(1)
        .with_publishing(false, true)
        .build()
        .await;
    harness.dispatch("sub-1").await;
    harness.service.drain().await;

    assert!(harness.pending.is_empty());
    assert_eq!(harness.confirmations.len(), 1);
}

#[tokio::test]
async fn test_failed_publisher_does_not_block_cleanup() {
    let harness = TestHarness::builder().with_max_batch_size(1).build().await;
    harness.confirmations.set_fail(true);
    harness.dispatch("sub-1").await;

    assert_eq!(harness.service.drain().await, 4);
    assert_eq!(harness.pending.len(), 1);
    assert!(harness.service.in_progress().is_empty());
}

#[tokio::test]
async fn test_identity_override_replaces_configured_session() {
    let harness = TestHarness::builder()
        .with_session_id("default-session")
        .with_identity_override("worker-session-7")
        .build()
        .await;

    assert_eq!(harness.filing.session_id(), "worker-session-7");
    assert_eq!(harness.service.executor().session_id(), "worker-session-7");
}

#[tokio::test]
async fn test_missing_identity_override_keeps_configured_session() {
    let harness = TestHarness::builder()
        .with_session_id("default-session")
        .build()
        .await;

    assert_eq!(harness.filing.session_id(), "default-session");
}

#[tokio::test]
async fn test_unsupported_dispatch_version_is_rejected() {
    let harness = TestHarness::builder().build().await;

    let raw = DispatchBuilder::new("sub-1").with_version(Some("9")).build();
    let err = assert_err!(harness.service.consumer().on_message(&raw).await);
    assert!(matches!(err, SubmitError::UnsupportedMessageVersion { .. }));

    let raw = DispatchBuilder::new("sub-1").with_version(None).build();
    assert_err!(harness.service.consumer().on_message(&raw).await);
    assert_err!(harness.service.consumer().on_message("not json").await);

    assert!(harness.store.is_empty());
    assert_eq!(harness.service.assembler().current_size().await, 0);
}

#[tokio::test]
async fn test_restarted_worker_resumes_unprocessed_batches() {
    let first = TestHarness::builder().with_max_batch_size(5).build().await;
    first.dispatch("sub-1").await;
    first.dispatch("sub-2").await;
    assert!(first.service.queue().is_empty());

    first.clock.advance(chrono::Duration::minutes(2));
    let restarted = TestHarness::builder()
        .with_max_batch_size(5)
        .restarted_from(&first)
        .build()
        .await;

    assert_eq!(restarted.service.assembler().current_batch_id().await, 1);
    assert_eq!(
        restarted
            .service
            .assembler()
            .resume_unprocessed_batches()
            .await
            .unwrap(),
        1
    );
    assert!(restarted.service.in_progress().contains(&first_batch()));

    restarted.service.drain().await;
    assert_eq!(
        restarted.filing.submitted_bundles(),
        vec![vec!["sub-1".to_string(), "sub-2".to_string()]]
    );
    assert!(restarted.store.is_empty());
}

#[tokio::test]
async fn test_restart_within_timeout_keeps_writing_same_batch() {
    let first = TestHarness::builder().with_max_batch_size(5).build().await;
    first.dispatch("sub-1").await;

    first.clock.advance(chrono::Duration::seconds(10));
    let restarted = TestHarness::builder()
        .with_max_batch_size(5)
        .restarted_from(&first)
        .build()
        .await;

    assert_eq!(restarted.service.assembler().current_batch_id().await, 0);
    assert_eq!(
        restarted
            .service
            .assembler()
            .resume_unprocessed_batches()
            .await
            .unwrap(),
        0
    );

    restarted.dispatch("sub-2").await;
    assert!(restarted
        .store
        .contains("pre-submission-batching/it-worker/2024/0/sub-2/manifest.xml"));
}

#[tokio::test]
async fn test_restarted_partial_batch_is_flushed_by_timeout() {
    let first = TestHarness::builder().with_max_batch_size(5).build().await;
    first.dispatch("sub-2").await;
    first.dispatch("sub-1").await;

    first.clock.advance(chrono::Duration::seconds(10));
    let restarted = TestHarness::builder()
        .with_max_batch_size(5)
        .restarted_from(&first)
        .build()
        .await;
    assert_eq!(restarted.service.assembler().current_batch_id().await, 0);
    assert_eq!(restarted.service.assembler().current_size().await, 2);

    restarted.clock.advance(chrono::Duration::minutes(5));
    assert_eq!(
        restarted
            .service
            .assembler()
            .resume_unprocessed_batches()
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        restarted.service.assembler().on_timeout().await,
        Some(first_batch())
    );
    restarted.service.drain().await;

    assert_eq!(
        restarted.filing.submitted_bundles(),
        vec![vec!["sub-2".to_string(), "sub-1".to_string()]]
    );
    assert!(restarted.store.is_empty());
    assert_eq!(restarted.service.assembler().current_batch_id().await, 1);
}
