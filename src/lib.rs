#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Submit Core
//!
//! Batch assembly, action pipeline, and failure recovery for delivering tax
//! return submissions to a filing authority.
//!
//! ## Overview
//!
//! Individually dispatched submissions are grouped into bounded batches
//! (size or timeout), and each batch is driven through a linear pipeline of
//! stages implemented as tagged actions on a shared queue:
//!
//! archive → bundle → submit → cleanup
//!
//! Filing-authority outages trip an offline-mode breaker and the failing
//! action is retried verbatim once the authority is back. Content rejections
//! split the batch into single-submission batches that are retried on their
//! own, so one bad return cannot block the rest of its batch.
//!
//! ## Module Organization
//!
//! - [`batching`] - Assembler, batch processor, and error-batch recovery
//! - [`pipeline`] - Actions, queue, in-progress set, and the executor
//! - [`storage`] - Object-store seam, key layout, and batch bookkeeping
//! - [`filing`] - Filing-authority client and identity lookup seams
//! - [`messaging`] - Dispatch decoding and outbound notifications
//! - [`resilience`] - Offline-mode breaker
//! - [`config`] - Layered configuration
//! - [`service`] - Composition root
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use submit_core::config::SubmitConfig;
//! use submit_core::filing::{SimulatedFilingClient, StaticIdentityLookup};
//! use submit_core::messaging::{MessagePublisher, RecordingPublisher};
//! use submit_core::service::{ServiceCollaborators, SubmitService};
//! use submit_core::storage::{InMemoryObjectStore, SystemClock};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = SubmitService::new(
//!     SubmitConfig::default(),
//!     ServiceCollaborators {
//!         store: Arc::new(InMemoryObjectStore::new()),
//!         clock: Arc::new(SystemClock),
//!         filing_client: Arc::new(SimulatedFilingClient::default()),
//!         identity: Arc::new(StaticIdentityLookup::default()),
//!         pending_submission_publisher: Arc::new(RecordingPublisher::new("pending")),
//!         confirmation_publishers: vec![
//!             Arc::new(RecordingPublisher::new("confirmations")) as Arc<dyn MessagePublisher>
//!         ],
//!     },
//! )?;
//!
//! let scheduler = service.start().await?;
//! service
//!     .consumer()
//!     .on_message(r#"{"headers":{"version":"1"},"payload":{}}"#)
//!     .await
//!     .ok();
//! scheduler.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod batching;
pub mod config;
pub mod constants;
pub mod error;
pub mod filing;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod pipeline;
pub mod resilience;
pub mod scheduler;
pub mod service;
pub mod storage;

pub use config::{ConfigManager, SubmitConfig};
pub use constants::{FailureCategory, FailureDetail, SubmissionEventType};
pub use error::{SubmitError, SubmitResult};
pub use models::{Batch, Submission, SubmitterContext};
pub use service::{ServiceCollaborators, SubmitService};
