//! # Filing Authority Boundary
//!
//! The pipeline talks to the filing authority through `FilingAuthorityClient`
//! (login, submit, logout) and resolves per-worker session ids through
//! `IdentityLookup`. `SimulatedFilingClient` fabricates receipts for the
//! demo binary and test suites.

pub mod client;
pub mod errors;
pub mod identity;
pub mod simulated;

pub use client::FilingAuthorityClient;
pub use errors::{FilingError, FilingResult};
pub use identity::{IdentityLookup, StaticIdentityLookup};
pub use simulated::SimulatedFilingClient;
