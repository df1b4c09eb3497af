//! # Resilience Module
//!
//! Fault isolation for the filing-authority boundary.
//!
//! ```rust
//! use submit_core::resilience::OfflineMode;
//!
//! let breaker = OfflineMode::default();
//! assert!(breaker.enable());
//! assert!(breaker.is_enabled());
//! assert!(breaker.disable());
//! ```

pub mod offline_mode;

pub use offline_mode::{OfflineMode, OfflineState};
