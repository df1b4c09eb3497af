//! # Offline-Mode Breaker
//!
//! Process-wide two-state breaker gating contact with the filing authority.
//! The executor trips it when logout, the liveness probe, fails; the offline
//! probe resets it once login and logout succeed again. Transitions are
//! compare-and-set so redundant calls are no-ops.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfflineState {
    /// Filing authority reachable, submissions flow
    Online = 0,
    /// Outage detected, SubmitBundle short-circuits
    Offline = 1,
}

impl From<u8> for OfflineState {
    fn from(value: u8) -> Self {
        match value {
            0 => OfflineState::Online,
            _ => OfflineState::Offline,
        }
    }
}

#[derive(Debug)]
pub struct OfflineMode {
    name: String,
    state: AtomicU8,
    went_offline_at: Mutex<Option<Instant>>,
    times_enabled: AtomicU64,
}

impl Default for OfflineMode {
    fn default() -> Self {
        Self::new("filing_authority")
    }
}

impl OfflineMode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: AtomicU8::new(OfflineState::Online as u8),
            went_offline_at: Mutex::new(None),
            times_enabled: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> OfflineState {
        OfflineState::from(self.state.load(Ordering::Acquire))
    }

    pub fn is_enabled(&self) -> bool {
        self.state() == OfflineState::Offline
    }

    /// Online → Offline. Returns `true` only for the call that made the transition.
    pub fn enable(&self) -> bool {
        let transitioned = self
            .state
            .compare_exchange(
                OfflineState::Online as u8,
                OfflineState::Offline as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if transitioned {
            *self.went_offline_at.lock() = Some(Instant::now());
            self.times_enabled.fetch_add(1, Ordering::Relaxed);
            warn!(component = %self.name, "🔴 Offline mode enabled");
        }
        transitioned
    }

    /// Offline → Online. Returns `true` only for the call that made the transition.
    pub fn disable(&self) -> bool {
        let transitioned = self
            .state
            .compare_exchange(
                OfflineState::Offline as u8,
                OfflineState::Online as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if transitioned {
            let offline_for = self
                .went_offline_at
                .lock()
                .take()
                .map(|at| at.elapsed())
                .unwrap_or(Duration::ZERO);
            info!(
                component = %self.name,
                offline_ms = offline_for.as_millis() as u64,
                "🟢 Offline mode disabled"
            );
        }
        transitioned
    }

    /// How many times the breaker has tripped since start
    pub fn times_enabled(&self) -> u64 {
        self.times_enabled.load(Ordering::Relaxed)
    }
}
