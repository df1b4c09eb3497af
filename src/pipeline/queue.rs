//! # Action Queue
//!
//! Two FIFO lanes shared by every producer and executor worker. The
//! in-progress lane always drains first, so a batch already in the pipeline
//! finishes before the next new batch starts.

use super::action::{Action, Lane};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Lanes {
    new_actions: VecDeque<Action>,
    in_progress_actions: VecDeque<Action>,
}

#[derive(Debug, Default)]
pub struct ActionQueue {
    lanes: Mutex<Lanes>,
    available: Notify,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the lane the action belongs in
    pub fn push(&self, action: Action) {
        {
            let mut lanes = self.lanes.lock();
            match action.lane() {
                Lane::New => lanes.new_actions.push_back(action),
                Lane::InProgress => lanes.in_progress_actions.push_back(action),
            }
        }
        self.available.notify_one();
    }

    /// Put an action back at the head of its lane
    pub fn push_front(&self, action: Action) {
        {
            let mut lanes = self.lanes.lock();
            match action.lane() {
                Lane::New => lanes.new_actions.push_front(action),
                Lane::InProgress => lanes.in_progress_actions.push_front(action),
            }
        }
        self.available.notify_one();
    }

    pub fn try_next(&self) -> Option<Action> {
        let mut lanes = self.lanes.lock();
        lanes
            .in_progress_actions
            .pop_front()
            .or_else(|| lanes.new_actions.pop_front())
    }

    /// Wait until an action is available
    pub async fn next(&self) -> Action {
        loop {
            if let Some(action) = self.try_next() {
                return action;
            }
            self.available.notified().await;
        }
    }

    pub fn len(&self) -> usize {
        let lanes = self.lanes.lock();
        lanes.new_actions.len() + lanes.in_progress_actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn new_len(&self) -> usize {
        self.lanes.lock().new_actions.len()
    }

    pub fn in_progress_len(&self) -> usize {
        self.lanes.lock().in_progress_actions.len()
    }

    /// Copy of every queued action, in-progress lane first
    pub fn snapshot(&self) -> Vec<Action> {
        let lanes = self.lanes.lock();
        lanes
            .in_progress_actions
            .iter()
            .chain(lanes.new_actions.iter())
            .cloned()
            .collect()
    }
}
