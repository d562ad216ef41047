//! Snapshot reporter for widget-based front-ends.
//!
//! The reporter keeps a [`Dashboard`] (progress bar value, status line,
//! trace line and one labelled text per stage) and publishes every change
//! through a `tokio::sync::watch` channel. A UI task holds the receiver and
//! re-renders whenever the snapshot changes.

use serde::Serialize;
use tokio::sync::watch;

use super::{clamp_fraction, ProgressReporter, StepKey};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepStatus {
    pub message: String,
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    /// Progress bar value in `[0, 1]`.
    pub progress: f32,
    /// Latest message from any step.
    pub status: String,
    pub trace: Option<String>,
    pub planning: StepStatus,
    pub searching: StepStatus,
    pub writing: StepStatus,
}

impl Dashboard {
    fn step_mut(&mut self, step: StepKey) -> Option<&mut StepStatus> {
        match step {
            StepKey::Planning => Some(&mut self.planning),
            StepKey::Searching => Some(&mut self.searching),
            StepKey::Writing => Some(&mut self.writing),
            StepKey::Trace | StepKey::Starting => None,
        }
    }

    pub fn step(&self, step: StepKey) -> Option<&StepStatus> {
        match step {
            StepKey::Planning => Some(&self.planning),
            StepKey::Searching => Some(&self.searching),
            StepKey::Writing => Some(&self.writing),
            StepKey::Trace | StepKey::Starting => None,
        }
    }
}

pub struct DashboardReporter {
    tx: watch::Sender<Dashboard>,
}

impl DashboardReporter {
    /// Create a reporter and a receiver observing its snapshots.
    pub fn new() -> (Self, watch::Receiver<Dashboard>) {
        let (tx, rx) = watch::channel(Dashboard::default());
        (Self { tx }, rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<Dashboard> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Dashboard {
        self.tx.borrow().clone()
    }
}

impl ProgressReporter for DashboardReporter {
    fn update(&self, step: StepKey, message: &str, done: bool) {
        self.tx.send_modify(|board| {
            board.status = message.to_string();
            match step {
                StepKey::Trace => board.trace = Some(message.to_string()),
                StepKey::Starting => {}
                _ => {
                    if let Some(status) = board.step_mut(step) {
                        status.message = message.to_string();
                        status.done = done;
                    }
                }
            }
        });
    }

    fn mark_done(&self, step: StepKey) {
        self.tx.send_modify(|board| {
            if let Some(status) = board.step_mut(step) {
                status.done = true;
            }
        });
    }

    fn set_fraction(&self, _step: StepKey, fraction: f32) {
        let fraction = clamp_fraction(fraction);
        self.tx.send_modify(|board| board.progress = fraction);
    }
}
