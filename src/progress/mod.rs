//! # Progress Reporting
//!
//! Every stage reports progress through a [`ProgressReporter`]. The stages
//! never know what is on the other end: the CLI prints lines
//! ([`ConsoleReporter`]), interactive front-ends watch a snapshot
//! ([`DashboardReporter`]). Both receive the identical event sequence.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

mod console;
mod dashboard;

pub use console::ConsoleReporter;
pub use dashboard::{Dashboard, DashboardReporter, StepStatus};

/// The steps a run reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKey {
    /// Correlation id of the run.
    Trace,
    /// The run has begun.
    Starting,
    Planning,
    Searching,
    Writing,
}

impl StepKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Starting => "starting",
            Self::Planning => "planning",
            Self::Searching => "searching",
            Self::Writing => "writing",
        }
    }

    /// Informational steps are shown without a completion mark.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::Trace | Self::Starting)
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single progress update. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub step_key: StepKey,
    pub message: String,
    pub done: bool,
}

impl ProgressEvent {
    pub fn new(step_key: StepKey, message: impl Into<String>, done: bool) -> Self {
        Self {
            step_key,
            message: message.into(),
            done,
        }
    }
}

/// Sink for progress updates.
///
/// Methods take `&self`: implementations that hold state use interior
/// mutability, so one reporter can be shared by reference with every stage.
pub trait ProgressReporter: Send + Sync {
    /// Set the text of `step`, optionally marking it complete.
    fn update(&self, step: StepKey, message: &str, done: bool);

    /// Mark `step` complete, keeping its last message.
    fn mark_done(&self, step: StepKey);

    /// Report fractional completion of `step` in `[0, 1]`.
    fn set_fraction(&self, _step: StepKey, _fraction: f32) {}
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &R {
    fn update(&self, step: StepKey, message: &str, done: bool) {
        (**self).update(step, message, done)
    }

    fn mark_done(&self, step: StepKey) {
        (**self).mark_done(step)
    }

    fn set_fraction(&self, step: StepKey, fraction: f32) {
        (**self).set_fraction(step, fraction)
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for Arc<R> {
    fn update(&self, step: StepKey, message: &str, done: bool) {
        (**self).update(step, message, done)
    }

    fn mark_done(&self, step: StepKey) {
        (**self).mark_done(step)
    }

    fn set_fraction(&self, step: StepKey, fraction: f32) {
        (**self).set_fraction(step, fraction)
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for Box<R> {
    fn update(&self, step: StepKey, message: &str, done: bool) {
        (**self).update(step, message, done)
    }

    fn mark_done(&self, step: StepKey) {
        (**self).mark_done(step)
    }

    fn set_fraction(&self, step: StepKey, fraction: f32) {
        (**self).set_fraction(step, fraction)
    }
}

/// Clamp a reported fraction into `[0, 1]`; NaN counts as no progress.
pub(crate) fn clamp_fraction(fraction: f32) -> f32 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}
