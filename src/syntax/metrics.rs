// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Counters and timings for highlighting passes.

use std::time::Duration;

/// Outcome counters and pass timings kept by the scheduler.
///
/// Durations measure dispatch-to-validation wall time, so they include both
/// the engine computation and however long the completion waited to be
/// drained on the mutator context.
#[derive(Debug, Clone, Default)]
pub struct SchedulerMetrics {
    /// Passes handed to a worker thread.
    pub passes_dispatched: usize,
    /// Passes whose result was validated and merged.
    pub passes_merged: usize,
    /// Passes whose result was discarded (stale, shrunk, or engine-declined).
    pub passes_discarded: usize,
    /// Passes the delegate gate declined before dispatch.
    pub gate_declined: usize,
    /// Trigger invocations skipped because no engine or language was set.
    pub skipped_unconfigured: usize,
    /// Total wall time across completed passes.
    pub total_pass_time: Duration,
    /// Longest single completed pass.
    pub max_pass_time: Duration,
}

impl SchedulerMetrics {
    /// Records a merged pass and its wall time.
    pub fn record_merge(&mut self, elapsed: Duration) {
        self.passes_merged += 1;
        self.record_time(elapsed);
    }

    /// Records a discarded pass and its wall time.
    pub fn record_discard(&mut self, elapsed: Duration) {
        self.passes_discarded += 1;
        self.record_time(elapsed);
    }

    fn record_time(&mut self, elapsed: Duration) {
        self.total_pass_time += elapsed;
        if elapsed > self.max_pass_time {
            self.max_pass_time = elapsed;
        }
    }

    /// Passes that completed, merged or not.
    pub fn passes_completed(&self) -> usize {
        self.passes_merged + self.passes_discarded
    }

    /// Average wall time per completed pass.
    pub fn avg_pass_time(&self) -> Duration {
        let completed = self.passes_completed();
        if completed == 0 {
            Duration::ZERO
        } else {
            self.total_pass_time / completed as u32
        }
    }

    /// Resets every counter and timing to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
