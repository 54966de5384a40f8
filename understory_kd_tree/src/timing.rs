// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caller-owned build profiling.

use std::time::{Duration, Instant};

/// One finished phase of a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingEntry {
    /// Phase name, for example `"partition"`.
    pub label: &'static str,
    /// Wall-clock time spent in the phase.
    pub elapsed: Duration,
}

/// Scoped timing entries recorded while building a tree.
///
/// Pass one to [`SpatialTree::build_with_log`](crate::SpatialTree::build_with_log) to see
/// where build time goes. Entries accumulate across builds until [`BuildLog::clear`].
#[derive(Clone, Debug, Default)]
pub struct BuildLog {
    open: Vec<(&'static str, Instant)>,
    entries: Vec<TimingEntry>,
}

impl BuildLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin timing `label`.
    pub fn start(&mut self, label: &'static str) {
        self.open.push((label, Instant::now()));
    }

    /// Finish the most recent open entry named `label`.
    ///
    /// Stopping a label that was never started is ignored.
    pub fn stop(&mut self, label: &'static str) {
        let Some(pos) = self.open.iter().rposition(|(l, _)| *l == label) else {
            log::debug!("build log: stop without start for {label:?}");
            return;
        };
        let (label, started) = self.open.remove(pos);
        self.entries.push(TimingEntry {
            label,
            elapsed: started.elapsed(),
        });
    }

    /// Finished entries in completion order.
    pub fn entries(&self) -> &[TimingEntry] {
        &self.entries
    }

    /// Total time recorded under `label`.
    pub fn total(&self, label: &str) -> Duration {
        self.entries
            .iter()
            .filter(|e| e.label == label)
            .map(|e| e.elapsed)
            .sum()
    }

    /// Drop all entries, open or finished.
    pub fn clear(&mut self) {
        self.open.clear();
        self.entries.clear();
    }
}
