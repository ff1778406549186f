//! Build context providing per-stage timing and log forwarding
//!
//! Timers are accumulated per [`BuildStage`] and reported through the `log`
//! facade at debug level once a build finishes.

use std::collections::HashMap;
use std::time::Duration;
use web_time::Instant;

/// Pipeline stages that can be timed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildStage {
    /// Whole build
    Total,
    /// Walkable triangle marking
    AreaMarking,
    /// Heightfield rasterization
    Rasterization,
    /// Span filters
    Filtering,
    /// Walkable cell construction
    Cells,
    /// Erosion by agent radius
    Erosion,
    /// Region flood fill
    Regions,
}

impl BuildStage {
    pub fn name(&self) -> &'static str {
        match self {
            BuildStage::Total => "total",
            BuildStage::AreaMarking => "area marking",
            BuildStage::Rasterization => "rasterization",
            BuildStage::Filtering => "filtering",
            BuildStage::Cells => "cells",
            BuildStage::Erosion => "erosion",
            BuildStage::Regions => "regions",
        }
    }
}

/// Accumulated time for one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerEntry {
    /// Total time spent in the stage
    pub duration: Duration,
    /// Number of times the timer was stopped
    pub count: usize,
}

/// Context threaded through a build
#[derive(Debug)]
pub struct BuildContext {
    active_timers: HashMap<BuildStage, Instant>,
    timers: HashMap<BuildStage, TimerEntry>,
    enable_timing: bool,
    warnings: usize,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildContext {
    pub fn new() -> Self {
        Self {
            active_timers: HashMap::new(),
            timers: HashMap::new(),
            enable_timing: true,
            warnings: 0,
        }
    }

    /// Enables or disables performance timing
    pub fn set_timing_enabled(&mut self, enabled: bool) {
        self.enable_timing = enabled;
    }

    pub fn start_timer(&mut self, stage: BuildStage) {
        if self.enable_timing {
            self.active_timers.insert(stage, Instant::now());
        }
    }

    /// Stops the timer and returns the elapsed time since it started
    pub fn stop_timer(&mut self, stage: BuildStage) -> Option<Duration> {
        if !self.enable_timing {
            return None;
        }
        let start = self.active_timers.remove(&stage)?;
        let elapsed = start.elapsed();
        let entry = self.timers.entry(stage).or_default();
        entry.duration += elapsed;
        entry.count += 1;
        Some(elapsed)
    }

    /// Runs `f` under the timer for `stage`
    pub fn timed<T>(&mut self, stage: BuildStage, f: impl FnOnce(&mut Self) -> T) -> T {
        self.start_timer(stage);
        let result = f(self);
        self.stop_timer(stage);
        result
    }

    pub fn timer(&self, stage: BuildStage) -> Option<&TimerEntry> {
        self.timers.get(&stage)
    }

    pub fn log_info(&mut self, message: impl AsRef<str>) {
        log::info!("{}", message.as_ref());
    }

    pub fn log_warning(&mut self, message: impl AsRef<str>) {
        self.warnings += 1;
        log::warn!("{}", message.as_ref());
    }

    /// Warnings raised so far
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Writes the accumulated timings to the debug log
    pub fn log_timings(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let mut stages: Vec<_> = self.timers.iter().collect();
        stages.sort_by_key(|(stage, _)| **stage);
        for (stage, entry) in stages {
            log::debug!(
                "{:>14}: {:>8.3} ms ({}x)",
                stage.name(),
                entry.duration.as_secs_f64() * 1000.0,
                entry.count
            );
        }
    }

    /// Clears timers and counters
    pub fn reset(&mut self) {
        self.active_timers.clear();
        self.timers.clear();
        self.warnings = 0;
    }
}
