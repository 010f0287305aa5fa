//! LFU Cache Metrics
//!
//! Metrics specific to the LFU (Least Frequently Used) cache algorithm.

use super::{CacheMetrics, CoreCacheMetrics};
use std::collections::BTreeMap;

/// LFU-specific metrics (extends CoreCacheMetrics)
///
/// The frequency gauges (`min_frequency`, `total_frequency`,
/// `active_frequency_levels`) are refreshed by the segment after every
/// mutation, so they describe the current state rather than history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LfuCacheMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,

    /// Number of frequency bumps (every hit and every update bumps once)
    pub frequency_increments: u64,

    /// Number of aging passes run because the average frequency crossed the ceiling
    pub aging_passes: u64,

    /// Smallest frequency currently held by a live entry (0 when empty)
    pub min_frequency: u64,

    /// Sum of the frequencies of all live entries
    pub total_frequency: u64,

    /// Number of live entries
    pub live_entries: u64,

    /// Number of distinct frequency values currently in use
    pub active_frequency_levels: u64,
}

impl LfuCacheMetrics {
    /// Creates a zeroed set of LFU metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frequency bump.
    #[inline]
    pub fn record_frequency_increment(&mut self) {
        self.frequency_increments += 1;
    }

    /// Records an aging pass.
    #[inline]
    pub fn record_aging_pass(&mut self) {
        self.aging_passes += 1;
    }

    /// Refreshes the frequency gauges from the segment's bookkeeping.
    pub fn update_frequency_state(
        &mut self,
        min_frequency: u64,
        total_frequency: u64,
        live_entries: usize,
        active_frequency_levels: usize,
    ) {
        self.min_frequency = if live_entries == 0 { 0 } else { min_frequency };
        self.total_frequency = total_frequency;
        self.live_entries = live_entries as u64;
        self.active_frequency_levels = active_frequency_levels as u64;
    }

    /// Average frequency of the live entries, or 0.0 when empty.
    pub fn average_frequency(&self) -> f64 {
        if self.live_entries > 0 {
            self.total_frequency as f64 / self.live_entries as f64
        } else {
            0.0
        }
    }

    /// Converts LFU metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        metrics.insert(
            "active_frequency_levels".to_string(),
            self.active_frequency_levels as f64,
        );
        metrics.insert("aging_passes".to_string(), self.aging_passes as f64);
        metrics.insert("average_frequency".to_string(), self.average_frequency());
        metrics.insert(
            "frequency_increments".to_string(),
            self.frequency_increments as f64,
        );
        metrics.insert("live_entries".to_string(), self.live_entries as f64);
        metrics.insert("min_frequency".to_string(), self.min_frequency as f64);
        metrics.insert("total_frequency".to_string(), self.total_frequency as f64);

        metrics
    }
}

impl CacheMetrics for LfuCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}
