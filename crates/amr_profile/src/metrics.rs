//! Sampling statistics for profiling runs.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use amr_profile::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let (profile, stats) = profile_timed(&field, center, &hierarchy, &bins, &options);
//! println!("{} samples landed outside the domain", stats.out_of_domain);
//! ```

#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Per-level sample counts, merged across parallel rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleCounts {
  /// Samples resolved at each level (index = level).
  pub per_level: Vec<usize>,
  /// Samples that fell back to the base grid from outside the domain.
  pub out_of_domain: usize,
}

impl SampleCounts {
  /// Record one sample resolved at `level`.
  #[inline]
  pub fn record(&mut self, level: u32, inside_domain: bool) {
    let level = level as usize;
    if self.per_level.len() <= level {
      self.per_level.resize(level + 1, 0);
    }
    self.per_level[level] += 1;
    if !inside_domain {
      self.out_of_domain += 1;
    }
  }

  /// Combine two partial counts.
  pub fn merge(mut self, other: Self) -> Self {
    if self.per_level.len() < other.per_level.len() {
      self.per_level.resize(other.per_level.len(), 0);
    }
    for (total, count) in self.per_level.iter_mut().zip(other.per_level) {
      *total += count;
    }
    self.out_of_domain += other.out_of_domain;
    self
  }
}

/// Statistics from a timed profiling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStats {
  /// Number of (cos θ, φ, r) samples written.
  pub sample_count: usize,
  /// Samples resolved at each level. Empty unless metrics are enabled.
  pub samples_per_level: Vec<usize>,
  /// Samples outside the base grid. Zero unless metrics are enabled.
  pub out_of_domain: usize,
  /// Total profiling time in microseconds.
  pub total_us: u64,
}
