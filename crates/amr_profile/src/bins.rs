//! Bin resolution - angular and radial bin centers plus per-radius target
//! levels.
//!
//! # Angular Bins
//!
//! Each angular axis is given either explicitly or by a count `N`, which
//! generates `N` evenly spaced interior centers:
//!
//! ```text
//! phi:       linspace(-π + π/N, π - π/N, N)
//! cos(θ):    linspace(-1 + 1/N, 1 - 1/N, N)
//! ```
//!
//! # Radial Bins
//!
//! Exactly one of: explicit radii, `(rmin, rmax, dex)` or
//! `(rmin, rmax, delta)`. Generated vectors always have odd length
//! `2 * floor(count / 2) + 1` and span `rmin..=rmax`.
//!
//! # Target Levels
//!
//! Generated radii sample the finest level whose cell is still at least as
//! large as the local radial step:
//!
//! ```text
//! level[k] = clip(floor(log2(dx0 / step[k])), 0, max_level)
//! step[0]  = r[1] - r[0],  step[k] = r[k] - r[k-1]
//! ```
//!
//! Explicit radii carry no sampling step of their own and target the finest
//! level of the hierarchy.

use std::f64::consts::PI;

use crate::error::{AngularAxis, ConfigurationError, Result};
use crate::hierarchy::PatchHierarchy;

/// Bin configuration, mirroring the keyword surface of a profiling call.
///
/// Every axis needs exactly one specification; [`BinSpec::resolve`] rejects
/// missing or ambiguous ones before any sampling happens.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BinSpec {
  phi_bins: Option<Vec<f64>>,
  phi_count: Option<usize>,
  cos_theta_bins: Option<Vec<f64>>,
  cos_theta_count: Option<usize>,
  radii: Option<Vec<f64>>,
  rmin: Option<f64>,
  rmax: Option<f64>,
  dex_step: Option<f64>,
  delta_step: Option<f64>,
}

impl BinSpec {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_phi_bins(mut self, bins: Vec<f64>) -> Self {
    self.phi_bins = Some(bins);
    self
  }

  pub fn with_phi_count(mut self, count: usize) -> Self {
    self.phi_count = Some(count);
    self
  }

  pub fn with_cos_theta_bins(mut self, bins: Vec<f64>) -> Self {
    self.cos_theta_bins = Some(bins);
    self
  }

  pub fn with_cos_theta_count(mut self, count: usize) -> Self {
    self.cos_theta_count = Some(count);
    self
  }

  /// Explicit radial bin centers.
  pub fn with_radii(mut self, radii: Vec<f64>) -> Self {
    self.radii = Some(radii);
    self
  }

  /// Logarithmic radii from `rmin` to `rmax`, `dex` decades per bin.
  pub fn with_log_radii(self, rmin: f64, rmax: f64, dex: f64) -> Self {
    self.with_rmin(rmin).with_rmax(rmax).with_dex_step(dex)
  }

  /// Linear radii from `rmin` to `rmax`, `delta` apart.
  pub fn with_linear_radii(self, rmin: f64, rmax: f64, delta: f64) -> Self {
    self.with_rmin(rmin).with_rmax(rmax).with_delta_step(delta)
  }

  pub fn with_rmin(mut self, rmin: f64) -> Self {
    self.rmin = Some(rmin);
    self
  }

  pub fn with_rmax(mut self, rmax: f64) -> Self {
    self.rmax = Some(rmax);
    self
  }

  pub fn with_dex_step(mut self, dex: f64) -> Self {
    self.dex_step = Some(dex);
    self
  }

  pub fn with_delta_step(mut self, delta: f64) -> Self {
    self.delta_step = Some(delta);
    self
  }

  /// Resolve into concrete bin centers and target levels for `hierarchy`.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "bins::resolve"))]
  pub fn resolve(&self, hierarchy: &PatchHierarchy) -> Result<ResolvedBins> {
    let phi = resolve_angular(
      AngularAxis::Phi,
      self.phi_bins.as_deref(),
      self.phi_count,
    )?;
    let cos_theta = resolve_angular(
      AngularAxis::CosTheta,
      self.cos_theta_bins.as_deref(),
      self.cos_theta_count,
    )?;
    let (r, target_levels) = match self.resolve_radii()? {
      RadialBins::Explicit(r) => {
        let levels = vec![hierarchy.max_level(); r.len()];
        (r, levels)
      }
      RadialBins::Generated(r) => {
        let levels = target_levels(&r, hierarchy.cell_size(0), hierarchy.max_level());
        (r, levels)
      }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
      n_cos_theta = cos_theta.len(),
      n_phi = phi.len(),
      n_r = r.len(),
      "resolved profile bins"
    );

    ResolvedBins::new(cos_theta, phi, r, target_levels)
  }

  fn resolve_radii(&self) -> Result<RadialBins> {
    let has_range = self.rmin.is_some()
      || self.rmax.is_some()
      || self.dex_step.is_some()
      || self.delta_step.is_some();

    match (&self.radii, has_range) {
      (Some(_), true) => Err(ConfigurationError::AmbiguousRadialBins),
      (None, false) => Err(ConfigurationError::MissingRadialBins),
      (Some(radii), false) => {
        validate_radii(radii)?;
        Ok(RadialBins::Explicit(radii.clone()))
      }
      (None, true) => {
        if self.dex_step.is_some() && self.delta_step.is_some() {
          return Err(ConfigurationError::ConflictingRadialSteps);
        }
        let (Some(rmin), Some(rmax)) = (self.rmin, self.rmax) else {
          return Err(ConfigurationError::IncompleteRadialRange);
        };
        match (self.dex_step, self.delta_step) {
          (Some(dex), None) => log_radii(rmin, rmax, dex).map(RadialBins::Generated),
          (None, Some(delta)) => linear_radii(rmin, rmax, delta).map(RadialBins::Generated),
          _ => Err(ConfigurationError::IncompleteRadialRange),
        }
      }
    }
  }
}

enum RadialBins {
  Explicit(Vec<f64>),
  Generated(Vec<f64>),
}

/// Concrete bin centers, ready for profiling.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedBins {
  cos_theta: Vec<f64>,
  phi: Vec<f64>,
  r: Vec<f64>,
  target_levels: Vec<u32>,
}

impl ResolvedBins {
  /// Assemble bins directly. Every vector must be non-empty and there must
  /// be one target level per radius.
  pub fn new(
    cos_theta: Vec<f64>,
    phi: Vec<f64>,
    r: Vec<f64>,
    target_levels: Vec<u32>,
  ) -> Result<Self> {
    if cos_theta.is_empty() {
      return Err(ConfigurationError::EmptyAngularBins {
        axis: AngularAxis::CosTheta,
      });
    }
    if phi.is_empty() {
      return Err(ConfigurationError::EmptyAngularBins {
        axis: AngularAxis::Phi,
      });
    }
    if r.is_empty() {
      return Err(ConfigurationError::EmptyRadialBins);
    }
    if r.len() != target_levels.len() {
      return Err(ConfigurationError::TargetLevelLength {
        radii: r.len(),
        levels: target_levels.len(),
      });
    }
    Ok(Self {
      cos_theta,
      phi,
      r,
      target_levels,
    })
  }

  pub fn cos_theta(&self) -> &[f64] {
    &self.cos_theta
  }

  pub fn phi(&self) -> &[f64] {
    &self.phi
  }

  pub fn r(&self) -> &[f64] {
    &self.r
  }

  /// Maximum level searched for each radius.
  pub fn target_levels(&self) -> &[u32] {
    &self.target_levels
  }

  /// `(len(cos θ), len(φ), len(r))`
  pub fn shape(&self) -> (usize, usize, usize) {
    (self.cos_theta.len(), self.phi.len(), self.r.len())
  }
}

// =============================================================================
// Generators
// =============================================================================

/// `n` evenly spaced values from `start` to `stop` inclusive. A single value
/// is `start`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
  match n {
    0 => Vec::new(),
    1 => vec![start],
    _ => {
      let step = (stop - start) / (n - 1) as f64;
      let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
      values[n - 1] = stop;
      values
    }
  }
}

/// `n` values evenly spaced in log10 from `10^start` to `10^stop`.
pub fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
  linspace(start, stop, n)
    .into_iter()
    .map(|e| 10f64.powf(e))
    .collect()
}

/// Round a bin count down to odd: `2 * floor(count / 2) + 1`.
#[inline]
pub fn odd_count(count: f64) -> usize {
  (count / 2.0) as usize * 2 + 1
}

/// `n` interior centers over `(-half_width, half_width)`.
fn interior_centers(half_width: f64, n: usize) -> Vec<f64> {
  let inset = half_width / n as f64;
  linspace(-half_width + inset, half_width - inset, n)
}

/// Logarithmic radii, odd count, `dex` decades per bin.
pub fn log_radii(rmin: f64, rmax: f64, dex: f64) -> Result<Vec<f64>> {
  if !(rmin.is_finite() && rmax.is_finite() && rmin > 0.0 && rmax > rmin) {
    return Err(ConfigurationError::InvalidRadialRange { rmin, rmax });
  }
  if !(dex.is_finite() && dex > 0.0) {
    return Err(ConfigurationError::InvalidRadialStep { step: dex });
  }
  let count = odd_count((rmax / rmin).log10() / dex);
  Ok(logspace(rmin.log10(), rmax.log10(), count))
}

/// Linear radii, odd count, `delta` apart.
pub fn linear_radii(rmin: f64, rmax: f64, delta: f64) -> Result<Vec<f64>> {
  if !(rmin.is_finite() && rmax.is_finite() && rmin >= 0.0 && rmax > rmin) {
    return Err(ConfigurationError::InvalidRadialRange { rmin, rmax });
  }
  if !(delta.is_finite() && delta > 0.0) {
    return Err(ConfigurationError::InvalidRadialStep { step: delta });
  }
  let count = odd_count((rmax - rmin) / delta);
  Ok(linspace(rmin, rmax, count))
}

/// Per-radius target level from the local radial step.
///
/// Fewer than two radii have no step; they target `max_level`.
pub fn target_levels(radii: &[f64], base_cell_size: f64, max_level: u32) -> Vec<u32> {
  if radii.len() < 2 {
    return vec![max_level; radii.len()];
  }
  (0..radii.len())
    .map(|k| {
      let step = if k == 0 {
        radii[1] - radii[0]
      } else {
        radii[k] - radii[k - 1]
      };
      level_for_step(step, base_cell_size, max_level)
    })
    .collect()
}

/// Finest level whose cell size is at least `step`, capped at `max_level`.
#[inline]
pub fn level_for_step(step: f64, base_cell_size: f64, max_level: u32) -> u32 {
  let level = (base_cell_size / step).log2().floor();
  if level.is_nan() || level <= 0.0 {
    0
  } else {
    (level as u32).min(max_level)
  }
}

// =============================================================================
// Validation
// =============================================================================

fn resolve_angular(axis: AngularAxis, bins: Option<&[f64]>, count: Option<usize>) -> Result<Vec<f64>> {
  let half_width = match axis {
    AngularAxis::Phi => PI,
    AngularAxis::CosTheta => 1.0,
  };
  match (bins, count) {
    (Some(_), Some(_)) => Err(ConfigurationError::AmbiguousAngularBins { axis }),
    (None, None) => Err(ConfigurationError::MissingAngularBins { axis }),
    (None, Some(0)) => Err(ConfigurationError::ZeroAngularCount { axis }),
    (None, Some(n)) => Ok(interior_centers(half_width, n)),
    (Some(bins), None) => {
      if bins.is_empty() {
        return Err(ConfigurationError::EmptyAngularBins { axis });
      }
      for (index, &value) in bins.iter().enumerate() {
        let valid = match axis {
          AngularAxis::Phi => value.is_finite(),
          AngularAxis::CosTheta => (-1.0..=1.0).contains(&value),
        };
        if !valid {
          return Err(ConfigurationError::AngularValueOutOfRange { axis, index, value });
        }
      }
      Ok(bins.to_vec())
    }
  }
}

fn validate_radii(radii: &[f64]) -> Result<()> {
  if radii.is_empty() {
    return Err(ConfigurationError::EmptyRadialBins);
  }
  if let Some(index) = radii.iter().position(|r| !r.is_finite()) {
    return Err(ConfigurationError::NonIncreasingRadii { index });
  }
  if let Some(offset) = radii.windows(2).position(|w| w[1] <= w[0]) {
    return Err(ConfigurationError::NonIncreasingRadii { index: offset + 1 });
  }
  Ok(())
}

#[cfg(test)]
#[path = "bins_test.rs"]
mod bins_test;
