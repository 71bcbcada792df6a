//! Directional profiling - sample a field along rays from a center.
//!
//! ```text
//!            for each cos θ  (rows, parallel)
//!              for each φ
//!                for each r  (innermost)
//!   point = center + r (sin θ cos φ, sin θ sin φ, cos θ)
//!   cell  = locate(point, target_level[r])
//!   out[θ, φ, r] = nearest(cell) | trilinear(cell, point)
//! ```
//!
//! Every output slot is written exactly once from read-only inputs, so the
//! rows can be filled in any order or in parallel with identical results.

use glam::DVec3;
use ndarray::{Array3, ArrayViewMut2, Axis};
use rayon::prelude::*;

use crate::bins::{BinSpec, ResolvedBins};
use crate::error::Result;
use crate::field::{FieldArena, CORNER_OFFSETS};
use crate::hierarchy::PatchHierarchy;
use crate::locate::{CellLocation, PointLocator, DEFAULT_BUFFER};
use crate::metrics::{self, ProfileStats, SampleCounts};

/// How a located cell is turned into a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sampling {
  /// Value of the located cell.
  Nearest,
  /// Trilinear blend of the 8 cells around the point.
  Trilinear,
}

impl Default for Sampling {
  fn default() -> Self {
    Sampling::Nearest
  }
}

/// Options for a profiling run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileOptions {
  /// Sampling mode.
  pub sampling: Sampling,
  /// Boundary cells ignored on each face of a refined patch.
  pub buffer: u32,
  /// Fill cos θ rows in parallel with rayon.
  pub parallel: bool,
}

impl Default for ProfileOptions {
  fn default() -> Self {
    Self {
      sampling: Sampling::default(),
      buffer: DEFAULT_BUFFER,
      parallel: true,
    }
  }
}

impl ProfileOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_sampling(mut self, sampling: Sampling) -> Self {
    self.sampling = sampling;
    self
  }

  /// `true` selects trilinear sampling, `false` nearest-cell sampling.
  pub fn with_interpolate(self, interpolate: bool) -> Self {
    self.with_sampling(if interpolate {
      Sampling::Trilinear
    } else {
      Sampling::Nearest
    })
  }

  pub fn with_buffer(mut self, buffer: u32) -> Self {
    self.buffer = buffer;
    self
  }

  pub fn with_parallel(mut self, parallel: bool) -> Self {
    self.parallel = parallel;
    self
  }
}

/// Profile array plus the bin centers it was sampled on.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalProfile {
  /// Values indexed `[cos θ bin, φ bin, r bin]`.
  pub values: Array3<f64>,
  pub r: Vec<f64>,
  pub cos_theta: Vec<f64>,
  pub phi: Vec<f64>,
}

impl DirectionalProfile {
  /// `(len(cos θ), len(φ), len(r))`
  pub fn shape(&self) -> (usize, usize, usize) {
    self.values.dim()
  }
}

/// Cartesian position at radius `r` along direction `(cos θ, φ)`.
#[inline]
pub fn sample_position(center: DVec3, cos_theta: f64, phi: f64, r: f64) -> DVec3 {
  let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
  DVec3::new(
    center.x + r * sin_theta * phi.cos(),
    center.y + r * sin_theta * phi.sin(),
    center.z + r * cos_theta,
  )
}

/// Trilinear blend of stencil `corners` (ordered as [`CORNER_OFFSETS`]) at
/// fractional offsets `d`.
#[inline]
pub fn trilinear(corners: &[f64; 8], d: DVec3) -> f64 {
  CORNER_OFFSETS
    .iter()
    .zip(corners)
    .map(|(&[ox, oy, oz], &value)| {
      let wx = if ox == 1 { d.x } else { 1.0 - d.x };
      let wy = if oy == 1 { d.y } else { 1.0 - d.y };
      let wz = if oz == 1 { d.z } else { 1.0 - d.z };
      value * wx * wy * wz
    })
    .sum()
}

/// Read the field at an already located point.
#[inline]
fn read(field: &FieldArena, location: &CellLocation, point: DVec3, sampling: Sampling) -> f64 {
  match sampling {
    Sampling::Nearest => field.value(location.patch, location.index),
    Sampling::Trilinear => trilinear(
      &field.corners(location.patch, location.index),
      location.offsets(point),
    ),
  }
}

/// Sample `field` at a single point, searching levels up to `max_level`.
///
/// # Panics
/// If the located stencil falls outside the patch's padded buffer, e.g. for
/// a point far outside the domain.
pub fn sample(
  field: &FieldArena,
  locator: &PointLocator<'_>,
  point: DVec3,
  max_level: u32,
  sampling: Sampling,
) -> f64 {
  let location = locator.locate(point, max_level);
  read(field, &location, point, sampling)
}

/// Shared read-only state for filling one cos θ row.
struct RowSampler<'a> {
  field: &'a FieldArena,
  locator: PointLocator<'a>,
  center: DVec3,
  bins: &'a ResolvedBins,
  sampling: Sampling,
  collect: bool,
}

impl RowSampler<'_> {
  fn fill(&self, cos_theta: f64, mut row: ArrayViewMut2<'_, f64>) -> SampleCounts {
    let mut counts = SampleCounts::default();
    let radii = self.bins.r().iter().zip(self.bins.target_levels());

    for (j, &phi) in self.bins.phi().iter().enumerate() {
      for (k, (&r, &max_level)) in radii.clone().enumerate() {
        let point = sample_position(self.center, cos_theta, phi, r);
        let location = self.locator.locate(point, max_level);
        row[[j, k]] = read(self.field, &location, point, self.sampling);

        if self.collect {
          let inside = location.patch != 0 || self.locator.is_inside_domain(point);
          counts.record(location.level, inside);
        }
      }
    }

    counts
  }
}

fn run(
  field: &FieldArena,
  center: DVec3,
  hierarchy: &PatchHierarchy,
  bins: &ResolvedBins,
  options: &ProfileOptions,
  collect: bool,
) -> (DirectionalProfile, SampleCounts) {
  let sampler = RowSampler {
    field,
    locator: PointLocator::new(hierarchy, options.buffer),
    center,
    bins,
    sampling: options.sampling,
    collect,
  };
  let cos_theta = bins.cos_theta();
  let mut values = Array3::<f64>::zeros(bins.shape());

  let counts = if options.parallel {
    values
      .axis_iter_mut(Axis(0))
      .into_par_iter()
      .enumerate()
      .map(|(i, row)| sampler.fill(cos_theta[i], row))
      .reduce(SampleCounts::default, SampleCounts::merge)
  } else {
    values
      .axis_iter_mut(Axis(0))
      .enumerate()
      .map(|(i, row)| sampler.fill(cos_theta[i], row))
      .fold(SampleCounts::default(), SampleCounts::merge)
  };

  let profile = DirectionalProfile {
    values,
    r: bins.r().to_vec(),
    cos_theta: cos_theta.to_vec(),
    phi: bins.phi().to_vec(),
  };
  (profile, counts)
}

/// Sample `field` on every `(cos θ, φ, r)` bin around `center`.
///
/// # Panics
/// If a located stencil falls outside its patch's padded buffer.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "profile::profile"))]
pub fn profile(
  field: &FieldArena,
  center: DVec3,
  hierarchy: &PatchHierarchy,
  bins: &ResolvedBins,
  options: &ProfileOptions,
) -> DirectionalProfile {
  run(field, center, hierarchy, bins, options, false).0
}

/// Resolve `spec` against `hierarchy`, then profile.
///
/// Bin errors are returned before any sampling starts.
pub fn dir_profile(
  field: &FieldArena,
  center: DVec3,
  hierarchy: &PatchHierarchy,
  spec: &BinSpec,
  options: &ProfileOptions,
) -> Result<DirectionalProfile> {
  let bins = spec.resolve(hierarchy)?;
  Ok(profile(field, center, hierarchy, &bins, options))
}

/// [`profile`] with timing and, when metrics are enabled, per-level counts.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "profile::profile_timed"))]
pub fn profile_timed(
  field: &FieldArena,
  center: DVec3,
  hierarchy: &PatchHierarchy,
  bins: &ResolvedBins,
  options: &ProfileOptions,
) -> (DirectionalProfile, ProfileStats) {
  use web_time::Instant;

  let start = Instant::now();
  let (profile, counts) = run(field, center, hierarchy, bins, options, metrics::is_enabled());
  let total_us = start.elapsed().as_micros() as u64;

  let stats = ProfileStats {
    sample_count: profile.values.len(),
    samples_per_level: counts.per_level,
    out_of_domain: counts.out_of_domain,
    total_us,
  };

  #[cfg(feature = "tracing")]
  tracing::debug!(
    samples = stats.sample_count,
    out_of_domain = stats.out_of_domain,
    total_us = stats.total_us,
    "directional profile complete"
  );

  (profile, stats)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;
