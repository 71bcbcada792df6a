use std::f64::consts::{FRAC_PI_2, PI};

use approx::assert_relative_eq;

use super::*;
use crate::hierarchy::HierarchyGeometry;

/// 8³ box with unit base cells and a level-1 patch over [2, 6]³.
fn exact_hierarchy() -> PatchHierarchy {
  let geometry = HierarchyGeometry::base_only(8.0, 8, DVec3::ZERO);
  let anchor = geometry.anchor_for_corner(DVec3::splat(2.0), 1);
  PatchHierarchy::new(geometry.with_patch(1, anchor, [8, 8, 8])).unwrap()
}

/// Deterministic, non-linear cell values.
fn scrambled_field(hierarchy: &PatchHierarchy) -> FieldArena {
  FieldArena::from_fn(hierarchy, |patch, c| {
    (c.x * 12.9898 + c.y * 78.233 + c.z * 37.719 + patch.level as f64).sin() * 43.758
  })
}

// =========================================================================
// Options
// =========================================================================

#[test]
fn test_default_options() {
  let options = ProfileOptions::default();
  assert_eq!(options.sampling, Sampling::Nearest);
  assert_eq!(options.buffer, 1);
  assert!(options.parallel);
}

#[test]
fn test_options_builder() {
  let options = ProfileOptions::new()
    .with_interpolate(true)
    .with_buffer(2)
    .with_parallel(false);

  assert_eq!(options.sampling, Sampling::Trilinear);
  assert_eq!(options.buffer, 2);
  assert!(!options.parallel);
  assert_eq!(options.with_interpolate(false).sampling, Sampling::Nearest);
}

// =========================================================================
// Geometry and Weights
// =========================================================================

#[test]
fn test_sample_position_axes() {
  let center = DVec3::new(1.0, 2.0, 3.0);

  assert_eq!(sample_position(center, 0.0, 0.0, 2.0), DVec3::new(3.0, 2.0, 3.0));
  assert_eq!(sample_position(center, 1.0, 0.7, 2.0), DVec3::new(1.0, 2.0, 5.0));
  assert_eq!(sample_position(center, -1.0, 0.7, 2.0), DVec3::new(1.0, 2.0, 1.0));

  let y = sample_position(center, 0.0, FRAC_PI_2, 2.0);
  assert_relative_eq!(y.x, 1.0, epsilon = 1e-12);
  assert_relative_eq!(y.y, 4.0, epsilon = 1e-12);

  let minus_x = sample_position(center, 0.0, PI, 2.0);
  assert_relative_eq!(minus_x.x, -1.0, epsilon = 1e-12);
}

#[test]
fn test_sample_position_keeps_radius() {
  for &(cos_theta, phi) in &[(0.3, -2.0), (-0.9, 0.4), (0.99, 3.0)] {
    let p = sample_position(DVec3::ZERO, cos_theta, phi, 1.7);
    assert_relative_eq!(p.length(), 1.7, epsilon = 1e-12);
  }
}

#[test]
fn test_trilinear_at_corners() {
  let corners = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
  for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
    let d = DVec3::new(offset[0] as f64, offset[1] as f64, offset[2] as f64);
    assert_eq!(trilinear(&corners, d), corners[corner], "Corner {}", corner);
  }
}

#[test]
fn test_trilinear_midpoint_is_mean() {
  let corners = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
  assert_relative_eq!(trilinear(&corners, DVec3::splat(0.5)), 4.5, epsilon = 1e-12);
}

// =========================================================================
// Point Sampling
// =========================================================================

#[test]
fn test_trilinear_at_cell_center_equals_nearest() {
  let hierarchy = exact_hierarchy();
  let field = scrambled_field(&hierarchy);
  let locator = PointLocator::new(&hierarchy, DEFAULT_BUFFER);

  // Base cells outside the refined patch, and level-1 cells inside it
  let points = [
    hierarchy.base().cell_center([0, 1, 6]),
    hierarchy.base().cell_center([6, 6, 0]),
    hierarchy.patch(1).cell_center([2, 3, 4]),
    hierarchy.patch(1).cell_center([5, 1, 6]),
  ];
  for point in points {
    let nearest = sample(&field, &locator, point, 1, Sampling::Nearest);
    let trilinear = sample(&field, &locator, point, 1, Sampling::Trilinear);
    assert_eq!(trilinear, nearest, "Point {:?}", point);
  }
}

#[test]
fn test_trilinear_reproduces_linear_field() {
  let hierarchy = exact_hierarchy();
  let linear = |p: DVec3| 1.5 + 2.0 * p.x - 0.75 * p.y + 0.25 * p.z;
  let field = FieldArena::from_fn(&hierarchy, |_, c| linear(c));
  let locator = PointLocator::new(&hierarchy, DEFAULT_BUFFER);

  for point in [
    DVec3::new(1.3, 6.7, 0.9),
    DVec3::new(3.33, 4.1, 5.05),
    DVec3::new(7.2, 2.6, 4.4),
  ] {
    let value = sample(&field, &locator, point, 1, Sampling::Trilinear);
    assert_relative_eq!(value, linear(point), epsilon = 1e-10);
  }
}

#[test]
fn test_nearest_reads_located_cell() {
  let hierarchy = exact_hierarchy();
  let field = scrambled_field(&hierarchy);
  let locator = PointLocator::new(&hierarchy, DEFAULT_BUFFER);
  let point = DVec3::new(4.1, 3.8, 4.6);

  let location = locator.locate(point, 1);
  assert_eq!(location.patch, 1);
  assert_eq!(
    sample(&field, &locator, point, 1, Sampling::Nearest),
    field.value(1, location.index)
  );
}

// =========================================================================
// Profiles
// =========================================================================

#[test]
fn test_profile_shape_matches_bins() {
  let hierarchy = exact_hierarchy();
  let field = FieldArena::uniform(&hierarchy, 0.0);
  let bins = BinSpec::new()
    .with_cos_theta_count(3)
    .with_phi_count(5)
    .with_linear_radii(0.5, 3.0, 0.5)
    .resolve(&hierarchy)
    .unwrap();

  let result = profile(&field, DVec3::splat(4.0), &hierarchy, &bins, &ProfileOptions::default());
  assert_eq!(result.shape(), bins.shape());
  assert_eq!(result.shape(), (3, 5, bins.r().len()));
  assert_eq!(result.r, bins.r());
  assert_eq!(result.cos_theta, bins.cos_theta());
  assert_eq!(result.phi, bins.phi());
}

#[test]
fn test_parallel_and_serial_agree() {
  let hierarchy = exact_hierarchy();
  let field = scrambled_field(&hierarchy);
  let bins = BinSpec::new()
    .with_cos_theta_count(6)
    .with_phi_count(7)
    .with_log_radii(0.1, 3.0, 0.1)
    .resolve(&hierarchy)
    .unwrap();
  let center = DVec3::new(4.1, 3.9, 4.05);

  for interpolate in [false, true] {
    let options = ProfileOptions::new().with_interpolate(interpolate);
    let parallel = profile(&field, center, &hierarchy, &bins, &options.with_parallel(true));
    let serial = profile(&field, center, &hierarchy, &bins, &options.with_parallel(false));
    assert_eq!(parallel, serial);
  }
}

#[test]
fn test_each_slot_matches_point_sample() {
  let hierarchy = exact_hierarchy();
  let field = scrambled_field(&hierarchy);
  let bins = BinSpec::new()
    .with_cos_theta_count(2)
    .with_phi_count(3)
    .with_linear_radii(0.25, 2.75, 0.5)
    .resolve(&hierarchy)
    .unwrap();
  let center = DVec3::splat(4.0);
  let options = ProfileOptions::new().with_interpolate(true);
  let result = profile(&field, center, &hierarchy, &bins, &options);
  let locator = PointLocator::new(&hierarchy, options.buffer);

  for (i, &cos_theta) in bins.cos_theta().iter().enumerate() {
    for (j, &phi) in bins.phi().iter().enumerate() {
      for (k, &r) in bins.r().iter().enumerate() {
        let point = sample_position(center, cos_theta, phi, r);
        let expected = sample(&field, &locator, point, bins.target_levels()[k], Sampling::Trilinear);
        assert_eq!(result.values[[i, j, k]], expected);
      }
    }
  }
}

#[test]
fn test_dir_profile_rejects_bad_spec_before_sampling() {
  let hierarchy = exact_hierarchy();
  let field = FieldArena::uniform(&hierarchy, 1.0);
  let spec = BinSpec::new().with_phi_count(2).with_cos_theta_count(2);
  let result = dir_profile(&field, DVec3::splat(4.0), &hierarchy, &spec, &ProfileOptions::default());
  assert_eq!(result.unwrap_err(), crate::error::ConfigurationError::MissingRadialBins);
}

#[test]
fn test_profile_timed_reports_samples() {
  let hierarchy = exact_hierarchy();
  let field = FieldArena::uniform(&hierarchy, 1.0);
  let bins = BinSpec::new()
    .with_cos_theta_count(2)
    .with_phi_count(4)
    .with_radii(vec![0.5, 1.0, 3.5])
    .resolve(&hierarchy)
    .unwrap();

  let (result, stats) = profile_timed(&field, DVec3::splat(4.0), &hierarchy, &bins, &ProfileOptions::default());
  assert_eq!(stats.sample_count, 2 * 4 * 3);
  assert_eq!(stats.sample_count, result.values.len());
  if metrics::is_enabled() {
    assert_eq!(stats.samples_per_level.iter().sum::<usize>(), stats.sample_count);
    assert_eq!(stats.out_of_domain, 0);
  } else {
    assert!(stats.samples_per_level.is_empty());
  }
}
