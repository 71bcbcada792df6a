//! Configuration errors raised before any sampling work begins.

use thiserror::Error;

/// Result alias for hierarchy construction and bin resolution.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Angular axis a bin error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngularAxis {
  /// Azimuthal angle in radians.
  Phi,
  /// Cosine of the polar angle, in [-1, 1].
  CosTheta,
}

impl std::fmt::Display for AngularAxis {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AngularAxis::Phi => f.write_str("phi"),
      AngularAxis::CosTheta => f.write_str("cos(theta)"),
    }
  }
}

/// Malformed or ambiguous input. Recoverable by fixing the inputs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
  // Hierarchy geometry
  #[error("per-level patch counts must not be empty")]
  EmptyLevelCounts,
  #[error("level 0 must hold exactly one base patch, found {found}")]
  BaseLevelCount { found: usize },
  #[error("geometry array `{array}` has {found} entries, declared counts need {expected}")]
  PatchArrayLength {
    array: &'static str,
    expected: usize,
    found: usize,
  },
  #[error("patch {patch} has a zero extent")]
  EmptyPatch { patch: usize },
  #[error("domain size must be finite and positive, got {size}")]
  InvalidDomainSize { size: f64 },
  #[error("base resolution must be at least one cell per axis")]
  InvalidBaseResolution,

  // Field buffers
  #[error("field has {found} patch buffers, hierarchy has {expected} patches")]
  FieldPatchCount { expected: usize, found: usize },
  #[error("field buffer for patch {patch} has shape {found:?}, expected {expected:?} (extents plus one ghost layer)")]
  FieldShape {
    patch: usize,
    expected: [usize; 3],
    found: [usize; 3],
  },

  // Angular bins
  #[error("no {axis} bins specified")]
  MissingAngularBins { axis: AngularAxis },
  #[error("{axis} bins specified both explicitly and by count")]
  AmbiguousAngularBins { axis: AngularAxis },
  #[error("{axis} bin count must be positive")]
  ZeroAngularCount { axis: AngularAxis },
  #[error("explicit {axis} bins must not be empty")]
  EmptyAngularBins { axis: AngularAxis },
  #[error("{axis} bin {index} = {value} lies outside its valid range")]
  AngularValueOutOfRange {
    axis: AngularAxis,
    index: usize,
    value: f64,
  },

  // Radial bins
  #[error("no radial bins specified")]
  MissingRadialBins,
  #[error("radial bins specified both explicitly and by range")]
  AmbiguousRadialBins,
  #[error("both a logarithmic and a linear radial step were given")]
  ConflictingRadialSteps,
  #[error("generated radial bins need rmin, rmax and one step")]
  IncompleteRadialRange,
  #[error("invalid radial range rmin={rmin}, rmax={rmax}")]
  InvalidRadialRange { rmin: f64, rmax: f64 },
  #[error("radial step must be finite and positive, got {step}")]
  InvalidRadialStep { step: f64 },
  #[error("explicit radial bins must not be empty")]
  EmptyRadialBins,
  #[error("explicit radial bins must be finite and strictly increasing (index {index})")]
  NonIncreasingRadii { index: usize },
  #[error("{radii} radial bins but {levels} target levels")]
  TargetLevelLength { radii: usize, levels: usize },
}
