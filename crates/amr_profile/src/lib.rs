//! amr_profile - Point location and directional profiling on AMR hierarchies
//!
//! This crate samples scalar fields stored on nested, block-structured
//! adaptive mesh refinement grids. A base grid (level 0) covers a cubic box;
//! rectangular patches at levels 1, 2, ... refine it by a factor of two per
//! level.
//!
//! # Features
//!
//! - **Hierarchical point location**: finest patch containing a point, with a
//!   configurable boundary buffer and silent base-grid fallback
//! - **Bin resolution**: explicit or generated (cos θ, φ, r) bins with a
//!   per-radius refinement level matched to the radial spacing
//! - **Directional profiling**: nearest-cell or trilinear sampling along
//!   rays from a center, filled in parallel with rayon
//!
//! # Example
//!
//! ```ignore
//! use amr_profile::{dir_profile, BinSpec, FieldArena, HierarchyGeometry, PatchHierarchy,
//!   ProfileOptions};
//! use glam::DVec3;
//!
//! let geometry = HierarchyGeometry::base_only(1.0, 10, DVec3::ZERO);
//! let hierarchy = PatchHierarchy::new(geometry)?;
//! let field = FieldArena::uniform(&hierarchy, 1.0);
//!
//! let spec = BinSpec::new()
//!     .with_cos_theta_count(8)
//!     .with_phi_count(16)
//!     .with_log_radii(0.01, 0.4, 0.05);
//! let options = ProfileOptions::default().with_interpolate(true);
//! let profile = dir_profile(&field, DVec3::splat(0.5), &hierarchy, &spec, &options)?;
//!
//! println!("profile shape {:?}", profile.shape());
//! ```

pub mod error;
pub use error::{AngularAxis, ConfigurationError, Result};

// Patch hierarchy and geometry
pub mod hierarchy;
pub use hierarchy::{DAabb3, HierarchyGeometry, Patch, PatchHierarchy, PatchId};

// Hierarchical point location
pub mod locate;
pub use locate::{CellLocation, PointLocator, DEFAULT_BUFFER};

// Per-patch field storage
pub mod field;
pub use field::FieldArena;

// (cos θ, φ, r) bins and target levels
pub mod bins;
pub use bins::{BinSpec, ResolvedBins};

// Directional profiling
pub mod profile;
pub use profile::{
  dir_profile, profile, profile_timed, sample, DirectionalProfile, ProfileOptions, Sampling,
};

// Sampling statistics (feature-gated)
pub mod metrics;
pub use metrics::ProfileStats;
