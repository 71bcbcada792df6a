//! Point location - find the finest patch and cell holding a point.
//!
//! # Search Order
//!
//! Levels are scanned from `max_level` down to 1, and within a level
//! patches are scanned in ascending id order. The first patch whose
//! searchable region (bounds shrunk by `buffer` cells per face, boundary
//! included) contains the point wins, so a finer patch always takes
//! precedence over the coarser patches containing it.
//!
//! # Base Fallback
//!
//! When no refined patch matches, the point resolves to the base grid
//! (patch 0) **without** checking that it lies inside the domain. Callers
//! probing outside the box get extrapolated (and possibly out-of-range) cell
//! indices rather than an error. [`PointLocator::is_inside_domain`] lets a
//! caller detect this case.

use glam::DVec3;
use rayon::prelude::*;

use crate::hierarchy::{PatchHierarchy, PatchId};

/// Number of boundary cells ignored on each face of a refined patch.
pub const DEFAULT_BUFFER: u32 = 1;

/// Result of a point query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellLocation {
  /// Chosen patch.
  pub patch: PatchId,
  /// Level of the chosen patch.
  pub level: u32,
  /// Lower corner of the trilinear stencil around the point.
  pub index: [i64; 3],
  /// Center of cell `index`.
  pub cell_center: DVec3,
  /// Cell size of the chosen patch's level.
  pub cell_size: f64,
}

impl CellLocation {
  /// Fractional offsets of `point` from the located cell center, in cells.
  ///
  /// For a point inside the stencil every component lies in `[0, 1)`; the
  /// lower half of a patch's first cell gives `[-0.5, 0)` and extrapolates.
  #[inline]
  pub fn offsets(&self, point: DVec3) -> DVec3 {
    (point - self.cell_center) / self.cell_size
  }
}

/// Hierarchical point locator over a borrowed hierarchy.
#[derive(Clone, Copy, Debug)]
pub struct PointLocator<'a> {
  hierarchy: &'a PatchHierarchy,
  buffer: u32,
}

impl<'a> PointLocator<'a> {
  /// Locator ignoring `buffer` cells on each patch face.
  pub fn new(hierarchy: &'a PatchHierarchy, buffer: u32) -> Self {
    Self { hierarchy, buffer }
  }

  /// Finest patch at or below `max_level` whose searchable region contains
  /// `point`; patch 0 when none does.
  pub fn find_patch(&self, point: DVec3, max_level: u32) -> PatchId {
    let top = max_level.min(self.hierarchy.max_level());
    for level in (1..=top).rev() {
      for id in self.hierarchy.level_range(level) {
        if self
          .hierarchy
          .patch(id)
          .searchable_bounds(self.buffer)
          .contains_point(point)
        {
          return id;
        }
      }
    }
    0
  }

  /// Locate `point`, searching levels `max_level..=1` before falling back to
  /// the base grid.
  #[inline]
  pub fn locate(&self, point: DVec3, max_level: u32) -> CellLocation {
    let id = self.find_patch(point, max_level);
    let patch = self.hierarchy.patch(id);
    let index = patch.cell_index(point);
    CellLocation {
      patch: id,
      level: patch.level,
      index,
      cell_center: patch.cell_center(index),
      cell_size: patch.cell_size,
    }
  }

  /// Locate many points in parallel using rayon. Output order matches input.
  pub fn locate_batch(&self, points: &[DVec3], max_level: u32) -> Vec<CellLocation> {
    if points.is_empty() {
      return Vec::new();
    }

    points
      .par_iter()
      .map(|&point| self.locate(point, max_level))
      .collect()
  }

  /// True when `point` lies inside the base grid's full extent.
  pub fn is_inside_domain(&self, point: DVec3) -> bool {
    self.hierarchy.base().bounds().contains_point(point)
  }
}

impl PatchHierarchy {
  /// Locate `point` with a one-off [`PointLocator`].
  pub fn locate(&self, point: DVec3, max_level: u32, buffer: u32) -> CellLocation {
    PointLocator::new(self, buffer).locate(point, max_level)
  }
}

#[cfg(test)]
#[path = "locate_test.rs"]
mod locate_test;
