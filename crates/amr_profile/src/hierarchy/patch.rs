//! Patch - a rectangular block of cells at one refinement level.
//!
//! # Anchor Convention
//!
//! A patch's anchor is the center of its first *parent* cell, i.e. a cell of
//! level `l-1` (twice the patch's own cell size). The patch's lower corner is
//! therefore one level-`l` cell below the anchor, and level-`l` cell `i` has
//! its center at `anchor + (i - 0.5) * dx`:
//!
//! ```text
//!   lower = anchor - dx
//!   |<-- dx -->|<-- dx -->|
//!   +----------+----------+-----
//!   |  cell 0  |  cell 1  | ...
//!   +----------+----------+-----
//!        ^     ^     ^
//!        |   anchor  center of cell 1 = anchor + 0.5 dx
//!   center of cell 0 = anchor - 0.5 dx
//! ```

use glam::DVec3;

use super::DAabb3;

/// Index of a patch in the hierarchy. Patch 0 is always the base grid.
pub type PatchId = usize;

/// Immutable geometry of a single patch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Patch {
  /// Refinement level (0 = base grid).
  pub level: u32,
  /// Center of the first level `l-1` cell covered by this patch.
  pub anchor: DVec3,
  /// Number of level-`l` cells along each axis.
  pub extents: [usize; 3],
  /// Cell size at this patch's level.
  pub cell_size: f64,
}

impl Patch {
  /// Lower corner of the first cell.
  #[inline]
  pub fn lower_corner(&self) -> DVec3 {
    self.anchor - DVec3::splat(self.cell_size)
  }

  /// Upper corner of the last cell.
  #[inline]
  pub fn upper_corner(&self) -> DVec3 {
    self.anchor + (self.extents_f64() - 1.0) * self.cell_size
  }

  /// Full geometric extent of the patch.
  pub fn bounds(&self) -> DAabb3 {
    DAabb3::new(self.lower_corner(), self.upper_corner())
  }

  /// Bounds shrunk by `buffer` cells on every face.
  ///
  /// With `buffer = 1` the region spans the anchor up to the center of the
  /// second-to-last parent cell. Empty when the patch is narrower than
  /// `2 * buffer` cells.
  pub fn searchable_bounds(&self, buffer: u32) -> DAabb3 {
    let dx = self.cell_size;
    let buf = buffer as f64;
    DAabb3::new(
      self.anchor + (buf - 1.0) * dx,
      self.anchor + (self.extents_f64() - 1.0 - buf) * dx,
    )
  }

  /// Center of cell `index` (ghost indices allowed).
  #[inline]
  pub fn cell_center(&self, index: [i64; 3]) -> DVec3 {
    let idx = DVec3::new(index[0] as f64, index[1] as f64, index[2] as f64);
    self.anchor + (idx - 0.5) * self.cell_size
  }

  /// Index of the cell whose center is the nearest one at or below `point`
  /// on every axis.
  ///
  /// `floor((p - (anchor - dx)) / dx - 0.5)`. This is the lower corner of the
  /// trilinear stencil around `point`, not the floor of the containing cell.
  /// Points in the lower half of the first cell have no center below them
  /// and anchor the stencil at cell 0. Points below the lower corner keep
  /// the extrapolated negative index.
  #[inline]
  pub fn cell_index(&self, point: DVec3) -> [i64; 3] {
    let scaled = (point - self.lower_corner()) / self.cell_size;
    let stencil = (scaled - 0.5).floor();
    let index = DVec3::select(scaled.cmpge(DVec3::ZERO), stencil.max(DVec3::ZERO), stencil);
    [index.x as i64, index.y as i64, index.z as i64]
  }

  #[inline]
  fn extents_f64(&self) -> DVec3 {
    DVec3::new(
      self.extents[0] as f64,
      self.extents[1] as f64,
      self.extents[2] as f64,
    )
  }
}

#[cfg(test)]
#[path = "patch_test.rs"]
mod patch_test;
