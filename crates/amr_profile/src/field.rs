//! Per-patch field buffers.
//!
//! Each patch owns one `Array3<f64>` of shape `(nx + 1, ny + 1, nz + 1)`:
//! its extents plus one ghost layer on the upper face of every axis, so a
//! trilinear stencil anchored at any interior cell `i` may read `i + 1`.
//!
//! A read outside a buffer is a broken contract on the caller's side and
//! panics rather than being clamped.

use glam::DVec3;
use ndarray::Array3;

use crate::error::{ConfigurationError, Result};
use crate::hierarchy::{Patch, PatchHierarchy, PatchId};

/// Stencil corner offsets (binary: ZYX).
///
/// - 0 = (0,0,0)
/// - 1 = (1,0,0)
/// - 2 = (0,1,0)
/// - 3 = (1,1,0)
/// - 4 = (0,0,1)
/// - 5 = (1,0,1)
/// - 6 = (0,1,1)
/// - 7 = (1,1,1)
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
  [0, 0, 0],
  [1, 0, 0],
  [0, 1, 0],
  [1, 1, 0],
  [0, 0, 1],
  [1, 0, 1],
  [0, 1, 1],
  [1, 1, 1],
];

/// Buffer shape for a patch: extents plus one ghost layer.
#[inline]
pub fn padded_shape(patch: &Patch) -> [usize; 3] {
  [patch.extents[0] + 1, patch.extents[1] + 1, patch.extents[2] + 1]
}

/// Arena of field buffers indexed by patch id.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArena {
  buffers: Vec<Array3<f64>>,
}

impl FieldArena {
  /// Wrap caller-provided buffers, one per patch in id order.
  pub fn new(hierarchy: &PatchHierarchy, buffers: Vec<Array3<f64>>) -> Result<Self> {
    if buffers.len() != hierarchy.len() {
      return Err(ConfigurationError::FieldPatchCount {
        expected: hierarchy.len(),
        found: buffers.len(),
      });
    }
    for (id, (patch, buffer)) in hierarchy.patches().iter().zip(&buffers).enumerate() {
      let expected = padded_shape(patch);
      let found = buffer.dim();
      let found = [found.0, found.1, found.2];
      if found != expected {
        return Err(ConfigurationError::FieldShape {
          patch: id,
          expected,
          found,
        });
      }
    }
    Ok(Self { buffers })
  }

  /// Same value in every cell of every patch, ghost layers included.
  pub fn uniform(hierarchy: &PatchHierarchy, value: f64) -> Self {
    Self::from_fn(hierarchy, |_, _| value)
  }

  /// Fill every cell (ghost layers included) from its patch and cell center.
  pub fn from_fn<F>(hierarchy: &PatchHierarchy, f: F) -> Self
  where
    F: Fn(&Patch, DVec3) -> f64,
  {
    let buffers = hierarchy
      .patches()
      .iter()
      .map(|patch| {
        let [nx, ny, nz] = padded_shape(patch);
        Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| {
          f(patch, patch.cell_center([i as i64, j as i64, k as i64]))
        })
      })
      .collect();
    Self { buffers }
  }

  /// Number of patch buffers.
  pub fn len(&self) -> usize {
    self.buffers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffers.is_empty()
  }

  /// Buffer of one patch.
  pub fn buffer(&self, patch: PatchId) -> &Array3<f64> {
    &self.buffers[patch]
  }

  /// Value of cell `index` in `patch`.
  ///
  /// # Panics
  /// If an index is negative or past the padded buffer.
  #[inline]
  pub fn value(&self, patch: PatchId, index: [i64; 3]) -> f64 {
    let [i, j, k] = to_unsigned(patch, index);
    self.buffers[patch][[i, j, k]]
  }

  /// The eight stencil values `i..=i+1, j..=j+1, k..=k+1`, ordered as
  /// [`CORNER_OFFSETS`].
  ///
  /// # Panics
  /// If any corner lies outside the padded buffer.
  #[inline]
  pub fn corners(&self, patch: PatchId, index: [i64; 3]) -> [f64; 8] {
    let [i, j, k] = to_unsigned(patch, index);
    let buffer = &self.buffers[patch];
    CORNER_OFFSETS.map(|[di, dj, dk]| buffer[[i + di, j + dj, k + dk]])
  }
}

#[inline]
fn to_unsigned(patch: PatchId, index: [i64; 3]) -> [usize; 3] {
  index.map(|v| {
    usize::try_from(v)
      .unwrap_or_else(|_| panic!("negative cell index {:?} in patch {}", index, patch))
  })
}

#[cfg(test)]
#[path = "field_test.rs"]
mod field_test;
