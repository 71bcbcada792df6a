//! Patch hierarchy - immutable geometry of every patch across levels.
//!
//! Patch ids are assigned level by level. With `npatch[l]` patches
//! introduced at level `l` (and `npatch[0] = 1`), the patches of level `l`
//! occupy the contiguous id range
//!
//! ```text
//! sum(npatch[..l]) .. sum(npatch[..=l])
//! ```
//!
//! so patch 0 is always the base grid. Field data is not owned here; see
//! [`crate::field::FieldArena`].

use std::ops::Range;

use glam::DVec3;

use crate::error::{ConfigurationError, Result};

pub mod bounds;
pub mod patch;

pub use bounds::DAabb3;
pub use patch::{Patch, PatchId};

/// Raw per-patch geometry arrays, indexed by patch id.
///
/// Arrays include the base patch at index 0. Use [`HierarchyGeometry::base_only`]
/// and [`HierarchyGeometry::with_patch`] to assemble consistent inputs by
/// hand; simulation readers fill the fields directly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HierarchyGeometry {
  /// Number of patches introduced at each level (`npatch[0] = 1`).
  pub npatch: Vec<usize>,
  /// Anchor x of each patch (center of its first level `l-1` cell).
  pub patchrx: Vec<f64>,
  pub patchry: Vec<f64>,
  pub patchrz: Vec<f64>,
  /// Extent of each patch along x, in its own level's cells.
  pub patchnx: Vec<usize>,
  pub patchny: Vec<usize>,
  pub patchnz: Vec<usize>,
  /// Side length of the (cubic) domain.
  pub size: f64,
  /// Base grid cells per axis.
  pub nmax: usize,
}

impl HierarchyGeometry {
  /// Geometry with only the base grid, whose lower corner sits at `origin`.
  pub fn base_only(size: f64, nmax: usize, origin: DVec3) -> Self {
    let anchor = origin + cell_size_at(size, nmax, 0);
    Self {
      npatch: vec![1],
      patchrx: vec![anchor.x],
      patchry: vec![anchor.y],
      patchrz: vec![anchor.z],
      patchnx: vec![nmax],
      patchny: vec![nmax],
      patchnz: vec![nmax],
      size,
      nmax,
    }
  }

  /// Add a refined patch at `level`, keeping ids grouped by level.
  ///
  /// Patches added to the same level keep their insertion order.
  pub fn with_patch(mut self, level: u32, anchor: DVec3, extents: [usize; 3]) -> Self {
    let level = level as usize;
    if self.npatch.len() <= level {
      self.npatch.resize(level + 1, 0);
    }
    let at = self.npatch[..=level].iter().sum::<usize>();
    self.patchrx.insert(at, anchor.x);
    self.patchry.insert(at, anchor.y);
    self.patchrz.insert(at, anchor.z);
    self.patchnx.insert(at, extents[0]);
    self.patchny.insert(at, extents[1]);
    self.patchnz.insert(at, extents[2]);
    self.npatch[level] += 1;
    self
  }

  /// Anchor of a level-`level` patch whose lower corner is `corner`.
  pub fn anchor_for_corner(&self, corner: DVec3, level: u32) -> DVec3 {
    corner + cell_size_at(self.size, self.nmax, level)
  }

  fn validate(&self) -> Result<usize> {
    let Some(&base) = self.npatch.first() else {
      return Err(ConfigurationError::EmptyLevelCounts);
    };
    if base != 1 {
      return Err(ConfigurationError::BaseLevelCount { found: base });
    }
    if !(self.size.is_finite() && self.size > 0.0) {
      return Err(ConfigurationError::InvalidDomainSize { size: self.size });
    }
    if self.nmax == 0 {
      return Err(ConfigurationError::InvalidBaseResolution);
    }

    let total: usize = self.npatch.iter().sum();
    let lengths = [
      ("patchrx", self.patchrx.len()),
      ("patchry", self.patchry.len()),
      ("patchrz", self.patchrz.len()),
      ("patchnx", self.patchnx.len()),
      ("patchny", self.patchny.len()),
      ("patchnz", self.patchnz.len()),
    ];
    for (array, found) in lengths {
      if found != total {
        return Err(ConfigurationError::PatchArrayLength {
          array,
          expected: total,
          found,
        });
      }
    }

    for patch in 0..total {
      if self.patchnx[patch] == 0 || self.patchny[patch] == 0 || self.patchnz[patch] == 0 {
        return Err(ConfigurationError::EmptyPatch { patch });
      }
    }

    Ok(total)
  }
}

/// `size / nmax / 2^level`
#[inline]
fn cell_size_at(size: f64, nmax: usize, level: u32) -> f64 {
  size / nmax as f64 / (1u64 << level) as f64
}

/// Read-only patch hierarchy.
#[derive(Clone, Debug)]
pub struct PatchHierarchy {
  patches: Vec<Patch>,
  /// Prefix sums of `npatch`: level `l` occupies `offsets[l]..offsets[l + 1]`.
  offsets: Vec<usize>,
  size: f64,
  nmax: usize,
  max_level: u32,
}

impl PatchHierarchy {
  /// Build the hierarchy, checking array lengths against the declared counts.
  pub fn new(geometry: HierarchyGeometry) -> Result<Self> {
    let total = geometry.validate()?;

    let mut offsets = Vec::with_capacity(geometry.npatch.len() + 1);
    let mut running = 0;
    offsets.push(running);
    for &count in &geometry.npatch {
      running += count;
      offsets.push(running);
    }

    let mut patches = Vec::with_capacity(total);
    for (level, ids) in offsets.windows(2).enumerate() {
      let level = level as u32;
      let cell_size = cell_size_at(geometry.size, geometry.nmax, level);
      for id in ids[0]..ids[1] {
        patches.push(Patch {
          level,
          anchor: DVec3::new(geometry.patchrx[id], geometry.patchry[id], geometry.patchrz[id]),
          extents: [geometry.patchnx[id], geometry.patchny[id], geometry.patchnz[id]],
          cell_size,
        });
      }
    }

    let max_level = geometry
      .npatch
      .iter()
      .rposition(|&count| count > 0)
      .unwrap_or(0) as u32;

    Ok(Self {
      patches,
      offsets,
      size: geometry.size,
      nmax: geometry.nmax,
      max_level,
    })
  }

  /// Number of patches, base grid included.
  pub fn len(&self) -> usize {
    self.patches.len()
  }

  /// Always false: the base grid is mandatory.
  pub fn is_empty(&self) -> bool {
    self.patches.is_empty()
  }

  /// Patch by id.
  ///
  /// # Panics
  /// If `id >= self.len()`.
  #[inline]
  pub fn patch(&self, id: PatchId) -> &Patch {
    &self.patches[id]
  }

  /// The base grid (patch 0).
  #[inline]
  pub fn base(&self) -> &Patch {
    &self.patches[0]
  }

  /// All patches in id order.
  pub fn patches(&self) -> &[Patch] {
    &self.patches
  }

  /// Ids of the patches introduced at `level`. Empty past the last level.
  #[inline]
  pub fn level_range(&self, level: u32) -> Range<usize> {
    let level = level as usize;
    if level + 1 >= self.offsets.len() {
      return 0..0;
    }
    self.offsets[level]..self.offsets[level + 1]
  }

  /// Refinement level of every patch, indexed by id.
  pub fn levels(&self) -> Vec<u32> {
    self.patches.iter().map(|p| p.level).collect()
  }

  /// Highest level holding at least one patch.
  #[inline]
  pub fn max_level(&self) -> u32 {
    self.max_level
  }

  /// Cell size at `level`: `size / nmax / 2^level`.
  #[inline]
  pub fn cell_size(&self, level: u32) -> f64 {
    cell_size_at(self.size, self.nmax, level)
  }

  /// Domain side length.
  pub fn size(&self) -> f64 {
    self.size
  }

  /// Base grid cells per axis.
  pub fn nmax(&self) -> usize {
    self.nmax
  }
}
