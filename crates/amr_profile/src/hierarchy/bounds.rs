//! Axis-aligned bounding box for patch extents and searchable regions.

use glam::DVec3;

/// Closed double-precision box `[min, max]` on every axis.
///
/// A box whose `min` exceeds its `max` on any axis is empty and contains no
/// point; shrinking a small patch by a wide buffer produces such a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DAabb3 {
	pub min: DVec3,
	pub max: DVec3,
}

impl DAabb3 {
	pub fn new(min: DVec3, max: DVec3) -> Self {
		Self { min, max }
	}

	/// True when `min <= point <= max` on all three axes.
	#[inline]
	pub fn contains_point(&self, point: DVec3) -> bool {
		point.cmpge(self.min).all() && point.cmple(self.max).all()
	}
}
