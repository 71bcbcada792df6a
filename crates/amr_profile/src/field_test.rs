use super::*;
use crate::hierarchy::HierarchyGeometry;

fn two_patch_hierarchy() -> PatchHierarchy {
  let geometry = HierarchyGeometry::base_only(8.0, 8, DVec3::ZERO);
  let anchor = geometry.anchor_for_corner(DVec3::splat(2.0), 1);
  PatchHierarchy::new(geometry.with_patch(1, anchor, [4, 6, 2])).unwrap()
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_padded_shape_adds_ghost_layer() {
  let hierarchy = two_patch_hierarchy();
  assert_eq!(padded_shape(hierarchy.base()), [9, 9, 9]);
  assert_eq!(padded_shape(hierarchy.patch(1)), [5, 7, 3]);
}

#[test]
fn test_new_accepts_padded_buffers() {
  let hierarchy = two_patch_hierarchy();
  let buffers = vec![Array3::zeros((9, 9, 9)), Array3::from_elem((5, 7, 3), 2.0)];

  let field = FieldArena::new(&hierarchy, buffers).expect("shapes match");
  assert_eq!(field.len(), 2);
  assert_eq!(field.value(1, [4, 6, 2]), 2.0);
}

#[test]
fn test_new_rejects_wrong_patch_count() {
  let hierarchy = two_patch_hierarchy();
  let buffers = vec![Array3::zeros((9, 9, 9))];

  assert_eq!(
    FieldArena::new(&hierarchy, buffers).unwrap_err(),
    ConfigurationError::FieldPatchCount {
      expected: 2,
      found: 1
    }
  );
}

#[test]
fn test_new_rejects_missing_ghost_layer() {
  let hierarchy = two_patch_hierarchy();
  let buffers = vec![Array3::zeros((9, 9, 9)), Array3::zeros((4, 6, 2))];

  assert_eq!(
    FieldArena::new(&hierarchy, buffers).unwrap_err(),
    ConfigurationError::FieldShape {
      patch: 1,
      expected: [5, 7, 3],
      found: [4, 6, 2],
    }
  );
}

#[test]
fn test_uniform_fills_every_cell() {
  let hierarchy = two_patch_hierarchy();
  let field = FieldArena::uniform(&hierarchy, 3.5);

  for id in 0..hierarchy.len() {
    assert!(field.buffer(id).iter().all(|&v| v == 3.5));
  }
}

#[test]
fn test_from_fn_samples_cell_centers() {
  let hierarchy = two_patch_hierarchy();
  let field = FieldArena::from_fn(&hierarchy, |patch, center| {
    patch.level as f64 * 100.0 + center.x
  });

  // Base cell 3 has center 3.5
  assert_eq!(field.value(0, [3, 0, 0]), 3.5);
  // Level-1 cell 0 has center 2.25
  assert_eq!(field.value(1, [0, 0, 0]), 102.25);
  // Ghost layer is filled too
  assert_eq!(field.value(0, [8, 8, 8]), 8.5);
}

// =========================================================================
// Stencil Reads
// =========================================================================

#[test]
fn test_corners_follow_offset_order() {
  let hierarchy = two_patch_hierarchy();
  let field = FieldArena::from_fn(&hierarchy, |_, c| c.x + 10.0 * c.y + 100.0 * c.z);

  let base = [2i64, 3, 4];
  let corners = field.corners(0, base);
  for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
    let index = [
      base[0] + offset[0] as i64,
      base[1] + offset[1] as i64,
      base[2] + offset[2] as i64,
    ];
    assert_eq!(corners[corner], field.value(0, index), "Corner {}", corner);
  }
}

#[test]
fn test_corners_may_read_ghost_layer() {
  let hierarchy = two_patch_hierarchy();
  let field = FieldArena::uniform(&hierarchy, 1.0);
  // Last interior cell of the refined patch; its +1 neighbours are ghosts
  assert_eq!(field.corners(1, [3, 5, 1]), [1.0; 8]);
}

#[test]
#[should_panic(expected = "negative cell index")]
fn test_negative_index_panics() {
  let hierarchy = two_patch_hierarchy();
  let field = FieldArena::uniform(&hierarchy, 1.0);
  field.value(0, [-1, 0, 0]);
}

#[test]
#[should_panic]
fn test_read_past_ghost_layer_panics() {
  let hierarchy = two_patch_hierarchy();
  let field = FieldArena::uniform(&hierarchy, 1.0);
  field.corners(1, [4, 0, 0]);
}
