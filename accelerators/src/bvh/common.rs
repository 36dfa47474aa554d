//! BVH Common

use simcore::geometry::*;
use simcore::pbrt::*;
use simcore::primitive::*;
use simcore::{stat_counter, stat_inc, stat_memory_counter, stat_percent, stat_ratio, stat_register_fns};

stat_memory_counter!("Memory/BVH tree", TREE_BYTES, bvh_stats_tree_bytes);
stat_counter!("BVH/Interior nodes", INTERIOR_NODES, bvh_stats_interior_nodes);
stat_counter!("BVH/Leaf nodes", LEAF_NODES, bvh_stats_leaf_nodes);
stat_percent!(
    "Intersections/Ray-primitive hits",
    PRIMITIVE_HITS,
    PRIMITIVE_TESTS,
    bvh_stats_primitive_hits,
);
stat_ratio!(
    "Intersections/BVH nodes visited per ray",
    NODES_VISITED,
    RAYS_TRACED,
    bvh_stats_nodes_per_ray,
);

stat_register_fns!(
    bvh_stats_tree_bytes,
    bvh_stats_interior_nodes,
    bvh_stats_leaf_nodes,
    bvh_stats_primitive_hits,
    bvh_stats_nodes_per_ray,
);

/// Stores information about an object while the tree is built.
#[derive(Copy, Clone, Debug)]
pub struct BVHPrimitiveInfo {
    /// The object table entry.
    pub object: ObjectEntry,

    /// The bounding box of the object's geometry.
    pub bounds: Bounds3f,

    /// The centroid of the bounding box.
    pub centroid: Point3f,
}

impl BVHPrimitiveInfo {
    /// Create a `BVHPrimitiveInfo`.
    ///
    /// * `object` - The object table entry.
    /// * `bounds` - The bounding box of the object's geometry.
    pub fn new(object: ObjectEntry, bounds: Bounds3f) -> Self {
        Self {
            object,
            bounds,
            centroid: bounds.centroid(),
        }
    }
}

/// A node of the flattened tree. Leaves reference one object; interior nodes
/// always have two children.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BVHNode {
    /// Bounding box of everything beneath this node.
    pub bounds: Bounds3f,

    /// Object index for leaves; `NO_INDEX` for interior nodes.
    pub object: Int,

    /// Index of the left child or `NO_INDEX`.
    pub left: Int,

    /// Index of the right child or `NO_INDEX`.
    pub right: Int,
}

impl Default for BVHNode {
    /// Returns an unused node with an empty box that no ray enters.
    fn default() -> Self {
        Self {
            bounds: Bounds3f::EMPTY,
            object: NO_INDEX,
            left: NO_INDEX,
            right: NO_INDEX,
        }
    }
}

impl BVHNode {
    /// Creates a leaf node.
    ///
    /// * `object` - Object index.
    /// * `bounds` - Bounding box of the object.
    pub fn new_leaf_node(object: usize, bounds: Bounds3f) -> Self {
        stat_inc!(LEAF_NODES, 1);
        Self {
            bounds,
            object: object as Int,
            left: NO_INDEX,
            right: NO_INDEX,
        }
    }

    /// Creates an interior node over two built children.
    ///
    /// * `left`   - Index of the left child.
    /// * `right`  - Index of the right child.
    /// * `bounds` - Union of the children's boxes.
    pub fn new_interior_node(left: usize, right: usize, bounds: Bounds3f) -> Self {
        stat_inc!(INTERIOR_NODES, 1);
        Self {
            bounds,
            object: NO_INDEX,
            left: left as Int,
            right: right as Int,
        }
    }

    /// Returns the object index if this is a leaf.
    pub fn leaf_object(&self) -> Option<usize> {
        usize::try_from(self.object).ok()
    }

    /// Returns the child indices that exist.
    pub fn children(&self) -> impl Iterator<Item = usize> {
        [self.left, self.right]
            .into_iter()
            .filter_map(|c| usize::try_from(c).ok())
    }
}
