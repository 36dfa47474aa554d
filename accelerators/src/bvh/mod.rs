//! Bounding Volume Hierarchy.

use simcore::error::{Error, Result};
use simcore::geometry::*;
use simcore::pbrt::*;
use simcore::primitive::*;
use simcore::stat_inc;

mod build;
mod common;

pub use common::*;

/// Maximum number of pending nodes during traversal. A median split tree over
/// `n` objects is `ceil(log2 n) + 1` levels deep, and a traversal never holds
/// more than one pending node per level plus one.
const TRAVERSAL_STACK_SIZE: usize = 64;

/// Bounding Volume Hierarchy Accelerator.
///
/// Nodes live in a flat array of exactly `2n - 1` entries for `n` objects,
/// in preorder with the root at index 0. The tree is immutable once built.
#[derive(Clone, Debug)]
pub struct BVHAccel {
    /// The list of nodes.
    nodes: Vec<BVHNode>,
}

impl BVHAccel {
    /// Returns the number of nodes a tree over `n` objects needs.
    ///
    /// * `n` - Number of objects.
    pub fn required_nodes(n: usize) -> usize {
        2 * n - 1
    }

    /// Builds the tree over an object table. The table is reordered in place;
    /// leaf nodes hold indices into the reordered table.
    ///
    /// * `objects`    - The object table.
    /// * `geometries` - Geometry referenced by the objects.
    pub fn build<G: Shape>(objects: &mut [ObjectEntry], geometries: &[G]) -> Result<Self> {
        if objects.is_empty() {
            return Err(Error::EmptyScene);
        }
        Self::build_with_capacity(objects, geometries, Self::required_nodes(objects.len()))
    }

    /// Builds the tree into a node array of a given capacity. Fails with
    /// `Error::CapacityExceeded` instead of truncating the tree.
    ///
    /// * `objects`    - The object table.
    /// * `geometries` - Geometry referenced by the objects.
    /// * `capacity`   - Number of nodes to allocate.
    pub fn build_with_capacity<G: Shape>(
        objects: &mut [ObjectEntry],
        geometries: &[G],
        capacity: usize,
    ) -> Result<Self> {
        register_stats();

        let n_objects = objects.len();
        if n_objects == 0 {
            return Err(Error::EmptyScene);
        }

        // Initialize primitive info for the objects.
        let mut info = objects
            .iter()
            .enumerate()
            .map(|(i, object)| {
                object
                    .geometry_index()
                    .and_then(|g| geometries.get(g))
                    .map(|g| BVHPrimitiveInfo::new(*object, g.bounds()))
                    .ok_or_else(|| {
                        Error::InvalidScene(format!(
                            "object {} refers to missing geometry {}",
                            i, object.geometry
                        ))
                    })
            })
            .collect::<Result<Vec<BVHPrimitiveInfo>>>()?;

        let required = Self::required_nodes(n_objects);
        let mut nodes = vec![BVHNode::default(); capacity];
        let (root, total_nodes) = build::build(&mut info, &mut nodes, 0, n_objects - 1, 0, required)?;
        debug_assert!(root == 0 && total_nodes == required);
        nodes.truncate(total_nodes);

        // Apply the build order to the object table.
        for (object, pi) in objects.iter_mut().zip(info.iter()) {
            *object = pi.object;
        }

        let tree_bytes = total_nodes * std::mem::size_of::<BVHNode>() + std::mem::size_of::<Self>();
        stat_inc!(TREE_BYTES, tree_bytes as u64);
        info!(
            "BVH created with {} nodes for {} objects ({:.2} MB)",
            total_nodes,
            n_objects,
            tree_bytes as f32 / (1024.0 * 1024.0)
        );

        Ok(Self { nodes })
    }

    /// Returns the flattened nodes; the root is node 0.
    pub fn nodes(&self) -> &[BVHNode] {
        &self.nodes
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the bounding box of the whole tree.
    pub fn world_bound(&self) -> Bounds3f {
        self.nodes.first().map_or(Bounds3f::EMPTY, |n| n.bounds)
    }

    /// Returns the closest intersection farther than `HIT_EPSILON` along the
    /// ray, tagged with its object index, or `None`.
    ///
    /// Every node whose box the ray enters is visited and distances are
    /// compared at the leaves, so the nearest hit wins regardless of the
    /// order siblings are visited in.
    ///
    /// * `ray`        - The ray.
    /// * `objects`    - The object table the tree was built over.
    /// * `geometries` - Geometry referenced by the objects.
    pub fn intersect<G: Shape>(
        &self,
        ray: &Ray,
        objects: &[ObjectEntry],
        geometries: &[G],
    ) -> Option<Intersection> {
        if self.nodes.is_empty() {
            return None;
        }

        let inv_dir = ray.inv_dir();
        let dir_is_neg = ray.dir_is_neg();

        let mut best: Option<Intersection> = None;
        let mut best_distance = INFINITY;

        let mut nodes_to_visit = [0_usize; TRAVERSAL_STACK_SIZE];
        let mut to_visit_offset = 1;
        stat_inc!(RAYS_TRACED, 1);

        while to_visit_offset > 0 {
            to_visit_offset -= 1;
            let node = &self.nodes[nodes_to_visit[to_visit_offset]];
            stat_inc!(NODES_VISITED, 1);

            if !node.bounds.intersect_p_inv(ray, &inv_dir, dir_is_neg) {
                continue;
            }

            if let Some(object) = node.leaf_object() {
                stat_inc!(PRIMITIVE_TESTS, 1);
                let hit = objects
                    .get(object)
                    .and_then(ObjectEntry::geometry_index)
                    .and_then(|g| geometries.get(g))
                    .and_then(|g| g.intersect(ray));

                if let Some(hit) = hit {
                    stat_inc!(PRIMITIVE_HITS, 1);
                    if hit.distance > HIT_EPSILON && hit.distance < best_distance {
                        best_distance = hit.distance;
                        best = Some(hit.with_object(object as Int));
                    }
                }
            } else {
                for child in node.children() {
                    nodes_to_visit[to_visit_offset] = child;
                    to_visit_offset += 1;
                }
            }
        }

        best
    }
}
