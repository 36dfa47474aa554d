//! Median split construction

use super::common::*;
use simcore::error::{Error, Result};
use simcore::geometry::*;
use order_stat::kth_by;

/// Recursively build the subtree over `info[left..=right]` and return its root
/// node index together with the next free node index.
///
/// Nodes are allocated in preorder from `next`; a subtree over `n` objects
/// uses exactly `2n - 1` nodes. Ranges of three or more objects are split at
/// the median centroid along the axis of largest centroid extent, partially
/// reordering `info` in place.
///
/// * `info`     - Object information; reordered in place.
/// * `nodes`    - Preallocated node array.
/// * `left`     - First object index of the range.
/// * `right`    - Last object index of the range (inclusive).
/// * `next`     - Next free node index.
/// * `required` - Total nodes the whole tree needs, for error reporting.
pub fn build(
    info: &mut [BVHPrimitiveInfo],
    nodes: &mut [BVHNode],
    left: usize,
    right: usize,
    next: usize,
    required: usize,
) -> Result<(usize, usize)> {
    let index = allocate(nodes, next, required)?;
    let next = index + 1;

    if left == right {
        nodes[index] = BVHNode::new_leaf_node(left, info[left].bounds);
        return Ok((index, next));
    }

    let mid = if right == left + 1 {
        left
    } else {
        // Bounds of primitive centroids choose the split dimension.
        let centroid_bounds = info[left..=right]
            .iter()
            .fold(Bounds3f::EMPTY, |b, pi| b.union(&pi.centroid));
        let dim = centroid_bounds.maximum_extent();

        let mid = (left + right) / 2;
        kth_by(&mut info[left..=right], mid - left, |a, b| {
            a.centroid[dim].total_cmp(&b.centroid[dim])
        });
        mid
    };

    let (l, next) = build(info, nodes, left, mid, next, required)?;
    let (r, next) = build(info, nodes, mid + 1, right, next, required)?;
    let bounds = nodes[l].bounds.union(&nodes[r].bounds);
    nodes[index] = BVHNode::new_interior_node(l, r, bounds);

    Ok((index, next))
}

/// Claims node `next` or fails if the array is full.
fn allocate(nodes: &[BVHNode], next: usize, required: usize) -> Result<usize> {
    if next < nodes.len() {
        Ok(next)
    } else {
        Err(Error::CapacityExceeded {
            capacity: nodes.len(),
            requested: required,
        })
    }
}
