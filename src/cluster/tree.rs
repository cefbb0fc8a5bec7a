//! A pointerless 3-d tree over an array of points.
//!
//! The tree is an implicit-layout binary tree: the children of node `i`
//! live at positions `2i + 1` and `2i + 2` of a flat node array, so nodes
//! store no child pointers and siblings are contiguous in memory. Points
//! belonging to a node are contiguous in the point array, and a node only
//! records the index one past its last point; the index of its first point
//! is read from the node to its left at the same level. Memory usage per
//! node is 16 bytes.
//!
//! The only query is an epsilon range query: find all points within some
//! squared Euclidean distance of a query vector. Its result is returned as
//! the index of the first point in range, with the remaining results
//! reachable through the linked list embedded in the points themselves
//! (`Point::next`). The results are expected to span a small number of
//! leaves that the scan has just touched, so the list is likely
//! cache-resident when the caller walks it. The price of this layout is
//! that a query mutates the point array, which is why [`Tree::in_range`]
//! takes the points as an exclusive borrow: one query at a time, and each
//! query invalidates the previous result.
//!
//! The tree does not own the point array. Construction permutes the order
//! of points in the array but never modifies the points themselves.

use tracing::info;

use crate::cluster::point::{Point, NOT_FOUND};
use crate::error::{Error, Result};
use crate::geom::{min_squared_euclidean, squared_euclidean, Vec3};

const SHIFT: u32 = 2;
const MASK: usize = (1 << SHIFT) - 1;
const LEAF_DIM: usize = 3;

/// A pointerless node: a splitting value plus packed metadata.
///
/// The two least-significant bits of `metadata` hold the split dimension
/// (0, 1, 2) or [`LEAF_DIM`] for a leaf; the remaining bits hold the index
/// one past the last point of the subtree rooted here.
#[derive(Debug, Clone, Copy)]
struct Node {
    split: f64,
    metadata: usize,
}

impl Node {
    #[inline]
    fn right(&self) -> usize {
        self.metadata >> SHIFT
    }

    #[inline]
    fn split_dim(&self) -> usize {
        self.metadata & MASK
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.split_dim() == LEAF_DIM
    }

    fn set_split_dim(&mut self, dim: usize) {
        self.metadata = (dim & MASK) | (self.metadata & !MASK);
    }

    fn set_right(&mut self, index: usize) {
        self.metadata = (index << SHIFT) | (self.metadata & MASK);
    }
}

impl Default for Node {
    fn default() -> Self {
        // all-ones metadata: a leaf until a split dimension is assigned
        Self {
            split: f64::NAN,
            metadata: usize::MAX,
        }
    }
}

/// Finds the extent and dimension of maximum extent of the given points.
/// Used to pick a splitting dimension during tree construction.
fn max_extent_and_dim(points: &[Point]) -> (f64, usize) {
    let inf = f64::INFINITY;
    let mut min = Vec3::new(inf, inf, inf);
    let mut max = -min;
    for p in points {
        min = min.min(&p.v);
        max = max.max(&p.v);
    }
    let extents = max - min;
    let mut max_extent = extents.x();
    let mut max_dim = 0;
    if extents.y() > max_extent {
        max_extent = extents.y();
        max_dim = 1;
    }
    if extents.z() > max_extent {
        max_extent = extents.z();
        max_dim = 2;
    }
    (max_extent, max_dim)
}

/// A pointerless 3-d tree supporting epsilon range queries over a point
/// array it does not own.
#[derive(Debug)]
pub struct Tree {
    num_points: usize,
    height: usize,
    nodes: Box<[Node]>,
}

impl Tree {
    /// Maximum tree height: two bits of node metadata pack the split
    /// dimension.
    pub const MAX_HEIGHT: usize = usize::BITS as usize - 2;

    /// Build a 3-d tree over `points`, permuting them in place.
    ///
    /// `points_per_leaf` is the target number of points per leaf node and
    /// determines the tree height. Nodes whose maximum extent along every
    /// dimension is at most `leaf_extent_threshold` are not subdivided.
    pub fn build(
        points: &mut [Point],
        points_per_leaf: usize,
        leaf_extent_threshold: f64,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        if points_per_leaf == 0 {
            return Err(Error::InvalidParameter {
                name: "points_per_leaf",
                message: "must be at least 1",
            });
        }
        if !(leaf_extent_threshold >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "leaf_extent_threshold",
                message: "must be non-negative",
            });
        }

        let num_points = points.len();
        let mut height = 0;
        while height < Self::MAX_HEIGHT && num_points >> height > points_per_leaf {
            height += 1;
        }
        let num_nodes = (1usize << (height + 1)) - 1;
        let mut tree = Self {
            num_points,
            height,
            nodes: vec![Node::default(); num_nodes].into_boxed_slice(),
        };
        tree.subdivide(points, leaf_extent_threshold);
        Ok(tree)
    }

    /// The number of points this tree was built over.
    pub fn len(&self) -> usize {
        self.num_points
    }

    /// Always false: empty trees cannot be built.
    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    /// The height of the tree (0 for a single leaf).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Locate all points within squared Euclidean distance `dist` of `v`.
    ///
    /// Returns the index of the first point in range, or [`NOT_FOUND`] if
    /// there is none. The remaining results are reached by following
    /// `Point::next` until it yields [`NOT_FOUND`]; each result's squared
    /// distance to `v` is left in its `dist` field. Both fields are only
    /// valid until the next query on this point array.
    ///
    /// `points` must be the same slice the tree was built over.
    pub fn in_range(&self, points: &mut [Point], v: &Vec3, dist: f64) -> usize {
        debug_assert_eq!(points.len(), self.num_points);
        let mut descend = [false; Self::MAX_HEIGHT];
        let mut node = 0;
        let mut h = 0;
        let mut head = NOT_FOUND;
        let mut tail = NOT_FOUND;
        loop {
            if self.nodes[node].is_leaf() {
                let right = self.nodes[node].right();
                let left = if node & (node + 1) != 0 {
                    // node has a left sibling: it carries the index of the
                    // first point in this leaf
                    self.nodes[node - 1].right()
                } else {
                    0
                };
                // scan the leaf, appending results to the embedded list
                for i in left..right {
                    let d = squared_euclidean(v, &points[i].v);
                    if d <= dist {
                        points[i].dist = d;
                        if tail == NOT_FOUND {
                            head = i;
                        } else {
                            points[tail].next = i;
                        }
                        tail = i;
                    }
                }
                // move back up to the nearest subtree still pending a visit
                let mut pending = false;
                while h > 0 {
                    node = (node - 1) >> 1;
                    h -= 1;
                    if descend[h] {
                        pending = true;
                        break;
                    }
                }
                if !pending {
                    break;
                }
                descend[h] = false;
                node = (node << 1) + 2;
                h += 1;
            } else {
                // determine which children must be visited
                let split = self.nodes[node].split;
                let dim = self.nodes[node].split_dim();
                let vd = v.coords[dim];
                if min_squared_euclidean(vd, split) <= dist {
                    // both children
                    descend[h] = true;
                    node = (node << 1) + 1;
                } else if vd < split {
                    descend[h] = false;
                    node = (node << 1) + 1;
                } else {
                    descend[h] = false;
                    node = (node << 1) + 2;
                }
                h += 1;
            }
        }
        if tail != NOT_FOUND {
            points[tail].next = NOT_FOUND;
        }
        head
    }

    /// Iterative construction: explicit index arithmetic, no recursion
    /// stack, no per-node allocation.
    fn subdivide(&mut self, points: &mut [Point], leaf_extent_threshold: f64) {
        info!(
            "building 3d tree of height {} for {} points",
            self.height, self.num_points
        );
        let mut node = 0;
        let mut left = 0;
        let mut right = self.num_points;
        let mut h = 0;
        loop {
            self.nodes[node].set_right(right);
            if h < self.height {
                let (extent, dim) = max_extent_and_dim(&points[left..right]);
                if extent > leaf_extent_threshold {
                    self.nodes[node].set_split_dim(dim);
                    // position the median as if [left, right) were sorted
                    let median = left + ((right - left) >> 1);
                    points[left..right].select_nth_unstable_by(median - left, |a, b| {
                        a.v.coords[dim].total_cmp(&b.v.coords[dim])
                    });
                    right = median;
                    self.nodes[node].split = points[right].v.coords[dim];
                    // process the left child
                    node = (node << 1) + 1;
                    h += 1;
                    continue;
                }
                // node extent is below the subdivision limit: set the right
                // index for all right descendants of node, since their left
                // siblings may still carry meaningful ranges
                let mut h2 = h;
                let mut c = node;
                while h2 < self.height {
                    c = (c << 1) + 2;
                    h2 += 1;
                    self.nodes[c].set_right(right);
                }
            }
            // move up the tree until a left child is found
            left = right;
            while h > 0 && node & 1 == 0 {
                node = (node - 1) >> 1;
                h -= 1;
            }
            if h == 0 {
                break;
            }
            // node is a left child: process its right sibling
            right = self.nodes[(node - 1) >> 1].right();
            node += 1;
        }
        info!("built 3d tree");
    }
}
