//! OPTICS: Ordering Points To Identify the Clustering Structure.
//!
//! # The Algorithm (Ankerst et al., 1999)
//!
//! OPTICS is a density-based clustering algorithm. Rather than producing a
//! flat labeling for one fixed density like DBSCAN, it emits a linear
//! ordering of the points in which density-connected groups end up
//! adjacent, annotated with the reachability-distance at which each point
//! was reached. Cutting that ordering at any reachability threshold
//! recovers the DBSCAN clustering for that threshold, so a single run
//! exposes the cluster structure at every density at once.
//!
//! ## Core Concepts
//!
//! - **Epsilon (ε)**: Generating radius for neighborhoods, here an angle
//!   in degrees on the unit sphere.
//! - **MinNeighbors (MinPts)**: Minimum size of an ε-neighborhood for a
//!   point to be "core". The neighborhood of a point contains the point
//!   itself.
//! - **Core-distance**: For a core point, the distance to its
//!   MinNeighbors-th nearest neighbor.
//! - **Reachability-distance** of q from p:
//!   `max(core-distance(p), dist(p, q))`.
//!
//! ## Algorithm Steps
//!
//! 1. Scan for an unprocessed point, finalize it, and start a cluster.
//! 2. If it is a core point, push its neighbors into a seed heap keyed by
//!    reachability-distance.
//! 3. While seeds remain, pop the smallest, finalize it, append it to the
//!    current cluster, and expand around it in turn.
//! 4. When the heap runs dry the cluster is complete; publish it and
//!    resume the scan.
//!
//! A cluster is therefore a maximal reachability run, and a singleton
//! cluster is a noise point. The consumer may further segment clusters by
//! thresholding reachability after the fact.
//!
//! ## Complexity
//!
//! One range query per point: O(n · q) where q is the cost of a query
//! against the spatial index, plus O(n log n) for the heap traffic.
//!
//! ## References
//!
//! Ankerst, M., Breunig, M. M., Kriegel, H.-P., Sander, J. (1999).
//! "OPTICS: Ordering Points To Identify the Clustering Structure."
//! ACM SIGMOD 1999, pp. 49-60.

use tracing::info;

use crate::cluster::point::{Point, NOT_FOUND, PROCESSED, UNPROCESSED};
use crate::cluster::seeds::SeedList;
use crate::cluster::traits::ClusterPublisher;
use crate::cluster::tree::Tree;
use crate::error::{Error, Result};
use crate::geom::squared_euclidean_for_angle;

/// The OPTICS driver.
///
/// Owns the point array for the duration of one [`run`](Optics::run),
/// lending it to the spatial index and the seed heap one call at a time.
/// Construction builds the index (permuting the points) and performs all
/// allocation; `run` itself only grows the transient cluster vector.
pub struct Optics {
    points: Option<Vec<Point>>,
    tree: Tree,
    seeds: SeedList,
    distances: Vec<f64>,
    epsilon: f64,
    min_neighbors: usize,
}

impl Optics {
    /// Create a driver over `points`.
    ///
    /// # Arguments
    ///
    /// * `points` - The point array; `v` and `record` populated, all other
    ///   fields at their defaults.
    /// * `min_neighbors` - Minimum ε-neighborhood size (the point itself
    ///   included) for a core object. At least 1.
    /// * `epsilon` - Neighborhood radius in degrees, in `(0, 180]`.
    /// * `points_per_leaf` - Spatial index tuning: target leaf size.
    /// * `leaf_extent_threshold` - Spatial index tuning: nodes with at most
    ///   this extent (in unit-vector coordinate units) are not subdivided.
    pub fn new(
        mut points: Vec<Point>,
        min_neighbors: usize,
        epsilon: f64,
        points_per_leaf: usize,
        leaf_extent_threshold: f64,
    ) -> Result<Self> {
        if min_neighbors == 0 {
            return Err(Error::InvalidParameter {
                name: "min_neighbors",
                message: "must be at least 1",
            });
        }
        if !(epsilon > 0.0 && epsilon <= 180.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be in (0, 180] degrees",
            });
        }
        let tree = Tree::build(&mut points, points_per_leaf, leaf_extent_threshold)?;
        Ok(Self {
            seeds: SeedList::new(points.len()),
            distances: Vec::with_capacity(min_neighbors),
            epsilon: squared_euclidean_for_angle(epsilon),
            min_neighbors,
            tree,
            points: Some(points),
        })
    }

    /// The number of points handed to the driver.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Always false: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Produce the reachability ordering, publishing one cluster per
    /// reachability run and a final (possibly empty) cluster at
    /// termination.
    ///
    /// Single-shot: the driver relinquishes its points when it returns,
    /// and a second call fails with [`Error::AlreadyRun`].
    pub fn run<P: ClusterPublisher + ?Sized>(&mut self, publisher: &mut P) -> Result<()> {
        let mut points = self.points.take().ok_or(Error::AlreadyRun)?;
        info!("clustering {} points using OPTICS", points.len());

        let mut cluster: Vec<usize> = Vec::new();
        let mut scan_from = 0;
        loop {
            if self.seeds.is_empty() {
                // find the next unprocessed point
                let mut i = NOT_FOUND;
                for j in scan_from..points.len() {
                    if points[j].state == UNPROCESSED {
                        scan_from = j + 1;
                        i = j;
                        break;
                    }
                }
                if i == NOT_FOUND {
                    break;
                }
                points[i].state = PROCESSED;
                self.expand_cluster_order(&mut points, i);
                if !cluster.is_empty() {
                    // clusters of size 1 are generated for noise sources
                    publisher.publish(&cluster);
                    cluster.clear();
                }
                cluster.push(points[i].record);
            } else {
                // expand around the seed with the smallest reachability
                let i = self.seeds.pop(&mut points);
                self.expand_cluster_order(&mut points, i);
                debug_assert!(points[i].reach < f64::INFINITY);
                cluster.push(points[i].record);
            }
        }

        publisher.publish(&cluster);
        info!("finished clustering");
        Ok(())
    }

    fn expand_cluster_order(&mut self, points: &mut [Point], i: usize) {
        // epsilon neighborhood of point i; the list includes i itself
        let v = points[i].v;
        let range = self.tree.in_range(points, &v, self.epsilon);

        // core-distance: the min_neighbors-th smallest neighborhood
        // distance, tracked with a bounded max-heap
        self.distances.clear();
        let mut j = range;
        while j != NOT_FOUND {
            let d = points[j].dist;
            if self.distances.len() < self.min_neighbors {
                self.distances.push(d);
                sift_up_max(&mut self.distances);
            } else if self.distances[0] > d {
                self.distances[0] = d;
                sift_down_max(&mut self.distances);
            }
            j = points[j].next;
        }

        if self.distances.len() == self.min_neighbors {
            // point i is a core object: update the reachability-distance
            // of every point in its epsilon neighborhood
            let core_dist = self.distances[0];
            let mut j = range;
            while j != NOT_FOUND {
                if points[j].state != PROCESSED {
                    let reach = core_dist.max(points[j].dist);
                    self.seeds.update(points, j, reach);
                }
                j = points[j].next;
            }
        }
    }
}

fn sift_up_max(heap: &mut [f64]) {
    let mut i = heap.len() - 1;
    let d = heap[i];
    while i > 0 {
        let parent = (i - 1) >> 1;
        if heap[parent] >= d {
            break;
        }
        heap[i] = heap[parent];
        i = parent;
    }
    heap[i] = d;
}

fn sift_down_max(heap: &mut [f64]) {
    let d = heap[0];
    let half = heap.len() >> 1;
    let mut i = 0;
    while i < half {
        let mut child = (i << 1) + 1;
        if child + 1 < heap.len() && heap[child + 1] > heap[child] {
            child += 1;
        }
        if d >= heap[child] {
            break;
        }
        heap[i] = heap[child];
        i = child;
    }
    heap[i] = d;
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geom::LonLat;

    fn sky_points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(lon, lat))| Point::new(LonLat::from_degrees(lon, lat).into(), i))
            .collect()
    }

    #[test]
    fn rejects_invalid_parameters() {
        let points = sky_points(&[(0.0, 0.0)]);

        assert!(Optics::new(points.clone(), 0, 1.0, 32, 0.0).is_err());
        assert!(Optics::new(points.clone(), 1, 0.0, 32, 0.0).is_err());
        assert!(Optics::new(points.clone(), 1, -1.0, 32, 0.0).is_err());
        assert!(Optics::new(points.clone(), 1, 180.5, 32, 0.0).is_err());
        assert!(Optics::new(points.clone(), 1, 1.0, 0, 0.0).is_err());
        assert!(Optics::new(points, 1, 1.0, 32, -0.5).is_err());
        assert!(Optics::new(Vec::new(), 1, 1.0, 32, 0.0).is_err());
    }

    #[test]
    fn run_is_single_shot() {
        let points = sky_points(&[(0.0, 0.0), (10.0, 10.0)]);
        let n = points.len();
        let mut optics = Optics::new(points, 1, 1.0, 32, 0.0).unwrap();
        assert_eq!(optics.len(), n);
        assert!(!optics.is_empty());

        let mut sink = |_: &[usize]| {};
        optics.run(&mut sink).unwrap();
        assert!(matches!(optics.run(&mut sink), Err(Error::AlreadyRun)));
        // the points are relinquished, but the driver still knows its size
        assert_eq!(optics.len(), n);
    }

    #[test]
    fn scratch_heap_tracks_smallest_distances() {
        let mut heap = Vec::with_capacity(3);
        for &d in &[5.0, 1.0, 4.0] {
            heap.push(d);
            sift_up_max(&mut heap);
        }
        assert_eq!(heap[0], 5.0);
        for &d in &[3.0, 0.5, 6.0] {
            if heap[0] > d {
                heap[0] = d;
                sift_down_max(&mut heap);
            }
        }
        // the three smallest of {5, 1, 4, 3, 0.5, 6}, largest at the root
        assert_eq!(heap[0], 3.0);
        let mut rest = vec![heap[1], heap[2]];
        rest.sort_by(f64::total_cmp);
        assert_eq!(rest, vec![0.5, 1.0]);
    }
}
