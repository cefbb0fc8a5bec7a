//! The OPTICS ordered-seed heap.
//!
//! An indexed binary min-heap of point indices keyed by reachability
//! distance. Each point stores its current heap position in its `state`
//! field, which makes membership testing O(1) and decrease-key O(log n):
//! the heap never has to search for the entry to reprioritize. The sift
//! loops move a hole instead of swapping, updating the back-pointers of
//! every element they shift.

use tracing::error;

use crate::cluster::point::{Point, NOT_FOUND, PROCESSED, UNPROCESSED};

/// The seed list: candidate points ordered by reachability-distance.
#[derive(Debug)]
pub struct SeedList {
    heap: Box<[usize]>,
    size: usize,
}

impl SeedList {
    /// Create an empty seed list able to hold `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: vec![NOT_FOUND; capacity].into_boxed_slice(),
            size: 0,
        }
    }

    /// Whether the seed list holds no points.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The number of points currently in the seed list.
    pub fn len(&self) -> usize {
        self.size
    }

    /// The maximum number of points the seed list can hold.
    pub fn capacity(&self) -> usize {
        self.heap.len()
    }

    /// Remove and return the point with the smallest reachability-distance,
    /// marking it [`PROCESSED`]. Returns [`NOT_FOUND`] if the list is empty.
    pub fn pop(&mut self, points: &mut [Point]) -> usize {
        let s = self.size;
        if s == 0 {
            return NOT_FOUND;
        }
        let smallest = self.heap[0];
        points[smallest].state = PROCESSED;
        let s = s - 1;
        self.size = s;
        if s > 1 {
            self.sift_down(points, self.heap[s]);
        } else if s == 1 {
            let i = self.heap[1];
            self.heap[0] = i;
            points[i].state = 0;
        }
        smallest
    }

    /// Add the `i`-th point to the seed list.
    ///
    /// The point must not already be in the list, and the list must not be
    /// full.
    pub fn add(&mut self, points: &mut [Point], i: usize) {
        debug_assert!(i < self.capacity());
        debug_assert!(self.size < self.capacity());
        let s = self.size;
        self.size = s + 1;
        if s == 0 {
            self.heap[0] = i;
            points[i].state = 0;
        } else {
            self.sift_up(points, s, i);
        }
    }

    /// Update the reachability-distance of the `i`-th point.
    ///
    /// If the point is not yet in the seed list, its reachability is set
    /// and it is added. If it is in the list and `reach` is smaller than
    /// its current reachability, the key decreases and the point moves up.
    /// [`PROCESSED`] points are left untouched: their position in the
    /// cluster ordering is already final.
    pub fn update(&mut self, points: &mut [Point], i: usize, reach: f64) {
        debug_assert!(i < self.capacity());
        let heap_index = points[i].state;
        if heap_index < PROCESSED {
            debug_assert_eq!(self.heap[heap_index], i);
            // already in the seed list
            if reach < points[i].reach {
                points[i].reach = reach;
                self.sift_up(points, heap_index, i);
            }
        } else if heap_index == UNPROCESSED {
            points[i].reach = reach;
            self.add(points, i);
        }
    }

    fn sift_up(&mut self, points: &mut [Point], mut heap_index: usize, point_index: usize) {
        debug_assert!(heap_index < self.size);
        debug_assert!(point_index < self.capacity());
        let reach = points[point_index].reach;
        while heap_index > 0 {
            let parent_heap_index = (heap_index - 1) >> 1;
            let parent_point_index = self.heap[parent_heap_index];
            if points[parent_point_index].reach <= reach {
                break;
            }
            self.heap[heap_index] = parent_point_index;
            points[parent_point_index].state = heap_index;
            heap_index = parent_heap_index;
        }
        self.heap[heap_index] = point_index;
        points[point_index].state = heap_index;
    }

    fn sift_down(&mut self, points: &mut [Point], point_index: usize) {
        debug_assert!(point_index < self.capacity());
        let reach = points[point_index].reach;
        let half_size = self.size >> 1;
        let mut heap_index = 0;
        while heap_index < half_size {
            let mut child_heap_index = (heap_index << 1) + 1;
            let sibling_heap_index = child_heap_index + 1;
            let mut child_point_index = self.heap[child_heap_index];
            let mut child_reach = points[child_point_index].reach;
            if sibling_heap_index < self.size {
                let sibling_point_index = self.heap[sibling_heap_index];
                let sibling_reach = points[sibling_point_index].reach;
                if sibling_reach < child_reach {
                    child_reach = sibling_reach;
                    child_point_index = sibling_point_index;
                    child_heap_index = sibling_heap_index;
                }
            }
            if reach <= child_reach {
                break;
            }
            self.heap[heap_index] = child_point_index;
            points[child_point_index].state = heap_index;
            heap_index = child_heap_index;
        }
        self.heap[heap_index] = point_index;
        points[point_index].state = heap_index;
    }

    /// Verify that the seed list is internally consistent: every in-heap
    /// point's `state` names its heap slot, every heap slot names a point
    /// that points back at it, and parents never have larger reachability
    /// than their children. O(N + len). For use in tests.
    pub fn check_invariants(&self, points: &[Point]) -> bool {
        // each point knows its location in the seed list
        for (i, p) in points.iter().enumerate() {
            let h = p.state;
            if h < PROCESSED {
                if h >= self.size {
                    error!("point {i} has invalid seed list index {h} >= {}", self.size);
                    return false;
                }
                if self.heap[h] != i {
                    error!("point {i} has an incorrect seed list index {h}");
                    return false;
                }
            }
        }
        for h in 0..self.size {
            let p = self.heap[h];
            if p >= points.len() {
                error!("heap entry {h} has invalid point index {p} >= {}", points.len());
                return false;
            }
            if points[p].state != h {
                error!("point {p} has incorrect seed list index != {h}");
                return false;
            }
        }
        // the heap invariant
        for h in 0..self.size >> 1 {
            let reach = points[self.heap[h]].reach;
            let child = (h << 1) + 1;
            if points[self.heap[child]].reach < reach {
                error!("heap invariant violation at {h}");
                return false;
            }
            if child + 1 < self.size && points[self.heap[child + 1]].reach < reach {
                error!("heap invariant violation at {h}");
                return false;
            }
        }
        true
    }
}
