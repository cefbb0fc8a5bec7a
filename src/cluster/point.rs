//! The shared mutable point record.
//!
//! A single array of [`Point`]s is threaded through the whole clustering
//! run: the spatial index permutes it and embeds range-query results in it,
//! the seed heap stores back-pointers in it, and the OPTICS driver reads
//! and finalizes it. The `state` field multiplexes three roles using
//! out-of-range sentinels, which is what makes the heap's decrease-key a
//! constant-time lookup.

use crate::geom::Vec3;

/// Sentinel index: "no such point". Terminates range-query result lists.
pub const NOT_FOUND: usize = usize::MAX;

/// `state` sentinel: the point has not been touched by the driver yet.
pub const UNPROCESSED: usize = usize::MAX;

/// `state` sentinel: the point's position in the cluster ordering is final.
///
/// Any valid heap index is numerically smaller than both `PROCESSED` and
/// [`UNPROCESSED`], so `state < PROCESSED` tests heap membership.
pub const PROCESSED: usize = usize::MAX - 1;

/// An entry in the array indexed by the 3-d tree.
///
/// Contains the point's unit vector along with:
///
/// - an index used to embed a singly linked list of range-query results in
///   the point array,
/// - the squared distance of the point to the current range-query input,
/// - the reachability-distance maintained by the OPTICS algorithm,
/// - an opaque handle to the record the coordinates came from.
///
/// Memory usage per point is 64 bytes (a single cache line on most CPUs).
#[derive(Debug, Clone, Copy)]
#[repr(align(64))]
pub struct Point {
    /// Unit vector extracted from the originating record.
    pub v: Vec3,
    /// Squared distance to the latest range-query point. Only valid for
    /// points returned by that query, until the next query runs.
    pub dist: f64,
    /// OPTICS reachability-distance.
    pub reach: f64,
    /// Opaque handle to the originating record. Never interpreted here;
    /// typically an index or byte offset into caller-owned storage.
    pub record: usize,
    /// Index of the next range-query result, or [`NOT_FOUND`].
    pub next: usize,
    /// [`UNPROCESSED`], [`PROCESSED`], or the point's current index in the
    /// seed heap.
    pub state: usize,
}

impl Point {
    /// Create a point at `v` carrying `record`, with all scratch fields at
    /// their defaults.
    pub fn new(v: Vec3, record: usize) -> Self {
        Self {
            v,
            dist: f64::NAN,
            reach: f64::INFINITY,
            record,
            next: NOT_FOUND,
            state: UNPROCESSED,
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(Vec3::default(), 0)
    }
}
