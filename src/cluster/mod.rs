//! Density-based clustering of points on the unit sphere.
//!
//! This module implements the OPTICS algorithm over a pointerless 3-d
//! tree. Three collaborators share one mutable point array:
//!
//! - the [`Tree`] permutes the array at construction and threads
//!   range-query results through it as an embedded linked list,
//! - the [`SeedList`] keeps each point's heap position in the point
//!   itself, making decrease-key O(log n) with an O(1) membership test,
//! - the [`Optics`] driver interleaves range queries, core-distance
//!   computation and seed expansion to emit the reachability ordering.
//!
//! The sharing is safe by temporal separation: the driver owns the array
//! and lends exclusive access to the tree or the heap for the duration of
//! a single call, and at most one range-query result is ever live.
//!
//! ## Usage
//!
//! ```rust
//! use skyclust::{LonLat, Optics, Point};
//!
//! let coords = [
//!     (10.0, 0.0),
//!     (10.1, 0.1),
//!     (10.05, -0.1),
//!     (200.0, -45.0),
//! ];
//! let points: Vec<Point> = coords
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &(lon, lat))| Point::new(LonLat::from_degrees(lon, lat).into(), i))
//!     .collect();
//!
//! let mut clusters: Vec<Vec<usize>> = Vec::new();
//! let mut sink = |cluster: &[usize]| clusters.push(cluster.to_vec());
//!
//! let mut optics = Optics::new(points, 2, 1.0, 32, 0.0).unwrap();
//! optics.run(&mut sink).unwrap();
//!
//! // the three nearby records form one cluster, the straggler is noise
//! assert_eq!(clusters.len(), 2);
//! assert_eq!(clusters[0].len(), 3);
//! assert_eq!(clusters[1], vec![3]);
//! ```

mod optics;
mod point;
mod seeds;
mod traits;
mod tree;

pub use optics::Optics;
pub use point::{Point, NOT_FOUND, PROCESSED, UNPROCESSED};
pub use seeds::SeedList;
pub use traits::ClusterPublisher;
pub use tree::Tree;
