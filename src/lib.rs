//! Density-based clustering for the celestial sphere.
//!
//! `skyclust` orders large collections of sky positions (longitude,
//! latitude) by reachability using the OPTICS algorithm, implicitly
//! revealing clusters at every density in a single pass.
//!
//! The primary public API is under [`cluster`], which provides:
//! - [`Optics`], the clustering driver, fed by an array of [`Point`]s and
//!   emitting clusters to a [`ClusterPublisher`]
//! - [`Tree`], the pointerless 3-d index behind its range queries
//! - [`SeedList`], the indexed heap of candidate points
//!
//! Coordinate handling (degrees in and out, unit vectors inside) lives in
//! [`geom`].

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod geom;

pub use cluster::{
    ClusterPublisher, Optics, Point, SeedList, Tree, NOT_FOUND, PROCESSED, UNPROCESSED,
};
pub use error::{Error, Result};
pub use geom::{LonLat, Vec3};
