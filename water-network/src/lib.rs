//! A crate to represent municipal water-distribution networks.
//!
//! A network is built from a pipe-segment layer and a valve layer: segment
//! endpoints become junctions, segments become edges and valves become
//! barrier junctions. On top of that the crate offers seed-point generation,
//! barrier-aware network tracing and the isolation-zone partitioner, as well
//! as reading and writing the involved feature layers as GeoJSON.
#![warn(missing_docs)]
#![recursion_limit = "1024"]

/// Contains the error types used by this crate.
pub mod error;
/// Contains geometric helpers shared by the network and scoring code.
pub mod geometry;
/// Contains functions for reading and writing feature layers.
pub mod io;
/// Contains the domain model of the asset layers.
pub mod model;
/// Contains the network representation and its builder.
pub mod network;
/// Contains the seed-point generator.
pub mod seeds;
/// Contains the trace engine.
pub mod trace;
/// Contains the isolation-zone partitioner.
pub mod zones;

pub use geo;
pub use pipegraph;
