//! Typed-index undirected graphs for utility networks.
//!
//! A utility network is modelled with junctions as nodes and line assets
//! (pipe segments) as edges. Traces are undirected and stop at barrier
//! nodes, which matches how shut-off valves bound an isolation zone.

mod algo;
mod graph;
mod index;

pub use algo::*;
pub use graph::*;
pub use index::*;
