/// Decomposition of a graph into barrier-bounded edge components.
pub mod components;
/// Barrier-aware breadth-first network tracing.
pub mod traversal;

pub use components::*;
pub use traversal::*;
