use crate::algo::traversal::trace_from_edge;
use crate::graph::PipeGraph;
use crate::index::EdgeIndex;

/// Decomposes the edge set of the graph into barrier-bounded components.
///
/// Each component is the set of edges reachable from one seed edge without
/// crossing a barrier node. Seeds are taken in ascending edge order, skipping
/// edges already reached by an earlier trace, so the result is deterministic
/// and partitions the edge set: every edge appears in exactly one component.
///
/// With an all-false barrier slice this degenerates to the weakly connected
/// components of the graph, expressed as edge sets.
pub fn barrier_components<NodeData, EdgeData>(
    graph: &PipeGraph<NodeData, EdgeData>,
    barriers: &[bool],
) -> Vec<Vec<EdgeIndex>> {
    let mut result = Vec::new();
    let mut covered = vec![false; graph.edge_count()];

    for start_edge in graph.edge_indices() {
        if covered[start_edge] {
            continue;
        }

        let reach = trace_from_edge(graph, start_edge, barriers);
        for &edge in &reach.edges {
            covered[edge] = true;
        }
        result.push(reach.edges);
    }

    result
}
