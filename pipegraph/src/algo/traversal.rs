use crate::graph::PipeGraph;
use crate::index::{EdgeIndex, NodeIndex};
use std::collections::VecDeque;

/// The edges and nodes reached by a single network trace.
///
/// Both vectors are sorted ascending, so two traces over the same graph can
/// be compared directly.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct TraceReach {
    /// All reached edges, including the start edge.
    pub edges: Vec<EdgeIndex>,
    /// All reached nodes, including barrier nodes the trace stopped at.
    pub nodes: Vec<NodeIndex>,
}

/// Traces the connected subgraph reachable from `start_edge` without
/// crossing a barrier node.
///
/// The trace is undirected. A barrier node is included in the reached nodes
/// but never expanded, so edges on its far side stay unreached unless the
/// trace gets there another way. The start edge is always part of the
/// result, even if both of its endpoints are barriers.
///
/// # Panics
///
/// Panics if `barriers` is shorter than the node count of the graph.
pub fn trace_from_edge<NodeData, EdgeData>(
    graph: &PipeGraph<NodeData, EdgeData>,
    start_edge: EdgeIndex,
    barriers: &[bool],
) -> TraceReach {
    assert!(barriers.len() >= graph.node_count());

    let mut reached_edges = vec![false; graph.edge_count()];
    let mut visited_nodes = vec![false; graph.node_count()];
    reached_edges[start_edge] = true;

    let mut queue = VecDeque::new();
    let (from, to) = graph.edge_endpoints(start_edge);
    queue.push_back(from);
    queue.push_back(to);

    while let Some(node) = queue.pop_front() {
        if visited_nodes[node] {
            continue;
        }
        visited_nodes[node] = true;

        if barriers[node.as_usize()] {
            continue;
        }

        for neighbor in graph.incident_edges(node) {
            reached_edges[neighbor.edge_id] = true;
            if !visited_nodes[neighbor.node_id] {
                queue.push_back(neighbor.node_id);
            }
        }
    }

    TraceReach {
        edges: collect_marked(&reached_edges),
        nodes: collect_marked(&visited_nodes),
    }
}

fn collect_marked<IndexType: From<usize>>(marks: &[bool]) -> Vec<IndexType> {
    marks
        .iter()
        .enumerate()
        .filter(|(_, &marked)| marked)
        .map(|(index, _)| index.into())
        .collect()
}
