use crate::index::{EdgeIndex, NodeIndex};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

/// A node reached through one of its incident edges.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Neighbor {
    /// The edge connecting the two nodes.
    pub edge_id: EdgeIndex,
    /// The node on the far side of the edge.
    pub node_id: NodeIndex,
}

/// An undirected graph with typed indices, backed by petgraph.
///
/// Node and edge indices are assigned in insertion order and remain stable,
/// which makes traversals reproducible as long as the graph is built in a
/// fixed order.
#[derive(Debug, Clone, Default)]
pub struct PipeGraph<NodeData, EdgeData> {
    graph: UnGraph<NodeData, EdgeData, usize>,
}

impl<NodeData, EdgeData> PipeGraph<NodeData, EdgeData> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
        }
    }

    /// Adds a node and returns its index.
    pub fn add_node(&mut self, node_data: NodeData) -> NodeIndex {
        self.graph.add_node(node_data).index().into()
    }

    /// Adds an undirected edge between the two nodes and returns its index.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge_data: EdgeData) -> EdgeIndex {
        self.graph
            .add_edge(from.as_usize().into(), to.as_usize().into(), edge_data)
            .index()
            .into()
    }

    /// The number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The data associated with the given node.
    pub fn node_data(&self, node_id: NodeIndex) -> &NodeData {
        self.graph
            .node_weight(node_id.as_usize().into())
            .expect("node index out of bounds")
    }

    /// The data associated with the given edge.
    pub fn edge_data(&self, edge_id: EdgeIndex) -> &EdgeData {
        self.graph
            .edge_weight(edge_id.as_usize().into())
            .expect("edge index out of bounds")
    }

    /// The two endpoints of the given edge.
    pub fn edge_endpoints(&self, edge_id: EdgeIndex) -> (NodeIndex, NodeIndex) {
        let (from, to) = self
            .graph
            .edge_endpoints(edge_id.as_usize().into())
            .expect("edge index out of bounds");
        (from.index().into(), to.index().into())
    }

    /// Iterates all node indices in ascending order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.node_count()).map(NodeIndex::from)
    }

    /// Iterates all edge indices in ascending order.
    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        (0..self.edge_count()).map(EdgeIndex::from)
    }

    /// Iterates the edges incident to the given node, together with the node
    /// on the far side of each edge. A self loop yields the node itself.
    pub fn incident_edges(&self, node_id: NodeIndex) -> impl Iterator<Item = Neighbor> + '_ {
        let petgraph_node = petgraph::graph::NodeIndex::<usize>::new(node_id.as_usize());
        self.graph.edges(petgraph_node).map(move |edge| {
            let far_side = if edge.source() == petgraph_node {
                edge.target()
            } else {
                edge.source()
            };
            Neighbor {
                edge_id: edge.id().index().into(),
                node_id: far_side.index().into(),
            }
        })
    }
}
