use crate::error::*;
use crate::model::SeedPoint;
use crate::network::Network;
use error_chain::bail;
use geo::{LineString, Point};
use pipegraph::trace_from_edge;

/// The aggregated result of one network trace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceResult {
    /// The polylines of all reached segments.
    pub lines: Vec<LineString<f64>>,
    /// The positions of all reached junctions, including the barriers the
    /// trace stopped at.
    pub points: Vec<Point<f64>>,
    /// The facility identifiers of all reached segments, ascending.
    pub segment_ids: Vec<String>,
}

/// The trace capability consumed by the zone partitioner: given a start
/// point, return the connected subnetwork reachable without crossing a
/// barrier.
///
/// The partitioner is generic over this trait so that tests can substitute
/// engines with injected failures.
pub trait TraceEngine {
    /// Traces the network from the given seed point with the full barrier
    /// set, undirected, including barriers in the result.
    fn trace(&self, seed: &SeedPoint) -> Result<TraceResult>;
}

/// The trace engine over an in-memory [`Network`].
#[derive(Debug, Clone)]
pub struct NetworkTraceEngine<'a> {
    network: &'a Network,
}

impl<'a> NetworkTraceEngine<'a> {
    /// Creates a trace engine over the given network.
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }
}

impl TraceEngine for NetworkTraceEngine<'_> {
    fn trace(&self, seed: &SeedPoint) -> Result<TraceResult> {
        let segment_index = match self.network.segment_index_of(&seed.facility_id) {
            Some(segment_index) => segment_index,
            None => bail!(ErrorKind::TraceStartUnknown(seed.facility_id.clone())),
        };

        let start_edge = self.network.edge_of_segment(segment_index);
        let reach = trace_from_edge(self.network.graph(), start_edge, self.network.barriers());

        let mut lines = Vec::with_capacity(reach.edges.len());
        let mut segment_ids = Vec::with_capacity(reach.edges.len());
        for &edge in &reach.edges {
            let segment = self.network.segment(self.network.graph().edge_data(edge).0);
            lines.push(segment.geometry.clone());
            segment_ids.push(segment.facility_id.clone());
        }

        let points = reach
            .nodes
            .iter()
            .map(|&node| self.network.graph().node_data(node).position)
            .collect();

        Ok(TraceResult {
            lines,
            points,
            segment_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{NetworkTraceEngine, TraceEngine};
    use crate::model::SeedPoint;
    use crate::network::tests::segment;
    use crate::network::NetworkBuilder;
    use crate::seeds::generate_seed_points;
    use geo::{line_string, point};

    #[test]
    fn test_trace_returns_connected_segments_and_junctions() {
        let segments = vec![
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            segment("WM-2", line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]),
            segment("WM-3", line_string![(x: 30.0, y: 0.0), (x: 40.0, y: 0.0)]),
        ];
        let network = NetworkBuilder::default().build(segments, &[]).unwrap();
        let engine = NetworkTraceEngine::new(&network);
        let seeds = generate_seed_points(&network);

        let result = engine.trace(&seeds[0]).unwrap();
        assert_eq!(result.segment_ids, vec!["WM-1", "WM-2"]);
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.points.len(), 3);

        let result = engine.trace(&seeds[2]).unwrap();
        assert_eq!(result.segment_ids, vec!["WM-3"]);
    }

    #[test]
    fn test_trace_from_unknown_seed_is_an_error() {
        let segments = vec![segment(
            "WM-1",
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
        )];
        let network = NetworkBuilder::default().build(segments, &[]).unwrap();
        let engine = NetworkTraceEngine::new(&network);
        let seed = SeedPoint {
            facility_id: "WM-404".to_owned(),
            position: point!(x: 0.0, y: 0.0),
        };
        assert!(engine.trace(&seed).is_err());
    }
}
