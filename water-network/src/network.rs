use crate::error::*;
use crate::geometry::snap_key;
use crate::model::{PipeSegment, Valve};
use error_chain::bail;
use geo::{EuclideanDistance, EuclideanLength, Point};
use log::{debug, warn};
use pipegraph::{EdgeIndex, NodeIndex, PipeGraph};
use std::collections::HashMap;

/// A junction of the network: a point where segment endpoints meet.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    /// The snapped position of the junction.
    pub position: Point<f64>,
}

/// Edge data of the network graph: the index of the segment in the
/// network's segment list.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SegmentRef(pub usize);

/// A water-distribution network: pipe segments as edges, junctions as nodes
/// and valves as barrier junctions.
///
/// Segments are stored sorted ascending by facility identifier, so indices,
/// seed order and trace results are reproducible for identical input.
#[derive(Debug, Clone)]
pub struct Network {
    graph: PipeGraph<Junction, SegmentRef>,
    segments: Vec<PipeSegment>,
    segment_index_by_id: HashMap<String, usize>,
    edge_of_segment: Vec<EdgeIndex>,
    barriers: Vec<bool>,
    matched_valve_count: usize,
    unmatched_valve_count: usize,
    snap_tolerance: f64,
}

impl Network {
    /// The underlying graph.
    pub fn graph(&self) -> &PipeGraph<Junction, SegmentRef> {
        &self.graph
    }

    /// The pipe segments, sorted ascending by facility identifier.
    pub fn segments(&self) -> &[PipeSegment] {
        &self.segments
    }

    /// The segment stored at the given index.
    pub fn segment(&self, index: usize) -> &PipeSegment {
        &self.segments[index]
    }

    /// Looks up a segment index by facility identifier.
    pub fn segment_index_of(&self, facility_id: &str) -> Option<usize> {
        self.segment_index_by_id.get(facility_id).copied()
    }

    /// The graph edge representing the segment at the given index.
    pub fn edge_of_segment(&self, index: usize) -> EdgeIndex {
        self.edge_of_segment[index]
    }

    /// One barrier flag per junction; `true` where a valve snapped onto it.
    pub fn barriers(&self) -> &[bool] {
        &self.barriers
    }

    /// The number of junctions.
    pub fn junction_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The number of valves that snapped onto a junction.
    pub fn matched_valve_count(&self) -> usize {
        self.matched_valve_count
    }

    /// The number of valves that did not coincide with any junction.
    pub fn unmatched_valve_count(&self) -> usize {
        self.unmatched_valve_count
    }

    /// The snapping tolerance the network was built with.
    pub fn snap_tolerance(&self) -> f64 {
        self.snap_tolerance
    }

    /// The summed length of all segments, in coordinate units.
    pub fn total_length(&self) -> f64 {
        self.segments
            .iter()
            .map(|segment| segment.geometry.euclidean_length())
            .sum()
    }
}

/// Builds a [`Network`] from a pipe-segment layer and a valve layer.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    snap_tolerance: f64,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        // Tight enough for data digitised with endpoint snapping; callers
        // with sloppier sources can widen it.
        Self {
            snap_tolerance: 0.05,
        }
    }
}

impl NetworkBuilder {
    /// Creates a builder with the given junction snapping tolerance.
    pub fn with_snap_tolerance(snap_tolerance: f64) -> Self {
        Self { snap_tolerance }
    }

    /// Builds the network.
    ///
    /// Segments are sorted ascending by facility identifier. Duplicate
    /// identifiers and segments with fewer than two coordinates are errors.
    /// Valves that do not coincide with any junction (within the snapping
    /// tolerance) are logged and counted, but do not fail the build.
    pub fn build(&self, mut segments: Vec<PipeSegment>, valves: &[Valve]) -> Result<Network> {
        for segment in &segments {
            if segment.geometry.0.len() < 2 {
                bail!(ErrorKind::DegenerateSegment(segment.facility_id.clone()));
            }
        }

        segments.sort_by(|a, b| a.facility_id.cmp(&b.facility_id));
        for window in segments.windows(2) {
            if window[0].facility_id == window[1].facility_id {
                bail!(ErrorKind::DuplicateFacilityId(window[0].facility_id.clone()));
            }
        }

        let mut graph = PipeGraph::new();
        let mut node_by_key: HashMap<(i64, i64), NodeIndex> = HashMap::new();
        let mut segment_index_by_id = HashMap::new();
        let mut edge_of_segment = Vec::with_capacity(segments.len());

        for (segment_index, segment) in segments.iter().enumerate() {
            let first = segment.geometry.0[0];
            let last = segment.geometry.0[segment.geometry.0.len() - 1];

            let from = *node_by_key
                .entry(snap_key(first, self.snap_tolerance))
                .or_insert_with(|| {
                    graph.add_node(Junction {
                        position: Point::from(first),
                    })
                });
            let to = *node_by_key
                .entry(snap_key(last, self.snap_tolerance))
                .or_insert_with(|| {
                    graph.add_node(Junction {
                        position: Point::from(last),
                    })
                });

            edge_of_segment.push(graph.add_edge(from, to, SegmentRef(segment_index)));
            segment_index_by_id.insert(segment.facility_id.clone(), segment_index);
        }

        debug!(
            "Built graph with {} junctions and {} segments",
            graph.node_count(),
            graph.edge_count()
        );

        let mut barriers = vec![false; graph.node_count()];
        let mut matched_valve_count = 0;
        let mut unmatched_valve_count = 0;

        for valve in valves {
            match self.snap_valve(&graph, &node_by_key, valve.position) {
                Some(node) => {
                    barriers[node] = true;
                    matched_valve_count += 1;
                }
                None => {
                    warn!(
                        "Valve {} at ({}, {}) does not coincide with any junction; ignoring it",
                        valve.id.as_deref().unwrap_or("<unnamed>"),
                        valve.position.x(),
                        valve.position.y()
                    );
                    unmatched_valve_count += 1;
                }
            }
        }

        Ok(Network {
            graph,
            segments,
            segment_index_by_id,
            edge_of_segment,
            barriers,
            matched_valve_count,
            unmatched_valve_count,
            snap_tolerance: self.snap_tolerance,
        })
    }

    /// Finds the nearest junction within the snapping tolerance, searching
    /// the 3x3 neighborhood of the valve's quantised coordinate.
    fn snap_valve(
        &self,
        graph: &PipeGraph<Junction, SegmentRef>,
        node_by_key: &HashMap<(i64, i64), NodeIndex>,
        position: Point<f64>,
    ) -> Option<NodeIndex> {
        let (key_x, key_y) = snap_key(position.0, self.snap_tolerance);
        let mut nearest: Option<(NodeIndex, f64)> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(&node) = node_by_key.get(&(key_x + dx, key_y + dy)) {
                    let distance = position.euclidean_distance(&graph.node_data(node).position);
                    if distance <= self.snap_tolerance
                        && nearest.map_or(true, |(_, best)| distance < best)
                    {
                        nearest = Some((node, distance));
                    }
                }
            }
        }

        nearest.map(|(node, _)| node)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::NetworkBuilder;
    use crate::model::{PipeSegment, Valve};
    use geo::{line_string, point, LineString};

    pub(crate) fn segment(facility_id: &str, geometry: LineString<f64>) -> PipeSegment {
        PipeSegment {
            facility_id: facility_id.to_owned(),
            geometry,
            material: None,
            install_date: None,
            diameter: None,
        }
    }

    #[test]
    fn test_endpoints_snap_to_shared_junctions() {
        let segments = vec![
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            // Slightly off the shared endpoint, within tolerance.
            segment("WM-2", line_string![(x: 10.01, y: 0.0), (x: 20.0, y: 0.0)]),
        ];
        let network = NetworkBuilder::default().build(segments, &[]).unwrap();
        assert_eq!(network.junction_count(), 3);
        assert_eq!(network.graph().edge_count(), 2);
    }

    #[test]
    fn test_segments_are_sorted_by_facility_id() {
        let segments = vec![
            segment("WM-2", line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]),
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
        ];
        let network = NetworkBuilder::default().build(segments, &[]).unwrap();
        assert_eq!(network.segment(0).facility_id, "WM-1");
        assert_eq!(network.segment(1).facility_id, "WM-2");
        assert_eq!(network.segment_index_of("WM-2"), Some(1));
    }

    #[test]
    fn test_valve_marks_barrier_junction() {
        let segments = vec![
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            segment("WM-2", line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]),
        ];
        let valves = vec![Valve {
            id: Some("V-1".to_owned()),
            position: point!(x: 10.02, y: 0.0),
        }];
        let network = NetworkBuilder::default().build(segments, &valves).unwrap();
        assert_eq!(network.matched_valve_count(), 1);
        assert_eq!(network.unmatched_valve_count(), 0);
        assert_eq!(network.barriers().iter().filter(|&&b| b).count(), 1);
    }

    #[test]
    fn test_unmatched_valve_is_counted_not_fatal() {
        let segments = vec![segment(
            "WM-1",
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
        )];
        let valves = vec![Valve {
            id: None,
            position: point!(x: 5.0, y: 3.0),
        }];
        let network = NetworkBuilder::default().build(segments, &valves).unwrap();
        assert_eq!(network.matched_valve_count(), 0);
        assert_eq!(network.unmatched_valve_count(), 1);
    }

    #[test]
    fn test_duplicate_facility_id_is_an_error() {
        let segments = vec![
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            segment("WM-1", line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]),
        ];
        assert!(NetworkBuilder::default().build(segments, &[]).is_err());
    }

    #[test]
    fn test_degenerate_segment_is_an_error() {
        let segments = vec![segment("WM-1", line_string![(x: 0.0, y: 0.0)])];
        assert!(NetworkBuilder::default().build(segments, &[]).is_err());
    }
}
