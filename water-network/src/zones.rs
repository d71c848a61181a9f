use crate::geometry::point_on_any_line;
use crate::model::SeedPoint;
use crate::trace::TraceEngine;
use geo::LineString;
use log::{debug, info, warn};
use std::collections::HashSet;

/// An isolation zone: the maximal connected set of pipe reachable from one
/// seed point without crossing a valve barrier.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationZone {
    /// The zone label. Labels are sequential integers rendered as text,
    /// assigned at creation and never reused or reassigned.
    pub label: String,
    /// The aggregated polyline geometry of the zone.
    pub lines: Vec<LineString<f64>>,
    /// The facility identifiers of the segments in the zone, ascending.
    pub segment_ids: Vec<String>,
}

/// A seed whose trace failed. The run continues past it; failed seeds are
/// surfaced in the final summary instead of aborting the partition.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedSeed {
    /// The facility identifier of the failed seed.
    pub facility_id: String,
    /// The chained error display of the trace failure.
    pub reason: String,
}

/// The set of seed points already assigned to a zone.
///
/// Grows monotonically over a partition run and never shrinks.
#[derive(Debug, Clone, Default)]
pub struct CoverageTracker {
    covered: HashSet<String>,
}

impl CoverageTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the seed with the given identifier is covered.
    pub fn contains(&self, facility_id: &str) -> bool {
        self.covered.contains(facility_id)
    }

    /// Marks the seed with the given identifier as covered.
    pub fn insert(&mut self, facility_id: &str) {
        self.covered.insert(facility_id.to_owned());
    }

    /// The number of covered seeds.
    pub fn len(&self) -> usize {
        self.covered.len()
    }

    /// Returns true if no seed is covered yet.
    pub fn is_empty(&self) -> bool {
        self.covered.is_empty()
    }
}

/// The result of a partition run.
#[derive(Debug, Clone, Default)]
pub struct ZonePartition {
    /// The discovered zones, in order of discovery.
    pub zones: Vec<IsolationZone>,
    /// The seeds whose traces failed.
    pub failed_seeds: Vec<FailedSeed>,
    /// The number of trace invocations. At most the seed count, typically
    /// far fewer because one trace covers many seeds at once.
    pub trace_count: usize,
}

impl ZonePartition {
    /// The number of isolation zones found.
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}

/// Partitions the network into isolation zones.
///
/// Seeds are visited once each, in the given order (ascending facility
/// identifier as produced by [`crate::seeds::generate_seed_points`]). A seed
/// already covered by an earlier trace is skipped without another trace
/// invocation. Every successful trace opens a new zone and covers all seeds
/// whose position lies on the returned aggregated lines, within
/// `coverage_tolerance`; that always includes the trace's own seed. A failed
/// trace covers nothing and consumes no zone label.
pub fn partition_zones<Engine: TraceEngine>(
    engine: &Engine,
    seeds: &[SeedPoint],
    coverage_tolerance: f64,
) -> ZonePartition {
    let mut coverage = CoverageTracker::new();
    let mut zone_count = 0usize;
    let mut partition = ZonePartition::default();

    for seed in seeds {
        if coverage.contains(&seed.facility_id) {
            debug!("Seed {} already covered, skipping", seed.facility_id);
            continue;
        }

        partition.trace_count += 1;
        let result = match engine.trace(seed) {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    "Trace from seed {} failed, skipping it: {}",
                    seed.facility_id, error
                );
                partition.failed_seeds.push(FailedSeed {
                    facility_id: seed.facility_id.clone(),
                    reason: error.to_string(),
                });
                continue;
            }
        };

        zone_count += 1;
        let label = zone_count.to_string();
        debug!(
            "Zone {} covers {} segments",
            label,
            result.segment_ids.len()
        );

        // The trace's own seed lies on its own segment, so the spatial test
        // below covers it; inserting it explicitly keeps the invariant even
        // for zero-length geometry.
        coverage.insert(&seed.facility_id);
        for other in seeds {
            if !coverage.contains(&other.facility_id)
                && point_on_any_line(other.position, &result.lines, coverage_tolerance)
            {
                coverage.insert(&other.facility_id);
            }
        }

        partition.zones.push(IsolationZone {
            label,
            lines: result.lines,
            segment_ids: result.segment_ids,
        });
    }

    info!(
        "Partitioned network into {} isolation zones with {} traces over {} seeds ({} failed)",
        partition.zone_count(),
        partition.trace_count,
        seeds.len(),
        partition.failed_seeds.len()
    );

    partition
}

#[cfg(test)]
mod tests {
    use super::partition_zones;
    use crate::error::*;
    use crate::model::{SeedPoint, Valve};
    use crate::network::tests::segment;
    use crate::network::NetworkBuilder;
    use crate::seeds::generate_seed_points;
    use crate::trace::{NetworkTraceEngine, TraceEngine, TraceResult};
    use error_chain::bail;
    use geo::{line_string, point};
    use std::collections::HashSet;

    fn chain_of_four() -> Vec<crate::model::PipeSegment> {
        vec![
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            segment("WM-2", line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]),
            segment("WM-3", line_string![(x: 20.0, y: 0.0), (x: 30.0, y: 0.0)]),
            segment("WM-4", line_string![(x: 30.0, y: 0.0), (x: 40.0, y: 0.0)]),
        ]
    }

    #[test]
    fn test_connected_network_is_one_zone() {
        let segments = vec![
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            segment("WM-2", line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]),
            segment("WM-3", line_string![(x: 20.0, y: 0.0), (x: 20.0, y: 10.0)]),
        ];
        let network = NetworkBuilder::default().build(segments, &[]).unwrap();
        let engine = NetworkTraceEngine::new(&network);
        let seeds = generate_seed_points(&network);

        let partition = partition_zones(&engine, &seeds, network.snap_tolerance());
        assert_eq!(partition.zone_count(), 1);
        assert_eq!(partition.trace_count, 1);
        assert_eq!(partition.zones[0].label, "1");
        assert_eq!(partition.zones[0].segment_ids, vec!["WM-1", "WM-2", "WM-3"]);
    }

    #[test]
    fn test_valve_splits_network_into_two_zones() {
        let valves = vec![Valve {
            id: Some("V-1".to_owned()),
            position: point!(x: 20.0, y: 0.0),
        }];
        let network = NetworkBuilder::default()
            .build(chain_of_four(), &valves)
            .unwrap();
        let engine = NetworkTraceEngine::new(&network);
        let seeds = generate_seed_points(&network);

        let partition = partition_zones(&engine, &seeds, network.snap_tolerance());
        assert_eq!(partition.zone_count(), 2);
        assert_eq!(partition.zones[0].segment_ids, vec!["WM-1", "WM-2"]);
        assert_eq!(partition.zones[1].segment_ids, vec!["WM-3", "WM-4"]);
        assert_eq!(partition.zones[1].label, "2");
    }

    #[test]
    fn test_zones_partition_the_segment_set() {
        let valves = vec![Valve {
            id: None,
            position: point!(x: 10.0, y: 0.0),
        }];
        let network = NetworkBuilder::default()
            .build(chain_of_four(), &valves)
            .unwrap();
        let engine = NetworkTraceEngine::new(&network);
        let seeds = generate_seed_points(&network);

        let partition = partition_zones(&engine, &seeds, network.snap_tolerance());
        let mut all_ids = HashSet::new();
        for zone in &partition.zones {
            for id in &zone.segment_ids {
                // Pairwise disjoint membership.
                assert!(all_ids.insert(id.clone()));
            }
        }
        assert_eq!(all_ids.len(), network.segments().len());
    }

    #[test]
    fn test_disconnected_segment_becomes_singleton_zone() {
        let segments = vec![
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            segment("WM-9", line_string![(x: 100.0, y: 100.0), (x: 110.0, y: 100.0)]),
        ];
        let network = NetworkBuilder::default().build(segments, &[]).unwrap();
        let engine = NetworkTraceEngine::new(&network);
        let seeds = generate_seed_points(&network);

        let partition = partition_zones(&engine, &seeds, network.snap_tolerance());
        assert_eq!(partition.zone_count(), 2);
        assert_eq!(partition.zones[1].segment_ids, vec!["WM-9"]);
    }

    /// An engine that fails for one configured seed and otherwise returns a
    /// singleton result covering only the seed's own segment.
    struct FailingEngine {
        failing_id: String,
    }

    impl TraceEngine for FailingEngine {
        fn trace(&self, seed: &SeedPoint) -> Result<TraceResult> {
            if seed.facility_id == self.failing_id {
                bail!(ErrorKind::TraceStartUnknown(seed.facility_id.clone()));
            }
            Ok(TraceResult {
                lines: vec![line_string![
                    (x: seed.position.x() - 1.0, y: seed.position.y()),
                    (x: seed.position.x() + 1.0, y: seed.position.y()),
                ]],
                points: Vec::new(),
                segment_ids: vec![seed.facility_id.clone()],
            })
        }
    }

    #[test]
    fn test_failed_seed_is_recorded_and_skipped() {
        let seeds = vec![
            SeedPoint {
                facility_id: "WM-1".to_owned(),
                position: point!(x: 5.0, y: 0.0),
            },
            SeedPoint {
                facility_id: "WM-2".to_owned(),
                position: point!(x: 15.0, y: 0.0),
            },
            SeedPoint {
                facility_id: "WM-3".to_owned(),
                position: point!(x: 25.0, y: 0.0),
            },
        ];
        let engine = FailingEngine {
            failing_id: "WM-2".to_owned(),
        };

        let partition = partition_zones(&engine, &seeds, 0.05);
        assert_eq!(partition.zone_count(), 2);
        assert_eq!(partition.trace_count, 3);
        assert_eq!(partition.failed_seeds.len(), 1);
        assert_eq!(partition.failed_seeds[0].facility_id, "WM-2");
        // A failed seed consumes no zone label: labels stay dense.
        assert_eq!(partition.zones[0].label, "1");
        assert_eq!(partition.zones[1].label, "2");
    }

    #[test]
    fn test_covered_seed_is_never_traced_again() {
        let network = NetworkBuilder::default()
            .build(chain_of_four(), &[])
            .unwrap();
        let engine = NetworkTraceEngine::new(&network);
        let seeds = generate_seed_points(&network);

        let partition = partition_zones(&engine, &seeds, network.snap_tolerance());
        assert_eq!(partition.trace_count, 1);
        assert!(partition.trace_count <= seeds.len());
    }
}
