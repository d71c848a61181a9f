//! Consequence-of-failure scoring.
//!
//! COF is computed per isolation zone and inherited by every segment in the
//! zone: the count of service laterals that would lose service when the
//! zone shuts down, and connection flags for critical customers, schools
//! and healthcare facilities. Near distances stay per segment and are
//! carried along as independent columns.

use crate::near::{near_distances, NearLayer};
use geo::EuclideanDistance;
use log::info;
use std::collections::HashMap;
use water_network::geometry::{interior_midpoint, point_on_any_line};
use water_network::model::{Facility, FacilityKind, Lateral, PipeSegment};
use water_network::zones::IsolationZone;

/// The critical-facility connection flags of one zone.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ZoneFlags {
    /// A critical customer connects within the zone.
    pub critical_customer: bool,
    /// A school or childcare facility connects within the zone.
    pub school_childcare: bool,
    /// A healthcare facility connects within the zone.
    pub healthcare: bool,
}

impl ZoneFlags {
    fn set(&mut self, kind: FacilityKind) {
        match kind {
            FacilityKind::CriticalCustomer => self.critical_customer = true,
            FacilityKind::SchoolChildcare => self.school_childcare = true,
            FacilityKind::Healthcare => self.healthcare = true,
        }
    }

    /// Whether the flag for the given facility kind is set.
    pub fn get(&self, kind: FacilityKind) -> bool {
        match kind {
            FacilityKind::CriticalCustomer => self.critical_customer,
            FacilityKind::SchoolChildcare => self.school_childcare,
            FacilityKind::Healthcare => self.healthcare,
        }
    }
}

/// Options of the COF computation.
#[derive(Debug, Clone)]
pub struct CofOptions {
    /// The distance within which a geometry counts as inside a zone.
    pub zone_tolerance: f64,
    /// The search radius of the near-distance columns and the
    /// facility-to-zone connection test.
    pub search_radius: f64,
}

/// One row of the COF table.
#[derive(Debug, Clone, PartialEq)]
pub struct CofRecord {
    /// The facility identifier of the main.
    pub facility_id: String,
    /// The isolation zone the main belongs to, if any.
    pub zone: Option<String>,
    /// The number of laterals in the main's zone.
    pub affected_laterals: u32,
    /// The zone-wide critical connection flags.
    pub flags: ZoneFlags,
    /// Nearest distances, parallel to [`CofTable::near_names`]. Absent where
    /// no feature lies within the search radius.
    pub near: Vec<Option<f64>>,
}

/// The COF table: one record per main plus the near column names.
#[derive(Debug, Clone, Default)]
pub struct CofTable {
    /// The names of the near-distance columns.
    pub near_names: Vec<String>,
    /// The records, in the order of the input segments.
    pub records: Vec<CofRecord>,
}

/// Maps each main to its isolation zone.
///
/// Zones carrying explicit membership (fresh partitions) are used directly;
/// zones read back from a layer only have geometry, so the remaining mains
/// are matched spatially by their interior midpoint.
pub fn assign_segments_to_zones(
    segments: &[PipeSegment],
    zones: &[IsolationZone],
    zone_tolerance: f64,
) -> HashMap<String, String> {
    let mut zone_by_segment = HashMap::new();

    for zone in zones {
        for segment_id in &zone.segment_ids {
            zone_by_segment.insert(segment_id.clone(), zone.label.clone());
        }
    }

    for segment in segments {
        if zone_by_segment.contains_key(&segment.facility_id) {
            continue;
        }
        let midpoint = interior_midpoint(&segment.geometry);
        if let Some(zone) = zones
            .iter()
            .find(|zone| point_on_any_line(midpoint, &zone.lines, zone_tolerance))
        {
            zone_by_segment.insert(segment.facility_id.clone(), zone.label.clone());
        }
    }

    zone_by_segment
}

/// Counts the laterals per zone: a one-to-many join of laterals onto the
/// zone geometry, grouped by zone label. A lateral crossing a zone boundary
/// counts in every zone it touches.
pub fn count_laterals_per_zone(
    laterals: &[Lateral],
    zones: &[IsolationZone],
    zone_tolerance: f64,
) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();

    for lateral in laterals {
        for zone in zones {
            let touches = zone
                .lines
                .iter()
                .any(|line| lateral.geometry.euclidean_distance(line) <= zone_tolerance);
            if touches {
                *counts.entry(zone.label.clone()).or_insert(0) += 1;
            }
        }
    }

    counts
}

/// Computes the critical connection flags per zone: each facility connects
/// to its nearest zone within the search radius, and the flag applies to
/// the whole zone.
pub fn zone_facility_flags(
    facilities: &[Facility],
    zones: &[IsolationZone],
    search_radius: f64,
) -> HashMap<String, ZoneFlags> {
    let mut flags: HashMap<String, ZoneFlags> = HashMap::new();

    for facility in facilities {
        let mut nearest: Option<(&IsolationZone, f64)> = None;
        for zone in zones {
            for line in &zone.lines {
                let distance = facility.position.euclidean_distance(line);
                if distance <= search_radius && nearest.map_or(true, |(_, best)| distance < best) {
                    nearest = Some((zone, distance));
                }
            }
        }
        if let Some((zone, _)) = nearest {
            flags.entry(zone.label.clone()).or_default().set(facility.kind);
        }
    }

    flags
}

/// Computes the full COF table.
pub fn score_cof(
    segments: &[PipeSegment],
    zones: &[IsolationZone],
    laterals: &[Lateral],
    facilities: &[Facility],
    near_layers: &[NearLayer],
    options: &CofOptions,
) -> CofTable {
    let zone_by_segment = assign_segments_to_zones(segments, zones, options.zone_tolerance);
    let lateral_counts = count_laterals_per_zone(laterals, zones, options.zone_tolerance);
    let zone_flags = zone_facility_flags(facilities, zones, options.search_radius);
    let near_columns: Vec<_> = near_layers
        .iter()
        .map(|layer| near_distances(segments, layer, options.search_radius))
        .collect();

    let records = segments
        .iter()
        .map(|segment| {
            let zone = zone_by_segment.get(&segment.facility_id).cloned();
            let (affected_laterals, flags) = match &zone {
                Some(label) => (
                    lateral_counts.get(label).copied().unwrap_or(0),
                    zone_flags.get(label).copied().unwrap_or_default(),
                ),
                None => (0, ZoneFlags::default()),
            };
            CofRecord {
                facility_id: segment.facility_id.clone(),
                zone,
                affected_laterals,
                flags,
                near: near_columns
                    .iter()
                    .map(|column| column.get(&segment.facility_id).copied())
                    .collect(),
            }
        })
        .collect();

    info!(
        "Scored COF for {} mains across {} zones",
        segments.len(),
        zones.len()
    );

    CofTable {
        near_names: near_layers.iter().map(|layer| layer.name.clone()).collect(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::{score_cof, CofOptions};
    use crate::near::NearLayer;
    use geo::{line_string, point};
    use water_network::model::{Facility, FacilityKind, FeatureGeometry, Lateral, PipeSegment};
    use water_network::zones::IsolationZone;

    fn main(facility_id: &str, x0: f64, x1: f64) -> PipeSegment {
        PipeSegment {
            facility_id: facility_id.to_owned(),
            geometry: line_string![(x: x0, y: 0.0), (x: x1, y: 0.0)],
            material: None,
            install_date: None,
            diameter: None,
        }
    }

    fn two_zone_fixture() -> (Vec<PipeSegment>, Vec<IsolationZone>) {
        let segments = vec![
            main("WM-1", 0.0, 10.0),
            main("WM-2", 10.0, 20.0),
            main("WM-3", 20.0, 30.0),
        ];
        let zones = vec![
            IsolationZone {
                label: "1".to_owned(),
                lines: vec![segments[0].geometry.clone(), segments[1].geometry.clone()],
                segment_ids: Vec::new(),
            },
            IsolationZone {
                label: "2".to_owned(),
                lines: vec![segments[2].geometry.clone()],
                segment_ids: Vec::new(),
            },
        ];
        (segments, zones)
    }

    fn options() -> CofOptions {
        CofOptions {
            zone_tolerance: 0.05,
            search_radius: 10.0,
        }
    }

    #[test]
    fn test_segments_join_zones_spatially() {
        let (segments, zones) = two_zone_fixture();
        let table = score_cof(&segments, &zones, &[], &[], &[], &options());
        assert_eq!(table.records[0].zone.as_deref(), Some("1"));
        assert_eq!(table.records[1].zone.as_deref(), Some("1"));
        assert_eq!(table.records[2].zone.as_deref(), Some("2"));
    }

    #[test]
    fn test_laterals_are_counted_per_zone() {
        let (segments, zones) = two_zone_fixture();
        let laterals = vec![
            Lateral {
                id: None,
                geometry: line_string![(x: 5.0, y: 0.0), (x: 5.0, y: 5.0)],
            },
            Lateral {
                id: None,
                geometry: line_string![(x: 15.0, y: 0.0), (x: 15.0, y: 5.0)],
            },
            Lateral {
                id: None,
                geometry: line_string![(x: 25.0, y: 0.0), (x: 25.0, y: 5.0)],
            },
        ];

        let table = score_cof(&segments, &zones, &laterals, &[], &[], &options());
        assert_eq!(table.records[0].affected_laterals, 2);
        assert_eq!(table.records[1].affected_laterals, 2);
        assert_eq!(table.records[2].affected_laterals, 1);
    }

    #[test]
    fn test_facility_flags_propagate_zone_wide() {
        let (segments, zones) = two_zone_fixture();
        let facilities = vec![Facility {
            kind: FacilityKind::Healthcare,
            position: point!(x: 5.0, y: 5.0),
        }];

        let table = score_cof(&segments, &zones, &[], &facilities, &[], &options());
        // Every segment sharing zone "1" inherits the flag, including WM-2,
        // which is not the segment nearest to the facility.
        assert!(table.records[0].flags.healthcare);
        assert!(table.records[1].flags.healthcare);
        assert!(!table.records[2].flags.healthcare);
        assert!(!table.records[0].flags.critical_customer);
    }

    #[test]
    fn test_near_columns_are_independent_per_segment() {
        let (segments, zones) = two_zone_fixture();
        let near_layers = vec![NearLayer {
            name: "MAJOR_ROADS".to_owned(),
            features: vec![FeatureGeometry::Line(
                line_string![(x: 0.0, y: 4.0), (x: 10.0, y: 4.0)],
            )],
        }];

        let table = score_cof(&segments, &zones, &[], &[], &near_layers, &options());
        assert_eq!(table.near_names, vec!["MAJOR_ROADS"]);
        assert_eq!(table.records[0].near, vec![Some(4.0)]);
        // WM-3 is beyond the search radius: absent, not zero.
        assert_eq!(table.records[2].near, vec![None]);
    }
}
