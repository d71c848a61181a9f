use chrono::NaiveDate;
use geo::{LineString, Point, Polygon};

/// A pipe segment of the distribution network. Immutable input; the zone
/// partitioner and the scoring pipelines only ever read it.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeSegment {
    /// The unique facility identifier of the segment.
    pub facility_id: String,
    /// The polyline geometry of the segment.
    pub geometry: LineString<f64>,
    /// The pipe material, if recorded.
    pub material: Option<String>,
    /// The installation date, if recorded.
    pub install_date: Option<NaiveDate>,
    /// The pipe diameter, if recorded.
    pub diameter: Option<f64>,
}

/// A shut-off valve. Valves act as barriers that stop trace propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct Valve {
    /// The facility identifier of the valve, if recorded.
    pub id: Option<String>,
    /// The point position of the valve.
    pub position: Point<f64>,
}

/// A service lateral connecting a customer to a main.
#[derive(Debug, Clone, PartialEq)]
pub struct Lateral {
    /// The facility identifier of the lateral, if recorded.
    pub id: Option<String>,
    /// The polyline geometry of the lateral.
    pub geometry: LineString<f64>,
}

/// The type of a critical facility connection.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FacilityKind {
    /// A customer flagged as critical by the utility.
    CriticalCustomer,
    /// A school or childcare facility.
    SchoolChildcare,
    /// A healthcare facility.
    Healthcare,
}

impl FacilityKind {
    /// The column name used for this facility kind in the risk table.
    pub fn column_name(self) -> &'static str {
        match self {
            FacilityKind::CriticalCustomer => "CRITICAL_CUSTOMER",
            FacilityKind::SchoolChildcare => "SCHOOL_CHILDCARE",
            FacilityKind::Healthcare => "HEALTHCARE",
        }
    }
}

/// A critical facility located somewhere in the service area.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    /// The type of the facility.
    pub kind: FacilityKind,
    /// The point position of the facility.
    pub position: Point<f64>,
}

/// A feature of a proximity layer (roads, buildings, right-of-way, water
/// areas and lines). Near-distance scoring only needs the geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// A point feature, e.g. a road intersection.
    Point(Point<f64>),
    /// A line feature, e.g. a road centerline.
    Line(LineString<f64>),
    /// An area feature, e.g. a building footprint.
    Area(Polygon<f64>),
}

/// A seed point for network tracing: one per pipe segment, positioned at the
/// segment's interior midpoint and tagged with the segment's identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPoint {
    /// The facility identifier of the segment the seed represents.
    pub facility_id: String,
    /// The position of the seed on the segment.
    pub position: Point<f64>,
}
