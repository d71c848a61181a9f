//! Reading and writing feature layers as GeoJSON.
//!
//! Layers are expected to be local exports of the remote feature services
//! (the export itself is outside this crate). Property names of the water
//! main layer differ between cities, so they are configurable through
//! [`MainsSchema`].

use crate::model::{Facility, FacilityKind, FeatureGeometry, Lateral, PipeSegment, Valve};
use crate::zones::IsolationZone;
use chrono::NaiveDate;
use error_chain::{bail, ensure, error_chain};
use geo::{Coord, LineString, Point, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};
use log::debug;
use std::path::Path;

error_chain! {
    foreign_links {
        Io(std::io::Error);
        GeoJson(geojson::Error);
    }

    errors {
        NotAFeatureCollection(path: String) {
            description("the file does not contain a GeoJSON feature collection")
            display("'{}' does not contain a GeoJSON feature collection", path)
        }

        MissingGeometry(feature: usize) {
            description("a feature has no geometry")
            display("feature {} has no geometry", feature)
        }

        UnexpectedGeometry(expected: String, found: String) {
            description("a feature has an unexpected geometry type")
            display("expected {} geometry, found {}", expected, found)
        }

        MalformedPosition {
            description("a coordinate has fewer than two ordinates")
            display("a coordinate has fewer than two ordinates")
        }

        DegenerateLine {
            description("a line feature has fewer than two positions")
            display("a line feature has fewer than two positions")
        }

        MissingProperty(name: String) {
            description("a feature is missing a required property")
            display("a feature is missing the required property '{}'", name)
        }
    }
}

/// The property names of the water main layer.
#[derive(Debug, Clone)]
pub struct MainsSchema {
    /// The unique facility identifier property.
    pub facility_id: String,
    /// The installation date property.
    pub install_date: String,
    /// The pipe material property.
    pub material: String,
    /// The pipe diameter property.
    pub diameter: String,
}

impl Default for MainsSchema {
    fn default() -> Self {
        Self {
            facility_id: "FACILITYID".to_owned(),
            install_date: "PLACEDINSE".to_owned(),
            material: "MATERIAL".to_owned(),
            diameter: "DIAMETER".to_owned(),
        }
    }
}

/// Reads the water main layer into pipe segments.
///
/// The facility identifier is required per feature; material, install date
/// and diameter are read as `None` when missing or blank. Scoring drops
/// incomplete rows later, the network build does not need them.
pub fn read_pipe_segments<P: AsRef<Path>>(path: P, schema: &MainsSchema) -> Result<Vec<PipeSegment>> {
    let collection = read_feature_collection(path.as_ref())?;
    let mut segments = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.iter().enumerate() {
        let facility_id = match string_property(feature, &schema.facility_id) {
            Some(facility_id) => facility_id,
            None => bail!(ErrorKind::MissingProperty(schema.facility_id.clone())),
        };
        let geometry = as_line_string(require_geometry(feature, index)?)?;
        segments.push(PipeSegment {
            facility_id,
            geometry,
            material: string_property(feature, &schema.material),
            install_date: property(feature, &schema.install_date).and_then(parse_install_date),
            diameter: number_property(feature, &schema.diameter),
        });
    }

    debug!("Read {} pipe segments", segments.len());
    Ok(segments)
}

/// Reads a valve point layer.
pub fn read_valves<P: AsRef<Path>>(path: P) -> Result<Vec<Valve>> {
    let collection = read_feature_collection(path.as_ref())?;
    let mut valves = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        valves.push(Valve {
            id: string_property(feature, "FACILITYID"),
            position: as_point(require_geometry(feature, index)?)?,
        });
    }
    Ok(valves)
}

/// Reads a service lateral line layer.
pub fn read_laterals<P: AsRef<Path>>(path: P) -> Result<Vec<Lateral>> {
    let collection = read_feature_collection(path.as_ref())?;
    let mut laterals = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        laterals.push(Lateral {
            id: string_property(feature, "FACILITYID"),
            geometry: as_line_string(require_geometry(feature, index)?)?,
        });
    }
    Ok(laterals)
}

/// Reads a bare point layer, such as historical break events.
pub fn read_point_layer<P: AsRef<Path>>(path: P) -> Result<Vec<Point<f64>>> {
    let collection = read_feature_collection(path.as_ref())?;
    let mut points = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        points.push(as_point(require_geometry(feature, index)?)?);
    }
    Ok(points)
}

/// Reads a critical facility point layer, tagging every feature with the
/// given kind.
pub fn read_facilities<P: AsRef<Path>>(path: P, kind: FacilityKind) -> Result<Vec<Facility>> {
    let collection = read_feature_collection(path.as_ref())?;
    let mut facilities = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        facilities.push(Facility {
            kind,
            position: as_point(require_geometry(feature, index)?)?,
        });
    }
    Ok(facilities)
}

/// Reads a proximity layer of mixed point, line and area features.
/// Multi-part geometries are flattened into one feature per part.
pub fn read_near_layer<P: AsRef<Path>>(path: P) -> Result<Vec<FeatureGeometry>> {
    let collection = read_feature_collection(path.as_ref())?;
    let mut features = Vec::new();
    for (index, feature) in collection.features.iter().enumerate() {
        flatten_geometry(&require_geometry(feature, index)?.value, &mut features)?;
    }
    Ok(features)
}

/// Writes the isolation-zone layer with schema `{geometry, zone: text}`.
pub fn write_zone_layer<P: AsRef<Path>>(path: P, zones: &[IsolationZone]) -> Result<()> {
    let features = zones
        .iter()
        .map(|zone| {
            let mut properties = JsonObject::new();
            properties.insert("zone".to_owned(), JsonValue::String(zone.label.clone()));
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::MultiLineString(
                    zone.lines.iter().map(line_to_positions).collect(),
                ))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    std::fs::write(path, GeoJson::from(collection).to_string())?;
    Ok(())
}

/// Reads an isolation-zone layer written by [`write_zone_layer`].
///
/// Segment membership is not part of the layer schema; consumers that need
/// it (the COF join) recover it spatially from the zone geometry.
pub fn read_zone_layer<P: AsRef<Path>>(path: P) -> Result<Vec<IsolationZone>> {
    let collection = read_feature_collection(path.as_ref())?;
    let mut zones = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.iter().enumerate() {
        let label = match string_property(feature, "zone") {
            Some(label) => label,
            None => bail!(ErrorKind::MissingProperty("zone".to_owned())),
        };
        let lines = match &require_geometry(feature, index)?.value {
            Value::MultiLineString(lines) => lines
                .iter()
                .map(|positions| positions_to_line(positions))
                .collect::<Result<Vec<_>>>()?,
            Value::LineString(positions) => vec![positions_to_line(positions)?],
            other => bail!(ErrorKind::UnexpectedGeometry(
                "MultiLineString".to_owned(),
                geometry_type_name(other).to_owned()
            )),
        };
        zones.push(IsolationZone {
            label,
            lines,
            segment_ids: Vec::new(),
        });
    }

    Ok(zones)
}

fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let contents = std::fs::read_to_string(path)?;
    match contents.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => bail!(ErrorKind::NotAFeatureCollection(
            path.display().to_string()
        )),
    }
}

fn require_geometry(feature: &Feature, index: usize) -> Result<&Geometry> {
    match &feature.geometry {
        Some(geometry) => Ok(geometry),
        None => bail!(ErrorKind::MissingGeometry(index)),
    }
}

fn property<'a>(feature: &'a Feature, name: &str) -> Option<&'a JsonValue> {
    feature
        .properties
        .as_ref()
        .and_then(|properties| properties.get(name))
}

/// Reads a string property; blank and whitespace-only values count as
/// missing, matching how the scoring scripts blank-drop their inputs.
fn string_property(feature: &Feature, name: &str) -> Option<String> {
    match property(feature, name)? {
        JsonValue::String(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        JsonValue::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn number_property(feature: &Feature, name: &str) -> Option<f64> {
    match property(feature, name)? {
        JsonValue::Number(value) => value.as_f64(),
        JsonValue::String(value) => value.trim().parse().ok(),
        _ => None,
    }
}

/// Parses an install date from an epoch-millisecond number (the feature
/// service export format) or from the usual date string formats. Unparsable
/// dates are treated as missing.
fn parse_install_date(value: &JsonValue) -> Option<NaiveDate> {
    match value {
        JsonValue::Number(number) => number
            .as_i64()
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
            .map(|datetime| datetime.date_naive()),
        JsonValue::String(value) => parse_date_string(value.trim()),
        _ => None,
    }
}

fn parse_date_string(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    if value.len() == 4 {
        if let Ok(year) = value.parse() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }
    None
}

fn coord_from(position: &[f64]) -> Result<Coord<f64>> {
    ensure!(position.len() >= 2, ErrorKind::MalformedPosition);
    Ok(Coord {
        x: position[0],
        y: position[1],
    })
}

fn positions_to_line(positions: &[Vec<f64>]) -> Result<LineString<f64>> {
    Ok(LineString::new(
        positions
            .iter()
            .map(|position| coord_from(position))
            .collect::<Result<Vec<_>>>()?,
    ))
}

fn line_to_positions(line: &LineString<f64>) -> Vec<Vec<f64>> {
    line.0.iter().map(|coord| vec![coord.x, coord.y]).collect()
}

fn as_point(geometry: &Geometry) -> Result<Point<f64>> {
    match &geometry.value {
        Value::Point(position) => Ok(Point::from(coord_from(position)?)),
        other => bail!(ErrorKind::UnexpectedGeometry(
            "Point".to_owned(),
            geometry_type_name(other).to_owned()
        )),
    }
}

fn as_line_string(geometry: &Geometry) -> Result<LineString<f64>> {
    let positions = match &geometry.value {
        Value::LineString(positions) => positions,
        // Single-part multi lines are common in exported layers.
        Value::MultiLineString(lines) if lines.len() == 1 => &lines[0],
        other => bail!(ErrorKind::UnexpectedGeometry(
            "LineString".to_owned(),
            geometry_type_name(other).to_owned()
        )),
    };
    // Downstream geometry code assumes at least one line segment.
    ensure!(positions.len() >= 2, ErrorKind::DegenerateLine);
    positions_to_line(positions)
}

fn polygon_from(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>> {
    let exterior = match rings.first() {
        Some(exterior) => positions_to_line(exterior)?,
        None => bail!(ErrorKind::UnexpectedGeometry(
            "Polygon".to_owned(),
            "empty polygon".to_owned()
        )),
    };
    let interiors = rings[1..]
        .iter()
        .map(|ring| positions_to_line(ring))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn flatten_geometry(value: &Value, out: &mut Vec<FeatureGeometry>) -> Result<()> {
    match value {
        Value::Point(position) => out.push(FeatureGeometry::Point(Point::from(coord_from(
            position,
        )?))),
        Value::MultiPoint(positions) => {
            for position in positions {
                out.push(FeatureGeometry::Point(Point::from(coord_from(position)?)));
            }
        }
        Value::LineString(positions) => {
            out.push(FeatureGeometry::Line(positions_to_line(positions)?))
        }
        Value::MultiLineString(lines) => {
            for positions in lines {
                out.push(FeatureGeometry::Line(positions_to_line(positions)?));
            }
        }
        Value::Polygon(rings) => out.push(FeatureGeometry::Area(polygon_from(rings)?)),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(FeatureGeometry::Area(polygon_from(rings)?));
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                flatten_geometry(&geometry.value, out)?;
            }
        }
    }
    Ok(())
}

fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_date_string, parse_install_date, read_zone_layer, write_zone_layer};
    use crate::zones::IsolationZone;
    use chrono::NaiveDate;
    use geo::line_string;
    use geojson::JsonValue;

    #[test]
    fn test_parse_date_string_formats() {
        let expected = NaiveDate::from_ymd_opt(1950, 6, 1).unwrap();
        assert_eq!(parse_date_string("1950-06-01"), Some(expected));
        assert_eq!(parse_date_string("1950/06/01"), Some(expected));
        assert_eq!(parse_date_string("06/01/1950"), Some(expected));
        assert_eq!(
            parse_date_string("1950"),
            NaiveDate::from_ymd_opt(1950, 1, 1)
        );
        assert_eq!(parse_date_string(""), None);
        assert_eq!(parse_date_string("unknown"), None);
    }

    #[test]
    fn test_parse_install_date_from_epoch_milliseconds() {
        let value = JsonValue::from(0i64);
        assert_eq!(
            parse_install_date(&value),
            NaiveDate::from_ymd_opt(1970, 1, 1)
        );
    }

    #[test]
    fn test_empty_line_coordinates_are_a_layer_error() {
        let contents = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"FACILITYID": "WM-1"},
                "geometry": {"type": "LineString", "coordinates": []}
            }]
        }"#;
        let path = std::env::temp_dir().join("water_network_empty_line_test.geojson");
        std::fs::write(&path, contents).unwrap();

        let result = super::read_pipe_segments(&path, &super::MainsSchema::default());
        std::fs::remove_file(&path).ok();

        // Malformed exports surface as a typed error instead of panicking
        // later, when the midpoint of the empty line is taken.
        assert!(result.is_err());
    }

    #[test]
    fn test_zone_layer_round_trip() {
        let zones = vec![IsolationZone {
            label: "1".to_owned(),
            lines: vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]],
            segment_ids: vec!["WM-1".to_owned()],
        }];

        let directory = std::env::temp_dir();
        let path = directory.join("water_network_zone_layer_test.geojson");
        write_zone_layer(&path, &zones).unwrap();
        let read_back = read_zone_layer(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].label, "1");
        assert_eq!(read_back[0].lines, zones[0].lines);
        // Membership is not stored in the layer schema.
        assert!(read_back[0].segment_ids.is_empty());
    }
}
