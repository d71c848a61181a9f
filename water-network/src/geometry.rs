use crate::model::FeatureGeometry;
use geo::{Coord, EuclideanDistance, LineInterpolatePoint, LineString, Point};

/// Returns the interior midpoint of a polyline: the point halfway along the
/// line measured by length, not the center of its bounding box.
///
/// Identical input geometry always yields an identical midpoint. A
/// zero-length line yields its first coordinate.
pub fn interior_midpoint(line: &LineString<f64>) -> Point<f64> {
    line.line_interpolate_point(0.5)
        .unwrap_or_else(|| Point::from(line.0[0]))
}

/// Quantises a coordinate for junction snapping. Two coordinates within
/// `tolerance` of each other map to the same or an adjacent key.
pub fn snap_key(coord: Coord<f64>, tolerance: f64) -> (i64, i64) {
    (
        (coord.x / tolerance).round() as i64,
        (coord.y / tolerance).round() as i64,
    )
}

/// Tests whether a point lies on any of the given lines, within `tolerance`.
///
/// This is the coverage test of the zone partitioner: a seed point counts as
/// covered by a trace when its position intersects the trace's aggregated
/// line geometry.
pub fn point_on_any_line(point: Point<f64>, lines: &[LineString<f64>], tolerance: f64) -> bool {
    lines
        .iter()
        .any(|line| point.euclidean_distance(line) <= tolerance)
}

/// The euclidean distance between a polyline and a proximity-layer feature.
pub fn distance_to_feature(line: &LineString<f64>, feature: &FeatureGeometry) -> f64 {
    match feature {
        FeatureGeometry::Point(point) => point.euclidean_distance(line),
        FeatureGeometry::Line(other) => line.euclidean_distance(other),
        FeatureGeometry::Area(polygon) => line.euclidean_distance(polygon),
    }
}

#[cfg(test)]
mod tests {
    use super::{interior_midpoint, point_on_any_line, snap_key};
    use geo::{line_string, point, Coord};

    #[test]
    fn test_interior_midpoint_follows_the_line() {
        // An L-shaped line of total length 2: the midpoint sits on the bend,
        // not in the middle of the bounding box.
        let line = line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
        ];
        assert_eq!(interior_midpoint(&line), point!(x: 1.0, y: 0.0));
    }

    #[test]
    fn test_interior_midpoint_is_deterministic() {
        let line = line_string![(x: 3.25, y: -1.5), (x: 7.75, y: 2.0)];
        assert_eq!(interior_midpoint(&line), interior_midpoint(&line.clone()));
    }

    #[test]
    fn test_snap_key_merges_nearby_coordinates() {
        let a = Coord { x: 10.001, y: 5.002 };
        let b = Coord { x: 9.999, y: 4.998 };
        assert_eq!(snap_key(a, 0.05), snap_key(b, 0.05));
    }

    #[test]
    fn test_point_on_any_line() {
        let lines = vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]];
        assert!(point_on_any_line(point!(x: 5.0, y: 0.0), &lines, 0.01));
        assert!(!point_on_any_line(point!(x: 5.0, y: 1.0), &lines, 0.01));
    }
}
