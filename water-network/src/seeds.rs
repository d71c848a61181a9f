use crate::geometry::interior_midpoint;
use crate::model::SeedPoint;
use crate::network::Network;

/// Generates one seed point per pipe segment, at the segment's interior
/// midpoint, tagged with the segment's facility identifier.
///
/// Seeds come out in ascending facility-identifier order, which is the
/// iteration order of the zone partitioner. Generation has no side effects
/// and identical input geometry always yields identical seeds.
pub fn generate_seed_points(network: &Network) -> Vec<SeedPoint> {
    network
        .segments()
        .iter()
        .map(|segment| SeedPoint {
            facility_id: segment.facility_id.clone(),
            position: interior_midpoint(&segment.geometry),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::generate_seed_points;
    use crate::network::tests::segment;
    use crate::network::NetworkBuilder;
    use geo::{line_string, point};

    #[test]
    fn test_one_seed_per_segment_in_ascending_order() {
        let segments = vec![
            segment("WM-2", line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]),
            segment("WM-1", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
        ];
        let network = NetworkBuilder::default().build(segments, &[]).unwrap();
        let seeds = generate_seed_points(&network);
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].facility_id, "WM-1");
        assert_eq!(seeds[0].position, point!(x: 5.0, y: 0.0));
        assert_eq!(seeds[1].facility_id, "WM-2");
        assert_eq!(seeds[1].position, point!(x: 15.0, y: 0.0));
    }

    #[test]
    fn test_seed_generation_is_deterministic() {
        let build = || {
            let segments = vec![segment(
                "WM-1",
                line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0)],
            )];
            NetworkBuilder::default().build(segments, &[]).unwrap()
        };
        assert_eq!(
            generate_seed_points(&build()),
            generate_seed_points(&build())
        );
    }
}
