//! Per-segment nearest distances to proximity layers.
//!
//! The counterpart of a near-table: for every main, the distance to the
//! nearest feature of each layer within a search radius. Each layer yields
//! one independent numeric column; nothing is combined into a single score
//! at this stage.

use log::info;
use std::collections::HashMap;
use water_network::geometry::distance_to_feature;
use water_network::model::{FeatureGeometry, PipeSegment};

/// A named proximity layer.
#[derive(Debug, Clone)]
pub struct NearLayer {
    /// The layer name, used as the column name in the risk table.
    pub name: String,
    /// The features of the layer.
    pub features: Vec<FeatureGeometry>,
}

/// Computes the nearest-feature distance per main for one layer. Mains with
/// no feature inside `search_radius` are absent from the result.
pub fn near_distances(
    segments: &[PipeSegment],
    layer: &NearLayer,
    search_radius: f64,
) -> HashMap<String, f64> {
    let mut distances = HashMap::new();

    for segment in segments {
        let mut nearest: Option<f64> = None;
        for feature in &layer.features {
            let distance = distance_to_feature(&segment.geometry, feature);
            if distance <= search_radius && nearest.map_or(true, |best| distance < best) {
                nearest = Some(distance);
            }
        }
        if let Some(distance) = nearest {
            distances.insert(segment.facility_id.clone(), distance);
        }
    }

    info!(
        "Near layer '{}': {} of {} mains within {}",
        layer.name,
        distances.len(),
        segments.len(),
        search_radius
    );
    distances
}
