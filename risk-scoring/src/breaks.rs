//! Break-frequency scoring.
//!
//! Historical break events are points recorded near, not on, the main that
//! broke. Each break joins its nearest main within a search radius (a
//! one-to-one join); per-main counts then score as 8 for a single break and
//! 10 for a repeat breaker. Mains with zero breaks get no row at all: the
//! break component is absent for them, not zero.

use geo::{EuclideanDistance, Point};
use log::{info, warn};
use std::collections::HashMap;
use water_network::model::PipeSegment;

/// Joins each break to its nearest main within `search_radius` and counts
/// breaks per facility identifier. Breaks without a main inside the radius
/// are logged and dropped.
pub fn count_breaks_per_main(
    breaks: &[Point<f64>],
    segments: &[PipeSegment],
    search_radius: f64,
) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut unmatched = 0usize;

    for &break_point in breaks {
        let mut nearest: Option<(&PipeSegment, f64)> = None;
        for segment in segments {
            let distance = break_point.euclidean_distance(&segment.geometry);
            if distance <= search_radius && nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((segment, distance));
            }
        }

        match nearest {
            Some((segment, _)) => *counts.entry(segment.facility_id.clone()).or_insert(0) += 1,
            None => unmatched += 1,
        }
    }

    if unmatched > 0 {
        warn!("{} break events matched no main within the search radius", unmatched);
    }
    info!(
        "Joined {} break events onto {} mains",
        breaks.len() - unmatched,
        counts.len()
    );
    counts
}

/// The break score for a per-main break count. Zero breaks yield no score.
pub fn break_score(count: u32) -> Option<u8> {
    match count {
        0 => None,
        1 => Some(8),
        _ => Some(10),
    }
}

/// One row of the break table. Only mains with at least one break appear.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BreakRecord {
    /// The facility identifier of the main.
    #[serde(rename = "FACILITYID")]
    pub facility_id: String,
    /// The number of recorded breaks.
    #[serde(rename = "BREAKS")]
    pub breaks: u32,
    /// The break score: 8 for one break, 10 for two or more.
    #[serde(rename = "BREAKS_SCORE")]
    pub score: u8,
}

/// Builds the break table from per-main counts, sorted ascending by
/// facility identifier.
pub fn score_breaks(counts: &HashMap<String, u32>) -> Vec<BreakRecord> {
    let mut records: Vec<_> = counts
        .iter()
        .filter_map(|(facility_id, &breaks)| {
            break_score(breaks).map(|score| BreakRecord {
                facility_id: facility_id.clone(),
                breaks,
                score,
            })
        })
        .collect();
    records.sort_by(|a, b| a.facility_id.cmp(&b.facility_id));
    records
}
