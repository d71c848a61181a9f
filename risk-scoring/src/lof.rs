//! The combined likelihood-of-failure score.

use crate::breaks::BreakRecord;
use crate::service_life::ServiceLifeRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the final LOF table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LofRecord {
    /// The facility identifier of the main.
    #[serde(rename = "FACILITYID")]
    pub facility_id: String,
    /// The pipe material.
    #[serde(rename = "MATERIAL")]
    pub material: String,
    /// The installation year.
    #[serde(rename = "INSTALL_YEAR")]
    pub install_year: i32,
    /// The pipe diameter, if recorded.
    #[serde(rename = "DIAMETER")]
    pub diameter: Option<f64>,
    /// The age in years at scoring time.
    #[serde(rename = "AGE")]
    pub age: i32,
    /// The service-life score, 1..=10.
    #[serde(rename = "SERVICE_LIFE_SCORE")]
    pub service_life_score: u8,
    /// The break count, absent for mains without any recorded break.
    #[serde(rename = "BREAKS")]
    pub breaks: Option<u32>,
    /// The break score, absent for mains without any recorded break.
    #[serde(rename = "BREAKS_SCORE")]
    pub break_score: Option<u8>,
    /// The combined likelihood-of-failure score.
    #[serde(rename = "LOF")]
    pub lof: u8,
}

/// The combined score: the break component weighs in only where it exists.
///
/// An absent break score is *not* an implicit zero; averaging against zero
/// would halve the score of every main without break history.
pub fn combined_lof(service_life_score: u8, break_score: Option<u8>) -> u8 {
    match break_score {
        Some(break_score) => {
            (0.5 * f64::from(service_life_score) + 0.5 * f64::from(break_score)).ceil() as u8
        }
        None => service_life_score,
    }
}

/// Merges the service-life table with the break table into the LOF table.
/// Only mains with a service-life row appear; the break table is a partial
/// overlay keyed by facility identifier.
pub fn combine_lof(service: &[ServiceLifeRecord], breaks: &[BreakRecord]) -> Vec<LofRecord> {
    let breaks_by_id: HashMap<&str, &BreakRecord> = breaks
        .iter()
        .map(|record| (record.facility_id.as_str(), record))
        .collect();

    service
        .iter()
        .map(|record| {
            let break_record = breaks_by_id.get(record.facility_id.as_str());
            LofRecord {
                facility_id: record.facility_id.clone(),
                material: record.material.clone(),
                install_year: record.install_year,
                diameter: record.diameter,
                age: record.age,
                service_life_score: record.score,
                breaks: break_record.map(|record| record.breaks),
                break_score: break_record.map(|record| record.score),
                lof: combined_lof(record.score, break_record.map(|record| record.score)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{combine_lof, combined_lof};
    use crate::breaks::BreakRecord;
    use crate::service_life::ServiceLifeRecord;

    #[test]
    fn test_combined_lof_blends_when_break_score_exists() {
        // service life 4, two breaks: ceil(0.5*4 + 0.5*10) = 7.
        assert_eq!(combined_lof(4, Some(10)), 7);
        assert_eq!(combined_lof(3, Some(8)), 6);
        assert_eq!(combined_lof(10, Some(10)), 10);
    }

    #[test]
    fn test_combined_lof_without_breaks_is_service_life_alone() {
        assert_eq!(combined_lof(4, None), 4);
        assert_eq!(combined_lof(10, None), 10);
    }

    fn service_record(facility_id: &str, score: u8) -> ServiceLifeRecord {
        ServiceLifeRecord {
            facility_id: facility_id.to_owned(),
            material: "Cast Iron".to_owned(),
            install_year: 1950,
            diameter: None,
            age: 75,
            service_life: 75.0,
            score,
        }
    }

    #[test]
    fn test_combine_lof_overlays_breaks_by_facility_id() {
        let service = vec![service_record("WM-1", 4), service_record("WM-2", 6)];
        let breaks = vec![BreakRecord {
            facility_id: "WM-1".to_owned(),
            breaks: 2,
            score: 10,
        }];

        let records = combine_lof(&service, &breaks);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lof, 7);
        assert_eq!(records[0].breaks, Some(2));
        assert_eq!(records[1].lof, 6);
        assert_eq!(records[1].breaks, None);
    }
}
