//! Service-life decay scoring.
//!
//! A pipe's service-life score is its age relative to the expected service
//! life of its material, scaled to 1..=10. Rows with missing material,
//! missing install date or an unmapped material are dropped, not imputed:
//! their service life is not estimable.

use crate::error::*;
use chrono::Datelike;
use error_chain::bail;
use log::{debug, info};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use water_network::model::PipeSegment;

/// The expected service life per pipe material, in years.
#[derive(Debug, Clone, Default)]
pub struct ServiceLifeTable {
    by_material: HashMap<String, f64>,
}

#[derive(Deserialize)]
struct ServiceLifeRow {
    #[serde(rename = "Material")]
    material: String,
    #[serde(rename = "Service Life")]
    service_life: f64,
}

impl ServiceLifeTable {
    /// Reads the table from a CSV file with columns `Material` and
    /// `Service Life`.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut by_material = HashMap::new();
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        for row in reader.deserialize() {
            let row: ServiceLifeRow = row?;
            // The negated comparison also rejects NaN.
            if !(row.service_life > 0.0) {
                debug!(
                    "Dropping service-life row '{}': unusable service life {}",
                    row.material, row.service_life
                );
                continue;
            }
            by_material.insert(row.material, row.service_life);
        }
        if by_material.is_empty() {
            bail!(ErrorKind::EmptyServiceLifeTable(
                path.as_ref().display().to_string()
            ));
        }
        Ok(Self { by_material })
    }

    /// Creates a table from material/service-life pairs.
    pub fn from_pairs<Iter: IntoIterator<Item = (String, f64)>>(pairs: Iter) -> Self {
        Self {
            by_material: pairs.into_iter().collect(),
        }
    }

    /// The expected service life of the given material, if mapped.
    pub fn get(&self, material: &str) -> Option<f64> {
        self.by_material.get(material).copied()
    }

    /// The number of mapped materials.
    pub fn len(&self) -> usize {
        self.by_material.len()
    }

    /// Returns true if no material is mapped.
    pub fn is_empty(&self) -> bool {
        self.by_material.is_empty()
    }
}

/// The service-life score: `ceil(age / service_life * 10)` clamped to the
/// closed interval `[1, 10]`. Values at or below zero map to 1, not 0; a
/// zero floor would read as "no risk". A non-finite ratio (zero or NaN
/// service life) means the pipe has no remaining life and scores 10.
pub fn service_life_score(age_years: f64, service_life: f64) -> u8 {
    let score = (age_years / service_life * 10.0).ceil();
    if score.is_nan() || score > 10.0 {
        10
    } else if score <= 0.0 {
        1
    } else {
        score as u8
    }
}

/// One scored row of the service-life table.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLifeRecord {
    /// The facility identifier of the main.
    pub facility_id: String,
    /// The pipe material.
    pub material: String,
    /// The installation year.
    pub install_year: i32,
    /// The pipe diameter, if recorded.
    pub diameter: Option<f64>,
    /// The age in years at scoring time.
    pub age: i32,
    /// The expected service life of the material, in years.
    pub service_life: f64,
    /// The service-life score, 1..=10.
    pub score: u8,
}

/// Scores all segments whose service life is estimable; the rest are
/// dropped. The result keeps the ascending facility-identifier order of the
/// input.
pub fn score_service_life(
    segments: &[PipeSegment],
    table: &ServiceLifeTable,
    current_year: i32,
) -> Vec<ServiceLifeRecord> {
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for segment in segments {
        let (material, install_date) = match (&segment.material, segment.install_date) {
            (Some(material), Some(install_date)) => (material, install_date),
            _ => {
                debug!(
                    "Dropping {}: missing material or install date",
                    segment.facility_id
                );
                dropped += 1;
                continue;
            }
        };
        let service_life = match table.get(material) {
            Some(service_life) => service_life,
            None => {
                debug!(
                    "Dropping {}: unmapped material '{}'",
                    segment.facility_id, material
                );
                dropped += 1;
                continue;
            }
        };

        let install_year = install_date.year();
        let age = current_year - install_year;
        records.push(ServiceLifeRecord {
            facility_id: segment.facility_id.clone(),
            material: material.clone(),
            install_year,
            diameter: segment.diameter,
            age,
            service_life,
            score: service_life_score(age as f64, service_life),
        });
    }

    info!(
        "Scored service life for {} of {} mains ({} dropped)",
        records.len(),
        segments.len(),
        dropped
    );
    records
}
