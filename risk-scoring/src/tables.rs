//! CSV readers and writers for the scoring tables.
//!
//! The break and LOF tables serialize directly from their records. The risk
//! table has a dynamic column set (one `NEAR_*` column per proximity layer),
//! so it is written field by field. Absent values become empty cells, never
//! zeros.

use crate::breaks::BreakRecord;
use crate::cof::CofTable;
use crate::error::*;
use crate::lof::LofRecord;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use water_network::model::FacilityKind;

/// Writes the break table.
pub fn write_breaks_table<P: AsRef<Path>>(path: P, records: &[BreakRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} break rows to {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Writes the final LOF table.
pub fn write_lof_table<P: AsRef<Path>>(path: P, records: &[LofRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} LOF rows to {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Reads a previously written LOF table back.
pub fn read_lof_table<P: AsRef<Path>>(path: P) -> Result<Vec<LofRecord>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    info!(
        "Read {} LOF rows from {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> &'static str {
    if value {
        "Y"
    } else {
        ""
    }
}

/// Writes the combined risk table: the COF columns per main, the LOF columns
/// where a LOF record exists for the main, and one `NEAR_*` column per
/// proximity layer.
pub fn write_risk_table<P: AsRef<Path>>(
    path: P,
    cof: &CofTable,
    lof_by_id: &HashMap<String, LofRecord>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let mut header = vec![
        "FACILITYID".to_owned(),
        "MATERIAL".to_owned(),
        "INSTALL_YEAR".to_owned(),
        "DIAMETER".to_owned(),
        "AGE".to_owned(),
        "SERVICE_LIFE_SCORE".to_owned(),
        "BREAKS".to_owned(),
        "BREAKS_SCORE".to_owned(),
        "LOF".to_owned(),
        "ZONE".to_owned(),
        "AFFECTED_LATERALS".to_owned(),
        FacilityKind::CriticalCustomer.column_name().to_owned(),
        FacilityKind::SchoolChildcare.column_name().to_owned(),
        FacilityKind::Healthcare.column_name().to_owned(),
    ];
    header.extend(cof.near_names.iter().map(|name| format!("NEAR_{}", name)));
    writer.write_record(&header)?;

    for record in &cof.records {
        let lof = lof_by_id.get(&record.facility_id);
        let mut row = vec![
            record.facility_id.clone(),
            lof.map(|lof| lof.material.clone()).unwrap_or_default(),
            optional(lof.map(|lof| lof.install_year)),
            optional(lof.and_then(|lof| lof.diameter)),
            optional(lof.map(|lof| lof.age)),
            optional(lof.map(|lof| lof.service_life_score)),
            optional(lof.and_then(|lof| lof.breaks)),
            optional(lof.and_then(|lof| lof.break_score)),
            optional(lof.map(|lof| lof.lof)),
            record.zone.clone().unwrap_or_default(),
            record.affected_laterals.to_string(),
            flag(record.flags.get(FacilityKind::CriticalCustomer)).to_owned(),
            flag(record.flags.get(FacilityKind::SchoolChildcare)).to_owned(),
            flag(record.flags.get(FacilityKind::Healthcare)).to_owned(),
        ];
        row.extend(record.near.iter().map(|distance| optional(*distance)));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    info!(
        "Wrote {} risk rows to {}",
        cof.records.len(),
        path.as_ref().display()
    );
    Ok(())
}
