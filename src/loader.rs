use crate::error::{DemandError, Result};
use crate::types::{ObservationEntry, ObservationTable, RawObservationRow, RawThresholdRow, ThresholdTable};
use crate::util::{parse_count_safe, parse_f64_safe};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
    pub skipped_rows: usize,
}

fn open(path: &Path) -> Result<std::fs::File> {
    if !path.is_file() {
        return Err(DemandError::MissingInput(path.to_path_buf()));
    }
    Ok(std::fs::File::open(path)?)
}

pub fn load_observations(path: &Path) -> Result<(ObservationTable, LoadReport)> {
    let (table, report) = read_observations(open(path)?)?;
    info!(
        path = %path.display(),
        rows = report.total_rows,
        kept = report.kept_rows,
        keys = table.len(),
        "loaded daily observations"
    );
    Ok((table, report))
}

/// Read `crop,average,count` rows. A blank crop drops the row, a bad average
/// becomes "absent", a bad count becomes 0.
pub fn read_observations<R: Read>(reader: R) -> Result<(ObservationTable, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let mut report = LoadReport::default();
    let mut table = ObservationTable::new();

    for result in rdr.deserialize::<RawObservationRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "unreadable observation row");
                report.parse_errors += 1;
                continue;
            }
        };
        let crop = row.crop.unwrap_or_default();
        let entry = ObservationEntry::new(
            crop.trim(),
            parse_f64_safe(row.average.as_deref()),
            parse_count_safe(row.count.as_deref()),
        );
        if table.push(entry) {
            report.kept_rows += 1;
        } else {
            report.skipped_rows += 1;
        }
    }
    Ok((table, report))
}

pub fn load_thresholds(path: &Path) -> Result<(ThresholdTable, LoadReport)> {
    let (table, report) = read_thresholds(open(path)?)?;
    info!(
        path = %path.display(),
        rows = report.total_rows,
        thresholds = table.len(),
        "loaded peak thresholds"
    );
    Ok((table, report))
}

/// Read `Crop,Average_Peak_Value` rows. Rows without a crop or a numeric
/// value are dropped; a repeated crop keeps its last value.
pub fn read_thresholds<R: Read>(reader: R) -> Result<(ThresholdTable, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let mut report = LoadReport::default();
    let mut table = ThresholdTable::new();

    for result in rdr.deserialize::<RawThresholdRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "unreadable threshold row");
                report.parse_errors += 1;
                continue;
            }
        };
        let Some(value) = parse_f64_safe(row.value.as_deref()) else {
            report.skipped_rows += 1;
            continue;
        };
        if table.insert(row.crop.as_deref().unwrap_or(""), value) {
            report.kept_rows += 1;
        } else {
            report.skipped_rows += 1;
        }
    }
    Ok((table, report))
}
