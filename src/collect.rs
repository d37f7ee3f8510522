//! Builds the two input tables from per-crop folders.
//!
//! Each immediate subdirectory of the data root is one crop. `Day.csv`
//! holds the recent daily series, `Year.csv` the long-run series whose
//! mean becomes the crop's peak threshold.

use crate::error::Result;
use crate::types::{DayAverage, PeakCollection, PeakValueRow, SkippedCrop};
use crate::util::{mean, parse_f64_safe, round_to};
use csv::{ReaderBuilder, StringRecord};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DAY_FILE: &str = "Day.csv";
pub const YEAR_FILE: &str = "Year.csv";

/// Immediate subdirectories of `root` as `(name, path)`, sorted by name.
fn crop_folders(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "__pycache__" {
            continue;
        }
        folders.push((name, path));
    }
    folders.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(folders)
}

fn is_metadata(record: &StringRecord) -> bool {
    let first = record.get(0).unwrap_or("").trim().to_lowercase();
    first.starts_with("category:") || first == "week" || first == "time"
}

/// Non-zero, finite values from the last column of a daily series.
/// Metadata lines, header lines and unparseable cells are skipped.
pub fn read_day_values(path: &Path) -> Result<Vec<f64>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut values = Vec::new();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable line");
                continue;
            }
        };
        if record.len() < 2 || is_metadata(&record) {
            continue;
        }
        match parse_f64_safe(record.get(record.len() - 1)) {
            Some(v) if v != 0.0 => values.push(v),
            _ => {}
        }
    }
    Ok(values)
}

pub fn collect_day_averages(root: &Path) -> Result<Vec<DayAverage>> {
    let mut rows = Vec::new();
    for (crop, dir) in crop_folders(root)? {
        let day_file = dir.join(DAY_FILE);
        if !day_file.is_file() {
            continue;
        }
        let values = read_day_values(&day_file)?;
        debug!(crop = %crop, samples = values.len(), "read daily series");
        rows.push(DayAverage {
            crop,
            average: mean(&values),
            count: values.len(),
        });
    }
    info!(root = %root.display(), crops = rows.len(), "collected daily averages");
    Ok(rows)
}

/// Mean of the second column of a yearly series. The first two lines are a
/// banner, the third is the column header.
pub fn read_year_mean(path: &Path) -> Result<Option<f64>> {
    // The banner may contain a blank line, which the csv reader would
    // swallow, so drop it by raw line count first.
    let text = fs::read_to_string(path)?;
    let body = text.lines().skip(2).collect::<Vec<_>>().join("\n");
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut values = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if let Some(v) = parse_f64_safe(record.get(1)) {
            values.push(v);
        }
    }
    Ok(mean(&values))
}

pub fn collect_peak_values(root: &Path) -> Result<PeakCollection> {
    let mut collection = PeakCollection::default();
    for (crop, dir) in crop_folders(root)? {
        let year_file = dir.join(YEAR_FILE);
        if !year_file.is_file() {
            warn!(crop = %crop, "Year.csv not found");
            collection.skipped.push(SkippedCrop {
                crop,
                reason: "Year.csv not found".to_string(),
            });
            continue;
        }
        match read_year_mean(&year_file) {
            Ok(Some(avg)) => {
                debug!(crop = %crop, average = avg, "average peak value");
                collection.rows.push(PeakValueRow {
                    crop,
                    average_peak_value: round_to(avg, 2),
                });
            }
            Ok(None) => {
                warn!(crop = %crop, "no numeric values in Year.csv");
                collection.skipped.push(SkippedCrop {
                    crop,
                    reason: "no numeric values".to_string(),
                });
            }
            Err(e) => {
                warn!(crop = %crop, error = %e, "failed to read Year.csv");
                collection.skipped.push(SkippedCrop {
                    crop,
                    reason: e.to_string(),
                });
            }
        }
    }
    collection.rows.sort_by(|a, b| {
        b.average_peak_value
            .partial_cmp(&a.average_peak_value)
            .unwrap_or(Ordering::Equal)
    });
    info!(
        root = %root.display(),
        crops = collection.rows.len(),
        skipped = collection.skipped.len(),
        "collected peak values"
    );
    Ok(collection)
}
