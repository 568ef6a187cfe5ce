use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::{info, warn};
use zip::ZipArchive;

use crate::models::{iso_bin_index, SurveyRecord, TreatmentStatus};

/// Fixed name of the tabular member inside the survey archive.
pub const ARCHIVE_MEMBER: &str = "Final_Data.csv";

const REQUIRED_COLUMNS: [&str; 11] = [
    "Timestamp",
    "Gender",
    "Country",
    "Occupation",
    "Self_employed",
    "Family_history",
    "Care_options",
    "Days_indoors",
    "Treatment_Encoded",
    "Stress_Score_Balanced",
    "Isolation_Level_Balanced",
];

/// Ensure the archive contents are present under `data_dir`. Extraction is
/// skipped entirely when the directory already exists; a prior run is assumed
/// to have completed successfully.
pub fn ensure_extracted(archive: &Path, data_dir: &Path) -> anyhow::Result<()> {
    if data_dir.exists() {
        info!(
            "data directory {} already present, skipping extraction",
            data_dir.display()
        );
        return Ok(());
    }

    let file = fs::File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("{} is not a readable zip archive", archive.display()))?;

    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let mut extracted = 0usize;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("skipping archive member with unsafe path: {}", entry.name());
            continue;
        };
        let out_path = data_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file = fs::File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out_file)?;
        extracted += 1;
    }

    info!(
        "extracted {} files from {} into {}",
        extracted,
        archive.display(),
        data_dir.display()
    );
    Ok(())
}

/// Tolerant timestamp parse. The survey export mixes ISO-ish and US-style
/// stamps, some without a time component.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }

    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Parse the survey CSV into normalized records. The header row is validated
/// against the required column set before any row is read; rows whose
/// timestamp fails every known format are dropped, not errors.
pub fn load_survey(csv_path: &Path) -> anyhow::Result<Vec<SurveyRecord>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        #[serde(rename = "Timestamp")]
        timestamp: String,
        #[serde(rename = "Gender")]
        gender: Option<String>,
        #[serde(rename = "Country")]
        country: Option<String>,
        #[serde(rename = "Occupation")]
        occupation: Option<String>,
        #[serde(rename = "Self_employed")]
        self_employed: Option<String>,
        #[serde(rename = "Family_history")]
        family_history: Option<String>,
        #[serde(rename = "Care_options")]
        care_options: Option<String>,
        #[serde(rename = "Days_indoors")]
        days_indoors: Option<String>,
        #[serde(rename = "Treatment_Encoded")]
        treatment_encoded: u8,
        #[serde(rename = "Stress_Score_Balanced")]
        stress_score: Option<f64>,
        #[serde(rename = "Isolation_Level_Balanced")]
        isolation_level: Option<f64>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!(
            "{} does not match the survey schema, missing columns: {}",
            csv_path.display(),
            missing.join(", ")
        );
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed survey row {}", index + 2))?;

        let Some(timestamp) = parse_timestamp(&row.timestamp) else {
            dropped += 1;
            continue;
        };
        let Some(treatment) = TreatmentStatus::from_encoded(row.treatment_encoded) else {
            bail!(
                "row {}: Treatment_Encoded must be 0 or 1, got {}",
                index + 2,
                row.treatment_encoded
            );
        };

        records.push(SurveyRecord {
            timestamp,
            year: timestamp.year(),
            gender: row.gender,
            occupation: row.occupation,
            country: row.country,
            self_employed: row.self_employed,
            family_history: row.family_history,
            care_options: row.care_options,
            days_indoors: row.days_indoors,
            treatment,
            stress_score: row.stress_score,
            isolation_level: row.isolation_level,
            iso_bin: row.isolation_level.and_then(iso_bin_index),
        });
    }

    if dropped > 0 {
        warn!("dropped {dropped} rows with unparseable timestamps");
    }
    info!("loaded {} survey records from {}", records.len(), csv_path.display());
    Ok(records)
}

/// Extract the archive if needed and load the base table from the fixed
/// member file. The base table is loaded once per run and never mutated.
pub fn load_dashboard(archive: &Path, data_dir: &Path) -> anyhow::Result<Vec<SurveyRecord>> {
    ensure_extracted(archive, data_dir)?;
    load_survey(&member_path(data_dir))
}

pub fn member_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ARCHIVE_MEMBER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Timestamp,Gender,Country,Occupation,Self_employed,Family_history,Care_options,Days_indoors,Treatment_Encoded,Stress_Score_Balanced,Isolation_Level_Balanced";

    fn write_csv(dir: &Path, rows: &[&str]) -> PathBuf {
        let path = dir.join("Final_Data.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    #[test]
    fn parses_mixed_timestamp_formats() {
        assert!(parse_timestamp("2014-08-27 11:29:31").is_some());
        assert!(parse_timestamp("8/27/2014 11:29").is_some());
        assert!(parse_timestamp("2014-08-27").is_some());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn unparseable_timestamp_rows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            &[
                "2014-08-27 11:29:31,Female,United States,Corporate,No,Yes,Yes,1-14 days,1,3.5,0.42",
                "garbage,Male,Canada,Student,No,No,No,15-30 days,0,2.0,0.10",
            ],
        );

        let records = load_survey(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country.as_deref(), Some("United States"));
        assert_eq!(records[0].year, 2014);
    }

    #[test]
    fn all_unparseable_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            &["nope,Female,US,Corporate,No,Yes,Yes,1-14 days,1,3.5,0.42"],
        );
        assert!(load_survey(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_columns_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "Timestamp,Gender,Country").unwrap();
        writeln!(file, "2014-08-27 11:29:31,Female,US").unwrap();

        let err = load_survey(&path).unwrap_err().to_string();
        assert!(err.contains("missing columns"));
        assert!(err.contains("Treatment_Encoded"));
    }

    #[test]
    fn invalid_treatment_encoding_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            &["2014-08-27 11:29:31,Female,US,Corporate,No,Yes,Yes,1-14 days,7,3.5,0.42"],
        );
        let err = load_survey(&path).unwrap_err().to_string();
        assert!(err.contains("Treatment_Encoded"));
    }

    #[test]
    fn empty_fields_become_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            &["2014-08-27 11:29:31,,United States,Corporate,No,Yes,Yes,1-14 days,1,,"],
        );
        let records = load_survey(&path).unwrap();
        assert_eq!(records[0].gender, None);
        assert_eq!(records[0].stress_score, None);
        assert_eq!(records[0].iso_bin, None);
    }

    #[test]
    fn extracts_archive_once_and_skips_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("Final_Data.csv.zip");
        let data_dir = dir.path().join("data");

        let file = fs::File::create(&archive_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(ARCHIVE_MEMBER, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(
            format!(
                "{HEADER}\n2014-08-27 11:29:31,Female,US,Corporate,No,Yes,Yes,1-14 days,1,3.5,0.42\n"
            )
            .as_bytes(),
        )
        .unwrap();
        zip.finish().unwrap();

        ensure_extracted(&archive_path, &data_dir).unwrap();
        assert!(member_path(&data_dir).exists());

        let records = load_dashboard(&archive_path, &data_dir).unwrap();
        assert_eq!(records.len(), 1);

        // Second run with the archive gone must still succeed off the
        // existing directory.
        fs::remove_file(&archive_path).unwrap();
        let records = load_dashboard(&archive_path, &data_dir).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_archive_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_extracted(&dir.path().join("absent.zip"), &dir.path().join("data"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("failed to open archive"));
    }
}
