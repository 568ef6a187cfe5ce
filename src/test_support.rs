use chrono::NaiveDate;

use crate::models::{iso_bin_index, SurveyRecord, TreatmentStatus};

pub fn record(gender: &str, occupation: &str, country: &str, year: i32) -> SurveyRecord {
    let timestamp = NaiveDate::from_ymd_opt(year, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    SurveyRecord {
        timestamp,
        year,
        gender: Some(gender.to_string()),
        occupation: Some(occupation.to_string()),
        country: Some(country.to_string()),
        self_employed: Some("No".to_string()),
        family_history: Some("No".to_string()),
        care_options: Some("Yes".to_string()),
        days_indoors: Some("1-14 days".to_string()),
        treatment: TreatmentStatus::NotTreated,
        stress_score: Some(3.0),
        isolation_level: Some(0.5),
        iso_bin: iso_bin_index(0.5),
    }
}

pub fn record_with(
    gender: &str,
    occupation: &str,
    country: &str,
    year: i32,
    tweak: impl FnOnce(&mut SurveyRecord),
) -> SurveyRecord {
    let mut r = record(gender, occupation, country, year);
    tweak(&mut r);
    r
}

pub fn treated(mut r: SurveyRecord) -> SurveyRecord {
    r.treatment = TreatmentStatus::Treated;
    r
}
