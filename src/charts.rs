use std::collections::BTreeMap;

use crate::metrics::{mean, round2};
use crate::models::{
    iso_bin_label, ChartKind, ChartSpec, SurveyRecord, Trace, TreatmentStatus,
    DAYS_INDOORS_ORDER, DAYS_INDOORS_OTHER, ISO_BIN_COUNT,
};

/// Build all seven dashboard charts. Each builder is a total function of the
/// filtered table, so a degenerate input (empty table, missing attribute)
/// yields an empty spec for that chart without disturbing the others.
pub fn build_all(filtered: &[SurveyRecord]) -> Vec<ChartSpec> {
    vec![
        treatment_rate_by_country(filtered),
        treatment_rate_by_family_history(filtered),
        occupation_self_employment_by_treatment(filtered),
        barriers_to_care(filtered),
        avg_stress_by_country(filtered),
        avg_stress_by_days_indoors(filtered),
        avg_stress_by_isolation_bin(filtered),
    ]
}

/// Percentage of treated respondents per grouping key, rounded to 2 decimals,
/// with the group size kept for hover text. Rows missing the key are skipped.
fn treatment_rates<'a>(
    filtered: &'a [SurveyRecord],
    key: impl Fn(&'a SurveyRecord) -> Option<&'a str>,
) -> Vec<(String, f64, u64)> {
    let mut groups: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for record in filtered {
        let Some(value) = key(record) else { continue };
        let entry = groups.entry(value).or_insert((0, 0));
        entry.1 += 1;
        if record.treatment == TreatmentStatus::Treated {
            entry.0 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(value, (treated, total))| {
            (
                value.to_string(),
                round2(treated as f64 / total as f64 * 100.0),
                total,
            )
        })
        .collect()
}

pub fn treatment_rate_by_country(filtered: &[SurveyRecord]) -> ChartSpec {
    let mut rows = treatment_rates(filtered, |r| r.country.as_deref());
    // Ranked bar: highest rate first, country name breaking ties.
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

    let mut spec = ChartSpec::new("Treatment Rate by Country", ChartKind::Bar);
    spec.x_label = Some("Country".to_string());
    spec.y_label = Some("Treatment Rate (%)".to_string());
    spec.color_scale = Some("Plasma".to_string());
    spec.hover_format = Some(":.2f".to_string());
    spec.traces = vec![Trace {
        name: "Treatment Rate (%)".to_string(),
        facet: None,
        categories: rows.iter().map(|(c, _, _)| c.clone()).collect(),
        values: rows.iter().map(|(_, rate, _)| *rate).collect(),
        counts: Some(rows.iter().map(|(_, _, total)| *total).collect()),
    }];
    spec
}

pub fn treatment_rate_by_family_history(filtered: &[SurveyRecord]) -> ChartSpec {
    let rows = treatment_rates(filtered, |r| r.family_history.as_deref());

    let mut spec = ChartSpec::new("Treatment Rate by Family History", ChartKind::Donut);
    spec.hole = Some(0.4);
    spec.text_info = Some("percent+label".to_string());
    spec.traces = vec![Trace {
        name: "Rate (%)".to_string(),
        facet: None,
        categories: rows.iter().map(|(c, _, _)| c.clone()).collect(),
        values: rows.iter().map(|(_, rate, _)| *rate).collect(),
        counts: Some(rows.iter().map(|(_, _, total)| *total).collect()),
    }];
    spec
}

pub fn occupation_self_employment_by_treatment(filtered: &[SurveyRecord]) -> ChartSpec {
    // Count per (occupation, self-employment, treatment); rows missing either
    // categorical key fall out of the grouping.
    let mut groups: BTreeMap<(TreatmentStatus, &str, &str), u64> = BTreeMap::new();
    for record in filtered {
        let (Some(occupation), Some(self_employed)) =
            (record.occupation.as_deref(), record.self_employed.as_deref())
        else {
            continue;
        };
        *groups
            .entry((record.treatment, self_employed, occupation))
            .or_insert(0) += 1;
    }

    // One trace per (facet, stack segment): faceted by treatment status,
    // stacked by self-employment. Facet labels carry the bare status text.
    let mut traces: Vec<Trace> = Vec::new();
    for status in [TreatmentStatus::NotTreated, TreatmentStatus::Treated] {
        let mut by_segment: BTreeMap<&str, (Vec<String>, Vec<f64>)> = BTreeMap::new();
        for (&(s, self_employed, occupation), &count) in &groups {
            if s != status {
                continue;
            }
            let entry = by_segment.entry(self_employed).or_default();
            entry.0.push(occupation.to_string());
            entry.1.push(count as f64);
        }
        for (self_employed, (categories, values)) in by_segment {
            traces.push(Trace {
                name: self_employed.to_string(),
                facet: Some(status.label().to_string()),
                categories,
                values,
                counts: None,
            });
        }
    }

    let mut spec = ChartSpec::new(
        "Occupation & Self-employment by Treatment",
        ChartKind::StackedBar,
    );
    spec.x_label = Some("Occupation".to_string());
    spec.y_label = Some("Count".to_string());
    spec.traces = traces;
    spec
}

pub fn barriers_to_care(filtered: &[SurveyRecord]) -> ChartSpec {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in filtered {
        if let Some(barrier) = record.care_options.as_deref() {
            *counts.entry(barrier).or_insert(0) += 1;
        }
    }
    let mut rows: Vec<(&str, u64)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let mut spec = ChartSpec::new("Barriers to Care", ChartKind::Pie);
    spec.hole = Some(0.3);
    spec.text_info = Some("value+label".to_string());
    spec.traces = vec![Trace {
        name: "Barrier".to_string(),
        facet: None,
        categories: rows.iter().map(|(b, _)| b.to_string()).collect(),
        values: rows.iter().map(|(_, count)| *count as f64).collect(),
        counts: None,
    }];
    spec
}

pub fn avg_stress_by_country(filtered: &[SurveyRecord]) -> ChartSpec {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in filtered {
        let (Some(country), Some(score)) = (record.country.as_deref(), record.stress_score)
        else {
            continue;
        };
        groups.entry(country).or_default().push(score);
    }

    let mut categories = Vec::new();
    let mut values = Vec::new();
    for (country, scores) in groups {
        if let Some(avg) = mean(scores.into_iter()) {
            categories.push(country.to_string());
            values.push(round2(avg));
        }
    }

    let mut spec = ChartSpec::new("Average Stress Score by Country", ChartKind::Treemap);
    spec.color_scale = Some("YlGnBu".to_string());
    spec.hover_format = Some(":.2f".to_string());
    spec.traces = vec![Trace {
        name: "Avg Stress Score".to_string(),
        facet: None,
        categories,
        values,
        counts: None,
    }];
    spec
}

pub fn avg_stress_by_days_indoors(filtered: &[SurveyRecord]) -> ChartSpec {
    let mut groups: BTreeMap<String, (Vec<f64>, u64)> = BTreeMap::new();
    let mut has_other = false;
    for record in filtered {
        let Some(raw) = record.days_indoors.as_deref() else {
            continue;
        };
        // Values outside the fixed category set land in an explicit bucket
        // instead of silently vanishing from the axis.
        let category = if DAYS_INDOORS_ORDER.contains(&raw) {
            raw.to_string()
        } else {
            has_other = true;
            DAYS_INDOORS_OTHER.to_string()
        };
        let entry = groups.entry(category).or_default();
        entry.1 += 1;
        if let Some(score) = record.stress_score {
            entry.0.push(score);
        }
    }

    let mut order: Vec<String> = DAYS_INDOORS_ORDER.iter().map(|c| c.to_string()).collect();
    if has_other {
        order.push(DAYS_INDOORS_OTHER.to_string());
    }

    let mut categories = Vec::new();
    let mut values = Vec::new();
    let mut counts = Vec::new();
    for category in &order {
        let Some((scores, count)) = groups.get(category) else {
            continue;
        };
        if let Some(avg) = mean(scores.iter().copied()) {
            categories.push(category.clone());
            values.push(avg);
            counts.push(*count);
        }
    }

    let mut spec = ChartSpec::new("Average Stress Score by Days Indoors", ChartKind::Bar);
    spec.x_label = Some("Days Indoors".to_string());
    spec.y_label = Some("Average Stress Score".to_string());
    spec.category_order = Some(order);
    spec.color_scale = Some("YlGnBu".to_string());
    spec.hover_format = Some(":.2f".to_string());
    spec.traces = vec![Trace {
        name: "Avg Stress".to_string(),
        facet: None,
        categories,
        values,
        counts: Some(counts),
    }];
    spec
}

pub fn avg_stress_by_isolation_bin(filtered: &[SurveyRecord]) -> ChartSpec {
    let mut groups: BTreeMap<(TreatmentStatus, usize), Vec<f64>> = BTreeMap::new();
    for record in filtered {
        let (Some(bin), Some(score)) = (record.iso_bin, record.stress_score) else {
            continue;
        };
        groups.entry((record.treatment, bin)).or_default().push(score);
    }

    let mut traces = Vec::new();
    for status in [TreatmentStatus::NotTreated, TreatmentStatus::Treated] {
        let mut categories = Vec::new();
        let mut values = Vec::new();
        for bin in 0..ISO_BIN_COUNT {
            let Some(scores) = groups.get(&(status, bin)) else {
                continue;
            };
            if let Some(avg) = mean(scores.iter().copied()) {
                categories.push(iso_bin_label(bin));
                values.push(avg);
            }
        }
        if !categories.is_empty() {
            traces.push(Trace {
                name: status.label().to_string(),
                facet: None,
                categories,
                values,
                counts: None,
            });
        }
    }

    let mut spec = ChartSpec::new("Average Stress by Isolation Level", ChartKind::Line);
    spec.x_label = Some("Isolation Level Bin".to_string());
    spec.y_label = Some("Average Stress Score".to_string());
    spec.category_order = Some((0..ISO_BIN_COUNT).map(iso_bin_label).collect());
    spec.markers = Some(true);
    spec.traces = traces;
    spec
}
