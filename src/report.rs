use std::fmt::Write;

use crate::models::{ChartSpec, DashboardMetrics, FilterSelection};

pub fn describe_selection(selection: &FilterSelection) -> String {
    if selection.is_unrestricted() {
        return "all respondents".to_string();
    }
    let mut parts = Vec::new();
    if !selection.genders.is_empty() {
        parts.push(format!("Gender in [{}]", selection.genders.join(", ")));
    }
    if !selection.occupations.is_empty() {
        parts.push(format!("Occupation in [{}]", selection.occupations.join(", ")));
    }
    if !selection.countries.is_empty() {
        parts.push(format!("Country in [{}]", selection.countries.join(", ")));
    }
    if !selection.years.is_empty() {
        let years: Vec<String> = selection.years.iter().map(|y| y.to_string()).collect();
        parts.push(format!("Year in [{}]", years.join(", ")));
    }
    parts.join("; ")
}

pub fn build_report(
    selection: &FilterSelection,
    metrics: &DashboardMetrics,
    specs: &[ChartSpec],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Mental Health Help-Seeking Dashboard");
    let _ = writeln!(output, "Generated for {}", describe_selection(selection));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline Metrics");
    let _ = writeln!(output, "- Total Respondents: {}", metrics.total_respondents);
    let _ = writeln!(output, "- No. of Countries: {}", metrics.country_count);
    let _ = writeln!(output, "- Avg Stress Score: {}", metrics.avg_stress_display());

    for spec in specs {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", spec.title);

        if spec.is_empty() {
            let _ = writeln!(output, "No data after filtering.");
            continue;
        }

        for trace in &spec.traces {
            let label = match trace.facet.as_deref() {
                Some(facet) => format!("{} / {}", facet, trace.name),
                None => trace.name.clone(),
            };
            let leading: Vec<String> = trace
                .categories
                .iter()
                .zip(&trace.values)
                .take(5)
                .map(|(category, value)| format!("{category}: {value:.2}"))
                .collect();
            let _ = writeln!(
                output,
                "- {} ({} points): {}",
                label,
                trace.values.len(),
                leading.join(", ")
            );
        }
    }

    output
}
