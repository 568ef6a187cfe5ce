use chrono::NaiveDateTime;
use serde::Serialize;

/// Presentation order for the Days_indoors axis, regardless of which
/// categories survive filtering.
pub const DAYS_INDOORS_ORDER: [&str; 5] = [
    "Go out Every day",
    "1-14 days",
    "15-30 days",
    "31-60 days",
    "More than 2 months",
];

/// Bucket for Days_indoors values outside the fixed category set.
pub const DAYS_INDOORS_OTHER: &str = "Other";

/// Number of equal-width isolation-level bins over [0, 1].
pub const ISO_BIN_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TreatmentStatus {
    NotTreated,
    Treated,
}

impl TreatmentStatus {
    pub fn from_encoded(value: u8) -> Option<Self> {
        match value {
            0 => Some(TreatmentStatus::NotTreated),
            1 => Some(TreatmentStatus::Treated),
            _ => None,
        }
    }

    pub fn encoded(self) -> u8 {
        match self {
            TreatmentStatus::NotTreated => 0,
            TreatmentStatus::Treated => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TreatmentStatus::NotTreated => "Not Treated",
            TreatmentStatus::Treated => "Treated",
        }
    }
}

/// One normalized survey response. Derived attributes (year, iso_bin) are
/// computed once at load time and cached on the record.
#[derive(Debug, Clone)]
pub struct SurveyRecord {
    pub timestamp: NaiveDateTime,
    pub year: i32,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub country: Option<String>,
    pub self_employed: Option<String>,
    pub family_history: Option<String>,
    pub care_options: Option<String>,
    pub days_indoors: Option<String>,
    pub treatment: TreatmentStatus,
    pub stress_score: Option<f64>,
    pub isolation_level: Option<f64>,
    pub iso_bin: Option<usize>,
}

/// Bin index for an isolation level. Bins are half-open (lo, hi] except the
/// first, which also includes 0.0; values outside [0, 1] carry no bin.
pub fn iso_bin_index(value: f64) -> Option<usize> {
    if !value.is_finite() || value < 0.0 || value > 1.0 {
        return None;
    }
    if value <= 0.0 {
        return Some(0);
    }
    let idx = (value * ISO_BIN_COUNT as f64).ceil() as usize - 1;
    Some(idx.min(ISO_BIN_COUNT - 1))
}

pub fn iso_bin_label(index: usize) -> String {
    let lo = index as f64 / ISO_BIN_COUNT as f64;
    let hi = (index + 1) as f64 / ISO_BIN_COUNT as f64;
    if index == 0 {
        format!("[{lo:.1}, {hi:.1}]")
    } else {
        format!("({lo:.1}, {hi:.1}]")
    }
}

/// Selected values per filterable attribute. An empty list imposes no
/// restriction for that attribute.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub genders: Vec<String>,
    pub occupations: Vec<String>,
    pub countries: Vec<String>,
    pub years: Vec<i32>,
}

/// Distinct non-missing values per attribute, sorted for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub genders: Vec<String>,
    pub occupations: Vec<String>,
    pub countries: Vec<String>,
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_respondents: usize,
    pub country_count: usize,
    pub avg_stress: Option<f64>,
}

impl DashboardMetrics {
    pub fn avg_stress_display(&self) -> String {
        match self.avg_stress {
            Some(avg) => format!("{avg:.2}"),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    StackedBar,
    Pie,
    Donut,
    Treemap,
    Line,
}

/// One plotted series: parallel category/value vectors, optionally tagged
/// with a facet label or per-point counts for hover text.
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<Vec<u64>>,
}

/// Chart metadata plus aggregated series, ready for a rendering collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<bool>,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    pub fn new(title: &str, kind: ChartKind) -> Self {
        ChartSpec {
            title: title.to_string(),
            kind,
            x_label: None,
            y_label: None,
            category_order: None,
            color_scale: None,
            hover_format: None,
            text_info: None,
            hole: None,
            markers: None,
            traces: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|t| t.values.is_empty())
    }
}
