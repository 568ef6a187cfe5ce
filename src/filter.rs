use std::collections::BTreeSet;

use crate::models::{FilterOptions, FilterSelection, SurveyRecord};

impl FilterSelection {
    pub fn is_unrestricted(&self) -> bool {
        self.genders.is_empty()
            && self.occupations.is_empty()
            && self.countries.is_empty()
            && self.years.is_empty()
    }

    /// A record passes when every non-empty selection set contains its
    /// attribute value. Missing attribute values never match an active set.
    pub fn matches(&self, record: &SurveyRecord) -> bool {
        matches_categorical(&self.genders, record.gender.as_deref())
            && matches_categorical(&self.occupations, record.occupation.as_deref())
            && matches_categorical(&self.countries, record.country.as_deref())
            && (self.years.is_empty() || self.years.contains(&record.year))
    }
}

fn matches_categorical(selected: &[String], value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match value {
        Some(value) => selected.iter().any(|s| s == value),
        None => false,
    }
}

/// Recompute the filtered table from the base table. The base table is never
/// mutated; every call starts from the full set of records.
pub fn apply(base: &[SurveyRecord], selection: &FilterSelection) -> Vec<SurveyRecord> {
    base.iter()
        .filter(|record| selection.matches(record))
        .cloned()
        .collect()
}

impl FilterOptions {
    pub fn from_records(base: &[SurveyRecord]) -> Self {
        FilterOptions {
            genders: distinct(base, |r| r.gender.as_deref()),
            occupations: distinct(base, |r| r.occupation.as_deref()),
            countries: distinct(base, |r| r.country.as_deref()),
            years: base.iter().map(|r| r.year).collect::<BTreeSet<_>>().into_iter().collect(),
        }
    }
}

fn distinct<'a>(
    base: &'a [SurveyRecord],
    attribute: impl Fn(&'a SurveyRecord) -> Option<&'a str>,
) -> Vec<String> {
    base.iter()
        .filter_map(attribute)
        .map(str::to_string)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{record, record_with};

    fn base_table() -> Vec<SurveyRecord> {
        vec![
            record("Female", "Corporate", "United States", 2014),
            record("Male", "Student", "Canada", 2014),
            record("Female", "Housewife", "Canada", 2015),
            record("Male", "Corporate", "Poland", 2016),
        ]
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        let base = base_table();
        let filtered = apply(&base, &FilterSelection::default());
        assert_eq!(filtered.len(), base.len());
    }

    #[test]
    fn single_attribute_membership() {
        let base = base_table();
        let selection = FilterSelection {
            countries: vec!["Canada".to_string()],
            ..Default::default()
        };
        let filtered = apply(&base, &selection);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.country.as_deref() == Some("Canada")));
    }

    #[test]
    fn multiple_values_within_an_attribute_are_a_disjunction() {
        let base = base_table();
        let selection = FilterSelection {
            countries: vec!["Canada".to_string(), "Poland".to_string()],
            ..Default::default()
        };
        assert_eq!(apply(&base, &selection).len(), 3);
    }

    #[test]
    fn attributes_combine_as_a_conjunction() {
        let base = base_table();
        let selection = FilterSelection {
            genders: vec!["Female".to_string()],
            countries: vec!["Canada".to_string()],
            years: vec![2015],
            ..Default::default()
        };
        let filtered = apply(&base, &selection);
        assert_eq!(filtered.len(), 1);
        assert!(selection.matches(&filtered[0]));
    }

    #[test]
    fn filtered_table_is_a_subset_satisfying_every_predicate() {
        let base = base_table();
        let selection = FilterSelection {
            genders: vec!["Male".to_string()],
            years: vec![2014, 2016],
            ..Default::default()
        };
        let filtered = apply(&base, &selection);
        assert!(filtered.len() <= base.len());
        assert!(filtered.iter().all(|r| selection.matches(r)));
    }

    #[test]
    fn filtering_is_idempotent() {
        let base = base_table();
        let selection = FilterSelection {
            genders: vec!["Female".to_string()],
            ..Default::default()
        };
        let once = apply(&base, &selection);
        let twice = apply(&once, &selection);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn missing_values_never_match_an_active_set() {
        let mut r = record("Female", "Corporate", "United States", 2014);
        r.gender = None;
        let selection = FilterSelection {
            genders: vec!["Female".to_string()],
            ..Default::default()
        };
        assert!(!selection.matches(&r));
    }

    #[test]
    fn options_are_distinct_sorted_and_skip_missing() {
        let mut base = base_table();
        base.push(record_with("Zed", "Student", "Canada", 2014, |r| {
            r.country = None;
        }));

        let options = FilterOptions::from_records(&base);
        assert_eq!(options.countries, vec!["Canada", "Poland", "United States"]);
        assert_eq!(options.genders, vec!["Female", "Male", "Zed"]);
        assert_eq!(options.years, vec![2014, 2015, 2016]);
    }
}
