use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dimension, JobDataset, JobPosting};

// ---------------------------------------------------------------------------
// Filter predicate: which distinct values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: maps dimension → set of selected values.
/// If a dimension is absent, it means "no filter" (show all).
pub type FilterState = BTreeMap<Dimension, BTreeSet<String>>;

/// Initialise a [`FilterState`] with all values selected (i.e., show everything).
pub fn init_filter_state(dataset: &JobDataset) -> FilterState {
    dataset.unique_values.clone()
}

/// Whether a single posting passes all active filters.
///
/// A posting passes a dimension filter when:
/// * The dimension is not present in `filters` → passes (no constraint)
/// * The filter set for that dimension is empty → nothing selected → fails
/// * Every distinct value is selected → passes (no effective constraint)
/// * One of the posting's values for that dimension is selected → passes.
///   For [`Dimension::Skill`] any listed skill counts; a posting with no
///   value (e.g. unknown employment type) fails a constrained dimension.
pub fn matches(dataset: &JobDataset, filters: &FilterState, posting: &JobPosting) -> bool {
    for (dim, selected) in filters {
        if selected.is_empty() {
            return false;
        }
        if let Some(all_vals) = dataset.unique_values.get(dim) {
            if selected == all_vals {
                continue;
            }
        }
        if !posting.values(*dim).iter().any(|v| selected.contains(*v)) {
            return false;
        }
    }
    true
}

/// Return indices of postings that pass all active filters.
pub fn filtered_indices(dataset: &JobDataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .postings
        .iter()
        .enumerate()
        .filter(|(_, p)| matches(dataset, filters, p))
        .map(|(i, _)| i)
        .collect()
}

/// Borrowed view of the postings that pass all active filters, in file order.
pub fn filtered_rows<'a>(dataset: &'a JobDataset, filters: &FilterState) -> Vec<&'a JobPosting> {
    dataset
        .postings
        .iter()
        .filter(|p| matches(dataset, filters, p))
        .collect()
}

/// Filter state restricting one dimension to the given values, e.g. a
/// country pair on [`Dimension::CompanyLocation`].
pub fn only<I, S>(dim: Dimension, values: I) -> FilterState
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut filters = FilterState::new();
    filters.insert(dim, values.into_iter().map(Into::into).collect());
    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::posting;
    use crate::data::model::ExperienceLevel;

    fn dataset() -> JobDataset {
        let mut a = posting("ML Engineer", 100.0, &["Python", "SQL"]);
        a.company_location = "Germany".to_string();
        let mut b = posting("Data Analyst", 60.0, &["SQL"]);
        b.experience_level = ExperienceLevel::Senior;
        b.employment_type = None;
        let mut c = posting("ML Engineer", 120.0, &["Python"]);
        c.employment_type = Some("PT".to_string());
        JobDataset::from_postings(vec![a, b, c])
    }

    #[test]
    fn empty_filter_state_passes_everything() {
        let ds = dataset();
        assert_eq!(filtered_indices(&ds, &FilterState::new()), vec![0, 1, 2]);
    }

    #[test]
    fn all_selected_passes_everything() {
        let ds = dataset();
        let filters = init_filter_state(&ds);
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let ds = dataset();
        let mut filters = FilterState::new();
        filters.insert(Dimension::JobTitle, BTreeSet::new());
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn skill_filter_matches_any_listed_skill() {
        let ds = dataset();
        let filters = only(Dimension::Skill, ["SQL"]);
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1]);
    }

    #[test]
    fn missing_value_fails_constrained_dimension() {
        let ds = dataset();
        let filters = only(Dimension::EmploymentType, ["FT"]);
        assert_eq!(filtered_indices(&ds, &filters), vec![0]);
        // Selecting every known value lifts the constraint, unknowns included.
        let filters = only(Dimension::EmploymentType, ["FT", "PT"]);
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn country_pair_and_level_combine() {
        let ds = dataset();
        let mut filters = only(Dimension::CompanyLocation, ["Germany", "United States"]);
        filters.insert(Dimension::ExperienceLevel, ["MI".to_string()].into());
        let rows = filtered_rows(&ds, &filters);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|p| p.job_title == "ML Engineer"));
    }
}
