use std::collections::BTreeSet;
use std::sync::Arc;

use crate::data::filter::{filtered_indices, init_filter_state, FilterState};
use crate::data::model::{Dimension, JobDataset, JobPosting};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Selection state of one dashboard session, independent of rendering.
///
/// The dataset is shared read-only; each session owns its filters and the
/// cached view, so concurrent sessions never see each other's selections.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<JobDataset>>,

    /// Per-dimension filter selections.
    pub filters: FilterState,

    /// Indices of postings passing the current filters (cached).
    pub visible_indices: Vec<usize>,
}

impl DashboardState {
    pub fn new(dataset: Arc<JobDataset>) -> Self {
        let mut state = Self::default();
        state.set_dataset(dataset);
        state
    }

    /// Ingest a newly loaded dataset and select everything.
    pub fn set_dataset(&mut self, dataset: Arc<JobDataset>) {
        self.filters = init_filter_state(&dataset);
        self.visible_indices = (0..dataset.len()).collect();
        self.dataset = Some(dataset);
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
            log::debug!(
                "{} of {} postings visible",
                self.visible_indices.len(),
                ds.len()
            );
        }
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.filters.entry(dim).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(ds) = &self.dataset {
            if let Some(all_vals) = ds.unique_values.get(&dim) {
                self.filters.insert(dim, all_vals.clone());
                self.refilter();
            }
        }
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.filters.insert(dim, BTreeSet::new());
        self.refilter();
    }

    /// Restrict a dimension to exactly the given values.
    pub fn select_only<I, S>(&mut self, dim: Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .insert(dim, values.into_iter().map(Into::into).collect());
        self.refilter();
    }

    /// The postings passing the current filters, in file order.
    pub fn visible_rows(&self) -> Vec<&JobPosting> {
        match &self.dataset {
            Some(ds) => self
                .visible_indices
                .iter()
                .filter_map(|&i| ds.postings.get(i))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::posting;

    fn state() -> DashboardState {
        let mut b = posting("Data Analyst", 60.0, &["SQL"]);
        b.company_location = "Germany".to_string();
        let dataset = JobDataset::from_postings(vec![
            posting("ML Engineer", 100.0, &["Python"]),
            b,
            posting("ML Engineer", 120.0, &["Python", "SQL"]),
        ]);
        DashboardState::new(Arc::new(dataset))
    }

    #[test]
    fn starts_with_everything_visible() {
        let state = state();
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.visible_rows().len(), 3);
    }

    #[test]
    fn toggling_hides_and_restores() {
        let mut state = state();
        state.toggle_filter_value(Dimension::CompanyLocation, "Germany");
        assert_eq!(state.visible_indices, vec![0, 2]);
        state.toggle_filter_value(Dimension::CompanyLocation, "Germany");
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn none_all_and_only() {
        let mut state = state();
        state.select_none(Dimension::JobTitle);
        assert!(state.visible_rows().is_empty());
        state.select_all(Dimension::JobTitle);
        assert_eq!(state.visible_indices.len(), 3);
        state.select_only(Dimension::Skill, ["SQL"]);
        assert_eq!(state.visible_indices, vec![1, 2]);
    }

    #[test]
    fn empty_state_has_no_rows() {
        let state = DashboardState::default();
        assert!(state.visible_rows().is_empty());
    }
}
