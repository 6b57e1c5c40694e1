//! Aggregation, skill-quadrant classification and job ranking over AI job
//! posting datasets.
//!
//! Load a file with [`data::loader::load_file`], narrow it down with
//! [`data::filter`] or a [`state::DashboardState`], then hand the rows to the
//! functions in [`analysis`].

pub mod analysis;
pub mod data;
pub mod state;
