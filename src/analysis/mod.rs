//! Analysis core: pure functions over borrowed postings.
//!
//! ```text
//!   filtered rows (&JobPosting)
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  group by dimensions → AggregateRow (count, metrics)
//!   └───────────┘
//!     │    │    └──────────────┐
//!     ▼    ▼                   ▼
//!  skills  ranking / compare   dashboard / salary views
//!  (quadrants) (min-max scores)
//! ```
//!
//! Nothing here logs, mutates its input or keeps state between calls.

pub mod aggregate;
pub mod compare;
pub mod dashboard;
pub mod error;
pub mod normalize;
pub mod ranking;
pub mod salary;
pub mod skills;

pub use aggregate::{aggregate, AggregateQuery, AggregateRow, Metric, SortOrder};
pub use compare::{compare_jobs, ComparisonMetric, JobComparison};
pub use error::ConfigError;
pub use ranking::{rank_jobs, RankedJob, Weights};
pub use skills::{classify_skills, skill_landscape, Quadrant, SkillLandscape, SkillOptions, SkillQuadrant};
