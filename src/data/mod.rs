/// Data layer: core types, loading, skill tokenizing and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawPosting → JobPosting (skills tokenized)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ JobDataset │  Vec<JobPosting>, distinct values per dimension
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply dimension predicates → filtered rows
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod skills;
