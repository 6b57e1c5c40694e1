use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::normalize::{mean, median};
use crate::data::model::{Dimension, JobPosting};

// ---------------------------------------------------------------------------
// Metric – a numeric statistic computed per group
// ---------------------------------------------------------------------------

/// Statistic computed over one numeric field of each group. The posting
/// count is always computed and is not a `Metric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MeanSalary,
    MedianSalary,
    MeanRemoteRatio,
    MeanYearsExperience,
    MeanBenefitsScore,
}

impl Metric {
    /// The value a posting contributes, or `None` if the field is missing.
    fn sample(self, posting: &JobPosting) -> Option<f64> {
        match self {
            Metric::MeanSalary | Metric::MedianSalary => Some(posting.salary_usd),
            Metric::MeanRemoteRatio => posting.remote_ratio,
            Metric::MeanYearsExperience => posting.years_experience,
            Metric::MeanBenefitsScore => posting.benefits_score,
        }
    }

    fn reduce(self, samples: &[f64]) -> Option<f64> {
        match self {
            Metric::MedianSalary => median(samples),
            _ => mean(samples),
        }
    }
}

/// How aggregated rows are ordered. Ties are always broken by the group key
/// in lexical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Descending posting count.
    #[default]
    Count,
    /// Descending metric value; groups where the metric is undefined go last.
    Metric(Metric),
    /// Ascending group key.
    Key,
}

// ---------------------------------------------------------------------------
// AggregateRow – one group
// ---------------------------------------------------------------------------

/// Grouped summary of the rows sharing one combination of dimension values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    /// One value per grouping dimension, in the order they were requested.
    pub key: Vec<String>,
    /// Number of rows in the group (the demand proxy).
    pub count: usize,
    /// Requested metrics. `None` means no row in the group had a value for
    /// that field, which is distinct from a mean of zero.
    pub metrics: BTreeMap<Metric, Option<f64>>,
}

impl AggregateRow {
    /// Value of a metric, `None` if undefined or not requested.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied().flatten()
    }

    pub fn mean_salary(&self) -> Option<f64> {
        self.metric(Metric::MeanSalary)
    }

    pub fn mean_remote_ratio(&self) -> Option<f64> {
        self.metric(Metric::MeanRemoteRatio)
    }

    /// Group key joined for display, e.g. `"Germany / SE"`.
    pub fn label(&self) -> String {
        self.key.join(" / ")
    }
}

// ---------------------------------------------------------------------------
// AggregateQuery – grouping, metrics, ordering and limit in one request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateQuery {
    pub group_by: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    pub order: SortOrder,
    /// Keep only the first `limit` rows after ordering ("Top N").
    pub limit: Option<usize>,
}

impl AggregateQuery {
    pub fn new(group_by: impl Into<Vec<Dimension>>) -> Self {
        Self {
            group_by: group_by.into(),
            metrics: Vec::new(),
            order: SortOrder::Count,
            limit: None,
        }
    }

    pub fn metrics(mut self, metrics: impl Into<Vec<Metric>>) -> Self {
        self.metrics = metrics.into();
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Partition `rows` by the distinct combinations of the grouping values
    /// and summarise each partition.
    ///
    /// Only groups with at least one row are produced. A multi-valued
    /// dimension ([`Dimension::Skill`]) puts a row into one group per value,
    /// and a row without any value for a grouping dimension joins no group.
    pub fn run<'a, I>(&self, rows: I) -> Result<Vec<AggregateRow>, ConfigError>
    where
        I: IntoIterator<Item = &'a JobPosting>,
    {
        if self.group_by.is_empty() {
            return Err(ConfigError::EmptyGrouping);
        }

        let mut metrics: BTreeSet<Metric> = self.metrics.iter().copied().collect();
        if let SortOrder::Metric(m) = self.order {
            metrics.insert(m);
        }

        let mut groups: BTreeMap<Vec<String>, Accumulator> = BTreeMap::new();
        for row in rows {
            for key in group_keys(row, &self.group_by) {
                let acc = groups.entry(key).or_default();
                acc.count += 1;
                for &m in &metrics {
                    if let Some(v) = m.sample(row) {
                        acc.samples.entry(m).or_default().push(v);
                    }
                }
            }
        }

        let mut out: Vec<AggregateRow> = groups
            .into_iter()
            .map(|(key, acc)| AggregateRow {
                key,
                count: acc.count,
                metrics: metrics
                    .iter()
                    .map(|&m| {
                        let samples = acc.samples.get(&m).map(Vec::as_slice).unwrap_or(&[]);
                        (m, m.reduce(samples))
                    })
                    .collect(),
            })
            .collect();

        match self.order {
            SortOrder::Count => {
                out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)))
            }
            SortOrder::Metric(m) => out.sort_by(|a, b| {
                descending_defined_first(a.metric(m), b.metric(m)).then_with(|| a.key.cmp(&b.key))
            }),
            SortOrder::Key => out.sort_by(|a, b| a.key.cmp(&b.key)),
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        Ok(out)
    }
}

/// Group `rows` by `group_by` and compute `metrics`, ordered by descending
/// count (ties by key).
pub fn aggregate<'a, I>(
    rows: I,
    group_by: &[Dimension],
    metrics: &[Metric],
) -> Result<Vec<AggregateRow>, ConfigError>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    AggregateQuery::new(group_by)
        .metrics(metrics)
        .run(rows)
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    samples: BTreeMap<Metric, Vec<f64>>,
}

/// Every group key a row belongs to: the cartesian product of its values
/// for each grouping dimension.
fn group_keys(row: &JobPosting, group_by: &[Dimension]) -> Vec<Vec<String>> {
    let mut keys: Vec<Vec<String>> = vec![Vec::new()];
    for &dim in group_by {
        let values = row.values(dim);
        keys = keys
            .iter()
            .flat_map(|prefix| {
                values.iter().map(move |v| {
                    let mut key = prefix.clone();
                    key.push(v.to_string());
                    key
                })
            })
            .collect();
    }
    keys
}

pub(crate) fn descending_defined_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::posting;
    use crate::data::model::ExperienceLevel;

    fn rows() -> Vec<JobPosting> {
        vec![
            posting("ML Engineer", 100_000.0, &["Python"]),
            posting("ML Engineer", 120_000.0, &["Python"]),
            posting("Data Analyst", 60_000.0, &["SQL"]),
        ]
    }

    #[test]
    fn groups_by_title_with_counts_and_means() {
        let rows = rows();
        let out = aggregate(&rows, &[Dimension::JobTitle], &[Metric::MeanSalary]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].key, vec!["ML Engineer"]);
        assert_eq!(out[0].count, 2);
        assert_eq!(out[0].mean_salary(), Some(110_000.0));
        assert_eq!(out[1].key, vec!["Data Analyst"]);
        assert_eq!(out[1].count, 1);
        assert_eq!(out[1].mean_salary(), Some(60_000.0));
    }

    #[test]
    fn empty_grouping_is_a_config_error() {
        let rows = rows();
        assert_eq!(
            aggregate(&rows, &[], &[Metric::MeanSalary]),
            Err(ConfigError::EmptyGrouping)
        );
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let out = aggregate(&Vec::<JobPosting>::new(), &[Dimension::JobTitle], &[Metric::MeanSalary]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn missing_values_are_undefined_not_zero() {
        let mut rows = rows();
        rows[2].remote_ratio = None;
        rows[0].remote_ratio = None;
        let out = aggregate(&rows, &[Dimension::JobTitle], &[Metric::MeanRemoteRatio]).unwrap();
        let analyst = out.iter().find(|r| r.key == ["Data Analyst"]).unwrap();
        assert_eq!(analyst.metrics.get(&Metric::MeanRemoteRatio), Some(&None));
        assert_eq!(analyst.mean_remote_ratio(), None);
        // The missing remote ratio does not drop the row from the count.
        let engineer = out.iter().find(|r| r.key == ["ML Engineer"]).unwrap();
        assert_eq!(engineer.count, 2);
        assert_eq!(engineer.mean_remote_ratio(), Some(0.0));
    }

    #[test]
    fn ties_break_on_key() {
        let rows = vec![
            posting("B", 1.0, &[]),
            posting("A", 1.0, &[]),
            posting("C", 5.0, &[]),
        ];
        let out = aggregate(&rows, &[Dimension::JobTitle], &[]).unwrap();
        let keys: Vec<String> = out.iter().map(AggregateRow::label).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);

        let out = AggregateQuery::new([Dimension::JobTitle])
            .order(SortOrder::Metric(Metric::MeanSalary))
            .limit(2)
            .run(&rows)
            .unwrap();
        let keys: Vec<String> = out.iter().map(AggregateRow::label).collect();
        assert_eq!(keys, vec!["C", "A"]);
    }

    #[test]
    fn metric_order_puts_undefined_last() {
        let mut rows = rows();
        rows[2].remote_ratio = None;
        let out = AggregateQuery::new([Dimension::JobTitle])
            .order(SortOrder::Metric(Metric::MeanRemoteRatio))
            .run(&rows)
            .unwrap();
        assert_eq!(out[1].key, vec!["Data Analyst"]);
    }

    #[test]
    fn skills_explode_into_one_group_each() {
        let rows = vec![
            posting("A", 100.0, &["Python", "SQL"]),
            posting("B", 50.0, &["SQL"]),
            posting("C", 10.0, &[]),
        ];
        let out = aggregate(&rows, &[Dimension::Skill], &[Metric::MeanSalary]).unwrap();
        assert_eq!(out[0].key, vec!["SQL"]);
        assert_eq!(out[0].count, 2);
        assert_eq!(out[0].mean_salary(), Some(75.0));
        assert_eq!(out[1].key, vec!["Python"]);
        assert_eq!(out.iter().map(|r| r.count).sum::<usize>(), 3);
    }

    #[test]
    fn multi_dimension_keys_keep_request_order() {
        let mut rows = rows();
        rows[1].experience_level = ExperienceLevel::Senior;
        let out = AggregateQuery::new([Dimension::JobTitle, Dimension::ExperienceLevel])
            .metrics([Metric::MedianSalary])
            .order(SortOrder::Key)
            .run(&rows)
            .unwrap();
        let labels: Vec<String> = out.iter().map(AggregateRow::label).collect();
        assert_eq!(labels, vec![
            "Data Analyst / MI",
            "ML Engineer / MI",
            "ML Engineer / SE"
        ]);
        assert_eq!(out[2].metric(Metric::MedianSalary), Some(120_000.0));
    }
}
