use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::aggregate::{AggregateQuery, AggregateRow, Metric, SortOrder};
use super::error::ConfigError;
use super::normalize::min_max;
use crate::data::model::{Dimension, JobPosting};

/// A per-title metric that can be put side by side with the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    AverageSalary,
    JobCount,
    YearsExperience,
    BenefitsScore,
    RemoteRatio,
}

impl ComparisonMetric {
    pub const ALL: [ComparisonMetric; 5] = [
        ComparisonMetric::AverageSalary,
        ComparisonMetric::JobCount,
        ComparisonMetric::YearsExperience,
        ComparisonMetric::BenefitsScore,
        ComparisonMetric::RemoteRatio,
    ];

    fn aggregate_metric(self) -> Option<Metric> {
        match self {
            ComparisonMetric::AverageSalary => Some(Metric::MeanSalary),
            ComparisonMetric::JobCount => None,
            ComparisonMetric::YearsExperience => Some(Metric::MeanYearsExperience),
            ComparisonMetric::BenefitsScore => Some(Metric::MeanBenefitsScore),
            ComparisonMetric::RemoteRatio => Some(Metric::MeanRemoteRatio),
        }
    }

    fn raw(self, group: &AggregateRow) -> Option<f64> {
        match self.aggregate_metric() {
            Some(metric) => group.metric(metric),
            None => Some(group.count as f64),
        }
    }
}

/// Raw value of one metric for one title and its min-max score across all
/// titles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricValue {
    pub raw: Option<f64>,
    pub normalized: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobComparison {
    pub job_title: String,
    pub values: BTreeMap<ComparisonMetric, MetricValue>,
}

/// Put job titles side by side on the selected metrics. Each metric is
/// min-max normalized independently so disparate units share one scale.
/// Titles are returned in lexical order.
pub fn compare_jobs<'a, I>(
    rows: I,
    metrics: &[ComparisonMetric],
) -> Result<Vec<JobComparison>, ConfigError>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    if metrics.is_empty() {
        return Err(ConfigError::EmptyMetricSet);
    }

    let groups = AggregateQuery::new([Dimension::JobTitle])
        .metrics(
            metrics
                .iter()
                .filter_map(|m| m.aggregate_metric())
                .collect::<Vec<_>>(),
        )
        .order(SortOrder::Key)
        .run(rows)?;

    let mut out: Vec<JobComparison> = groups
        .iter()
        .map(|g| JobComparison {
            job_title: g.label(),
            values: BTreeMap::new(),
        })
        .collect();

    for &metric in metrics {
        let raw: Vec<Option<f64>> = groups.iter().map(|g| metric.raw(g)).collect();
        let normalized = min_max(&raw);
        for ((cmp, raw), normalized) in out.iter_mut().zip(raw).zip(normalized) {
            cmp.values.insert(metric, MetricValue { raw, normalized });
        }
    }
    Ok(out)
}
