//! Salary distribution views: per-title box plot statistics and median
//! salaries by country and experience level.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::aggregate::{AggregateQuery, AggregateRow, Metric, SortOrder};
use super::normalize::{median, quantile_sorted};
use crate::data::model::{Dimension, ExperienceLevel, JobPosting};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryOptions {
    /// Titles with fewer postings are ignored.
    pub min_postings: usize,
    /// Keep at most this many titles, the most frequent first.
    pub top_n: usize,
}

impl Default for SalaryOptions {
    fn default() -> Self {
        Self {
            min_postings: 5,
            top_n: 10,
        }
    }
}

/// Five-number summary of a salary sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalarySummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl SalarySummary {
    /// `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: *sorted.first()?,
            q1: quantile_sorted(&sorted, 0.25)?,
            median: quantile_sorted(&sorted, 0.5)?,
            q3: quantile_sorted(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSalaryStats {
    pub job_title: String,
    pub postings: usize,
    pub summary: SalarySummary,
    /// Median salary per experience level present for the title.
    pub by_level: BTreeMap<ExperienceLevel, f64>,
}

/// Salary distribution of the most frequent job titles, ordered by median
/// salary descending (ties by title).
pub fn salary_distribution<'a, I>(rows: I, options: &SalaryOptions) -> Vec<TitleSalaryStats>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let mut by_title: BTreeMap<&str, Vec<&JobPosting>> = BTreeMap::new();
    for row in rows {
        by_title.entry(row.job_title.as_str()).or_default().push(row);
    }

    let mut eligible: Vec<(&str, Vec<&JobPosting>)> = by_title
        .into_iter()
        .filter(|(_, postings)| postings.len() >= options.min_postings)
        .collect();
    eligible.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
    eligible.truncate(options.top_n);

    let mut stats: Vec<TitleSalaryStats> = eligible
        .into_iter()
        .filter_map(|(title, postings)| {
            let salaries: Vec<f64> = postings.iter().map(|p| p.salary_usd).collect();
            let mut levels: BTreeMap<ExperienceLevel, Vec<f64>> = BTreeMap::new();
            for p in &postings {
                levels.entry(p.experience_level).or_default().push(p.salary_usd);
            }
            Some(TitleSalaryStats {
                job_title: title.to_string(),
                postings: postings.len(),
                summary: SalarySummary::from_values(&salaries)?,
                by_level: levels
                    .into_iter()
                    .filter_map(|(level, values)| Some((level, median(&values)?)))
                    .collect(),
            })
        })
        .collect();

    stats.sort_by(|a, b| {
        b.summary
            .median
            .total_cmp(&a.summary.median)
            .then_with(|| a.job_title.cmp(&b.job_title))
    });
    stats
}

/// Median salary per (company location, experience level) for one job
/// title, limited to the `max_countries` countries with most postings for
/// it. Keys are `[country, level]`, sorted by key.
pub fn median_salary_by_country<'a, I>(
    rows: I,
    job_title: &str,
    max_countries: usize,
) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let postings: Vec<&JobPosting> = rows
        .into_iter()
        .filter(|p| p.job_title == job_title)
        .collect();

    let countries: BTreeSet<String> = AggregateQuery::new([Dimension::CompanyLocation])
        .limit(max_countries)
        .run(postings.iter().copied())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|g| g.key.into_iter().next())
        .collect();

    AggregateQuery::new([Dimension::CompanyLocation, Dimension::ExperienceLevel])
        .metrics([Metric::MedianSalary])
        .order(SortOrder::Key)
        .run(
            postings
                .into_iter()
                .filter(|p| countries.contains(&p.company_location)),
        )
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::posting;

    #[test]
    fn summary_uses_interpolated_quartiles() {
        let s = SalarySummary::from_values(&[40.0, 10.0, 30.0, 20.0, 50.0]).unwrap();
        assert_eq!((s.min, s.q1, s.median, s.q3, s.max), (10.0, 20.0, 30.0, 40.0, 50.0));
        assert!(SalarySummary::from_values(&[]).is_none());
    }

    #[test]
    fn distribution_filters_limits_and_orders_by_median() {
        let mut rows = Vec::new();
        for salary in [100.0, 110.0, 120.0] {
            rows.push(posting("Data Analyst", salary, &[]));
        }
        for salary in [200.0, 210.0] {
            let mut p = posting("ML Engineer", salary, &[]);
            p.experience_level = ExperienceLevel::Senior;
            rows.push(p);
        }
        rows.push(posting("ML Engineer", 50.0, &[]));
        rows.push(posting("Prompt Engineer", 999.0, &[]));

        let options = SalaryOptions {
            min_postings: 2,
            top_n: 5,
        };
        let stats = salary_distribution(&rows, &options);
        let titles: Vec<&str> = stats.iter().map(|s| s.job_title.as_str()).collect();
        assert_eq!(titles, vec!["ML Engineer", "Data Analyst"]);
        assert_eq!(stats[0].summary.median, 200.0);
        assert_eq!(stats[0].by_level[&ExperienceLevel::Senior], 205.0);
        assert_eq!(stats[0].by_level[&ExperienceLevel::Mid], 50.0);

        let options = SalaryOptions {
            min_postings: 2,
            top_n: 1,
        };
        let stats = salary_distribution(&rows, &options);
        assert_eq!(stats.len(), 1);
        // Both have three postings; the tie goes to the lexically first title.
        assert_eq!(stats[0].job_title, "Data Analyst");
    }

    #[test]
    fn country_medians_for_one_title() {
        let mut rows = Vec::new();
        for (country, salary) in [("US", 100.0), ("US", 300.0), ("DE", 80.0), ("FR", 70.0)] {
            let mut p = posting("ML Engineer", salary, &[]);
            p.company_location = country.to_string();
            rows.push(p);
        }
        rows.push(posting("Data Analyst", 10.0, &[]));

        let out = median_salary_by_country(&rows, "ML Engineer", 2);
        let labels: Vec<String> = out.iter().map(AggregateRow::label).collect();
        assert_eq!(labels, vec!["DE / MI", "US / MI"]);
        assert_eq!(out[1].metric(Metric::MedianSalary), Some(200.0));
        assert!(median_salary_by_country(&rows, "Nobody", 5).is_empty());
    }
}
