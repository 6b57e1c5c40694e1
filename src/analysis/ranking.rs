use serde::{Deserialize, Serialize};

use super::aggregate::{AggregateQuery, Metric};
use super::error::ConfigError;
use super::normalize::min_max;
use crate::data::model::{Dimension, JobPosting};

/// Allowed deviation of the weight sum from 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Relative importance of the three ranking components. Must be finite,
/// non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub salary: f64,
    pub demand: f64,
    pub remote: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            salary: 0.5,
            demand: 0.3,
            remote: 0.2,
        }
    }
}

impl Weights {
    /// Build validated weights.
    pub fn new(salary: f64, demand: f64, remote: f64) -> Result<Self, ConfigError> {
        let weights = Self {
            salary,
            demand,
            remote,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("salary", self.salary),
            ("demand", self.demand),
            ("remote", self.remote),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight { name, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }
        let sum = self.salary + self.demand + self.remote;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

/// One job title with its raw metrics, normalized component scores and
/// weighted composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedJob {
    pub job_title: String,
    pub postings: usize,
    pub mean_salary: Option<f64>,
    pub mean_remote_ratio: Option<f64>,
    pub salary_score: f64,
    pub demand_score: f64,
    pub remote_score: f64,
    pub composite: f64,
}

/// Rank job titles by a weighted blend of mean salary, posting count and
/// mean remote ratio, each min-max normalized across the titles present.
///
/// Weights are validated before any row is touched. The result is sorted by
/// composite descending with ties broken by title, and every score lies in
/// `[0, 1]`. No rows yields no titles.
pub fn rank_jobs<'a, I>(rows: I, weights: &Weights) -> Result<Vec<RankedJob>, ConfigError>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    weights.validate()?;

    let groups = AggregateQuery::new([Dimension::JobTitle])
        .metrics([Metric::MeanSalary, Metric::MeanRemoteRatio])
        .run(rows)?;

    let salaries: Vec<Option<f64>> = groups.iter().map(|g| g.mean_salary()).collect();
    let demand: Vec<Option<f64>> = groups.iter().map(|g| Some(g.count as f64)).collect();
    let remote: Vec<Option<f64>> = groups.iter().map(|g| g.mean_remote_ratio()).collect();

    let salary_scores = min_max(&salaries);
    let demand_scores = min_max(&demand);
    let remote_scores = min_max(&remote);

    let mut ranked: Vec<RankedJob> = groups
        .into_iter()
        .enumerate()
        .map(|(i, g)| {
            let (salary_score, demand_score, remote_score) =
                (salary_scores[i], demand_scores[i], remote_scores[i]);
            let composite = (weights.salary * salary_score
                + weights.demand * demand_score
                + weights.remote * remote_score)
                .clamp(0.0, 1.0);
            RankedJob {
                mean_salary: g.mean_salary(),
                mean_remote_ratio: g.mean_remote_ratio(),
                postings: g.count,
                job_title: g.key.into_iter().next().unwrap_or_default(),
                salary_score,
                demand_score,
                remote_score,
                composite,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.composite
            .total_cmp(&a.composite)
            .then_with(|| a.job_title.cmp(&b.job_title))
    });
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::posting;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn invalid_weights_are_rejected_before_ranking() {
        let rows = vec![posting("A", 1.0, &[])];
        let bad = Weights {
            salary: 0.5,
            demand: 0.6,
            remote: -0.1,
        };
        assert!(matches!(
            rank_jobs(&rows, &bad),
            Err(ConfigError::NegativeWeight { name: "remote", .. })
        ));
        assert!(matches!(
            Weights::new(0.5, 0.5, 0.5),
            Err(ConfigError::WeightSum { .. })
        ));
        assert!(matches!(
            Weights::new(f64::NAN, 0.5, 0.5),
            Err(ConfigError::NonFiniteWeight { name: "salary", .. })
        ));
        assert!(Weights::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0).is_ok());
        assert!(Weights::default().validate().is_ok());
    }

    #[test]
    fn dominant_title_scores_one() {
        let mut top = posting("ML Engineer", 200.0, &[]);
        top.remote_ratio = Some(100.0);
        let rows = vec![top.clone(), top, posting("Data Analyst", 50.0, &[])];
        let ranked = rank_jobs(&rows, &Weights::new(0.5, 0.3, 0.2).unwrap()).unwrap();
        assert_eq!(ranked[0].job_title, "ML Engineer");
        assert!(approx(ranked[0].composite, 1.0));
        assert_eq!(ranked[1].job_title, "Data Analyst");
        assert!(approx(ranked[1].composite, 0.0));
    }

    #[test]
    fn constant_metric_scores_neutral() {
        let rows = vec![posting("A", 10.0, &[]), posting("B", 20.0, &[])];
        let ranked = rank_jobs(&rows, &Weights::default()).unwrap();
        assert!(ranked.iter().all(|r| r.demand_score == 0.5 && r.remote_score == 0.5));
        assert_eq!(ranked[0].job_title, "B");
        assert!(approx(ranked[0].composite, 0.5 + 0.15 + 0.1));
    }

    #[test]
    fn ties_break_on_title() {
        let rows = vec![posting("Zeta", 10.0, &[]), posting("Alpha", 10.0, &[])];
        let ranked = rank_jobs(&rows, &Weights::default()).unwrap();
        let titles: Vec<&str> = ranked.iter().map(|r| r.job_title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn empty_input_ranks_nothing() {
        let rows: Vec<JobPosting> = Vec::new();
        assert!(rank_jobs(&rows, &Weights::default()).unwrap().is_empty());
    }
}
