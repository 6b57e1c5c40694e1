use serde::{Deserialize, Serialize};

use super::aggregate::{AggregateQuery, Metric};
use super::normalize::{mean, median};
use crate::data::model::{Dimension, JobPosting};

// ---------------------------------------------------------------------------
// Quadrant – demand/salary bucket of a skill
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// High demand, high salary.
    CoreSkill,
    /// Low demand, high salary.
    HiddenGem,
    /// High demand, low salary.
    Commoditized,
    /// Low demand, low salary.
    Niche,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::CoreSkill,
        Quadrant::HiddenGem,
        Quadrant::Commoditized,
        Quadrant::Niche,
    ];

    /// Bucket a (frequency, salary) point. A value equal to its threshold
    /// counts as high.
    pub fn classify(
        frequency: f64,
        salary: f64,
        frequency_threshold: f64,
        salary_threshold: f64,
    ) -> Self {
        match (frequency >= frequency_threshold, salary >= salary_threshold) {
            (true, true) => Quadrant::CoreSkill,
            (false, true) => Quadrant::HiddenGem,
            (true, false) => Quadrant::Commoditized,
            (false, false) => Quadrant::Niche,
        }
    }
}

/// Reference statistic the quadrant boundaries are taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    #[default]
    Median,
    Mean,
}

impl Threshold {
    fn of(self, values: &[f64]) -> Option<f64> {
        match self {
            Threshold::Median => median(values),
            Threshold::Mean => mean(values),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillOptions {
    /// Skills listed by fewer postings are left out before the thresholds
    /// are computed.
    pub min_postings: usize,
    pub threshold: Threshold,
}

impl Default for SkillOptions {
    fn default() -> Self {
        Self {
            min_postings: 1,
            threshold: Threshold::Median,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillQuadrant {
    pub skill: String,
    /// Number of postings listing the skill.
    pub frequency: usize,
    /// Mean salary of the postings listing the skill.
    pub avg_salary: f64,
    pub quadrant: Quadrant,
}

/// Classified skills together with the boundaries used, so a chart can draw
/// the dividing lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillLandscape {
    /// `None` only when no skill survived the `min_postings` cut.
    pub frequency_threshold: Option<f64>,
    pub salary_threshold: Option<f64>,
    /// Frequency descending, ties by skill.
    pub skills: Vec<SkillQuadrant>,
}

impl SkillLandscape {
    /// The `n` best paid skills (ties by skill).
    pub fn top_by_salary(&self, n: usize) -> Vec<&SkillQuadrant> {
        let mut ranked: Vec<&SkillQuadrant> = self.skills.iter().collect();
        ranked.sort_by(|a, b| {
            b.avg_salary
                .total_cmp(&a.avg_salary)
                .then_with(|| a.skill.cmp(&b.skill))
        });
        ranked.truncate(n);
        ranked
    }

    /// The `n` most demanded skills.
    pub fn top_by_demand(&self, n: usize) -> Vec<&SkillQuadrant> {
        self.skills.iter().take(n).collect()
    }

    /// The `n` skills with the highest `salary / max salary + frequency /
    /// max frequency` (ties by skill), i.e. the ones worth labelling on a
    /// crowded scatter plot.
    pub fn top_by_score(&self, n: usize) -> Vec<&SkillQuadrant> {
        let max_salary = self.skills.iter().map(|s| s.avg_salary).fold(0.0, f64::max);
        let max_frequency = self.skills.iter().map(|s| s.frequency).max().unwrap_or(0);
        let score = |s: &SkillQuadrant| {
            let salary = if max_salary > 0.0 { s.avg_salary / max_salary } else { 0.0 };
            let demand = if max_frequency > 0 {
                s.frequency as f64 / max_frequency as f64
            } else {
                0.0
            };
            salary + demand
        };

        let mut ranked: Vec<&SkillQuadrant> = self.skills.iter().collect();
        ranked.sort_by(|a, b| {
            score(b)
                .total_cmp(&score(a))
                .then_with(|| a.skill.cmp(&b.skill))
        });
        ranked.truncate(n);
        ranked
    }

    pub fn in_quadrant(&self, quadrant: Quadrant) -> impl Iterator<Item = &SkillQuadrant> {
        self.skills.iter().filter(move |s| s.quadrant == quadrant)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify every skill with median thresholds and no minimum support.
pub fn classify_skills<'a, I>(rows: I) -> Vec<SkillQuadrant>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    skill_landscape(rows, &SkillOptions::default()).skills
}

/// Explode postings into skill occurrences, summarise each skill and bucket
/// it against the thresholds of the surviving population.
///
/// A posting listing several skills counts once toward each of them and
/// its full salary is attributed to each. Every surviving skill lands in
/// exactly one quadrant.
pub fn skill_landscape<'a, I>(rows: I, options: &SkillOptions) -> SkillLandscape
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    // Grouping by skill alone never fails.
    let groups = AggregateQuery::new([Dimension::Skill])
        .metrics([Metric::MeanSalary])
        .run(rows)
        .unwrap_or_default();

    let stats: Vec<(String, usize, f64)> = groups
        .into_iter()
        .filter(|g| g.count >= options.min_postings)
        .filter_map(|g| {
            let salary = g.mean_salary()?;
            let skill = g.key.into_iter().next()?;
            Some((skill, g.count, salary))
        })
        .collect();

    let frequencies: Vec<f64> = stats.iter().map(|(_, f, _)| *f as f64).collect();
    let salaries: Vec<f64> = stats.iter().map(|(_, _, s)| *s).collect();
    let (Some(frequency_threshold), Some(salary_threshold)) = (
        options.threshold.of(&frequencies),
        options.threshold.of(&salaries),
    ) else {
        return SkillLandscape::default();
    };

    let skills = stats
        .into_iter()
        .map(|(skill, frequency, avg_salary)| SkillQuadrant {
            quadrant: Quadrant::classify(
                frequency as f64,
                avg_salary,
                frequency_threshold,
                salary_threshold,
            ),
            skill,
            frequency,
            avg_salary,
        })
        .collect();

    SkillLandscape {
        frequency_threshold: Some(frequency_threshold),
        salary_threshold: Some(salary_threshold),
        skills,
    }
}
