use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ExperienceLevel – the seniority bucket of a posting
// ---------------------------------------------------------------------------

/// Seniority of a posting. Ordered from junior to senior so that
/// `BTreeMap<ExperienceLevel, _>` iterates in ladder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "EN")]
    Entry,
    #[serde(rename = "MI")]
    Mid,
    #[serde(rename = "SE")]
    Senior,
    #[serde(rename = "EX")]
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Executive,
    ];

    /// Two-letter code used in the source datasets.
    pub fn code(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "EN",
            ExperienceLevel::Mid => "MI",
            ExperienceLevel::Senior => "SE",
            ExperienceLevel::Executive => "EX",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when an experience level cell is neither a known code nor a
/// known long name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown experience level '{0}' (expected EN, MI, SE or EX)")]
pub struct UnknownExperienceLevel(pub String);

impl FromStr for ExperienceLevel {
    type Err = UnknownExperienceLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "entry" | "entry-level" | "junior" => Ok(ExperienceLevel::Entry),
            "mi" | "mid" | "mid-level" | "intermediate" => Ok(ExperienceLevel::Mid),
            "se" | "senior" | "senior-level" => Ok(ExperienceLevel::Senior),
            "ex" | "executive" | "executive-level" | "director" => Ok(ExperienceLevel::Executive),
            _ => Err(UnknownExperienceLevel(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// JobPosting – one row of the dataset
// ---------------------------------------------------------------------------

/// A single job posting (one row of the source table). Never mutated after
/// the dataset is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: Option<String>,
    pub job_title: String,
    /// Yearly salary in USD, finite and non-negative.
    pub salary_usd: f64,
    pub experience_level: ExperienceLevel,
    pub employment_type: Option<String>,
    pub company_location: String,
    pub employee_residence: String,
    /// Share of remote work in percent (0, 50, 100 in the usual datasets).
    pub remote_ratio: Option<f64>,
    /// Tokenized skill list, see [`super::skills::tokenize_skills`].
    pub required_skills: Vec<String>,
    pub years_experience: Option<f64>,
    pub benefits_score: Option<f64>,
}

impl JobPosting {
    /// Whether the employee lives in the country the company is located in.
    pub fn is_same_location(&self) -> bool {
        self.company_location == self.employee_residence
    }

    /// Values this posting takes for a categorical dimension. Single-valued
    /// dimensions yield at most one value; [`Dimension::Skill`] yields one per
    /// listed skill.
    pub fn values(&self, dim: Dimension) -> Vec<&str> {
        match dim {
            Dimension::JobTitle => vec![self.job_title.as_str()],
            Dimension::CompanyLocation => vec![self.company_location.as_str()],
            Dimension::EmployeeResidence => vec![self.employee_residence.as_str()],
            Dimension::ExperienceLevel => vec![self.experience_level.code()],
            Dimension::EmploymentType => self.employment_type.as_deref().into_iter().collect(),
            Dimension::Skill => self.required_skills.iter().map(String::as_str).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dimension – a categorical column rows can be grouped or filtered by
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    JobTitle,
    CompanyLocation,
    EmployeeResidence,
    ExperienceLevel,
    EmploymentType,
    Skill,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::JobTitle,
        Dimension::CompanyLocation,
        Dimension::EmployeeResidence,
        Dimension::ExperienceLevel,
        Dimension::EmploymentType,
        Dimension::Skill,
    ];

    /// Column name in the source file.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::JobTitle => "job_title",
            Dimension::CompanyLocation => "company_location",
            Dimension::EmployeeResidence => "employee_residence",
            Dimension::ExperienceLevel => "experience_level",
            Dimension::EmploymentType => "employment_type",
            Dimension::Skill => "required_skills",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// JobDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct values per dimension.
#[derive(Debug, Clone, Default)]
pub struct JobDataset {
    /// All postings (rows), in file order.
    pub postings: Vec<JobPosting>,
    /// For each dimension the sorted set of distinct values.
    pub unique_values: BTreeMap<Dimension, BTreeSet<String>>,
}

impl JobDataset {
    /// Build the dataset, unifying skill spellings and indexing distinct
    /// values.
    ///
    /// Skills are compared case-insensitively across the whole table; every
    /// variant is rewritten to the first spelling seen in file order.
    pub fn from_postings(mut postings: Vec<JobPosting>) -> Self {
        let mut spelling: BTreeMap<String, String> = BTreeMap::new();
        for posting in &mut postings {
            let mut seen = BTreeSet::new();
            let skills = std::mem::take(&mut posting.required_skills);
            for skill in skills {
                let canonical = spelling
                    .entry(skill.to_lowercase())
                    .or_insert(skill)
                    .clone();
                if seen.insert(canonical.clone()) {
                    posting.required_skills.push(canonical);
                }
            }
        }

        let mut unique_values: BTreeMap<Dimension, BTreeSet<String>> = BTreeMap::new();
        for posting in &postings {
            for dim in Dimension::ALL {
                for value in posting.values(dim) {
                    unique_values
                        .entry(dim)
                        .or_default()
                        .insert(value.to_string());
                }
            }
        }

        JobDataset {
            postings,
            unique_values,
        }
    }

    /// Number of postings.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Distinct values of one dimension, sorted.
    pub fn distinct(&self, dim: Dimension) -> impl Iterator<Item = &str> {
        self.unique_values
            .get(&dim)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal posting builder for tests.
    pub fn posting(title: &str, salary: f64, skills: &[&str]) -> JobPosting {
        JobPosting {
            job_id: None,
            job_title: title.to_string(),
            salary_usd: salary,
            experience_level: ExperienceLevel::Mid,
            employment_type: Some("FT".to_string()),
            company_location: "United States".to_string(),
            employee_residence: "United States".to_string(),
            remote_ratio: Some(0.0),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            years_experience: None,
            benefits_score: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::posting;
    use super::*;

    #[test]
    fn experience_level_accepts_codes_and_names() {
        assert_eq!("EN".parse::<ExperienceLevel>(), Ok(ExperienceLevel::Entry));
        assert_eq!(" senior ".parse::<ExperienceLevel>(), Ok(ExperienceLevel::Senior));
        assert_eq!("Executive".parse::<ExperienceLevel>(), Ok(ExperienceLevel::Executive));
        assert!("intern".parse::<ExperienceLevel>().is_err());
    }

    #[test]
    fn skill_spelling_is_unified_across_rows() {
        let ds = JobDataset::from_postings(vec![
            posting("A", 1.0, &["Python", "SQL"]),
            posting("B", 2.0, &["python", "sql", "SQL"]),
        ]);
        assert_eq!(ds.postings[1].required_skills, vec!["Python", "SQL"]);
        let skills: Vec<&str> = ds.distinct(Dimension::Skill).collect();
        assert_eq!(skills, vec!["Python", "SQL"]);
    }

    #[test]
    fn unique_values_cover_every_dimension_present() {
        let mut p = posting("ML Engineer", 1.0, &[]);
        p.employment_type = None;
        let ds = JobDataset::from_postings(vec![p]);
        assert!(ds.unique_values.get(&Dimension::EmploymentType).is_none());
        assert!(ds.unique_values.get(&Dimension::Skill).is_none());
        assert_eq!(
            ds.distinct(Dimension::ExperienceLevel).collect::<Vec<_>>(),
            vec!["MI"]
        );
    }

    #[test]
    fn same_location_compares_countries() {
        let mut p = posting("A", 1.0, &[]);
        assert!(p.is_same_location());
        p.employee_residence = "Germany".to_string();
        assert!(!p.is_same_location());
    }
}
