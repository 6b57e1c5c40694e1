//! Command line arguments for the analysis driver.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ai_job_insights::analysis::dashboard::LocationField;
use ai_job_insights::analysis::skills::Threshold;
use ai_job_insights::analysis::{ComparisonMetric, Metric};
use ai_job_insights::data::model::{Dimension, ExperienceLevel, UnknownExperienceLevel};

#[derive(Parser)]
#[command(
    name = "ai-job-insights",
    version,
    about = "Aggregate, classify and rank AI job postings",
    long_about = "Load a job posting dataset (.csv, .json or .parquet), apply filters \
                  and print one analysis as JSON.\n\n\
                  Set RUST_LOG=info (or debug) for progress messages on stderr."
)]
pub struct Cli {
    /// Dataset file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Print JSON on a single line.
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Row filters, applied before every analysis. Repeat a flag to select
/// several values (e.g. a country pair).
#[derive(Args, Default)]
pub struct FilterArgs {
    #[arg(long = "company-location", value_name = "COUNTRY", global = true)]
    pub company_location: Vec<String>,

    #[arg(long = "residence", value_name = "COUNTRY", global = true)]
    pub employee_residence: Vec<String>,

    /// EN, MI, SE, EX (or Entry, Mid, Senior, Executive).
    #[arg(long = "experience", value_name = "LEVEL", value_parser = parse_level, global = true)]
    pub experience: Vec<ExperienceLevel>,

    #[arg(long = "title", value_name = "JOB_TITLE", global = true)]
    pub job_title: Vec<String>,

    #[arg(long = "employment-type", value_name = "TYPE", global = true)]
    pub employment_type: Vec<String>,

    #[arg(long = "skill", value_name = "SKILL", global = true)]
    pub skill: Vec<String>,
}

impl FilterArgs {
    /// Non-empty selections as (dimension, values) pairs.
    pub fn selections(&self) -> Vec<(Dimension, Vec<String>)> {
        let levels: Vec<String> = self.experience.iter().map(|l| l.code().to_string()).collect();
        [
            (Dimension::CompanyLocation, self.company_location.clone()),
            (Dimension::EmployeeResidence, self.employee_residence.clone()),
            (Dimension::ExperienceLevel, levels),
            (Dimension::JobTitle, self.job_title.clone()),
            (Dimension::EmploymentType, self.employment_type.clone()),
            (Dimension::Skill, self.skill.clone()),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .collect()
    }
}

fn parse_level(s: &str) -> Result<ExperienceLevel, UnknownExperienceLevel> {
    s.parse()
}

#[derive(Subcommand)]
pub enum Command {
    /// Row counts and distinct values per dimension.
    Summary,

    /// Group rows by one or more dimensions.
    Aggregate {
        /// Grouping dimension (repeatable).
        #[arg(long = "by", value_enum, required = true)]
        by: Vec<DimensionArg>,

        /// Metric to compute per group (repeatable).
        #[arg(long = "metric", value_enum)]
        metrics: Vec<MetricArg>,

        /// Order by this metric instead of by count.
        #[arg(long = "sort-by", value_enum)]
        sort_by: Option<MetricArg>,

        /// Keep only the first N groups.
        #[arg(long)]
        top: Option<usize>,
    },

    /// Demand vs. salary quadrants of skills.
    Skills {
        /// Ignore skills listed by fewer postings.
        #[arg(long = "min-postings", default_value_t = 10)]
        min_postings: usize,

        #[arg(long, value_enum, default_value = "median")]
        threshold: ThresholdArg,

        /// Size of the top salary / top demand lists.
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// How many skills to label, by combined salary and demand score.
        #[arg(long, default_value_t = 30)]
        labels: usize,
    },

    /// Rank job titles by weighted salary, demand and remote scores.
    Rank {
        #[arg(long, default_value_t = 0.5)]
        salary: f64,

        #[arg(long, default_value_t = 0.3)]
        demand: f64,

        #[arg(long, default_value_t = 0.2)]
        remote: f64,

        #[arg(long)]
        top: Option<usize>,
    },

    /// Normalized side-by-side comparison of job titles.
    Compare {
        /// Metric to compare (repeatable; default: average-salary and job-count).
        #[arg(long = "metric", value_enum)]
        metrics: Vec<ComparisonArg>,
    },

    /// Postings per country, country roles, combined activity and the
    /// domestic/international split.
    Countries {
        #[arg(long, value_enum, default_value = "company")]
        by: LocationArg,

        /// Size of the combined activity list.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Most common roles, best paid roles per level and the pay ladder.
    Roles {
        #[arg(long, default_value_t = 5)]
        top: usize,

        #[arg(long = "per-level", default_value_t = 10)]
        per_level: usize,
    },

    /// Salary distribution per job title, optionally by country for one title.
    Salaries {
        #[arg(long = "min-postings", default_value_t = 5)]
        min_postings: usize,

        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Also break this title down by country and experience level.
        #[arg(long = "for-title", value_name = "JOB_TITLE")]
        for_title: Option<String>,

        #[arg(long = "countries", default_value_t = 10)]
        countries: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DimensionArg {
    Title,
    Company,
    Residence,
    Experience,
    EmploymentType,
    Skill,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Title => Dimension::JobTitle,
            DimensionArg::Company => Dimension::CompanyLocation,
            DimensionArg::Residence => Dimension::EmployeeResidence,
            DimensionArg::Experience => Dimension::ExperienceLevel,
            DimensionArg::EmploymentType => Dimension::EmploymentType,
            DimensionArg::Skill => Dimension::Skill,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricArg {
    MeanSalary,
    MedianSalary,
    MeanRemote,
    MeanYears,
    MeanBenefits,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::MeanSalary => Metric::MeanSalary,
            MetricArg::MedianSalary => Metric::MedianSalary,
            MetricArg::MeanRemote => Metric::MeanRemoteRatio,
            MetricArg::MeanYears => Metric::MeanYearsExperience,
            MetricArg::MeanBenefits => Metric::MeanBenefitsScore,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThresholdArg {
    Median,
    Mean,
}

impl From<ThresholdArg> for Threshold {
    fn from(arg: ThresholdArg) -> Self {
        match arg {
            ThresholdArg::Median => Threshold::Median,
            ThresholdArg::Mean => Threshold::Mean,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ComparisonArg {
    AverageSalary,
    JobCount,
    YearsExperience,
    BenefitsScore,
    RemoteRatio,
}

impl From<ComparisonArg> for ComparisonMetric {
    fn from(arg: ComparisonArg) -> Self {
        match arg {
            ComparisonArg::AverageSalary => ComparisonMetric::AverageSalary,
            ComparisonArg::JobCount => ComparisonMetric::JobCount,
            ComparisonArg::YearsExperience => ComparisonMetric::YearsExperience,
            ComparisonArg::BenefitsScore => ComparisonMetric::BenefitsScore,
            ComparisonArg::RemoteRatio => ComparisonMetric::RemoteRatio,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LocationArg {
    Company,
    Residence,
}

impl From<LocationArg> for LocationField {
    fn from(arg: LocationArg) -> Self {
        match arg {
            LocationArg::Company => LocationField::CompanyLocation,
            LocationArg::Residence => LocationField::EmployeeResidence,
        }
    }
}
