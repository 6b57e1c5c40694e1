//! Views behind the geographic landing page: postings per country, the
//! most common roles, where talent comes from, the best paid roles per
//! seniority and the salary ladder over years of experience.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::aggregate::{AggregateQuery, AggregateRow, Metric, SortOrder};
use super::normalize::mean;
use crate::data::model::{Dimension, ExperienceLevel, JobPosting};

/// Which country column a map is drawn from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationField {
    #[default]
    CompanyLocation,
    EmployeeResidence,
}

impl From<LocationField> for Dimension {
    fn from(field: LocationField) -> Self {
        match field {
            LocationField::CompanyLocation => Dimension::CompanyLocation,
            LocationField::EmployeeResidence => Dimension::EmployeeResidence,
        }
    }
}

/// Postings per country, most postings first.
pub fn country_counts<'a, I>(rows: I, field: LocationField) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    AggregateQuery::new([Dimension::from(field)])
        .metrics([Metric::MeanSalary])
        .run(rows)
        .unwrap_or_default()
}

/// Largest per-country posting count over both location columns. Keeps the
/// colour scale fixed when the map switches between them.
pub fn global_max_count(rows: &[&JobPosting]) -> usize {
    [LocationField::CompanyLocation, LocationField::EmployeeResidence]
        .into_iter()
        .filter_map(|field| country_counts(rows.iter().copied(), field).first().map(|r| r.count))
        .max()
        .unwrap_or(0)
}

/// Which location columns a country shows up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryRole {
    /// Only as an employee residence.
    EmployeesOnly,
    /// Only as a company location.
    CompaniesOnly,
    /// As both.
    Both,
}

/// Every country in either location column with its role, sorted by name.
pub fn country_roles<'a, I>(rows: I) -> Vec<(String, CountryRole)>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let mut seen: BTreeMap<&str, (bool, bool)> = BTreeMap::new();
    for row in rows {
        seen.entry(row.employee_residence.as_str()).or_default().0 = true;
        seen.entry(row.company_location.as_str()).or_default().1 = true;
    }
    seen.into_iter()
        .map(|(country, (employees, companies))| {
            let role = match (employees, companies) {
                (true, true) => CountryRole::Both,
                (true, false) => CountryRole::EmployeesOnly,
                _ => CountryRole::CompaniesOnly,
            };
            (country.to_string(), role)
        })
        .collect()
}

/// Postings touching a country as employee residence plus as company
/// location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryActivity {
    pub country: String,
    pub employees: usize,
    pub companies: usize,
    pub total: usize,
}

/// The `n` countries with the most combined activity, ties by name. A
/// domestic posting counts once on each side.
pub fn combined_activity<'a, I>(rows: I, n: usize) -> Vec<CountryActivity>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in rows {
        counts.entry(row.employee_residence.as_str()).or_default().0 += 1;
        counts.entry(row.company_location.as_str()).or_default().1 += 1;
    }
    let mut out: Vec<CountryActivity> = counts
        .into_iter()
        .map(|(country, (employees, companies))| CountryActivity {
            country: country.to_string(),
            employees,
            companies,
            total: employees + companies,
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.country.cmp(&b.country)));
    out.truncate(n);
    out
}

/// The `n` most frequent job titles.
pub fn top_roles<'a, I>(rows: I, n: usize) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    AggregateQuery::new([Dimension::JobTitle])
        .limit(n)
        .run(rows)
        .unwrap_or_default()
}

/// Domestic (employee resides in the company's country) vs international
/// hires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LocationSplit {
    pub domestic: usize,
    pub international: usize,
    /// Percentage of domestic postings; undefined for zero rows.
    pub domestic_share: Option<f64>,
}

pub fn location_split<'a, I>(rows: I) -> LocationSplit
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let mut split = LocationSplit::default();
    for row in rows {
        if row.is_same_location() {
            split.domestic += 1;
        } else {
            split.international += 1;
        }
    }
    let total = split.domestic + split.international;
    if total > 0 {
        split.domestic_share = Some(split.domestic as f64 / total as f64 * 100.0);
    }
    split
}

/// Per experience level (EN, MI, SE, EX), the `per_level` job titles with
/// the highest mean salary. Keys are `[level, title]`.
pub fn lucrative_roles<'a, I>(rows: I, per_level: usize) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let groups = AggregateQuery::new([Dimension::ExperienceLevel, Dimension::JobTitle])
        .order(SortOrder::Metric(Metric::MeanSalary))
        .run(rows)
        .unwrap_or_default();

    let mut by_level: BTreeMap<ExperienceLevel, Vec<AggregateRow>> = BTreeMap::new();
    for group in groups {
        let Some(level) = group.key.first().and_then(|code| code.parse().ok()) else {
            continue;
        };
        let bucket = by_level.entry(level).or_default();
        if bucket.len() < per_level {
            bucket.push(group);
        }
    }
    by_level.into_values().flatten().collect()
}

/// Mean salary at one whole number of years of experience.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LadderStep {
    pub years: i64,
    pub postings: usize,
    pub mean_salary: f64,
}

/// Mean salary per (rounded) year of experience, ascending. Rows without a
/// years-of-experience value are skipped.
pub fn pay_ladder<'a, I>(rows: I) -> Vec<LadderStep>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let mut steps: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(years) = row.years_experience {
            steps.entry(years.round() as i64).or_default().push(row.salary_usd);
        }
    }
    steps
        .into_iter()
        .filter_map(|(years, salaries)| {
            Some(LadderStep {
                years,
                postings: salaries.len(),
                mean_salary: mean(&salaries)?,
            })
        })
        .collect()
}
