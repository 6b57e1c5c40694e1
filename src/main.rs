mod cli;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;

use ai_job_insights::analysis::dashboard::{
    combined_activity, country_counts, country_roles, global_max_count, location_split,
    lucrative_roles, pay_ladder, top_roles,
};
use ai_job_insights::analysis::salary::{
    median_salary_by_country, salary_distribution, SalaryOptions,
};
use ai_job_insights::analysis::{
    compare_jobs, rank_jobs, skill_landscape, AggregateQuery, ComparisonMetric, Metric,
    SkillOptions, SortOrder, Weights,
};
use ai_job_insights::data::loader::load_file;
use ai_job_insights::data::model::Dimension;
use ai_job_insights::state::DashboardState;

use crate::cli::{Cli, Command};

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{}", error_message(&e));
        std::process::exit(1);
    }
}

/// One line for a fatal error, with its context chain.
fn error_message(e: &anyhow::Error) -> String {
    format!("error: {e:#}")
}

fn run(cli: &Cli) -> Result<()> {
    let dataset = load_file(&cli.file)
        .with_context(|| format!("loading {}", cli.file.display()))?;

    let mut state = DashboardState::new(Arc::new(dataset));
    for (dim, values) in cli.filters.selections() {
        state.select_only(dim, values);
    }
    let rows = state.visible_rows();
    log::info!("{} postings pass the filters", rows.len());
    if rows.is_empty() {
        log::warn!("no data for this selection");
    }

    match &cli.command {
        Command::Summary => {
            let distinct: BTreeMap<Dimension, usize> = state
                .dataset
                .iter()
                .flat_map(|ds| ds.unique_values.iter().map(|(dim, vals)| (*dim, vals.len())))
                .collect();
            emit(cli, &json!({
                "postings": state.dataset.as_ref().map_or(0, |ds| ds.len()),
                "visible": rows.len(),
                "distinct_values": distinct,
            }))
        }

        Command::Aggregate {
            by,
            metrics,
            sort_by,
            top,
        } => {
            let group_by: Vec<Dimension> = by.iter().map(|&d| d.into()).collect();
            let metrics: Vec<Metric> = metrics.iter().map(|&m| m.into()).collect();
            let mut query = AggregateQuery::new(group_by).metrics(metrics);
            if let Some(metric) = sort_by {
                query = query.order(SortOrder::Metric((*metric).into()));
            }
            if let Some(n) = top {
                query = query.limit(*n);
            }
            emit(cli, &query.run(rows.iter().copied())?)
        }

        Command::Skills {
            min_postings,
            threshold,
            top,
            labels,
        } => {
            let options = SkillOptions {
                min_postings: *min_postings,
                threshold: (*threshold).into(),
            };
            let landscape = skill_landscape(rows.iter().copied(), &options);
            emit(cli, &json!({
                "landscape": &landscape,
                "top_salaries": landscape.top_by_salary(*top),
                "highest_demand": landscape.top_by_demand(*top),
                "labelled": landscape.top_by_score(*labels),
            }))
        }

        Command::Rank {
            salary,
            demand,
            remote,
            top,
        } => {
            let weights = Weights::new(*salary, *demand, *remote)?;
            let mut ranked = rank_jobs(rows.iter().copied(), &weights)?;
            if let Some(n) = top {
                ranked.truncate(*n);
            }
            emit(cli, &ranked)
        }

        Command::Compare { metrics } => {
            let metrics: Vec<ComparisonMetric> = if metrics.is_empty() {
                vec![ComparisonMetric::AverageSalary, ComparisonMetric::JobCount]
            } else {
                metrics.iter().map(|&m| m.into()).collect()
            };
            emit(cli, &compare_jobs(rows.iter().copied(), &metrics)?)
        }

        Command::Countries { by, top } => emit(cli, &json!({
            "countries": country_counts(rows.iter().copied(), (*by).into()),
            "max_count": global_max_count(&rows),
            "country_roles": country_roles(rows.iter().copied()),
            "combined_activity": combined_activity(rows.iter().copied(), *top),
            "location_split": location_split(rows.iter().copied()),
        })),

        Command::Roles { top, per_level } => emit(cli, &json!({
            "top_roles": top_roles(rows.iter().copied(), *top),
            "lucrative_roles": lucrative_roles(rows.iter().copied(), *per_level),
            "pay_ladder": pay_ladder(rows.iter().copied()),
        })),

        Command::Salaries {
            min_postings,
            top,
            for_title,
            countries,
        } => {
            let options = SalaryOptions {
                min_postings: *min_postings,
                top_n: *top,
            };
            let by_country = for_title
                .as_deref()
                .map(|title| median_salary_by_country(rows.iter().copied(), title, *countries));
            emit(cli, &json!({
                "distribution": salary_distribution(rows.iter().copied(), &options),
                "by_country": by_country,
            }))
        }
    }
}

/// Write one analysis result to stdout as JSON.
fn emit<T: Serialize + ?Sized>(cli: &Cli, value: &T) -> Result<()> {
    let text = if cli.compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_carries_the_context_chain_once() {
        let err = anyhow::anyhow!("Row 3: missing 'job_title'").context("loading jobs.csv");
        let msg = error_message(&err);
        assert_eq!(msg, "error: loading jobs.csv: Row 3: missing 'job_title'");
        assert_eq!(msg.matches("missing").count(), 1);
    }
}
