//! Cross-file comparison charts

use std::path::PathBuf;

use anyhow::Context;
use benchagg_analysis::{
    group::group_records,
    record::Record,
    report::{completed_run_means, overall_means},
};
use clap::Args;

use crate::{
    chart::{ChartSeries, ComparisonChart},
    command::KeyArg,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    /// Paths to the benchmark results JSON files
    #[arg(required = true)]
    results: Vec<PathBuf>,
    /// Series label of each results file (comma-separated, defaults to file names)
    #[arg(long, value_delimiter = ',')]
    labels: Vec<String>,
    #[clap(flatten)]
    pub(crate) keys: KeyArg,
    /// Print the chart dataset as JSON instead of tables (to `--output` if given)
    #[arg(long)]
    json: bool,
    /// Save the chart dataset as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_all(arg: &CompareArg) -> anyhow::Result<(Vec<String>, Vec<Vec<Record>>)> {
    let labels = util::series_labels(&arg.results, &arg.labels)?;
    let experiments = arg
        .results
        .iter()
        .map(util::read_results_file)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok((labels, experiments))
}

fn finish(chart: &ComparisonChart, arg: &CompareArg) -> anyhow::Result<()> {
    if arg.json {
        return Output::save_json(&chart.dataset(), arg.output.clone());
    }
    chart.print();
    if let Some(output) = &arg.output {
        Output::save_json(&chart.dataset(), Some(output.clone()))?;
    }
    Ok(())
}

/// Mean time against mean result count, over every run of each file.
pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    let (labels, experiments) = load_all(arg)?;
    let template_path = arg.keys.keys().template;

    let mut series = Vec::with_capacity(experiments.len());
    for ((name, records), path) in labels.into_iter().zip(&experiments).zip(&arg.results) {
        let groups = group_records(records, &template_path)
            .with_context(|| format!("Failed to group {}", path.display()))?;
        let means = overall_means(&groups)
            .with_context(|| format!("Failed to compute mean times of {}", path.display()))?;
        series.push(ChartSeries {
            name,
            primary: means.time,
            secondary: means.results,
        });
    }

    let chart = ComparisonChart::new("Mean execution time (ms)", "Mean result count", series);
    finish(&chart, arg)
}

/// Mean time against error count, over the runs that succeeded in every file.
pub(crate) fn run_completed(arg: &CompareArg) -> anyhow::Result<()> {
    let (labels, experiments) = load_all(arg)?;
    let template_path = arg.keys.keys().template;

    let comparison = completed_run_means(&experiments, &template_path)
        .context("Failed to compare completed runs across results files")?;
    let excluded = comparison.mask.values().flatten().filter(|e| **e).count();
    tracing::info!(excluded, "runs failed in at least one file");

    let series = labels
        .into_iter()
        .zip(comparison.mean_time)
        .zip(comparison.error_count)
        .map(|((name, primary), secondary)| ChartSeries {
            name,
            primary,
            secondary,
        })
        .collect();

    let chart = ComparisonChart::new(
        "Mean execution time of completed runs (ms)",
        "Errors",
        series,
    );
    finish(&chart, arg)
}
