//! Per-template summary of one results file

use std::path::PathBuf;

use anyhow::Context;
use benchagg_analysis::{
    group::{GroupMap, group_projected},
    record::{FieldPath, Record, fields},
    reducer::Summary,
    report::{ExperimentReport, ReportOptions},
};
use benchagg_stats::descriptive::DescriptiveStats;
use clap::Args;

use crate::{
    command::KeyArg,
    util::{self, Output},
};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Args)]
pub(crate) struct SummarizeArg {
    /// Path to the benchmark results JSON file
    results: PathBuf,
    #[clap(flatten)]
    pub(crate) keys: KeyArg,
    /// Skip geometric means (needed when some timings are zero)
    #[arg(long)]
    no_geometric: bool,
    /// Leave failed runs out of the geometric means
    #[arg(long)]
    geometric_exclude_errors: bool,
    /// Skip the positional deviation analysis
    #[arg(long)]
    no_deviation: bool,
    /// Print the full report as JSON instead of tables (to `--output` if given)
    #[arg(long)]
    pub(crate) json: bool,
    /// Save the full report as JSON to this path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SummarizeArg) -> anyhow::Result<()> {
    let records = util::read_results_file(&arg.results)?;
    let options = ReportOptions {
        keys: arg.keys.keys(),
        geometric_means: !arg.no_geometric,
        geometric_exclude_errors: arg.geometric_exclude_errors,
        deviation: !arg.no_deviation,
    };
    let report = ExperimentReport::analyze(&records, &options)
        .with_context(|| format!("Failed to analyze {}", arg.results.display()))?;
    if arg.json {
        return Output::save_json(&report, arg.output.clone());
    }
    let time_stats = successful_time_stats(&records, &options.keys.template)?;

    println!("Results: {}", arg.results.display());
    println!(
        "  {} runs, {} templates, {} sequences",
        report.runs, report.templates, report.sequences
    );
    println!();
    print_template_table(&report, &time_stats);
    if let Some(deviation) = &report.deviation {
        println!();
        println!("Deviation from template mean by position:");
        println!("  {:>8} {:>8} {:>10}", "Position", "Runs", "Ratio");
        for (position, (ratios, mean)) in deviation
            .by_position
            .iter()
            .zip(&deviation.mean_by_position)
            .enumerate()
        {
            println!("  {position:>8} {:>8} {mean:>10.3}", ratios.len());
        }
    }

    if let Some(output) = &arg.output {
        Output::save_json(&report, Some(output.clone()))?;
    }
    Ok(())
}

/// Distribution of `time` over the successful runs of each template.
fn successful_time_stats(
    records: &[Record],
    template_path: &FieldPath,
) -> anyhow::Result<GroupMap<Option<DescriptiveStats>>> {
    let successful = records
        .iter()
        .filter(|r| !r.has_error() && r.get(fields::TIME).is_some())
        .cloned()
        .collect::<Vec<_>>();
    let times = group_projected(&successful, template_path, &FieldPath::new([fields::TIME]))
        .context("Failed to group successful run times")?;
    Ok(times.map_values(|_, values| {
        DescriptiveStats::new(values.iter().filter_map(serde_json::Value::as_f64))
    }))
}

fn print_template_table(report: &ExperimentReport, time_stats: &GroupMap<Option<DescriptiveStats>>) {
    println!(
        "  {:<28} {:>6} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>6} {:>9}",
        "Template",
        "Errors",
        "Error%",
        "Mean",
        "Refine",
        "NoRefine",
        "GeoMean",
        "Min",
        "Median",
        "Max",
        "StdDev",
        "CV",
        "Results"
    );
    println!("  {}", "-".repeat(28 + 7 + 8 + 11 * 8 + 7 + 10));

    for template in report.means.all.time.keys() {
        let stats = time_stats.get(template).and_then(Option::as_ref);
        let geomean = report
            .geometric_means
            .as_ref()
            .map_or(NOT_AVAILABLE.to_owned(), |g| format_value(g.all.time.get(template)));
        let cv = stats
            .and_then(DescriptiveStats::coefficient_of_variation)
            .map_or(NOT_AVAILABLE.to_owned(), |cv| format!("{cv:.2}"));
        println!(
            "  {:<28} {:>6} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>6} {:>9}",
            template.to_string(),
            format_count(report.errors.count.get(template)),
            format_percent(report.errors.proportion.get(template)),
            format_value(report.means.all.time.get(template)),
            format_value(report.means.refinement_only.time.get(template)),
            format_value(report.means.no_refinement.time.get(template)),
            geomean,
            format_stat(stats.map(|s| s.min)),
            format_stat(stats.map(|s| s.median)),
            format_stat(stats.map(|s| s.max)),
            format_stat(stats.map(|s| s.std_dev)),
            cv,
            format_value(report.results.all.get(template)),
        );
    }
}

fn format_value(summary: Option<&Summary>) -> String {
    format_stat(summary.and_then(Summary::value))
}

fn format_stat(value: Option<f64>) -> String {
    value.map_or(NOT_AVAILABLE.to_owned(), |v| format!("{v:.2}"))
}

fn format_count(summary: Option<&Summary>) -> String {
    match summary {
        Some(Summary::Count(n)) => n.to_string(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

fn format_percent(summary: Option<&Summary>) -> String {
    summary
        .and_then(Summary::value)
        .map_or(NOT_AVAILABLE.to_owned(), |p| format!("{:.1}%", p * 100.0))
}

#[cfg(test)]
mod tests {
    use benchagg_analysis::group::GroupKey;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_successful_time_stats_skips_failed_runs() {
        let records: Vec<Record> = serde_json::from_value(json!([
            {"sequenceElement": {"template": "q1"}, "time": 10.0},
            {"sequenceElement": {"template": "q1"}, "time": 30.0},
            {"sequenceElement": {"template": "q1"}, "time": 20.0},
            {"sequenceElement": {"template": "q1"}, "time": 900.0, "error": "timeout"},
            {"sequenceElement": {"template": "q2"}, "error": "crash"},
        ]))
        .unwrap();
        let stats = successful_time_stats(&records, &FieldPath::template()).unwrap();
        let q1 = stats.get(&GroupKey::from("q1")).unwrap().as_ref().unwrap();
        assert_eq!(q1.count, 3);
        assert!((q1.median - 20.0).abs() < 1e-9);
        assert!((q1.max - 30.0).abs() < 1e-9);
        assert!(!stats.contains_key(&GroupKey::from("q2")));
    }

    #[test]
    fn test_successful_time_stats_spread() {
        let records: Vec<Record> = serde_json::from_value(json!([
            {"sequenceElement": {"template": "q"}, "time": 10.0},
            {"sequenceElement": {"template": "q"}, "time": 30.0},
        ]))
        .unwrap();
        let stats = successful_time_stats(&records, &FieldPath::template()).unwrap();
        let q = stats.get(&GroupKey::from("q")).unwrap().as_ref().unwrap();
        assert!((q.std_dev - 10.0).abs() < 1e-9);
        let cv = q.coefficient_of_variation().unwrap();
        assert!((cv - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_formatting_unavailable() {
        assert_eq!(format_value(Some(&Summary::Scalar(None))), "N/A");
        assert_eq!(format_value(None), "N/A");
        assert_eq!(format_value(Some(&Summary::Scalar(Some(1.5)))), "1.50");
        assert_eq!(format_percent(Some(&Summary::Scalar(Some(0.25)))), "25.0%");
        assert_eq!(format_count(Some(&Summary::Count(3))), "3");
    }
}
