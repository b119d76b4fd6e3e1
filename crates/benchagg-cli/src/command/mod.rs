use benchagg_analysis::{record::FieldPath, report::Keys};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{compare::CompareArg, summarize::SummarizeArg};

mod compare;
mod summarize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Summarize one results file per template
    Summarize(#[clap(flatten)] SummarizeArg),
    /// Compare mean times and result counts across results files
    Compare(#[clap(flatten)] CompareArg),
    /// Compare mean times across results files over runs that succeeded in all of them
    CompareCompleted(#[clap(flatten)] CompareArg),
}

/// Where the grouping keys are found in each run
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct KeyArg {
    /// Dotted path of the template key
    #[arg(long, default_value = "sequenceElement.template")]
    template_key: FieldPath,
    /// Dotted path of the sequence key
    #[arg(long, default_value = "name")]
    sequence_key: FieldPath,
}

impl KeyArg {
    pub(crate) fn keys(&self) -> Keys {
        Keys {
            template: self.template_key.clone(),
            sequence: self.sequence_key.clone(),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Summarize(arg) => summarize::run(&arg)?,
        Mode::Compare(arg) => compare::run(&arg)?,
        Mode::CompareCompleted(arg) => compare::run_completed(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let args = CommandArgs::try_parse_from(["benchagg", "summarize", "results.json"]).unwrap();
        let Mode::Summarize(arg) = args.mode else {
            panic!("expected summarize");
        };
        assert_eq!(arg.keys.keys(), Keys::default());
    }

    #[test]
    fn test_custom_keys_and_verbosity() {
        let args = CommandArgs::try_parse_from([
            "benchagg",
            "-vv",
            "compare",
            "a.json",
            "b.json",
            "--template-key",
            "query.id",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        let Mode::Compare(arg) = args.mode else {
            panic!("expected compare");
        };
        assert_eq!(arg.keys.keys().template, FieldPath::new(["query", "id"]));
    }

    #[test]
    fn test_json_flag() {
        let args =
            CommandArgs::try_parse_from(["benchagg", "summarize", "results.json", "--json"]).unwrap();
        let Mode::Summarize(arg) = args.mode else {
            panic!("expected summarize");
        };
        assert!(arg.json);
        assert!(arg.output.is_none());
    }

    #[test]
    fn test_compare_requires_files() {
        assert!(CommandArgs::try_parse_from(["benchagg", "compare-completed"]).is_err());
    }
}
