//! Command-line parsing for the population/labor-force regression tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the extraction/regression code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_END_YEAR, DEFAULT_ENTITY, DEFAULT_START_YEAR, OutputPaths, PipelineConfig};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "popreg",
    version,
    about = "Population vs labor-force regression from yearly spreadsheets"
)]
pub struct Cli {
    /// More log output (debug level).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Less log output (warnings and errors only).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract, reconcile, fit and write every report.
    Run(RunArgs),
    /// Extract and reconcile only; writes the reconciled table.
    Clean(RunArgs),
    /// Fit from a previously written reconciled table.
    Regress(RegressArgs),
    /// Plot a previously exported result JSON.
    Plot(PlotArgs),
}

/// Source workbooks and the year span to read.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Population workbook (one sheet per year, one row per district).
    #[arg(long, value_name = "PATH", default_value = "Data Penduduk - Kota Tangerang.xls")]
    pub population: PathBuf,

    /// Labor-force workbook (one sheet per year, one row per regency/city).
    #[arg(long, value_name = "PATH", default_value = "Data BPS - Jumlah Angkatan Kerja.xls")]
    pub labor: PathBuf,

    /// First year (sheet label) to read.
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Last year (sheet label) to read, inclusive.
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    pub end_year: i32,

    /// Name fragment of the labor-force row to select.
    #[arg(long, default_value = DEFAULT_ENTITY)]
    pub entity: String,

    /// Fail instead of using the built-in dataset when a source yields no values.
    #[arg(long)]
    pub no_fallback: bool,
}

/// Report destinations and terminal plot options.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Directory for the generated workbooks, chart, PDF and JSON.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Also export per-year predictions to CSV.
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `run` and `clean`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for `regress`.
#[derive(Debug, Args, Clone)]
pub struct RegressArgs {
    /// Reconciled table workbook produced by `popreg clean`.
    #[arg(long, value_name = "PATH", default_value = "data_cleansing.xlsx")]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for plotting a saved result.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Result JSON file produced by `popreg run` or `popreg regress`.
    #[arg(long, value_name = "JSON", default_value = "regression_result.json")]
    pub result: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

impl Cli {
    /// Log filter implied by `-v`/`-q`; `None` leaves `RUST_LOG` (default `info`) in charge.
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        if self.verbose {
            Some(log::LevelFilter::Debug)
        } else if self.quiet {
            Some(log::LevelFilter::Warn)
        } else {
            None
        }
    }
}

pub fn pipeline_config_from_run_args(args: &RunArgs) -> PipelineConfig {
    let mut config = config_from_output_args(&args.output);
    config.population_path = Some(args.source.population.clone());
    config.labor_path = Some(args.source.labor.clone());
    config.start_year = args.source.start_year;
    config.end_year = args.source.end_year;
    config.entity = args.source.entity.clone();
    config.fallback = !args.source.no_fallback;
    config
}

pub fn pipeline_config_from_regress_args(args: &RegressArgs) -> PipelineConfig {
    let mut config = config_from_output_args(&args.output);
    config.reconciled_path = Some(args.input.clone());
    config
}

fn config_from_output_args(args: &OutputArgs) -> PipelineConfig {
    PipelineConfig {
        outputs: OutputPaths {
            dir: args.out_dir.clone(),
        },
        export_csv: args.export_csv.clone(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        ..PipelineConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_match_documented_span() {
        let cli = Cli::parse_from(["popreg", "run"]);
        assert_eq!(cli.log_level(), None);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = pipeline_config_from_run_args(&args);
        assert_eq!(config.sheet_names(), vec!["2020", "2021", "2022", "2023", "2024"]);
        assert_eq!(config.entity, "Tangerang");
        assert!(config.fallback);
        assert!(config.plot);
    }

    #[test]
    fn flags_reach_the_config() {
        let cli = Cli::parse_from([
            "popreg",
            "-v",
            "run",
            "--population",
            "p.xlsx",
            "--start-year",
            "2021",
            "--end-year",
            "2022",
            "--no-fallback",
            "--no-plot",
            "--out-dir",
            "out",
        ]);
        assert_eq!(cli.log_level(), Some(log::LevelFilter::Debug));
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = pipeline_config_from_run_args(&args);
        assert_eq!(config.population_path, Some(PathBuf::from("p.xlsx")));
        assert_eq!(config.years(), 2021..=2022);
        assert!(!config.fallback);
        assert!(!config.plot);
        assert_eq!(config.outputs.result_json(), PathBuf::from("out/regression_result.json"));
    }

    #[test]
    fn regress_reads_reconciled_table() {
        let cli = Cli::parse_from(["popreg", "regress", "--input", "t.xlsx", "-q"]);
        assert_eq!(cli.log_level(), Some(log::LevelFilter::Warn));
        let Command::Regress(args) = cli.command else {
            panic!("expected regress");
        };
        let config = pipeline_config_from_regress_args(&args);
        assert_eq!(config.reconciled_path, Some(PathBuf::from("t.xlsx")));
    }
}
