//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - runs the extraction/reconciliation/regression pipeline
//! - prints reports/plots
//! - lists the files written

use clap::Parser;

use crate::cli::{Cli, Command, PlotArgs, RegressArgs, RunArgs};
use crate::domain::PipelineConfig;
use crate::error::AppError;
use crate::report::{
    DatasetStats, format_dataset_stats, format_diagnostics, format_outputs, format_prediction_table,
    format_reconciled_table, format_regression_summary,
};

pub mod pipeline;

/// Entry point for the `popreg` binary.
pub fn run() -> Result<(), AppError> {
    // Clap requires a subcommand name, so `popreg` and `popreg --labor x.xls`
    // are rewritten to `popreg run ...` before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    init_logging(&cli);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Clean(args) => handle_clean(args),
        Command::Regress(args) => handle_regress(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = cli.log_level() {
        builder.filter_level(level);
    }
    // Already initialised when embedded (tests); keep the existing logger.
    let _ = builder.try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = crate::cli::pipeline_config_from_run_args(&args);
    let run = pipeline::run_pipeline(&config)?;

    print_clean(&run.clean);
    print_regression(&run, &config);
    println!("{}", format_outputs(run.written()));
    Ok(())
}

fn handle_clean(args: RunArgs) -> Result<(), AppError> {
    let config = crate::cli::pipeline_config_from_run_args(&args);
    let clean = pipeline::run_clean(&config)?;

    print_clean(&clean);
    println!("{}", format_outputs(&clean.written));
    Ok(())
}

fn handle_regress(args: RegressArgs) -> Result<(), AppError> {
    let config = crate::cli::pipeline_config_from_regress_args(&args);
    let run = pipeline::run_regress_from_table(&config)?;

    if let Some(stats) = DatasetStats::from_rows(run.clean.rows()) {
        println!("{}", format_dataset_stats(&stats));
    }
    print_regression(&run, &config);
    println!("{}", format_outputs(run.written()));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_result_json(&args.result)?;
    let plot = crate::plot::render_ascii_plot_from_result_file(&file, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn print_clean(clean: &pipeline::CleanOutput) {
    println!("{}", format_reconciled_table(clean.rows()));
    if let Some(stats) = DatasetStats::from_rows(clean.rows()) {
        println!("{}", format_dataset_stats(&stats));
    }
    let diagnostics = format_diagnostics(&clean.warnings, &clean.reconciliation.missing_years);
    if !diagnostics.is_empty() {
        println!("{diagnostics}");
    }
}

fn print_regression(run: &pipeline::RunOutput, config: &PipelineConfig) {
    println!("{}", format_regression_summary(&run.result, run.clean.origin));
    println!("{}", format_prediction_table(&run.result));
    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.result, config.plot_width, config.plot_height);
        println!("{plot}");
    }
}

/// Rewrite argv so `popreg` defaults to `popreg run`.
///
/// Rules:
/// - `popreg`                          -> `popreg run`
/// - `popreg --population p.xls ...`   -> `popreg run --population p.xls ...`
/// - `popreg --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "clean" | "regress" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
