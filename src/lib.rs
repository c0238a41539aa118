pub mod cli;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod frequency;
pub mod io_utils;
pub mod locale;
pub mod metric;
pub mod pipeline;
pub mod preview;
pub mod price;
pub mod profile;
pub mod record;
pub mod report;
pub mod stats;
pub mod table;
pub mod validate;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, DatasetArgs},
    config::DatasetConfig,
    pipeline::Pipeline,
    record::RecordStore,
    report::CleaningReport,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("app_market_profiler", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => preview::execute(&args),
        Commands::Duplicates(args) => handle_duplicates(&args),
        Commands::Clean(args) => handle_clean(&args),
        Commands::Frequency(args) => frequency::execute(&args),
        Commands::Average(args) => stats::execute(&args),
        Commands::Profile(args) => profile::execute(&args),
    }
}

/// Resolves the dataset configuration named on the command line, with overrides applied.
pub fn resolve_dataset_config(args: &DatasetArgs) -> Result<DatasetConfig> {
    let mut config = match (&args.dataset, args.preset) {
        (Some(path), _) => DatasetConfig::load(path)?,
        (None, Some(preset)) => preset.config(),
        (None, None) => anyhow::bail!("Either --preset or --dataset is required"),
    };
    if let Some(threshold) = args.locale_threshold {
        config.locale_threshold = threshold;
    }
    if !args.free_values.is_empty() {
        config.free_values = args.free_values.clone();
    }
    config.exclude_rows.extend(args.exclude_rows.iter().copied());
    Ok(config)
}

pub(crate) fn load_dataset(args: &DatasetArgs) -> Result<(RecordStore, DatasetConfig)> {
    let config = resolve_dataset_config(args)?;
    let input = &args.source.input;
    let delimiter = io_utils::resolve_input_delimiter(input, args.source.delimiter);
    let encoding = io_utils::resolve_encoding(args.source.input_encoding.as_deref())?;
    info!(
        "Loading '{}' as {} with delimiter '{}'",
        input.display(),
        config.name,
        printable_delimiter(delimiter)
    );
    let store = io_utils::read_record_store(input, delimiter, encoding)?;
    Ok((store, config))
}

fn handle_clean(args: &cli::CleanArgs) -> Result<()> {
    let (store, config) = load_dataset(&args.dataset)?;
    let pipeline = Pipeline::for_store(config, &store)?;
    let cleaned = pipeline
        .run(&store)
        .with_context(|| format!("Cleaning {:?}", args.dataset.source.input))?;

    let input_delimiter =
        io_utils::resolve_input_delimiter(&args.dataset.source.input, args.dataset.source.delimiter);
    let output_path = args.output.as_deref();
    let delimiter =
        io_utils::resolve_output_delimiter(output_path, args.output_delimiter, input_delimiter);
    let mut writer = io_utils::open_csv_writer(output_path, delimiter)?;
    io_utils::write_records(&mut writer, store.header(), &cleaned.records)?;

    let summary = CleaningReport {
        dataset: pipeline.name().to_string(),
        counts: cleaned.report,
    };
    // Table output would mix with CSV on stdout.
    info!("{}", report::render(&summary).trim_end());
    Ok(())
}

fn handle_duplicates(args: &cli::DuplicatesArgs) -> Result<()> {
    let (store, config) = load_dataset(&args.dataset)?;
    let pipeline = Pipeline::for_store(config, &store)?;
    let (valid, _) = validate::validate_store(&store, &pipeline.config().exclude_rows);
    let survey = dedupe::find_duplicates(&valid, pipeline.config().fields.name);
    println!("duplicated apps: {}", survey.duplicate_count());
    println!("unique names: {}", survey.unique_names);
    if survey.duplicate_count() > 0 {
        println!(
            "examples: {}",
            survey.examples(args.examples).join(", ")
        );
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
