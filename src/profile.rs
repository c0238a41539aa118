//! Multi-dataset reporting driven by a YAML profile.
//!
//! Each dataset is loaded, cleaned and queried on its own; nothing is shared
//! between entries, so one platform's export never affects another's numbers.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::{OutputFormat, ProfileArgs},
    config::{DatasetProfile, ProfileConfig},
    frequency::frequency_table,
    io_utils,
    pipeline::Pipeline,
    report::{self, APPROXIMATION_NOTE, AverageReport, CleaningReport, FrequencyReport},
    stats::category_average,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub cleaning: CleaningReport,
    pub frequency: Vec<FrequencyReport>,
    pub averages: Vec<AverageReport>,
}

pub fn summarize(entry: &DatasetProfile, top: usize) -> Result<DatasetSummary> {
    let config = entry.dataset_config()?;
    let delimiter = io_utils::resolve_input_delimiter(&entry.input, entry.delimiter()?);
    let encoding = io_utils::resolve_encoding(entry.encoding.as_deref())?;
    let store = io_utils::read_record_store(&entry.input, delimiter, encoding)?;
    let pipeline = Pipeline::for_store(config, &store)
        .with_context(|| format!("Configuring pipeline for {:?}", entry.input))?;
    let header = store.header();

    let frequency_fields = entry
        .frequency
        .iter()
        .map(|field| Ok((field.as_str(), pipeline.resolve_field(field, header)?)))
        .collect::<Result<Vec<_>>>()?;
    let average_fields = entry
        .averages
        .iter()
        .map(|query| {
            let group = pipeline.resolve_field(&query.group, header)?;
            let metric = pipeline.resolve_field(&query.metric, header)?;
            Ok((query, group, metric))
        })
        .collect::<Result<Vec<_>>>()?;

    let cleaned = pipeline
        .run(&store)
        .with_context(|| format!("Cleaning {:?}", entry.input))?;

    let frequency = frequency_fields
        .into_iter()
        .map(|(label, idx)| {
            FrequencyReport::new(pipeline.name(), label, &frequency_table(&cleaned.records, idx), top)
        })
        .collect();
    let averages = average_fields
        .into_iter()
        .map(|(query, group, metric)| {
            let parser = pipeline.metric_format_for(metric, query.format).parser();
            let averages = category_average(&cleaned.records, group, metric, parser)
                .with_context(|| format!("Averaging '{}' by '{}'", query.metric, query.group))?;
            Ok(AverageReport::new(
                pipeline.name(),
                &query.group,
                &query.metric,
                &averages,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DatasetSummary {
        cleaning: CleaningReport {
            dataset: pipeline.name().to_string(),
            counts: cleaned.report,
        },
        frequency,
        averages,
    })
}

pub fn execute(args: &ProfileArgs) -> Result<()> {
    let profile = ProfileConfig::load(&args.config)?;
    let summaries = profile
        .datasets
        .iter()
        .map(|entry| summarize(entry, args.top))
        .collect::<Result<Vec<_>>>()?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries)
                .context("Serializing profile to JSON")?;
            println!("{json}");
        }
        OutputFormat::Table => {
            for summary in &summaries {
                println!("{}", report::render(&summary.cleaning));
                for table in &summary.frequency {
                    println!("{}", report::render(table));
                }
                for table in &summary.averages {
                    println!("{}", report::render(table));
                }
            }
            println!("{APPROXIMATION_NOTE}");
        }
    }
    info!("Profiled {} dataset(s) from {:?}", summaries.len(), args.config);
    Ok(())
}
