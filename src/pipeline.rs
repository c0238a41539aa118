//! Staged cleaning of one dataset.
//!
//! Stages run in a fixed order: validation, duplicate resolution, locale
//! filtering, then price filtering. Every stage reads the previous stage's
//! view and returns a new `Vec<&Record>` borrowing from the same
//! [`RecordStore`]; records are never copied or mutated.
//!
//! Configuration problems surface from [`Pipeline::new`], before any record
//! is inspected. Metric parse failures surface from [`Pipeline::run`].

use log::{debug, info};
use serde::Serialize;

use crate::{
    config::DatasetConfig,
    dedupe,
    error::PipelineError,
    locale::LocaleFilter,
    metric::MetricFormat,
    price::{self, FreePredicate},
    record::{Record, RecordStore},
    validate,
};

/// Per-stage drop counts for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub read: usize,
    pub wrong_arity: usize,
    pub excluded: usize,
    pub duplicates: usize,
    pub non_target_locale: usize,
    pub paid: usize,
    pub retained: usize,
}

#[derive(Debug, Clone)]
pub struct CleanedDataset<'a> {
    pub records: Vec<&'a Record>,
    pub report: PipelineReport,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: DatasetConfig,
    arity: usize,
    locale: LocaleFilter,
    free: FreePredicate,
}

impl Pipeline {
    pub fn new(config: DatasetConfig, arity: usize) -> Result<Self, PipelineError> {
        config.check(arity)?;
        let free = FreePredicate::new(config.free_values.iter().cloned())?;
        let locale = LocaleFilter::new(config.locale_threshold);
        Ok(Self {
            config,
            arity,
            locale,
            free,
        })
    }

    /// Builds a pipeline for records shaped like `store`'s header.
    pub fn for_store(config: DatasetConfig, store: &RecordStore) -> Result<Self, PipelineError> {
        Self::new(config, store.arity())
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Format used to parse `field`: the explicit choice if any, else the
    /// dataset's metric format for its metric field, else plain.
    pub fn metric_format_for(&self, field: usize, explicit: Option<MetricFormat>) -> MetricFormat {
        match explicit {
            Some(format) => format,
            None if field == self.config.fields.metric => self.config.metric_format,
            None => MetricFormat::Plain,
        }
    }

    pub fn resolve_field(&self, reference: &str, header: &[String]) -> Result<usize, PipelineError> {
        self.config.fields.resolve(reference, header)
    }

    pub fn run<'a>(&self, store: &'a RecordStore) -> Result<CleanedDataset<'a>, PipelineError> {
        let records = store.records();
        let fields = &self.config.fields;
        let (valid, validation) =
            validate::validate(records, self.arity, &self.config.exclude_rows);
        debug!("[{}] validation kept {} record(s)", self.name(), valid.len());

        let unique = dedupe::dedupe(
            &valid,
            fields.name,
            fields.metric,
            self.config.metric_format.parser(),
        )?;
        let english = self.locale.filter(&unique, fields.name);
        let free = price::filter_free(&english, fields.price, &self.free);

        let report = PipelineReport {
            read: records.len(),
            wrong_arity: validation.wrong_arity,
            excluded: validation.excluded,
            duplicates: valid.len() - unique.len(),
            non_target_locale: unique.len() - english.len(),
            paid: english.len() - free.len(),
            retained: free.len(),
        };
        info!(
            "[{}] read {}, malformed {}, excluded {}, duplicates {}, non-English {}, paid {}, retained {}",
            self.name(),
            report.read,
            report.wrong_arity,
            report.excluded,
            report.duplicates,
            report.non_target_locale,
            report.paid,
            report.retained
        );
        Ok(CleanedDataset {
            records: free,
            report,
        })
    }
}
