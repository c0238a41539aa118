//! Duplicate resolution by name.
//!
//! Several records can describe the same app, typically snapshots taken at
//! different times. The record with the highest metric is assumed to be the
//! most recent one and is kept. That is a proxy: no timestamp exists to
//! confirm it. Two records sharing a name and the maximal metric keep only
//! the first, even if upstream data made them different apps.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::Serialize;

use crate::{error::PipelineError, metric::MetricParser, record::Record};

fn parse_metric(
    record: &Record,
    metric_field: usize,
    parser: MetricParser,
) -> Result<f64, PipelineError> {
    let raw = record.field(metric_field);
    parser(raw).ok_or_else(|| PipelineError::Parse {
        row: record.index(),
        field: metric_field,
        value: raw.to_string(),
    })
}

/// Keeps one record per name: the first one carrying the name's maximum metric.
pub fn dedupe<'a>(
    records: &[&'a Record],
    name_field: usize,
    metric_field: usize,
    parser: MetricParser,
) -> Result<Vec<&'a Record>, PipelineError> {
    let metrics = records
        .iter()
        .map(|record| parse_metric(record, metric_field, parser))
        .collect::<Result<Vec<_>, _>>()?;

    let mut best: HashMap<&str, f64> = HashMap::with_capacity(records.len());
    for (record, &metric) in records.iter().zip(&metrics) {
        best.entry(record.field(name_field))
            .and_modify(|max| {
                if metric > *max {
                    *max = metric;
                }
            })
            .or_insert(metric);
    }

    let mut emitted: HashSet<&str> = HashSet::with_capacity(best.len());
    let mut kept = Vec::with_capacity(best.len());
    for (record, &metric) in records.iter().zip(&metrics) {
        let name = record.field(name_field);
        if best.get(name) == Some(&metric) && emitted.insert(name) {
            kept.push(*record);
        }
    }
    debug!(
        "Deduplicated {} record(s) into {} unique name(s)",
        records.len(),
        kept.len()
    );
    Ok(kept)
}

/// Names seen more than once, before any resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateSurvey {
    pub unique_names: usize,
    /// One entry per repeated occurrence, in input order.
    pub duplicates: Vec<String>,
}

impl DuplicateSurvey {
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    pub fn examples(&self, limit: usize) -> &[String] {
        &self.duplicates[..limit.min(self.duplicates.len())]
    }
}

pub fn find_duplicates(records: &[&Record], name_field: usize) -> DuplicateSurvey {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicates = Vec::new();
    for record in records {
        let name = record.field(name_field);
        if !seen.insert(name) {
            duplicates.push(name.to_string());
        }
    }
    DuplicateSurvey {
        unique_names: seen.len(),
        duplicates,
    }
}
