use std::collections::BTreeMap;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::{
    cli::FrequencyArgs,
    pipeline::Pipeline,
    record::Record,
    report::{self, FrequencyReport},
};

/// Share of a record population held by each distinct field value.
///
/// Percentages are relative to the records the table was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    total: usize,
    counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

impl FrequencyTable {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, value: &str) -> Option<usize> {
        self.counts.get(value).copied()
    }

    pub fn percent(&self, value: &str) -> Option<f64> {
        self.count(value).map(|count| self.share(count))
    }

    pub fn percentages(&self) -> BTreeMap<String, f64> {
        self.counts
            .iter()
            .map(|(value, count)| (value.clone(), self.share(*count)))
            .collect()
    }

    /// Entries by descending share; equal shares order by value.
    pub fn ranked(&self) -> Vec<FrequencyEntry> {
        self.counts
            .iter()
            .sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
            .map(|(value, count)| FrequencyEntry {
                value: value.clone(),
                count: *count,
                percent: self.share(*count),
            })
            .collect()
    }

    fn share(&self, count: usize) -> f64 {
        (count as f64 / self.total as f64) * 100.0
    }
}

pub fn frequency_table(records: &[&Record], field: usize) -> FrequencyTable {
    let counts = records
        .iter()
        .map(|record| record.field(field))
        .counts()
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    FrequencyTable {
        total: records.len(),
        counts,
    }
}

pub fn execute(args: &FrequencyArgs) -> Result<()> {
    let (store, config) = crate::load_dataset(&args.dataset)?;
    let pipeline = Pipeline::for_store(config, &store)?;
    let fields = args
        .columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| Ok((c.to_string(), pipeline.resolve_field(c, store.header())?)))
        .collect::<Result<Vec<_>>>()?;
    let cleaned = pipeline
        .run(&store)
        .with_context(|| format!("Cleaning {:?}", args.dataset.source.input))?;

    let reports = fields
        .iter()
        .map(|(label, idx)| {
            let table = frequency_table(&cleaned.records, *idx);
            FrequencyReport::new(pipeline.name(), label, &table, args.top)
        })
        .collect::<Vec<_>>();
    report::emit_all(&reports, args.format)?;
    info!(
        "Computed frequency tables for {} field(s) over {} record(s)",
        reports.len(),
        cleaned.records.len()
    );
    Ok(())
}
