//! Rendering of pipeline results for the console, as tables or JSON.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    cli::OutputFormat,
    frequency::{FrequencyEntry, FrequencyTable},
    pipeline::PipelineReport,
    stats::{AverageEntry, CategoryAverages},
    table,
};

pub const APPROXIMATION_NOTE: &str = "note: English names are detected by counting non-ASCII \
characters, and duplicates are resolved by keeping the highest metric as the most recent \
listing; both are heuristics, so counts and shares are approximate.";

/// A result that can be shown as a titled table.
pub trait Tabular {
    fn title(&self) -> String;
    fn headers(&self) -> Vec<String>;
    fn rows(&self) -> Vec<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyReport {
    pub dataset: String,
    pub field: String,
    pub total: usize,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyReport {
    pub fn new(dataset: &str, field: &str, table: &FrequencyTable, top: usize) -> Self {
        let mut entries = table.ranked();
        if top > 0 {
            entries.truncate(top);
        }
        Self {
            dataset: dataset.to_string(),
            field: field.to_string(),
            total: table.total(),
            entries,
        }
    }
}

impl Tabular for FrequencyReport {
    fn title(&self) -> String {
        format!(
            "{}: frequency of '{}' over {} record(s)",
            self.dataset, self.field, self.total
        )
    }

    fn headers(&self) -> Vec<String> {
        headers(&["value", "count", "percent"])
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.entries
            .iter()
            .map(|entry| {
                vec![
                    entry.value.clone(),
                    entry.count.to_string(),
                    format!("{:.2}%", entry.percent),
                ]
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageReport {
    pub dataset: String,
    pub group: String,
    pub metric: String,
    pub entries: Vec<AverageEntry>,
}

impl AverageReport {
    pub fn new(dataset: &str, group: &str, metric: &str, averages: &CategoryAverages) -> Self {
        Self {
            dataset: dataset.to_string(),
            group: group.to_string(),
            metric: metric.to_string(),
            entries: averages.ranked(),
        }
    }
}

impl Tabular for AverageReport {
    fn title(&self) -> String {
        format!(
            "{}: average '{}' by '{}'",
            self.dataset, self.metric, self.group
        )
    }

    fn headers(&self) -> Vec<String> {
        headers(&[self.group.as_str(), "count", "average"])
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.entries
            .iter()
            .map(|entry| {
                vec![
                    entry.group.clone(),
                    entry.count.to_string(),
                    format!("{:.2}", entry.mean),
                ]
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub dataset: String,
    #[serde(flatten)]
    pub counts: PipelineReport,
}

impl Tabular for CleaningReport {
    fn title(&self) -> String {
        format!("{}: cleaning summary", self.dataset)
    }

    fn headers(&self) -> Vec<String> {
        headers(&["stage", "records"])
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let c = &self.counts;
        [
            ("read", c.read),
            ("wrong field count", c.wrong_arity),
            ("excluded rows", c.excluded),
            ("duplicates", c.duplicates),
            ("non-English names", c.non_target_locale),
            ("paid", c.paid),
            ("retained", c.retained),
        ]
        .into_iter()
        .map(|(stage, count)| vec![stage.to_string(), count.to_string()])
        .collect()
    }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub fn render<T: Tabular>(report: &T) -> String {
    format!(
        "{}\n{}",
        report.title(),
        table::render_table(&report.headers(), &report.rows())
    )
}

/// Prints reports in `format`; table output ends with the approximation note.
pub fn emit_all<T>(reports: &[T], format: OutputFormat) -> Result<()>
where
    T: Tabular + Serialize,
{
    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(reports).context("Serializing report to JSON")?;
            println!("{json}");
        }
        OutputFormat::Table => {
            for report in reports {
                println!("{}", render(report));
            }
            println!("{APPROXIMATION_NOTE}");
        }
    }
    Ok(())
}
