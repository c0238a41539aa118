use std::collections::BTreeMap;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::{
    cli::AverageArgs,
    error::PipelineError,
    metric::MetricParser,
    pipeline::Pipeline,
    record::Record,
    report::{self, AverageReport},
};

/// Running sum for one group. Each record contributes its metric once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupAverage {
    pub(crate) count: usize,
    pub(crate) total: f64,
}

impl GroupAverage {
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sum of the group's metric values.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn mean(&self) -> f64 {
        self.total / self.count as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageEntry {
    pub group: String,
    pub count: usize,
    pub mean: f64,
}

/// Mean metric per group. Only groups with at least one member appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryAverages {
    groups: BTreeMap<String, GroupAverage>,
}

impl CategoryAverages {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, group: &str) -> Option<f64> {
        self.groups.get(group).map(GroupAverage::mean)
    }

    pub fn group(&self, group: &str) -> Option<&GroupAverage> {
        self.groups.get(group)
    }

    pub fn means(&self) -> BTreeMap<String, f64> {
        self.groups
            .iter()
            .map(|(group, acc)| (group.clone(), acc.mean()))
            .collect()
    }

    /// Groups by descending mean.
    pub fn ranked(&self) -> Vec<AverageEntry> {
        self.groups
            .iter()
            .map(|(group, acc)| AverageEntry {
                group: group.clone(),
                count: acc.count,
                mean: acc.mean(),
            })
            .sorted_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.group.cmp(&b.group)))
            .collect()
    }
}

pub fn category_average(
    records: &[&Record],
    group_field: usize,
    metric_field: usize,
    parser: MetricParser,
) -> Result<CategoryAverages, PipelineError> {
    let groups = records.iter().try_fold(
        BTreeMap::<String, GroupAverage>::new(),
        |mut groups, record| {
            let raw = record.field(metric_field);
            let value = parser(raw).ok_or_else(|| PipelineError::Parse {
                row: record.index(),
                field: metric_field,
                value: raw.to_string(),
            })?;
            let acc = groups
                .entry(record.field(group_field).to_string())
                .or_insert(GroupAverage {
                    count: 0,
                    total: 0.0,
                });
            acc.count += 1;
            acc.total += value;
            Ok::<_, PipelineError>(groups)
        },
    )?;
    Ok(CategoryAverages { groups })
}

pub fn execute(args: &AverageArgs) -> Result<()> {
    let (store, config) = crate::load_dataset(&args.dataset)?;
    let pipeline = Pipeline::for_store(config, &store)?;
    let group_field = pipeline.resolve_field(&args.group, store.header())?;
    let metric_field = pipeline.resolve_field(&args.metric, store.header())?;
    let cleaned = pipeline
        .run(&store)
        .with_context(|| format!("Cleaning {:?}", args.dataset.source.input))?;

    let averages = category_average(
        &cleaned.records,
        group_field,
        metric_field,
        pipeline
            .metric_format_for(metric_field, args.metric_format)
            .parser(),
    )
    .with_context(|| format!("Averaging '{}' by '{}'", args.metric, args.group))?;
    let report = AverageReport::new(pipeline.name(), &args.group, &args.metric, &averages);
    report::emit_all(std::slice::from_ref(&report), args.format)?;
    info!(
        "Averaged '{}' across {} group(s) of '{}'",
        args.metric,
        averages.len(),
        args.group
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{parse_install_bucket, parse_plain};

    fn records(rows: &[(&str, &str)]) -> Vec<Record> {
        rows.iter()
            .enumerate()
            .map(|(idx, (group, metric))| {
                Record::new(idx, vec![group.to_string(), metric.to_string()])
            })
            .collect()
    }

    #[test]
    fn each_metric_counts_once() {
        let data = records(&[("A", "10"), ("A", "20"), ("B", "5")]);
        let refs: Vec<&Record> = data.iter().collect();
        let averages = category_average(&refs, 0, 1, parse_plain).expect("averages");
        assert_eq!(averages.get("A"), Some(15.0));
        assert_eq!(averages.get("B"), Some(5.0));
        let a = averages.group("A").expect("group A");
        assert_eq!(a.total(), 30.0);
        assert_eq!(a.count(), 2);
    }

    #[test]
    fn install_buckets_average_by_lower_bound() {
        let data = records(&[("VIDEO", "1,000,000+"), ("VIDEO", "5,000,000+")]);
        let refs: Vec<&Record> = data.iter().collect();
        let averages = category_average(&refs, 0, 1, parse_install_bucket).expect("averages");
        assert_eq!(averages.get("VIDEO"), Some(3_000_000.0));
    }

    #[test]
    fn empty_input_has_no_groups() {
        let averages = category_average(&[], 0, 1, parse_plain).expect("averages");
        assert!(averages.is_empty());
        assert!(averages.means().is_empty());
    }

    #[test]
    fn unparseable_metric_propagates() {
        let data = records(&[("A", "10"), ("A", "Varies with device")]);
        let refs: Vec<&Record> = data.iter().collect();
        let err = category_average(&refs, 0, 1, parse_plain).expect_err("not numeric");
        assert!(matches!(err, PipelineError::Parse { row: 1, .. }));
    }

    #[test]
    fn ranked_orders_by_descending_mean() {
        let data = records(&[("low", "1"), ("high", "100"), ("mid", "10")]);
        let refs: Vec<&Record> = data.iter().collect();
        let ranked = category_average(&refs, 0, 1, parse_plain)
            .expect("averages")
            .ranked();
        let groups: Vec<&str> = ranked.iter().map(|e| e.group.as_str()).collect();
        assert_eq!(groups, vec!["high", "mid", "low"]);
    }
}
