use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::record::{Record, RecordStore};

/// Counts of records dropped by [`validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub wrong_arity: usize,
    pub excluded: usize,
}

impl ValidationReport {
    pub fn dropped(&self) -> usize {
        self.wrong_arity + self.excluded
    }
}

/// Keeps records with exactly `expected_arity` fields whose index is not in
/// `exclude_rows`. Nothing here fails; drops are counted instead.
pub fn validate<'a>(
    records: &'a [Record],
    expected_arity: usize,
    exclude_rows: &[usize],
) -> (Vec<&'a Record>, ValidationReport) {
    let excluded: HashSet<usize> = exclude_rows.iter().copied().collect();
    let mut report = ValidationReport::default();
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if excluded.contains(&record.index()) {
            debug!("Excluding configured row {}", record.index());
            report.excluded += 1;
        } else if record.arity() != expected_arity {
            debug!(
                "Dropping row {} with {} field(s), expected {expected_arity}",
                record.index(),
                record.arity()
            );
            report.wrong_arity += 1;
        } else {
            kept.push(record);
        }
    }
    (kept, report)
}

/// Validates a whole store against its own header arity.
pub fn validate_store<'a>(
    store: &'a RecordStore,
    exclude_rows: &[usize],
) -> (Vec<&'a Record>, ValidationReport) {
    validate(store.records(), store.arity(), exclude_rows)
}
