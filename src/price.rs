use log::debug;

use crate::{error::PipelineError, record::Record};

/// Exact-match membership test against a dataset's free-price encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreePredicate {
    tokens: Vec<String>,
}

impl FreePredicate {
    pub fn new<I, S>(tokens: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(PipelineError::config("free predicate needs at least one token"));
        }
        Ok(Self { tokens })
    }

    pub fn matches(&self, value: &str) -> bool {
        self.tokens.iter().any(|token| token == value)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

pub fn is_free(record: &Record, price_field: usize, predicate: &FreePredicate) -> bool {
    predicate.matches(record.field(price_field))
}

pub fn filter_free<'a>(
    records: &[&'a Record],
    price_field: usize,
    predicate: &FreePredicate,
) -> Vec<&'a Record> {
    let kept: Vec<&'a Record> = records
        .iter()
        .copied()
        .filter(|record| is_free(record, price_field, predicate))
        .collect();
    debug!(
        "Price filter kept {} of {} record(s) matching {:?}",
        kept.len(),
        records.len(),
        predicate.tokens()
    );
    kept
}
