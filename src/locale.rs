//! Tolerant English-name heuristic.
//!
//! A name is treated as English unless it holds more than `threshold`
//! characters above the 7-bit ASCII range. A small allowance keeps names such
//! as `Docs To Go™ Free Office Suite` or `Instachat 😜`. This is an
//! approximation: a short non-English name with few non-ASCII characters
//! passes, and an English name decorated with many symbols is rejected.

use log::debug;

use crate::record::Record;

pub const DEFAULT_LOCALE_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleFilter {
    threshold: usize,
}

impl Default for LocaleFilter {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE_THRESHOLD)
    }
}

impl LocaleFilter {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn is_target_locale(&self, text: &str) -> bool {
        non_ascii_count(text) <= self.threshold
    }

    pub fn filter<'a>(&self, records: &[&'a Record], field: usize) -> Vec<&'a Record> {
        let kept: Vec<&'a Record> = records
            .iter()
            .copied()
            .filter(|record| self.is_target_locale(record.field(field)))
            .collect();
        debug!(
            "Locale filter kept {} of {} record(s) (threshold {})",
            kept.len(),
            records.len(),
            self.threshold
        );
        kept
    }
}

pub fn non_ascii_count(text: &str) -> usize {
    text.chars().filter(|ch| u32::from(*ch) > 127).count()
}
