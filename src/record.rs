//! In-memory record storage shared by every pipeline stage.
//!
//! A [`RecordStore`] owns the header and the raw records of one dataset.
//! Stages never copy or mutate records; they pass around `Vec<&Record>`
//! views that borrow from the store.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    index: usize,
    fields: Vec<String>,
}

impl Record {
    pub fn new(index: usize, fields: Vec<String>) -> Self {
        Self { index, fields }
    }

    /// 0-based position of the record among the dataset's data rows.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(|s| s.as_str())
    }

    /// Field text at `position`, or an empty string when the record is short.
    pub fn field(&self, position: usize) -> &str {
        self.get(position).unwrap_or("")
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    header: Vec<String>,
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            records: Vec::new(),
        }
    }

    pub fn from_rows<I>(header: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut store = Self::new(header);
        for row in rows {
            store.push(row);
        }
        store
    }

    pub fn push(&mut self, fields: Vec<String>) {
        let index = self.records.len();
        self.records.push(Record::new(index, fields));
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Field count established by the header.
    pub fn arity(&self) -> usize {
        self.header.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn records_remember_their_input_position() {
        let store = RecordStore::from_rows(
            row(&["App", "Category"]),
            vec![row(&["A", "G1"]), row(&["B", "G2"])],
        );
        assert_eq!(store.arity(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[1].index(), 1);
        assert_eq!(store.records()[1].field(0), "B");
    }

    #[test]
    fn short_records_yield_empty_fields() {
        let record = Record::new(0, row(&["A"]));
        assert_eq!(record.get(3), None);
        assert_eq!(record.field(3), "");
    }
}
