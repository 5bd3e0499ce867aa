//! In-memory dataset storage.
//!
//! Datasets are appended in upload order and never updated or removed.
//! Uploading two files with the same name keeps both.

pub mod search;

pub use search::{search, LineMatcher, MAX_RESULTS};

use serde::{Deserialize, Serialize};

/// One ingested text source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    data: Vec<String>,
    size: u64,
    lines_count: usize,
}

impl Dataset {
    pub fn new(name: impl Into<String>, data: Vec<String>, size: u64) -> Self {
        let lines_count = data.len();
        Self {
            name: name.into(),
            data,
            size,
            lines_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[String] {
        &self.data
    }

    /// Byte length of the original upload
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn lines_count(&self) -> usize {
        self.lines_count
    }
}

/// Totals across every stored dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub count: usize,
    pub total_size: u64,
    pub total_lines: usize,
}

/// Append-only, insertion-ordered collection of datasets
#[derive(Debug, Default)]
pub struct DatabaseStore {
    datasets: Vec<Dataset>,
}

impl DatabaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, dataset: Dataset) {
        self.datasets.push(dataset);
    }

    pub fn all(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn summary(&self) -> StoreSummary {
        self.datasets
            .iter()
            .fold(StoreSummary::default(), |mut acc, ds| {
                acc.count += 1;
                acc.total_size += ds.size;
                acc.total_lines += ds.lines_count;
                acc
            })
    }

    /// Case-insensitive substring search, capped at [`MAX_RESULTS`]
    pub fn search(&self, query: &str) -> Vec<String> {
        search(&self.datasets, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(name: &str, lines: &[&str], size: u64) -> Dataset {
        Dataset::new(name, lines.iter().map(|l| l.to_string()).collect(), size)
    }

    #[test]
    fn test_lines_count_matches_data() {
        let ds = dataset("a.txt", &["x", "y", "z"], 5);
        assert_eq!(ds.lines_count(), ds.lines().len());
    }

    #[test]
    fn test_append_preserves_order_and_content() {
        let mut store = DatabaseStore::new();
        let first = dataset("a.txt", &["one"], 3);
        let second = dataset("b.csv", &["two", "three"], 9);

        store.append(first.clone());
        store.append(second.clone());

        assert_eq!(store.all(), [first.clone(), second]);
        assert_eq!(store.all().iter().filter(|d| **d == first).count(), 1);
    }

    #[test]
    fn test_duplicate_names_coexist() {
        let mut store = DatabaseStore::new();
        store.append(dataset("leak.csv", &["a"], 1));
        store.append(dataset("leak.csv", &["b"], 1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_summary() {
        let mut store = DatabaseStore::new();
        assert_eq!(store.summary(), StoreSummary::default());

        store.append(dataset("a.txt", &["1", "2"], 100));
        store.append(dataset("b.txt", &["3"], 50));

        let summary = store.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_size, 150);
        assert_eq!(summary.total_lines, 3);
    }
}
