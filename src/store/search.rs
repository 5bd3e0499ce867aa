//! Linear case-insensitive substring search over stored datasets

use super::Dataset;
use memchr::memmem::Finder;

/// Global cap on results returned by a single search
pub const MAX_RESULTS: usize = 20;

/// Matches lines against a case-folded query.
///
/// Keeps a scratch buffer so folding a line does not allocate once the
/// buffer has grown.
pub struct LineMatcher {
    finder: Finder<'static>,
    scratch: String,
}

impl LineMatcher {
    pub fn new(query: &str) -> Self {
        let needle = query.to_lowercase();
        Self {
            finder: Finder::new(needle.as_bytes()).into_owned(),
            scratch: String::new(),
        }
    }

    pub fn is_match(&mut self, line: &str) -> bool {
        self.scratch.clear();
        if line.is_ascii() {
            self.scratch
                .extend(line.bytes().map(|b| b.to_ascii_lowercase() as char));
        } else {
            self.scratch.push_str(&line.to_lowercase());
        }
        self.finder.find(self.scratch.as_bytes()).is_some()
    }
}

/// Search datasets in order, returning up to [`MAX_RESULTS`] lines
/// formatted as `[<dataset>] <line>`.
///
/// An empty query matches every line; rejecting it is up to the caller.
pub fn search(datasets: &[Dataset], query: &str) -> Vec<String> {
    search_with_limit(datasets, query, MAX_RESULTS)
}

pub fn search_with_limit(datasets: &[Dataset], query: &str, limit: usize) -> Vec<String> {
    let mut matcher = LineMatcher::new(query);
    let mut results = Vec::new();

    if limit == 0 {
        return results;
    }

    for dataset in datasets {
        for line in dataset.lines() {
            if matcher.is_match(line) {
                results.push(format!("[{}] {}", dataset.name(), line));
                if results.len() >= limit {
                    return results;
                }
            }
        }
    }

    results
}
