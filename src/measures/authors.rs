//! Distinct-author count per file, the reference measure aggregator.

use super::{ChurnEntry, Measure, MeasureAggregator};
use std::collections::{HashMap, HashSet};

/// Counts the distinct (case-insensitive) authors that have touched a file
/// across every churn update seen so far.
#[derive(Debug, Default)]
pub struct NumberOfAuthorsAggregator {
    unique_authors_per_file: HashMap<String, HashSet<String>>,
}

impl NumberOfAuthorsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&mut self, entry: &ChurnEntry) -> u64 {
        let authors = self
            .unique_authors_per_file
            .entry(entry.file.to_string())
            .or_default();
        for author in &entry.churn.authors {
            authors.insert(author.to_lowercase());
        }
        authors.len() as u64
    }
}

impl MeasureAggregator for NumberOfAuthorsAggregator {
    fn name(&self) -> &str {
        "authors"
    }

    fn has_value(&self, _entry: &ChurnEntry) -> bool {
        true
    }

    fn value_for_new_key(&mut self, entry: &ChurnEntry) -> u64 {
        self.update(entry)
    }

    fn value_for_existing_key(&mut self, entry: &ChurnEntry, _previous: &Measure) -> u64 {
        self.update(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DailyCodeChurn;
    use crate::measures::MeasureCollector;
    use crate::core::ChurnTable;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn churn_with_authors(authors: &[&str]) -> DailyCodeChurn {
        DailyCodeChurn {
            changes: 1,
            authors: authors.iter().map(|a| a.to_lowercase()).collect::<BTreeSet<_>>(),
            ..Default::default()
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 10, d).unwrap()
    }

    #[test]
    fn counts_case_insensitive_identities_across_updates() {
        let mut table = ChurnTable::new();
        table
            .entry(day(1))
            .or_default()
            .insert("a.rs".to_string(), churn_with_authors(&["Alice"]));
        table
            .entry(day(2))
            .or_default()
            .insert("a.rs".to_string(), churn_with_authors(&["alice"]));
        table
            .entry(day(3))
            .or_default()
            .insert("a.rs".to_string(), churn_with_authors(&["BOB"]));

        let collector = MeasureCollector::collect(NumberOfAuthorsAggregator::new(), &table);
        assert_eq!(collector.value_for(day(1), "a.rs"), Some(1));
        assert_eq!(collector.value_for(day(2), "a.rs"), Some(1));
        assert_eq!(collector.value_for(day(3), "a.rs"), Some(2));
    }

    #[test]
    fn files_track_authors_independently() {
        let mut table = ChurnTable::new();
        let files = table.entry(day(1)).or_default();
        files.insert("a.rs".to_string(), churn_with_authors(&["alice", "bob"]));
        files.insert("b.rs".to_string(), churn_with_authors(&["carol"]));

        let collector = MeasureCollector::collect(NumberOfAuthorsAggregator::new(), &table);
        assert_eq!(collector.value_for(day(1), "a.rs"), Some(2));
        assert_eq!(collector.value_for(day(1), "b.rs"), Some(1));
    }
}
