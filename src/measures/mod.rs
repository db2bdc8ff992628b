//! Pluggable measure aggregation over the finished churn table.
//!
//! An aggregator is a stateful strategy that consumes churn entries one at a
//! time and produces a derived scalar per (date, file) key. Replaying the
//! same entries in the same order must always reproduce the same values.

pub mod authors;

use crate::core::{ChurnTable, DailyCodeChurn};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub use authors::NumberOfAuthorsAggregator;

/// A derived scalar for one (date, file) key, plus the history an aggregator
/// needs to compute the next value incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measure {
    pub date: NaiveDate,
    pub file: String,
    pub value: u64,
}

/// One churn entry together with its table key, as seen by an aggregator.
#[derive(Debug, Clone, Copy)]
pub struct ChurnEntry<'a> {
    pub date: NaiveDate,
    pub file: &'a str,
    pub churn: &'a DailyCodeChurn,
}

/// The aggregation capability. Each implementation owns whatever incremental
/// state it needs (e.g. a per-file set of seen authors).
pub trait MeasureAggregator {
    /// Measure name, used as the derived column's identifier.
    fn name(&self) -> &str;

    /// Whether this entry contributes a value at all.
    fn has_value(&self, entry: &ChurnEntry) -> bool;

    /// Value for a file this aggregator has not seen before.
    fn value_for_new_key(&mut self, entry: &ChurnEntry) -> u64;

    /// Value for a file with an earlier measure; `previous` is the measure
    /// most recently produced for this file.
    fn value_for_existing_key(&mut self, entry: &ChurnEntry, previous: &Measure) -> u64;
}

/// Drives one aggregator over churn entries and records its value stream.
///
/// Entries are fed in ascending date order, files in sorted order within a
/// date; the same order a replay over the finished table would use.
pub struct MeasureCollector<A: MeasureAggregator> {
    aggregator: A,
    latest_per_file: BTreeMap<String, Measure>,
    values: BTreeMap<NaiveDate, BTreeMap<String, u64>>,
}

impl<A: MeasureAggregator> MeasureCollector<A> {
    pub fn new(aggregator: A) -> Self {
        Self {
            aggregator,
            latest_per_file: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }

    /// Run the aggregator over a finished table.
    pub fn collect(aggregator: A, table: &ChurnTable) -> Self {
        let mut collector = Self::new(aggregator);
        for (date, files) in table {
            for (file, churn) in files {
                collector.add(*date, file, churn);
            }
        }
        collector
    }

    /// Feed one churn entry, in stream order.
    pub fn add(&mut self, date: NaiveDate, file: &str, churn: &DailyCodeChurn) {
        let entry = ChurnEntry { date, file, churn };
        if !self.aggregator.has_value(&entry) {
            return;
        }
        let value = match self.latest_per_file.get(file) {
            Some(previous) => self.aggregator.value_for_existing_key(&entry, previous),
            None => self.aggregator.value_for_new_key(&entry),
        };
        self.latest_per_file.insert(
            file.to_string(),
            Measure {
                date,
                file: file.to_string(),
                value,
            },
        );
        self.values.entry(date).or_default().insert(file.to_string(), value);
    }

    pub fn name(&self) -> &str {
        self.aggregator.name()
    }

    /// The value produced for a (date, file) key, if any.
    pub fn value_for(&self, date: NaiveDate, file: &str) -> Option<u64> {
        self.values.get(&date).and_then(|files| files.get(file)).copied()
    }
}
