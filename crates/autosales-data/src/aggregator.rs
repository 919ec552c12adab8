//! Filtering and grouping over the sales table.
//!
//! Every operation is a pure function of an immutable [`Dataset`].  Keys and
//! measures are named by [`Field`] and checked against the dataset's schema
//! before any record is touched, so a failing call never yields a partial
//! result.

use std::collections::HashMap;
use std::hash::Hash;

use autosales_core::error::{Result, SalesError};
use autosales_core::formatting::percentage;
use autosales_core::models::{Dataset, Field, GroupKey, Record};
use serde::Serialize;
use tracing::debug;

// ── Reducer ───────────────────────────────────────────────────────────────────

/// How a partition's measure values collapse to one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Mean,
    Sum,
}

/// Running sum and count of contributing values for one partition.
#[derive(Debug, Clone, Copy, Default)]
struct Partition {
    sum: f64,
    count: usize,
}

impl Partition {
    /// Missing (NaN) values do not contribute.
    fn add(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.sum += value;
        self.count += 1;
    }

    /// A partition with no contributing values sums to `0.0` and has a NaN
    /// mean.
    fn reduce(self, reducer: Reducer) -> f64 {
        match reducer {
            Reducer::Sum => self.sum,
            Reducer::Mean if self.count == 0 => f64::NAN,
            Reducer::Mean => self.sum / self.count as f64,
        }
    }
}

// ── Aggregate ─────────────────────────────────────────────────────────────────

/// One output row: the key value(s), the reduced measure, and how many
/// records contributed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub keys: Vec<GroupKey>,
    pub value: f64,
    pub count: usize,
}

impl AggregateRow {
    /// Key of a single-key grouping.
    pub fn key(&self) -> &GroupKey {
        &self.keys[0]
    }

    /// `"Sports"` or `"5.4 / Sports"` for pair groupings.
    pub fn label(&self) -> String {
        self.keys
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// The derived table produced by a grouping operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    /// Grouping fields, most significant first.
    pub keys: Vec<Field>,
    pub measure: Field,
    pub reducer: Reducer,
    pub rows: Vec<AggregateRow>,
}

impl Aggregate {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the reduced values across all rows.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    /// Each row's share of [`Aggregate::total`] in percent.  Empty when the
    /// total is zero.
    pub fn shares(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0.0 {
            return Vec::new();
        }
        self.rows
            .iter()
            .map(|r| percentage(r.value, total))
            .collect()
    }

    /// Reduced value for an exact key combination.
    pub fn value_for(&self, keys: &[GroupKey]) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.keys.as_slice() == keys)
            .map(|r| r.value)
    }

    /// `(key, value)` pairs of a single-key grouping.
    pub fn series(&self) -> Vec<(GroupKey, f64)> {
        self.rows
            .iter()
            .map(|r| (r.key().clone(), r.value))
            .collect()
    }
}

// ── group_by ──────────────────────────────────────────────────────────────────

/// Partition `records` by `key_fn` and reduce `measure_fn` within each
/// partition.
///
/// Returns `(key, value, count)` per distinct key in first-seen order, where
/// `count` is the number of non-NaN measure values in the partition.
pub fn group_by<'a, K, FK, FM>(
    records: impl IntoIterator<Item = &'a Record>,
    key_fn: FK,
    measure_fn: FM,
    reducer: Reducer,
) -> Vec<(K, f64, usize)>
where
    K: Eq + Hash + Clone,
    FK: Fn(&Record) -> K,
    FM: Fn(&Record) -> f64,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut partitions: Vec<(K, Partition)> = Vec::new();

    for record in records {
        let key = key_fn(record);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            partitions.push((key, Partition::default()));
            partitions.len() - 1
        });
        partitions[slot].1.add(measure_fn(record));
    }

    partitions
        .into_iter()
        .map(|(key, p)| (key, p.reduce(reducer), p.count))
        .collect()
}

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Stateless helper exposing the field-driven filter and grouping operations.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Records flagged as occurring during a recession, in insertion order.
    pub fn filter_by_recession(dataset: &Dataset) -> Result<Dataset> {
        dataset.schema().require(Field::Recession)?;
        let filtered = dataset.retain_where(|r| r.recession);
        debug!(
            "filter_by_recession kept {} of {} records",
            filtered.len(),
            dataset.len()
        );
        Ok(filtered)
    }

    /// Records of `year`, in insertion order.  Empty when the year is absent.
    pub fn filter_by_year(dataset: &Dataset, year: i32) -> Result<Dataset> {
        dataset.schema().require(Field::Year)?;
        let filtered = dataset.retain_where(|r| r.year == year);
        debug!(
            "filter_by_year({}) kept {} of {} records",
            year,
            filtered.len(),
            dataset.len()
        );
        Ok(filtered)
    }

    /// Arithmetic mean of `measure` per distinct `key`.
    pub fn group_mean(dataset: &Dataset, key: Field, measure: Field) -> Result<Aggregate> {
        Self::aggregate(dataset, &[key], measure, Reducer::Mean)
    }

    /// Sum of `measure` per distinct `key`.
    pub fn group_sum(dataset: &Dataset, key: Field, measure: Field) -> Result<Aggregate> {
        Self::aggregate(dataset, &[key], measure, Reducer::Sum)
    }

    /// Mean of `measure` per observed `(key1, key2)` combination.
    pub fn group_mean_by_pair(
        dataset: &Dataset,
        key1: Field,
        key2: Field,
        measure: Field,
    ) -> Result<Aggregate> {
        Self::aggregate(dataset, &[key1, key2], measure, Reducer::Mean)
    }

    /// Generic field-driven grouping driver.
    ///
    /// Rows come out in first-seen order, then stably sorted on every ordinal
    /// key (most significant key last applied, so it dominates).  At least
    /// one key is required.
    pub fn aggregate(
        dataset: &Dataset,
        keys: &[Field],
        measure: Field,
        reducer: Reducer,
    ) -> Result<Aggregate> {
        if keys.is_empty() {
            return Err(SalesError::NoGroupingKey);
        }
        let schema = dataset.schema();
        for key in keys {
            schema.require(*key)?;
        }
        schema.require_measure(measure)?;

        // Rows with a missing numeric key belong to no group.
        let keyed = dataset.records().iter().filter(|r| {
            keys.iter()
                .all(|k| k.numeric_value(r).map_or(true, |v| !v.is_nan()))
        });
        let grouped = group_by(
            keyed,
            |r| keys.iter().map(|k| k.key_value(r)).collect::<Vec<_>>(),
            |r| measure.numeric_value(r).unwrap_or(f64::NAN),
            reducer,
        );

        let mut rows: Vec<AggregateRow> = grouped
            .into_iter()
            .map(|(keys, value, count)| AggregateRow { keys, value, count })
            .collect();

        for (i, key) in keys.iter().enumerate().rev() {
            if key.is_ordinal() {
                rows.sort_by(|a, b| a.keys[i].cmp(&b.keys[i]));
            }
        }

        debug!(
            "{:?} of {} by {:?}: {} rows from {} records",
            reducer,
            measure,
            keys,
            rows.len(),
            dataset.len()
        );

        Ok(Aggregate {
            keys: keys.to_vec(),
            measure,
            reducer,
            rows,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
