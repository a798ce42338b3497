use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use serde::Serialize;

use crate::data::model::{float_values, text_values};

use super::aggregate::{grouped, Order, Reducer, VALUE};

/// Counts of rows per (row label, column label) pair.
///
/// Labels are kept sorted. Pairs that never occur are not stored;
/// [`CrossTab::cell`] reads them as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossTab {
    columns: BTreeSet<String>,
    cells: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CrossTab {
    /// Count the rows of `frame` by `row_key` × `col_key`.
    pub fn count(frame: &DataFrame, row_key: &str, col_key: &str) -> PolarsResult<Self> {
        let pairs = grouped(frame, &[row_key, col_key], Reducer::Count, Order::Keys, None)?;
        let rows = text_values(&pairs, row_key)?;
        let cols = text_values(&pairs, col_key)?;
        let counts = float_values(&pairs, VALUE)?;

        let mut tab = CrossTab::default();
        for ((row, column), n) in rows.into_iter().zip(cols).zip(counts) {
            tab.columns.insert(column.clone());
            tab.cells.entry(row).or_default().insert(column, n as u64);
        }
        Ok(tab)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn column_labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Count for a pair, zero when absent.
    pub fn cell(&self, row: &str, column: &str) -> u64 {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(0)
    }

    pub fn row_total(&self, row: &str) -> u64 {
        self.cells.get(row).map(|r| r.values().sum()).unwrap_or(0)
    }

    /// Largest single cell, used to scale heatmap colours.
    pub fn max_cell(&self) -> u64 {
        self.cells
            .values()
            .flat_map(|r| r.values().copied())
            .max()
            .unwrap_or(0)
    }
}
