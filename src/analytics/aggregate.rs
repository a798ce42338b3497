use polars::prelude::*;

use crate::data::model::{float_values, text_values, NumericColumn};

/// An ordered sequence of `(group, value)` pairs, the shape every chart takes.
pub type Ranking<K> = Vec<(K, f64)>;

/// Name of the reduced column in every grouped frame.
pub const VALUE: &str = "value";

/// How a group of rows collapses to one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Count,
    Sum(NumericColumn),
    Mean(NumericColumn),
}

impl Reducer {
    /// Aggregation expression producing [`VALUE`] as `Float64`.
    pub fn expr(self) -> Expr {
        let reduced = match self {
            Reducer::Count => len().cast(DataType::Float64),
            Reducer::Sum(c) => col(c.header()).cast(DataType::Float64).sum(),
            Reducer::Mean(c) => col(c.header()).cast(DataType::Float64).mean(),
        };
        reduced.alias(VALUE)
    }
}

/// Order of the groups in a grouped frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// As the groups first appear in the rows.
    FirstSeen,
    /// Largest value first; ties keep first-seen order.
    Descending,
    /// Smallest value first; ties by group keys.
    Ascending,
    /// By group keys.
    Keys,
}

/// Group `frame` by `keys`, reduce each group to [`VALUE`], order, and keep
/// at most `limit` groups.
pub fn grouped(
    frame: &DataFrame,
    keys: &[&str],
    reducer: Reducer,
    order: Order,
    limit: Option<usize>,
) -> PolarsResult<DataFrame> {
    let by: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    let stable = SortMultipleOptions::default().with_maintain_order(true);

    let mut lf = frame
        .clone()
        .lazy()
        .group_by_stable(by.clone())
        .agg([reducer.expr()]);
    lf = match order {
        Order::FirstSeen => lf,
        Order::Descending => lf.sort_by_exprs([col(VALUE)], stable.with_order_descending(true)),
        Order::Ascending => {
            let by_value: Vec<Expr> = std::iter::once(col(VALUE)).chain(by.iter().cloned()).collect();
            lf.sort_by_exprs(by_value, stable)
        }
        Order::Keys => lf.sort_by_exprs(by, stable),
    };
    if let Some(n) = limit {
        lf = lf.limit(n as IdxSize);
    }
    lf.collect()
}

/// Read a single-key grouped frame back as `(label, value)` pairs.
fn ranking(grouped: &DataFrame, key: &str) -> PolarsResult<Ranking<String>> {
    let labels = text_values(grouped, key)?;
    let values = float_values(grouped, VALUE)?;
    Ok(labels.into_iter().zip(values).collect())
}

/// Group by one text column and reduce, in `order`.
pub fn aggregate(frame: &DataFrame, key: &str, reducer: Reducer, order: Order) -> PolarsResult<Ranking<String>> {
    ranking(&grouped(frame, &[key], reducer, order, None)?, key)
}

/// Counts per group, most frequent first.
pub fn value_counts(frame: &DataFrame, key: &str) -> PolarsResult<Ranking<String>> {
    aggregate(frame, key, Reducer::Count, Order::Descending)
}

/// The `n` most frequent groups.
pub fn top_n(frame: &DataFrame, key: &str, n: usize) -> PolarsResult<Ranking<String>> {
    ranking(&grouped(frame, &[key], Reducer::Count, Order::Descending, Some(n))?, key)
}

/// Group with the largest reduced value; on a tie the smallest key wins.
pub fn arg_max(frame: &DataFrame, key: &str, reducer: Reducer) -> PolarsResult<Option<String>> {
    extreme(frame, key, reducer, true)
}

/// Group with the smallest reduced value; on a tie the smallest key wins.
pub fn arg_min(frame: &DataFrame, key: &str, reducer: Reducer) -> PolarsResult<Option<String>> {
    extreme(frame, key, reducer, false)
}

fn extreme(frame: &DataFrame, key: &str, reducer: Reducer, largest: bool) -> PolarsResult<Option<String>> {
    let best = frame
        .clone()
        .lazy()
        .group_by_stable([col(key)])
        .agg([reducer.expr()])
        .sort_by_exprs(
            [col(VALUE), col(key)],
            SortMultipleOptions::default().with_order_descending_multi([largest, false]),
        )
        .limit(1)
        .collect()?;
    Ok(text_values(&best, key)?.into_iter().next())
}
