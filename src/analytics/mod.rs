/// Aggregation layer: group-by/reduce, ranking, cross-tabulation and
/// descriptive statistics, all expressed as polars lazy queries over the
/// sales [`DataFrame`](polars::prelude::DataFrame).
///
/// An empty frame gives an empty ranking, an empty cross-tab, or `None`.
/// Errors only come from polars itself (a missing column, a failed cast).

pub mod aggregate;
pub mod crosstab;
pub mod stats;
