use polars::prelude::*;
use serde::Serialize;

use crate::data::model::{columns, float_values};

/// The three headline tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    /// Sum of sale prices, euros.
    pub total_revenue: f64,
    pub sale_count: usize,
    /// Mean satisfaction score; `None` when there are no sales.
    pub average_satisfaction: Option<f64>,
}

impl Kpis {
    pub fn compute(frame: &DataFrame) -> PolarsResult<Self> {
        let summary = frame
            .clone()
            .lazy()
            .select([
                col(columns::PRICE).sum().alias("revenue"),
                col(columns::SATISFACTION).mean().alias("satisfaction"),
            ])
            .collect()?;
        let revenue = float_values(&summary, "revenue")?;
        let satisfaction = float_values(&summary, "satisfaction")?;

        Ok(Kpis {
            total_revenue: revenue.first().copied().filter(|v| v.is_finite()).unwrap_or(0.0),
            sale_count: frame.height(),
            average_satisfaction: satisfaction.first().copied().filter(|v| v.is_finite()),
        })
    }
}

/// `numerator / total * 100`, zero when `total` is zero.
pub fn percent(numerator: f64, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        numerator / total as f64 * 100.0
    }
}
