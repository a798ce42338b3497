use polars::prelude::*;
use serde::Serialize;

use crate::data::model::{float_values, NumericColumn};

/// First value of a one-row summary column, `None` when null or not finite.
fn scalar(summary: &DataFrame, name: &str) -> PolarsResult<Option<f64>> {
    let values = float_values(summary, name)?;
    Ok(values.first().copied().filter(|v| v.is_finite()))
}

fn numeric(column: NumericColumn) -> Expr {
    col(column.header()).cast(DataType::Float64)
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pairwise correlations of a fixed list of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    /// `values[i][j]` = corr(columns[i], columns[j]).
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation of every pair of `columns` over the rows of `frame`.
///
/// A coefficient is `None` with fewer than two rows or when either column
/// holds a single distinct value. The diagonal is exactly 1 whenever defined.
pub fn correlation_matrix(frame: &DataFrame, columns: &[NumericColumn]) -> PolarsResult<CorrelationMatrix> {
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    if frame.height() >= 2 {
        let mut exprs = Vec::new();
        for (i, &a) in columns.iter().enumerate() {
            exprs.push(col(a.header()).n_unique().alias(format!("distinct_{i}")));
            for (j, &b) in columns.iter().enumerate().skip(i + 1) {
                exprs.push(pearson_corr(numeric(a), numeric(b)).alias(format!("r_{i}_{j}")));
            }
        }
        let summary = frame.clone().lazy().select(exprs).collect()?;

        let mut varies = Vec::with_capacity(n);
        for i in 0..n {
            varies.push(scalar(&summary, &format!("distinct_{i}"))?.is_some_and(|d| d > 1.0));
        }
        for i in 0..n {
            if !varies[i] {
                continue;
            }
            values[i][i] = Some(1.0);
            for j in (i + 1)..n {
                if varies[j] {
                    let r = scalar(&summary, &format!("r_{i}_{j}"))?.map(|r| r.clamp(-1.0, 1.0));
                    values[i][j] = r;
                    values[j][i] = r;
                }
            }
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

// ---------------------------------------------------------------------------
// Box plot statistics
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Linearly interpolated quartiles of `value` over every row of `frame`,
/// whiskers at the most extreme values within 1.5 × IQR. `None` without rows.
pub fn box_stats(frame: &DataFrame, value: NumericColumn) -> PolarsResult<Option<BoxStats>> {
    let quartile = |q: f64, name: &str| numeric(value).quantile(lit(q), QuantileMethod::Linear).alias(name);
    let summary = frame
        .clone()
        .lazy()
        .select([
            quartile(0.25, "q1"),
            quartile(0.5, "median"),
            quartile(0.75, "q3"),
        ])
        .collect()?;

    let (Some(q1), Some(median), Some(q3)) = (
        scalar(&summary, "q1")?,
        scalar(&summary, "median")?,
        scalar(&summary, "q3")?,
    ) else {
        return Ok(None);
    };
    let iqr = q3 - q1;
    let fence = (q1 - 1.5 * iqr)..=(q3 + 1.5 * iqr);

    let mut sorted: Vec<f64> = float_values(frame, value.header())?
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();
    sorted.sort_by(f64::total_cmp);

    let (inside, outliers): (Vec<f64>, Vec<f64>) = sorted.iter().partition(|v| fence.contains(*v));
    Ok(Some(BoxStats {
        count: sorted.len(),
        lower_whisker: inside.first().copied().unwrap_or(q1),
        q1,
        median,
        q3,
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{dataset, record};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn prices(values: &[f64]) -> DataFrame {
        let records = values
            .iter()
            .enumerate()
            .map(|(i, p)| record(&i.to_string(), 2020, "A", *p, "Gas"))
            .collect();
        dataset(records).frame().clone()
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let mut rows = Vec::new();
        for (i, price) in [10_000.0, 20_000.0, 15_000.0, 30_000.0].into_iter().enumerate() {
            let mut r = record(&i.to_string(), 2020, "A", price, "Gas");
            r.satisfaction = 4.0 + i as f64;
            r.mileage = 1_000 * (4 - i as u32);
            rows.push(r);
        }
        let ds = dataset(rows);
        let m = correlation_matrix(ds.frame(), &NumericColumn::CORRELATED).unwrap();
        assert_eq!(m.columns.len(), 7);
        assert_eq!(m.get(NumericColumn::Price, NumericColumn::Price), Some(1.0));
        let ps = m.get(NumericColumn::Price, NumericColumn::Satisfaction).unwrap();
        let sp = m.get(NumericColumn::Satisfaction, NumericColumn::Price).unwrap();
        assert!(close(ps, sp));
        assert!(close(
            m.get(NumericColumn::Mileage, NumericColumn::Satisfaction).unwrap(),
            -1.0
        ));
        // Warranty is constant in the fixture.
        assert_eq!(m.get(NumericColumn::Warranty, NumericColumn::Price), None);
        assert_eq!(m.get(NumericColumn::Warranty, NumericColumn::Warranty), None);
    }

    #[test]
    fn correlation_of_fewer_than_two_rows_is_all_none() {
        let m = correlation_matrix(&prices(&[]), &NumericColumn::CORRELATED).unwrap();
        assert!(m.values.iter().flatten().all(Option::is_none));
        let m = correlation_matrix(&prices(&[1.0]), &NumericColumn::CORRELATED).unwrap();
        assert!(m.values.iter().flatten().all(Option::is_none));
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let stats = box_stats(&prices(&[4.0, 1.0, 3.0, 2.0]), NumericColumn::Price)
            .unwrap()
            .unwrap();
        assert!(close(stats.q1, 1.75));
        assert!(close(stats.median, 2.5));
        assert!(close(stats.q3, 3.25));
        assert_eq!((stats.lower_whisker, stats.upper_whisker), (1.0, 4.0));
    }

    #[test]
    fn box_stats_flags_outliers() {
        let stats = box_stats(&prices(&[10.0, 11.0, 12.0, 13.0, 14.0, 100.0]), NumericColumn::Price)
            .unwrap()
            .unwrap();
        assert_eq!(stats.count, 6);
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.lower_whisker, 10.0);
        assert_eq!(stats.upper_whisker, 14.0);
        assert!(stats.q1 <= stats.median && stats.median <= stats.q3);
        assert!(box_stats(&prices(&[]), NumericColumn::Price).unwrap().is_none());
    }
}
