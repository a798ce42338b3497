use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use super::model::{columns, SalesDataset};

// ---------------------------------------------------------------------------
// Selection: which years and brands are ticked
// ---------------------------------------------------------------------------

/// The user's current filter choice.
///
/// An empty set selects nothing; there is no implicit "all". The UI starts
/// from [`Selection::all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub years: BTreeSet<i32>,
    pub brands: BTreeSet<String>,
}

impl Selection {
    pub fn new(
        years: impl IntoIterator<Item = i32>,
        brands: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Selection {
            years: years.into_iter().collect(),
            brands: brands.into_iter().map(Into::into).collect(),
        }
    }

    /// Every year and brand observed in `dataset` (show everything).
    pub fn all(dataset: &SalesDataset) -> Self {
        Selection {
            years: dataset.years().clone(),
            brands: dataset.brands().clone(),
        }
    }

    /// Row predicate: sale year in `years` and brand in `brands`.
    pub fn predicate(&self) -> Expr {
        let years = Series::new("years".into(), self.years.iter().copied().collect::<Vec<i32>>());
        let brands = Series::new(
            "brands".into(),
            self.brands.iter().map(String::as_str).collect::<Vec<&str>>(),
        );
        col(columns::SALE_YEAR)
            .is_in(lit(years))
            .and(col(columns::BRAND).is_in(lit(brands)))
    }
}

/// Build the filtered dataset, rows in dataset order. `dataset` is left untouched.
pub fn filter(dataset: &SalesDataset, selection: &Selection) -> PolarsResult<SalesDataset> {
    let frame = if selection.years.is_empty() || selection.brands.is_empty() {
        dataset.frame().head(Some(0))
    } else {
        dataset
            .frame()
            .clone()
            .lazy()
            .filter(selection.predicate())
            .collect()?
    };
    SalesDataset::from_frame(frame)
}
