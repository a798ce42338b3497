//! View model: everything the dashboard draws, computed from the full dataset
//! and the current selection.
//!
//! [`build_dashboard`] is the only entry point. The UI calls it whenever the
//! selection changes and draws the returned [`DashboardView`] every frame.
//! Tiles and charts describe the filtered rows; the sidebar key metrics and
//! the insights narrative describe the whole dataset.

use polars::prelude::*;
use serde::Serialize;

use crate::analytics::aggregate::{aggregate, grouped, top_n, value_counts, Order, Ranking, Reducer, VALUE};
use crate::analytics::crosstab::CrossTab;
use crate::analytics::stats::{box_stats, correlation_matrix, BoxStats, CorrelationMatrix};
use crate::data::filter::{filter, Selection};
use crate::data::model::{columns, float_values, int_values, text_values, NumericColumn, SalesDataset};

pub mod format;
pub mod insights;
pub mod kpi;

use insights::Insights;
use kpi::{percent, Kpis};

/// Brands in the "top brands" bar chart.
pub const TOP_BRANDS: usize = 10;
/// (brand, model) pairs in the "top models" chart.
pub const TOP_MODELS: usize = 10;
/// Brands in the price distribution box plot.
pub const PRICE_BRANDS: usize = 5;

// ---------------------------------------------------------------------------
// View structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    /// Tiles over the filtered rows.
    pub kpis: Kpis,
    /// Sidebar key metrics over the full dataset.
    pub sidebar_kpis: Kpis,
    pub overview: OverviewView,
    pub sales: SalesView,
    pub customers: CustomersView,
    pub insights: Insights,
    pub correlation: CorrelationMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualPoint {
    pub year: i32,
    pub sales: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    /// One point per year, in year order.
    pub annual: Vec<AnnualPoint>,
    pub top_brands: Ranking<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BrandModel {
    pub brand: String,
    pub model: String,
}

impl BrandModel {
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// Price spread of one (brand, fuel type) pair.
#[derive(Debug, Clone, Serialize)]
pub struct PriceBox {
    pub brand: String,
    pub fuel_type: String,
    pub stats: BoxStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesView {
    /// Revenue per country, smallest first.
    pub revenue_by_country: Ranking<String>,
    pub top_models: Ranking<BrandModel>,
    pub brand_fuel: CrossTab,
    /// Brands of the box plot, most sold first.
    pub price_brands: Vec<String>,
    pub price_boxes: Vec<PriceBox>,
}

/// A category count with its share of the filtered rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterGroup {
    pub client_type: String,
    /// `[price, satisfaction]` pairs.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomersView {
    pub client_types: Vec<Share>,
    pub client_by_brand: CrossTab,
    /// Mean satisfaction per brand, lowest first.
    pub satisfaction_by_brand: Ranking<String>,
    pub price_vs_satisfaction: Vec<ScatterGroup>,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Compute the whole dashboard for `selection`.
pub fn build_dashboard(full: &SalesDataset, selection: &Selection) -> PolarsResult<DashboardView> {
    let filtered = filter(full, selection)?;
    let rows = filtered.frame();

    Ok(DashboardView {
        selection: selection.clone(),
        kpis: Kpis::compute(rows)?,
        sidebar_kpis: Kpis::compute(full.frame())?,
        overview: overview(rows)?,
        sales: sales(rows)?,
        customers: customers(rows)?,
        insights: Insights::compute(full)?,
        correlation: correlation_matrix(rows, &NumericColumn::CORRELATED)?,
    })
}

fn overview(rows: &DataFrame) -> PolarsResult<OverviewView> {
    let annual = rows
        .clone()
        .lazy()
        .group_by([col(columns::SALE_YEAR)])
        .agg([len().alias("sales"), col(columns::PRICE).sum().alias("revenue")])
        .sort_by_exprs([col(columns::SALE_YEAR)], SortMultipleOptions::default())
        .collect()?;
    let annual = int_values(&annual, columns::SALE_YEAR)?
        .into_iter()
        .zip(float_values(&annual, "sales")?)
        .zip(float_values(&annual, "revenue")?)
        .map(|((year, sales), revenue)| AnnualPoint {
            year,
            sales: sales as usize,
            revenue,
        })
        .collect();

    Ok(OverviewView {
        annual,
        top_brands: top_n(rows, columns::BRAND, TOP_BRANDS)?,
    })
}

/// Rows of `frame` whose `column` equals `label`.
fn rows_with(frame: &DataFrame, column: &str, label: &str) -> PolarsResult<DataFrame> {
    frame.clone().lazy().filter(col(column).eq(lit(label))).collect()
}

fn sales(rows: &DataFrame) -> PolarsResult<SalesView> {
    let revenue_by_country = aggregate(
        rows,
        columns::COUNTRY,
        Reducer::Sum(NumericColumn::Price),
        Order::Ascending,
    )?;

    let models = grouped(
        rows,
        &[columns::BRAND, columns::MODEL],
        Reducer::Count,
        Order::Descending,
        Some(TOP_MODELS),
    )?;
    let top_models = text_values(&models, columns::BRAND)?
        .into_iter()
        .zip(text_values(&models, columns::MODEL)?)
        .zip(float_values(&models, VALUE)?)
        .map(|((brand, model), n)| (BrandModel { brand, model }, n))
        .collect();

    let price_brands: Vec<String> = top_n(rows, columns::BRAND, PRICE_BRANDS)?
        .into_iter()
        .map(|(b, _)| b)
        .collect();

    let mut price_boxes = Vec::new();
    for brand in &price_brands {
        let of_brand = rows_with(rows, columns::BRAND, brand)?;
        for (fuel_type, _) in aggregate(&of_brand, columns::FUEL_TYPE, Reducer::Count, Order::Keys)? {
            let group = rows_with(&of_brand, columns::FUEL_TYPE, &fuel_type)?;
            if let Some(stats) = box_stats(&group, NumericColumn::Price)? {
                price_boxes.push(PriceBox {
                    brand: brand.clone(),
                    fuel_type,
                    stats,
                });
            }
        }
    }

    Ok(SalesView {
        revenue_by_country,
        top_models,
        brand_fuel: CrossTab::count(rows, columns::BRAND, columns::FUEL_TYPE)?,
        price_brands,
        price_boxes,
    })
}

fn customers(rows: &DataFrame) -> PolarsResult<CustomersView> {
    let client_types = value_counts(rows, columns::CLIENT_TYPE)?
        .into_iter()
        .map(|(label, n)| Share {
            label,
            count: n as usize,
            percent: percent(n, rows.height()),
        })
        .collect();

    let satisfaction_by_brand = aggregate(
        rows,
        columns::BRAND,
        Reducer::Mean(NumericColumn::Satisfaction),
        Order::Ascending,
    )?;

    let mut price_vs_satisfaction = Vec::new();
    for (client_type, _) in aggregate(rows, columns::CLIENT_TYPE, Reducer::Count, Order::FirstSeen)? {
        let group = rows_with(rows, columns::CLIENT_TYPE, &client_type)?;
        let points = float_values(&group, columns::PRICE)?
            .into_iter()
            .zip(float_values(&group, columns::SATISFACTION)?)
            .map(|(price, score)| [price, score])
            .collect();
        price_vs_satisfaction.push(ScatterGroup { client_type, points });
    }

    Ok(CustomersView {
        client_types,
        client_by_brand: CrossTab::count(rows, columns::BRAND, columns::CLIENT_TYPE)?,
        satisfaction_by_brand,
        price_vs_satisfaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SaleRecord;
    use crate::data::test_support::{dataset, record, three_sales};

    #[test]
    fn dashboard_for_the_three_sale_scenario() {
        let ds = three_sales();
        let view = build_dashboard(&ds, &Selection::new([2020], ["A"])).unwrap();

        assert_eq!(view.kpis.sale_count, 2);
        assert_eq!(view.kpis.total_revenue, 15_000.0);
        assert_eq!(view.sidebar_kpis.sale_count, 3);
        assert_eq!(view.sidebar_kpis.total_revenue, 35_000.0);
        assert_eq!(
            view.overview.annual,
            vec![AnnualPoint { year: 2020, sales: 2, revenue: 15_000.0 }]
        );
        assert_eq!(view.overview.top_brands, vec![("A".to_string(), 2.0)]);
        assert_eq!(view.sales.price_brands, vec!["A".to_string()]);
        // One box per fuel type of brand A, fuel types sorted.
        let fuels: Vec<_> = view.sales.price_boxes.iter().map(|b| b.fuel_type.as_str()).collect();
        assert_eq!(fuels, vec!["Electric", "Gas"]);
    }

    #[test]
    fn unmatched_brand_renders_empty_views() {
        let ds = three_sales();
        let view = build_dashboard(&ds, &Selection::new([2020, 2021], ["Nobody"])).unwrap();

        assert_eq!(view.kpis.sale_count, 0);
        assert_eq!(view.kpis.average_satisfaction, None);
        assert!(view.overview.annual.is_empty());
        assert!(view.overview.top_brands.is_empty());
        assert!(view.sales.revenue_by_country.is_empty());
        assert!(view.sales.top_models.is_empty());
        assert!(view.sales.brand_fuel.is_empty());
        assert!(view.sales.price_boxes.is_empty());
        assert!(view.customers.client_types.is_empty());
        assert!(view.customers.client_by_brand.is_empty());
        assert!(view.customers.satisfaction_by_brand.is_empty());
        assert!(view.customers.price_vs_satisfaction.is_empty());
        assert!(view.correlation.values.iter().flatten().all(Option::is_none));
        // The narrative still describes the whole dataset.
        assert_eq!(view.insights.headline_brands, vec!["A", "B"]);
    }

    #[test]
    fn percentages_follow_the_filtered_rows_for_tiles() {
        let mut rows = vec![
            record("1", 2020, "A", 1.0, "Gas"),
            record("2", 2020, "A", 1.0, "Gas"),
            record("3", 2020, "B", 1.0, "Gas"),
            record("4", 2021, "B", 1.0, "Gas"),
        ];
        rows[0].client_type = "Professionnel".into();
        let ds = dataset(rows);
        let view = build_dashboard(&ds, &Selection::new([2020], ["A"])).unwrap();

        let shares = &view.customers.client_types;
        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|s| s.percent == 50.0));
        // Headline share is against all four rows.
        assert_eq!(view.insights.headline_share, 100.0);
    }

    #[test]
    fn rankings_are_bounded() {
        let rows: Vec<SaleRecord> = (0..30)
            .map(|i| record(&i.to_string(), 2020, &format!("Brand{}", i % 12), 1_000.0 * i as f64, "Gas"))
            .collect();
        let ds = dataset(rows);
        let view = build_dashboard(&ds, &Selection::all(&ds)).unwrap();

        assert_eq!(view.overview.top_brands.len(), TOP_BRANDS);
        assert_eq!(view.sales.top_models.len(), TOP_MODELS);
        assert_eq!(view.sales.price_brands.len(), PRICE_BRANDS);
        assert!(view.overview.top_brands.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!(view
            .sales
            .revenue_by_country
            .windows(2)
            .all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn view_serializes_to_json() {
        let ds = three_sales();
        let view = build_dashboard(&ds, &Selection::all(&ds)).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kpis"]["sale_count"], 3);
        assert!(json["sales"]["brand_fuel"].is_object());
    }
}
