use polars::prelude::*;
use serde::Serialize;

use crate::analytics::aggregate::{arg_max, arg_min, grouped, top_n, value_counts, Order, Reducer, VALUE};
use crate::data::model::{columns, float_values, text_values, ClientSegment, NumericColumn, SalesDataset};

use super::kpi::percent;

/// Headline brands in the narrative summary.
pub const HEADLINE_BRANDS: usize = 3;

/// Narrative figures. Always computed on the full, unfiltered dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub headline_brands: Vec<String>,
    /// Combined share of the headline brands in all sales, percent.
    pub headline_share: f64,
    /// Mean year-over-year revenue change, percent. `None` with fewer than two years.
    pub revenue_growth: Option<f64>,
    /// How much more satisfied professional clients are than individuals, percent.
    pub satisfaction_gap: Option<f64>,
    pub dominant_fuel: Option<String>,
    pub dominant_fuel_share: f64,
    pub recommendations: Recommendations,
}

/// Inputs of the two recommendation lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    /// Country with the highest revenue.
    pub top_country: Option<String>,
    /// Model with the highest mean price.
    pub priciest_model: Option<String>,
    /// Fuel type with the highest mean price.
    pub priciest_fuel: Option<String>,
    /// Most frequent client type.
    pub main_client_type: Option<String>,
    /// Client type with the highest mean price.
    pub premium_client_type: Option<String>,
    /// Model with the lowest mean satisfaction.
    pub least_satisfying_model: Option<String>,
}

impl Insights {
    pub fn compute(full: &SalesDataset) -> PolarsResult<Self> {
        let frame = full.frame();
        let total = full.len();

        let headline = top_n(frame, columns::BRAND, HEADLINE_BRANDS)?;
        let headline_share = percent(headline.iter().map(|(_, n)| n).sum(), total);

        let fuels = value_counts(frame, columns::FUEL_TYPE)?;
        let (dominant_fuel, dominant_fuel_share) = match fuels.first() {
            Some((fuel, n)) => (Some(fuel.clone()), percent(*n, total)),
            None => (None, 0.0),
        };

        Ok(Insights {
            headline_brands: headline.into_iter().map(|(b, _)| b).collect(),
            headline_share,
            revenue_growth: revenue_growth(frame)?,
            satisfaction_gap: satisfaction_gap(frame)?,
            dominant_fuel,
            dominant_fuel_share,
            recommendations: Recommendations::compute(frame)?,
        })
    }
}

impl Recommendations {
    pub fn compute(frame: &DataFrame) -> PolarsResult<Self> {
        let mean_price = Reducer::Mean(NumericColumn::Price);

        Ok(Recommendations {
            top_country: arg_max(frame, columns::COUNTRY, Reducer::Sum(NumericColumn::Price))?,
            priciest_model: arg_max(frame, columns::MODEL, mean_price)?,
            priciest_fuel: arg_max(frame, columns::FUEL_TYPE, mean_price)?,
            main_client_type: top_n(frame, columns::CLIENT_TYPE, 1)?.into_iter().next().map(|(k, _)| k),
            premium_client_type: arg_max(frame, columns::CLIENT_TYPE, mean_price)?,
            least_satisfying_model: arg_min(frame, columns::MODEL, Reducer::Mean(NumericColumn::Satisfaction))?,
        })
    }
}

/// Mean of the year-over-year relative revenue changes, in year order.
/// A year following a zero-revenue year contributes nothing.
pub fn revenue_growth(frame: &DataFrame) -> PolarsResult<Option<f64>> {
    let annual = grouped(
        frame,
        &[columns::SALE_YEAR],
        Reducer::Sum(NumericColumn::Price),
        Order::Keys,
        None,
    )?;
    let changes: Vec<f64> = float_values(&annual, VALUE)?
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect();
    Ok((!changes.is_empty()).then(|| changes.iter().sum::<f64>() / changes.len() as f64))
}

/// `(mean professional − mean individual) / mean individual × 100`.
pub fn satisfaction_gap(frame: &DataFrame) -> PolarsResult<Option<f64>> {
    let by_client = frame
        .clone()
        .lazy()
        .group_by_stable([col(columns::CLIENT_TYPE)])
        .agg([
            col(columns::SATISFACTION).sum().alias("score"),
            len().alias("sales"),
        ])
        .collect()?;
    let labels = text_values(&by_client, columns::CLIENT_TYPE)?;
    let scores = float_values(&by_client, "score")?;
    let sales = float_values(&by_client, "sales")?;

    let segment_mean = |segment: ClientSegment| {
        let (score, n) = labels
            .iter()
            .zip(scores.iter().zip(&sales))
            .filter(|(label, _)| ClientSegment::classify(label) == Some(segment))
            .fold((0.0, 0.0), |(s, n), (_, (score, count))| (s + score, n + count));
        (n > 0.0).then(|| score / n)
    };
    let (Some(pro), Some(ind)) = (
        segment_mean(ClientSegment::Professional),
        segment_mean(ClientSegment::Individual),
    ) else {
        return Ok(None);
    };
    if ind == 0.0 {
        return Ok(None);
    }
    Ok(Some((pro - ind) / ind * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SaleRecord;
    use crate::data::test_support::{dataset, record};

    fn frame(rows: Vec<SaleRecord>) -> DataFrame {
        dataset(rows).frame().clone()
    }

    fn sale(id: &str, year: i32, brand: &str, price: f64, client: &str, score: f64) -> SaleRecord {
        let mut r = record(id, year, brand, price, "Diesel");
        r.client_type = client.to_string();
        r.satisfaction = score;
        r
    }

    #[test]
    fn headline_brands_share_uses_all_rows() {
        let ds = dataset(vec![
            record("1", 2020, "A", 1.0, "Gas"),
            record("2", 2020, "B", 1.0, "Gas"),
            record("3", 2020, "A", 1.0, "Gas"),
            record("4", 2020, "C", 1.0, "Electric"),
            record("5", 2020, "D", 1.0, "Gas"),
        ]);
        let ins = Insights::compute(&ds).unwrap();
        assert_eq!(ins.headline_brands, vec!["A", "B", "C"]);
        assert_eq!(ins.headline_share, 80.0);
        assert_eq!(ins.dominant_fuel.as_deref(), Some("Gas"));
        assert_eq!(ins.dominant_fuel_share, 80.0);
    }

    #[test]
    fn growth_is_mean_of_yearly_changes() {
        let rows = vec![
            record("1", 2020, "A", 100.0, "Gas"),
            record("2", 2021, "A", 150.0, "Gas"),
            record("3", 2022, "A", 120.0, "Gas"),
        ];
        // +50% then -20%
        let g = revenue_growth(&frame(rows.clone())).unwrap().unwrap();
        assert!((g - 15.0).abs() < 1e-9);
        assert_eq!(revenue_growth(&frame(rows[..1].to_vec())).unwrap(), None);
    }

    #[test]
    fn satisfaction_gap_compares_segments() {
        let rows = vec![
            sale("1", 2020, "A", 1.0, "Professionnel", 9.0),
            sale("2", 2020, "A", 1.0, "Particulier", 8.0),
            sale("3", 2020, "A", 1.0, "Particulier", 7.0),
        ];
        let gap = satisfaction_gap(&frame(rows.clone())).unwrap().unwrap();
        assert!((gap - 20.0).abs() < 1e-9);
        assert_eq!(satisfaction_gap(&frame(rows[1..].to_vec())).unwrap(), None);
    }

    #[test]
    fn recommendations_pick_extremes() {
        let mut rows = vec![
            sale("1", 2020, "A", 30_000.0, "Professionnel", 9.0),
            sale("2", 2020, "B", 10_000.0, "Particulier", 4.0),
            sale("3", 2020, "B", 12_000.0, "Particulier", 6.0),
        ];
        rows[0].model = "Zoe".into();
        rows[0].country = "Allemagne".into();
        rows[1].model = "Clio".into();
        rows[2].model = "Clio".into();
        rows[0].fuel_type = "Electrique".into();

        let rec = Recommendations::compute(&frame(rows)).unwrap();
        assert_eq!(rec.top_country.as_deref(), Some("Allemagne"));
        assert_eq!(rec.priciest_model.as_deref(), Some("Zoe"));
        assert_eq!(rec.priciest_fuel.as_deref(), Some("Electrique"));
        assert_eq!(rec.main_client_type.as_deref(), Some("Particulier"));
        assert_eq!(rec.premium_client_type.as_deref(), Some("Professionnel"));
        assert_eq!(rec.least_satisfying_model.as_deref(), Some("Clio"));
    }

    #[test]
    fn empty_dataset_gives_blank_insights() {
        let ins = Insights::compute(&dataset(Vec::new())).unwrap();
        assert!(ins.headline_brands.is_empty());
        assert_eq!(ins.headline_share, 0.0);
        assert_eq!(ins.revenue_growth, None);
        assert_eq!(ins.dominant_fuel, None);
        assert_eq!(ins.recommendations, Recommendations::default());
    }
}
