use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

/// Exact header names of the sales spreadsheet, unit annotations included.
pub mod columns {
    pub const SALE_ID: &str = "ID_vente";
    pub const SALE_DATE: &str = "Date_vente";
    pub const BRAND: &str = "Marque";
    pub const MODEL: &str = "Modèle";
    pub const COUNTRY: &str = "Pays_vente";
    pub const PRICE: &str = "Prix_vente (€)";
    pub const MODEL_YEAR: &str = "Année_modèle";
    pub const MILEAGE: &str = "Kilométrage (km)";
    pub const WARRANTY: &str = "Garantie (mois)";
    pub const CLIENT_TYPE: &str = "Client_type";
    pub const SATISFACTION: &str = "Score_satisfaction_client (1-10)";
    pub const DISCOUNT: &str = "Remise (€)";
    pub const DELIVERY_DELAY: &str = "Délai_livraison (jours)";
    pub const FUEL_TYPE: &str = "Type_carburant";

    /// Derived from the sale date when the table is built; never read from the file.
    pub const SALE_YEAR: &str = "Année_vente";

    /// Every column the loader requires, in spreadsheet order.
    pub const REQUIRED: [&str; 14] = [
        SALE_ID,
        SALE_DATE,
        BRAND,
        MODEL,
        COUNTRY,
        PRICE,
        MODEL_YEAR,
        MILEAGE,
        WARRANTY,
        CLIENT_TYPE,
        SATISFACTION,
        DISCOUNT,
        DELIVERY_DELAY,
        FUEL_TYPE,
    ];
}

// ---------------------------------------------------------------------------
// CellValue – one untyped cell as read from any file format
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, the common currency between the format readers
/// and the schema mapping in the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a whole number. Floats must have no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            CellValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| CellValue::Float(s.parse().ok()?).as_i64())
            }
            _ => None,
        }
    }

    /// Interpret the value as text. Numbers are rendered, nulls are rejected.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Interpret the value as a calendar date. ISO strings (with or without a
    /// time part) are accepted.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::String(s) => parse_date_str(s),
            _ => None,
        }
    }
}

/// Parses an ISO-style date or datetime string, keeping the date part.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // "2021-03-04", "2021-03-04 10:00:00", "2021-03-04T10:00:00.000"
    let date_part = s.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// SaleRecord – one row of the spreadsheet
// ---------------------------------------------------------------------------

/// A single vehicle transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub sale_id: String,
    pub sale_date: NaiveDate,
    pub brand: String,
    pub model: String,
    pub country: String,
    /// Sale price in euros.
    pub price: f64,
    pub model_year: i32,
    /// Mileage in km.
    pub mileage: u32,
    pub warranty_months: u32,
    pub client_type: String,
    /// Customer satisfaction, 1–10.
    pub satisfaction: f64,
    /// Discount in euros.
    pub discount: f64,
    pub delivery_delay_days: u32,
    pub fuel_type: String,
}

impl SaleRecord {
    /// Sale year, always derived from the sale date.
    pub fn sale_year(&self) -> i32 {
        self.sale_date.year()
    }
}

/// The two customer populations the narrative compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClientSegment {
    Individual,
    Professional,
}

impl ClientSegment {
    /// Classify a raw `Client_type` label ("Particulier", "Professionnel",
    /// "Individual", "Professional", any case).
    pub fn classify(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        if lower.starts_with("pro") {
            Some(ClientSegment::Professional)
        } else if lower.starts_with("part") || lower.starts_with("indiv") {
            Some(ClientSegment::Individual)
        } else {
            None
        }
    }
}

/// Numeric columns usable as reducer inputs and in the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericColumn {
    Price,
    ModelYear,
    Mileage,
    Warranty,
    Satisfaction,
    Discount,
    DeliveryDelay,
}

impl NumericColumn {
    /// The seven columns of the correlation matrix, in display order.
    pub const CORRELATED: [NumericColumn; 7] = [
        NumericColumn::Price,
        NumericColumn::ModelYear,
        NumericColumn::Mileage,
        NumericColumn::Warranty,
        NumericColumn::Satisfaction,
        NumericColumn::Discount,
        NumericColumn::DeliveryDelay,
    ];

    /// Source header of the column.
    pub fn header(self) -> &'static str {
        match self {
            NumericColumn::Price => columns::PRICE,
            NumericColumn::ModelYear => columns::MODEL_YEAR,
            NumericColumn::Mileage => columns::MILEAGE,
            NumericColumn::Warranty => columns::WARRANTY,
            NumericColumn::Satisfaction => columns::SATISFACTION,
            NumericColumn::Discount => columns::DISCOUNT,
            NumericColumn::DeliveryDelay => columns::DELIVERY_DELAY,
        }
    }

    /// Short label for axes and heatmap headers.
    pub fn label(self) -> &'static str {
        match self {
            NumericColumn::Price => "Price (€)",
            NumericColumn::ModelYear => "Model year",
            NumericColumn::Mileage => "Mileage (km)",
            NumericColumn::Warranty => "Warranty (months)",
            NumericColumn::Satisfaction => "Satisfaction",
            NumericColumn::Discount => "Discount (€)",
            NumericColumn::DeliveryDelay => "Delivery (days)",
        }
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An immutable sales table with pre-computed filter options.
///
/// The table holds every source column under its spreadsheet header, dates
/// as `Date`, plus the derived [`columns::SALE_YEAR`]. The full dataset is
/// built once at startup and shared behind an `Arc`; reloading the file
/// requires restarting the process. Filtered subsets are built per selection
/// and dropped afterwards.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    frame: DataFrame,
    years: BTreeSet<i32>,
    brands: BTreeSet<String>,
}

impl SalesDataset {
    /// Lay the records out as columns and index their years and brands.
    pub fn from_records(records: &[SaleRecord]) -> PolarsResult<Self> {
        let epoch = NaiveDate::default();
        let days: Vec<i32> = records
            .iter()
            .map(|r| (r.sale_date - epoch).num_days() as i32)
            .collect();

        let frame = DataFrame::new(vec![
            text_column(columns::SALE_ID, records, |r| r.sale_id.as_str()),
            Column::new(columns::SALE_DATE.into(), days).cast(&DataType::Date)?,
            text_column(columns::BRAND, records, |r| r.brand.as_str()),
            text_column(columns::MODEL, records, |r| r.model.as_str()),
            text_column(columns::COUNTRY, records, |r| r.country.as_str()),
            Column::new(columns::PRICE.into(), values(records, |r| r.price)),
            Column::new(columns::MODEL_YEAR.into(), values(records, |r| r.model_year)),
            Column::new(columns::MILEAGE.into(), values(records, |r| r.mileage)),
            Column::new(columns::WARRANTY.into(), values(records, |r| r.warranty_months)),
            text_column(columns::CLIENT_TYPE, records, |r| r.client_type.as_str()),
            Column::new(columns::SATISFACTION.into(), values(records, |r| r.satisfaction)),
            Column::new(columns::DISCOUNT.into(), values(records, |r| r.discount)),
            Column::new(columns::DELIVERY_DELAY.into(), values(records, |r| r.delivery_delay_days)),
            text_column(columns::FUEL_TYPE, records, |r| r.fuel_type.as_str()),
            Column::new(columns::SALE_YEAR.into(), values(records, SaleRecord::sale_year)),
        ])?;
        Self::from_frame(frame)
    }

    /// Wrap a table that already has the dataset's columns.
    pub fn from_frame(frame: DataFrame) -> PolarsResult<Self> {
        let years = int_values(&frame, columns::SALE_YEAR)?.into_iter().collect();
        let brands = text_values(&frame, columns::BRAND)?.into_iter().collect();
        Ok(SalesDataset { frame, years, brands })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Sorted distinct sale years.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Sorted distinct brands.
    pub fn brands(&self) -> &BTreeSet<String> {
        &self.brands
    }

    /// Number of sales.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

impl PartialEq for SalesDataset {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

fn text_column(name: &str, records: &[SaleRecord], f: impl Fn(&SaleRecord) -> &str) -> Column {
    Column::new(name.into(), records.iter().map(f).collect::<Vec<_>>())
}

fn values<T>(records: &[SaleRecord], f: impl Fn(&SaleRecord) -> T) -> Vec<T> {
    records.iter().map(f).collect()
}

// ---------------------------------------------------------------------------
// Column access
// ---------------------------------------------------------------------------

/// Non-null values of a string column, in row order.
pub fn text_values(frame: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let column = frame.column(name)?.as_materialized_series();
    Ok(column.str()?.into_iter().flatten().map(str::to_owned).collect())
}

/// Values of a numeric column as `f64`, in row order. Nulls read as NaN.
pub fn float_values(frame: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let column = frame.column(name)?.cast(&DataType::Float64)?;
    let values = column
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Non-null values of an integer column as `i32`, in row order.
pub fn int_values(frame: &DataFrame, name: &str) -> PolarsResult<Vec<i32>> {
    let column = frame.column(name)?.cast(&DataType::Int32)?;
    let values = column.as_materialized_series().i32()?.into_iter().flatten().collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{dataset, record};

    #[test]
    fn sale_year_follows_sale_date() {
        let r = record("1", 2021, "Renault", 12_000.0, "Diesel");
        assert_eq!(r.sale_year(), 2021);
        assert_eq!(r.sale_date.year(), r.sale_year());
    }

    #[test]
    fn dataset_indexes_distinct_years_and_brands() {
        let ds = dataset(vec![
            record("1", 2021, "Peugeot", 1.0, "Gas"),
            record("2", 2020, "Audi", 1.0, "Gas"),
            record("3", 2021, "Audi", 1.0, "Gas"),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.years().iter().copied().collect::<Vec<_>>(), vec![2020, 2021]);
        assert_eq!(
            ds.brands().iter().cloned().collect::<Vec<_>>(),
            vec!["Audi".to_string(), "Peugeot".to_string()]
        );
    }

    #[test]
    fn frame_has_every_column_and_typed_dates() {
        let ds = dataset(vec![record("7", 2022, "Kia", 18_500.0, "Hybride")]);
        let frame = ds.frame();
        for name in columns::REQUIRED {
            assert!(frame.column(name).is_ok(), "missing {name}");
        }
        assert_eq!(frame.column(columns::SALE_DATE).unwrap().dtype(), &DataType::Date);
        assert_eq!(int_values(frame, columns::SALE_YEAR).unwrap(), vec![2022]);
        assert_eq!(float_values(frame, columns::PRICE).unwrap(), vec![18_500.0]);
        assert_eq!(text_values(frame, columns::FUEL_TYPE).unwrap(), vec!["Hybride"]);
    }

    #[test]
    fn empty_dataset_keeps_its_columns() {
        let ds = dataset(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.years().is_empty());
        assert_eq!(ds.frame().width(), columns::REQUIRED.len() + 1);
    }

    #[test]
    fn integer_cells_accept_whole_floats_only() {
        assert_eq!(CellValue::Float(2019.0).as_i64(), Some(2019));
        assert_eq!(CellValue::Float(2019.5).as_i64(), None);
        assert_eq!(CellValue::String(" 42 ".into()).as_i64(), Some(42));
        assert_eq!(CellValue::String("42.0".into()).as_i64(), Some(42));
        assert_eq!(CellValue::Null.as_i64(), None);
    }

    #[test]
    fn dates_parse_with_or_without_time() {
        let d = NaiveDate::from_ymd_opt(2022, 5, 17).unwrap();
        assert_eq!(parse_date_str("2022-05-17"), Some(d));
        assert_eq!(parse_date_str("2022-05-17 13:45:00"), Some(d));
        assert_eq!(parse_date_str("2022-05-17T13:45:00.000"), Some(d));
        assert_eq!(parse_date_str("17/05/2022"), None);
        assert_eq!(parse_date_str(""), None);
    }

    #[test]
    fn client_segments_cover_french_and_english_labels() {
        assert_eq!(ClientSegment::classify("Professionnel"), Some(ClientSegment::Professional));
        assert_eq!(ClientSegment::classify("particulier"), Some(ClientSegment::Individual));
        assert_eq!(ClientSegment::classify("Individual"), Some(ClientSegment::Individual));
        assert_eq!(ClientSegment::classify("Fleet"), None);
    }
}
