/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read cells → check schema → SaleRecords → DataFrame
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  polars DataFrame, year/brand index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  is_in(years) & is_in(brands) → filtered SalesDataset
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
