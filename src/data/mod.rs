/// Data layer: core types, loading, validation and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet   (file path or http(s) URL)
///        │
///        ▼
///   ┌──────────┐
///   │ provider  │  fetch raw payload → loader → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  required columns + semantic types, checked once
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ CovidData   │  historical + latest, read-only for the process lifetime
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  distinct values, row selection, date ordering
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod provider;
pub mod schema;
