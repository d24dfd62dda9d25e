/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  header names, Vec<Vec<CellValue>>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  accepted values per column → filtered row indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
