/// Data layer: core types, loading, grouping and statistics.
///
/// Architecture:
/// ```text
///  embedded iris.csv / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse source → Dataset (validated once, fatal on error)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Row>, feature names, declared classes
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ group / stats │  rows per class, describe(), histogram bins
///   └──────────────┘
/// ```

pub mod group;
pub mod loader;
pub mod model;
pub mod stats;
