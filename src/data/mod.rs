/// Data layer: core types, loading, views and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RecordStore (Join_Year derived once)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RecordStore │  Vec<Record>, source schema, first-seen categories
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  category selections → View
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod view;
