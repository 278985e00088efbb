/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  URL / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse source → raw headers + cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ columns   │  raw identifiers → display names (once)
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ TeamSeasonTable │  records, catalog of distinct keys
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterState → criteria → filtered / cluster rows
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, per-cluster means, trend lines
///   └───────────┘
/// ```
///
/// `export` writes the filtered rows back out as CSV.

pub mod aggregate;
pub mod columns;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
