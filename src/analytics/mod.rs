/// Analytics layer: aggregations over a view and their render-ready shape.
///
/// ```text
///   View (full store or filtered)
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  means, counts, bins, time series
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ assemble  │  named panels → rendering layer
///   └───────────┘
///
///   View ──► export  (CSV download)
/// ```

pub mod aggregate;
pub mod assemble;
pub mod export;
