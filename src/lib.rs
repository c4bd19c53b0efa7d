//! Banking customer analytics: load a customer table once, filter it by
//! category and compute the metrics, distributions and time series a
//! dashboard shows.

pub mod analytics;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
