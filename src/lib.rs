//! Vendor performance KPIs: filter delivery/quality/spend observations,
//! aggregate them per vendor, score and rank the vendors, and shape the
//! result for a dashboard or a CSV export.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod mapping;
pub mod output;
pub mod rank;
pub mod sample;
pub mod score;
pub mod types;
pub mod util;
