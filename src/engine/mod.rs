pub mod core;
pub mod error;
pub mod messages;
pub mod pipeline;

// Re-export key components
pub use core::ChartEngine;
pub use error::AnalysisError;
pub use messages::{Analysis, ChartScan, ManualInput, ManualScan, MarketSnapshot};
pub use pipeline::{analyze, analyze_batch, scan_chart, scan_manual, scan_manual_batch};
