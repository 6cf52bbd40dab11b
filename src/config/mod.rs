//! Configuration module for the chart calibration and analysis engine.

pub mod analysis;
pub mod debug;
pub mod persistence;

// Re-export commonly used items
pub use analysis::{
    ANALYSIS, AnalysisConfig, CalibrationSettings, ChartRegion, ColorThresholds,
    CurrentPriceStrip, InsightSettings, OcrRegions,
};
pub use persistence::{SCAN_HISTORY_FILENAME, SCAN_HISTORY_PATH, scan_history_path};
