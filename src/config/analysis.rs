//! Analysis and computation configuration

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Settings for turning axis labels into a pixel/price scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    // Pairs of labels closer than this (in pixels) are treated as noise
    pub min_pixel_gap: i32,
    // Max relative error between a label's value and the price implied by the reference scale
    pub relative_tolerance: f64,
    // OCR observations within this many rows of an earlier one are dropped as duplicates
    pub dedupe_window_px: i32,
    // Fraction of image height reserved at top and bottom when mapping manual bounds
    pub manual_margin_pct: f64,
}

/// Region of interest for candle scanning, expressed as fractions of the image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartRegion {
    pub left_pct: f64,
    // Axis label gutter
    pub right_pct: f64,
    // Header (ticker, OHLC readout)
    pub top_pct: f64,
    // Footer (time axis)
    pub bottom_pct: f64,
}

/// Narrow vertical strip used to estimate the latest price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentPriceStrip {
    pub start_pct: f64,
    pub width_pct: f64,
}

/// Channel-ratio heuristics for classifying candle pixels.
/// Tuned against the usual green/red chart themes; nothing guarantees they hold elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThresholds {
    // Dominant channel must exceed this to count at all
    pub channel_min: u8,
    // Dominant channel must exceed the others by this factor
    pub dominance: f64,
    // Red candles only need to beat blue by this (smaller) factor
    pub red_over_blue: f64,
    // All three channels above this => near-white (monochrome themes)
    pub white_min: u8,
    // Pixels below this alpha are ignored
    pub alpha_min: u8,
}

/// Zone and sentiment boundaries for the insight engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    // Distance to the 0.618 level, as a fraction of the level range, that counts as "in the pocket"
    pub golden_pocket_band: f64,
    // Position within the swing range above which sentiment is bullish (strict)
    pub bullish_above: f64,
    // Position within the swing range below which sentiment is bearish (strict)
    pub bearish_below: f64,
}

/// Crops handed to the text recognizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrRegions {
    // Right-hand price scale
    pub price_scale_pct: f64,
    // Header band carrying the ticker
    pub header_pct: f64,
    // Grayscale threshold after contrast enhancement
    pub binarize_threshold: f64,
}

/// The Master Analysis Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub calibration: CalibrationSettings,
    pub chart_region: ChartRegion,
    pub current_price_strip: CurrentPriceStrip,
    pub colors: ColorThresholds,
    pub insight: InsightSettings,
    pub ocr: OcrRegions,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    calibration: CalibrationSettings {
        min_pixel_gap: 5,
        relative_tolerance: 0.05,
        dedupe_window_px: 5,
        manual_margin_pct: 0.10,
    },

    chart_region: ChartRegion {
        left_pct: 0.05,
        right_pct: 0.18,
        top_pct: 0.12,
        bottom_pct: 0.08,
    },

    current_price_strip: CurrentPriceStrip {
        start_pct: 0.75,
        width_pct: 0.06,
    },

    colors: ColorThresholds {
        channel_min: 100,
        dominance: 1.3,
        red_over_blue: 1.2,
        white_min: 200,
        alpha_min: 128,
    },

    insight: InsightSettings {
        golden_pocket_band: 0.03,
        bullish_above: 0.65,
        bearish_below: 0.35,
    },

    ocr: OcrRegions {
        price_scale_pct: 0.18,
        header_pct: 0.12,
        binarize_threshold: 140.0,
    },
};

impl Default for AnalysisConfig {
    fn default() -> Self {
        ANALYSIS
    }
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        ANALYSIS.calibration
    }
}

impl Default for ChartRegion {
    fn default() -> Self {
        ANALYSIS.chart_region
    }
}

impl Default for CurrentPriceStrip {
    fn default() -> Self {
        ANALYSIS.current_price_strip
    }
}

impl Default for ColorThresholds {
    fn default() -> Self {
        ANALYSIS.colors
    }
}

impl Default for InsightSettings {
    fn default() -> Self {
        ANALYSIS.insight
    }
}

impl Default for OcrRegions {
    fn default() -> Self {
        ANALYSIS.ocr
    }
}

impl AnalysisConfig {
    /// Load overrides from a JSON file. Missing fields keep their `ANALYSIS` values.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&text)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .context(format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Every image fraction must lie in `[0, 1)`
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("chart_region.left_pct", self.chart_region.left_pct),
            ("chart_region.right_pct", self.chart_region.right_pct),
            ("chart_region.top_pct", self.chart_region.top_pct),
            ("chart_region.bottom_pct", self.chart_region.bottom_pct),
            ("current_price_strip.start_pct", self.current_price_strip.start_pct),
            ("current_price_strip.width_pct", self.current_price_strip.width_pct),
            ("calibration.manual_margin_pct", self.calibration.manual_margin_pct),
            ("ocr.price_scale_pct", self.ocr.price_scale_pct),
            ("ocr.header_pct", self.ocr.header_pct),
        ];
        for (name, value) in fractions {
            ensure!(
                (0.0..1.0).contains(&value),
                "{} must be within [0, 1), got {}",
                name,
                value
            );
        }
        Ok(())
    }
}
