use serde::{Deserialize, Serialize};

use crate::domain::{AssetInfo, AssetType, TrendDirection};
use crate::models::{FibLevel, Insight, PriceMap, ScanRecord, SwingResult};

/// The only inputs levels and insight depend on.
/// Any change here means a fresh `analyze` call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub swing_high: Option<f64>,
    pub swing_low: Option<f64>,
    pub current_price: Option<f64>,
    #[serde(default)]
    pub asset: AssetInfo,
}

impl From<&ScanRecord> for MarketSnapshot {
    fn from(record: &ScanRecord) -> Self {
        Self {
            swing_high: Some(record.swing_high),
            swing_low: Some(record.swing_low),
            current_price: record.current_price,
            asset: AssetInfo {
                name: record.asset_name.clone(),
                asset_type: record.asset_type,
                confidence: 100.0,
            },
        }
    }
}

impl From<&ManualInput> for MarketSnapshot {
    fn from(input: &ManualInput) -> Self {
        Self {
            swing_high: Some(input.high),
            swing_low: Some(input.low),
            current_price: input.current,
            asset: AssetInfo::manual(input.asset_type, input.name.as_deref()),
        }
    }
}

/// User-entered bounds, used when the screenshot cannot be read
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManualInput {
    pub high: f64,
    pub low: f64,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub asset_type: AssetType,
    #[serde(default)]
    pub name: Option<String>,
}

/// Levels and insight for one snapshot
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub asset: AssetInfo,
    pub swing_high: f64,
    pub swing_low: f64,
    pub current_price: Option<f64>,
    pub direction: TrendDirection,
    pub levels: Vec<FibLevel>,
    pub insight: Insight,
}

/// Result of reading a screenshot end to end
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartScan {
    pub price_map: PriceMap,
    pub swing: SwingResult,
    pub analysis: Analysis,
}

/// Result of the manual path. No map without a known image height.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManualScan {
    pub price_map: Option<PriceMap>,
    pub analysis: Analysis,
}

impl ScanRecord {
    /// Flatten an analysis into its persisted inputs
    pub fn from_analysis(analysis: &Analysis) -> Self {
        ScanRecord::new(
            &analysis.asset,
            analysis.swing_high,
            analysis.swing_low,
            analysis.current_price,
            analysis.direction,
        )
    }
}
