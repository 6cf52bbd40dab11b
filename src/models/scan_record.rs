use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AssetInfo, AssetType, TrendDirection};

/// Flat record handed to the persistence layer.
/// Holds only the inputs needed to recompute levels and insight, never the derived detail.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Assigned by the store; 0 until persisted
    #[serde(default)]
    pub id: u64,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub swing_high: f64,
    pub swing_low: f64,
    pub current_price: Option<f64>,
    pub direction: TrendDirection,
    pub created_at: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(
        asset: &AssetInfo,
        swing_high: f64,
        swing_low: f64,
        current_price: Option<f64>,
        direction: TrendDirection,
    ) -> Self {
        Self {
            id: 0,
            asset_name: asset.name.clone(),
            asset_type: asset.asset_type,
            swing_high,
            swing_low,
            current_price,
            direction,
            created_at: Utc::now(),
        }
    }
}
