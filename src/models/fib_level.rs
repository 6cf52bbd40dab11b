use serde::{Deserialize, Serialize};

/// Standard retracement ratios, ascending. Every level set follows this order.
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Human-readable label for each entry of `FIB_RATIOS`
pub const FIB_LABELS: [&str; 7] = ["0%", "23.6%", "38.2%", "50%", "61.8%", "78.6%", "100%"];

pub const GOLDEN_POCKET_RATIO: f64 = 0.618;

/// One retracement level
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FibLevel {
    pub ratio: f64,
    pub label: String,
    pub price: f64,
    pub is_golden_pocket: bool,
}

impl FibLevel {
    pub fn new(ratio: f64, label: &str, price: f64) -> Self {
        Self {
            ratio,
            label: label.to_string(),
            price,
            is_golden_pocket: ratio == GOLDEN_POCKET_RATIO,
        }
    }
}

/// Level closest to a price, with how far and on which side the price sits
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NearestLevel {
    pub level: FibLevel,
    pub distance: f64,
    /// Price at or above the level
    pub is_above: bool,
}
