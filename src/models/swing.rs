use serde::{Deserialize, Serialize};

/// Swing extremes and latest price read off a chart.
/// When both bounds are present `swing_high >= swing_low`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SwingResult {
    pub swing_high: Option<f64>,
    pub swing_low: Option<f64>,
    pub current_price: Option<f64>,
}

impl SwingResult {
    /// Build from two extremes in either order
    pub fn from_extremes(a: f64, b: f64, current_price: Option<f64>) -> Self {
        Self {
            swing_high: Some(a.max(b)),
            swing_low: Some(a.min(b)),
            current_price,
        }
    }
}
