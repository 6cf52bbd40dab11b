use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way the retracement is drawn
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum_macros::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum TrendDirection {
    /// Retrace from the swing high down (level 0 = high)
    #[default]
    #[strum(serialize = "uptrend", serialize = "up")]
    Uptrend,
    /// Retrace from the swing low up (level 0 = low)
    #[strum(serialize = "downtrend", serialize = "down")]
    Downtrend,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrendDirection::Uptrend => write!(f, "uptrend"),
            TrendDirection::Downtrend => write!(f, "downtrend"),
        }
    }
}

/// Side to search when looking for the next level from the current price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSide {
    /// Nearest level strictly below
    Support,
    /// Nearest level strictly above
    Resistance,
}
