use serde::{Deserialize, Serialize};
use std::fmt;

use super::fib_level::{FibLevel, NearestLevel};

/// Where the current price sits relative to the retracement levels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    GoldenPocket,
    Support,
    Resistance,
    Unknown,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Zone::GoldenPocket => write!(f, "golden_pocket"),
            Zone::Support => write!(f, "support"),
            Zone::Resistance => write!(f, "resistance"),
            Zone::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sentiment::Bullish => write!(f, "bullish"),
            Sentiment::Bearish => write!(f, "bearish"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Recommendation derived from price and levels. Rebuilt from scratch on every input change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Insight {
    pub zone: Zone,
    pub sentiment: Sentiment,
    pub nearest_level: Option<NearestLevel>,
    pub next_support: Option<FibLevel>,
    pub next_resistance: Option<FibLevel>,
    /// `next_support` when bearish, otherwise `next_resistance`
    pub next_target: Option<FibLevel>,
    pub narrative: String,
}

impl Insight {
    pub const INSUFFICIENT_DATA: &'static str =
        "Not enough data to produce an insight. Enter the swing high, swing low and current price manually.";

    pub fn insufficient_data() -> Self {
        Self {
            zone: Zone::Unknown,
            sentiment: Sentiment::Neutral,
            nearest_level: None,
            next_support: None,
            next_resistance: None,
            next_target: None,
            narrative: Self::INSUFFICIENT_DATA.to_string(),
        }
    }
}
