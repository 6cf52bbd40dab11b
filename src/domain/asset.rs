use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;

use crate::utils::group_thousands;

/// Market the charted instrument belongs to.
/// Only changes presentation (price formatting, narrative timeframe), never the analysis.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum AssetType {
    #[default]
    #[strum(serialize = "crypto")]
    Crypto,
    #[strum(serialize = "forex")]
    Forex,
    /// Indonesian equities (IDX)
    #[serde(alias = "saham")]
    #[strum(serialize = "stock", serialize = "saham")]
    Stock,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssetType::Crypto => write!(f, "crypto"),
            AssetType::Forex => write!(f, "forex"),
            AssetType::Stock => write!(f, "stock"),
        }
    }
}

impl AssetType {
    /// Parse a user-supplied market name; the error lists every accepted name
    pub fn parse_arg(value: &str) -> Result<Self, String> {
        value.parse().map_err(|_| {
            let names: Vec<String> = AssetType::iter().map(|t| t.to_string()).collect();
            format!("unknown asset type '{}', expected one of: {}", value, names.join(", "))
        })
    }

    /// Human readable noun used in narratives
    pub fn noun(&self) -> &'static str {
        match self {
            AssetType::Crypto => "crypto asset",
            AssetType::Forex => "forex pair",
            AssetType::Stock => "stock",
        }
    }

    /// Candle timeframe the narrative refers to for confirmation
    pub fn timeframe(&self) -> &'static str {
        match self {
            AssetType::Crypto => "4H",
            AssetType::Forex => "1H",
            AssetType::Stock => "Daily",
        }
    }

    /// Format a price the way traders of this market read it.
    /// Non-finite prices render as "-".
    pub fn format_price(&self, price: f64) -> String {
        if !price.is_finite() {
            return "-".to_string();
        }
        match self {
            AssetType::Forex => format!("{:.5}", price),
            AssetType::Stock => {
                format!("Rp {}", group_thousands(&format!("{:.0}", price.round()), '.'))
            }
            AssetType::Crypto => {
                if price >= 1000.0 {
                    format!("${}", group_thousands(&format!("{:.2}", price), ','))
                } else if price >= 1.0 {
                    format!("${:.4}", price)
                } else {
                    format!("${:.8}", price)
                }
            }
        }
    }
}

/// Ticker and market as read from the chart header
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssetInfo {
    pub name: String,
    pub asset_type: AssetType,
    /// Recognizer confidence (0-100); 0 when nothing matched
    pub confidence: f64,
}

impl AssetInfo {
    pub fn unknown() -> Self {
        Self {
            name: "UNKNOWN".to_string(),
            asset_type: AssetType::Crypto,
            confidence: 0.0,
        }
    }

    /// Asset entered by hand: the name is the market itself, confidence is total
    pub fn manual(asset_type: AssetType, name: Option<&str>) -> Self {
        Self {
            name: name
                .map(|n| n.to_uppercase())
                .unwrap_or_else(|| asset_type.to_string().to_uppercase()),
            asset_type,
            confidence: 100.0,
        }
    }
}

impl Default for AssetInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

/// How a rule names the asset once it matches
#[derive(Debug, Clone, Copy)]
pub enum AssetName {
    Fixed(&'static str),
    /// First 4-letter uppercase run in the text starting with one of `prefixes`
    /// (an empty prefix accepts any run), else `fallback`
    Ticker {
        prefixes: &'static [&'static str],
        fallback: &'static str,
    },
}

/// One row of the detection table: any needle present => this asset
#[derive(Debug, Clone, Copy)]
pub struct AssetRule {
    pub asset_type: AssetType,
    pub needles: &'static [&'static str],
    pub name: AssetName,
}

/// Evaluated top to bottom, first match wins.
/// Order matters: "PERP" must not shadow a named coin, and the catch-all forex row
/// (NZD/CHF/...) must come after the named pairs that contain those currencies.
pub const ASSET_RULES: &[AssetRule] = &[
    // Crypto
    AssetRule { asset_type: AssetType::Crypto, needles: &["BTC", "BITCOIN"], name: AssetName::Fixed("BTC") },
    AssetRule { asset_type: AssetType::Crypto, needles: &["ETH", "ETHEREUM"], name: AssetName::Fixed("ETH") },
    AssetRule { asset_type: AssetType::Crypto, needles: &["BNB", "BINANCE"], name: AssetName::Fixed("BNB") },
    AssetRule { asset_type: AssetType::Crypto, needles: &["SOL", "SOLANA"], name: AssetName::Fixed("SOL") },
    AssetRule { asset_type: AssetType::Crypto, needles: &["XRP", "RIPPLE"], name: AssetName::Fixed("XRP") },
    AssetRule { asset_type: AssetType::Crypto, needles: &["ADA", "CARDANO"], name: AssetName::Fixed("ADA") },
    AssetRule { asset_type: AssetType::Crypto, needles: &["DOGE"], name: AssetName::Fixed("DOGE") },
    AssetRule { asset_type: AssetType::Crypto, needles: &["USDT", "USDC", "BUSD"], name: AssetName::Fixed("STABLECOIN") },
    AssetRule { asset_type: AssetType::Crypto, needles: &["PERP", "SWAP", "FUTURES"], name: AssetName::Fixed("CRYPTO") },
    // Forex
    AssetRule { asset_type: AssetType::Forex, needles: &["EURUSD", "EUR/USD"], name: AssetName::Fixed("EUR/USD") },
    AssetRule { asset_type: AssetType::Forex, needles: &["GBPUSD", "GBP/USD"], name: AssetName::Fixed("GBP/USD") },
    AssetRule { asset_type: AssetType::Forex, needles: &["USDJPY", "USD/JPY"], name: AssetName::Fixed("USD/JPY") },
    AssetRule { asset_type: AssetType::Forex, needles: &["AUDUSD", "AUD/USD"], name: AssetName::Fixed("AUD/USD") },
    AssetRule { asset_type: AssetType::Forex, needles: &["USDCHF", "USD/CHF"], name: AssetName::Fixed("USD/CHF") },
    AssetRule { asset_type: AssetType::Forex, needles: &["USDCAD", "USD/CAD"], name: AssetName::Fixed("USD/CAD") },
    AssetRule { asset_type: AssetType::Forex, needles: &["XAUUSD", "XAU/USD", "GOLD"], name: AssetName::Fixed("XAU/USD") },
    AssetRule { asset_type: AssetType::Forex, needles: &["NZD", "CHF", "NOK", "SEK"], name: AssetName::Fixed("FOREX") },
    // Stocks (IDX)
    AssetRule {
        asset_type: AssetType::Stock,
        needles: &["BBCA", "BBRI", "BMRI", "BBNI"],
        name: AssetName::Ticker { prefixes: &["BB", "BM"], fallback: "SAHAM" },
    },
    AssetRule {
        asset_type: AssetType::Stock,
        needles: &["TLKM", "ASII", "UNVR", "HMSP"],
        name: AssetName::Ticker { prefixes: &[""], fallback: "SAHAM" },
    },
    AssetRule { asset_type: AssetType::Stock, needles: &["IHSG", "IDX", "COMPOSITE"], name: AssetName::Fixed("IHSG") },
    AssetRule { asset_type: AssetType::Stock, needles: &[".JK", "JAKARTA"], name: AssetName::Fixed("SAHAM") },
];

/// Detect ticker and market from header text (any case).
pub fn detect_asset(text: &str, confidence: f64) -> AssetInfo {
    let upper = text.to_uppercase();

    ASSET_RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| upper.contains(needle)))
        .map(|rule| AssetInfo {
            name: resolve_name(rule.name, &upper),
            asset_type: rule.asset_type,
            confidence,
        })
        .unwrap_or_else(AssetInfo::unknown)
}

fn resolve_name(name: AssetName, upper: &str) -> String {
    match name {
        AssetName::Fixed(n) => n.to_string(),
        AssetName::Ticker { prefixes, fallback } => find_ticker(upper, prefixes)
            .unwrap_or(fallback)
            .to_string(),
    }
}

/// Leftmost run of 4 ASCII uppercase letters that starts with one of `prefixes`
fn find_ticker<'a>(text: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    const TICKER_LEN: usize = 4;
    let bytes = text.as_bytes();
    if bytes.len() < TICKER_LEN {
        return None;
    }

    (0..=bytes.len() - TICKER_LEN)
        .filter(|&start| bytes[start..start + TICKER_LEN].iter().all(u8::is_ascii_uppercase))
        .map(|start| &text[start..start + TICKER_LEN])
        .find(|candidate| prefixes.iter().any(|p| candidate.starts_with(p)))
}
