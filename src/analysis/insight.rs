//! Rule-based recommendation from current price and retracement levels.

use crate::analysis::fibonacci::{find_nearest_level, find_next_target};
use crate::config::InsightSettings;
use crate::config::debug::PRINT_INSIGHT;
use crate::domain::{AssetType, TargetSide};
use crate::models::fib_level::{FibLevel, GOLDEN_POCKET_RATIO, NearestLevel};
use crate::models::{Insight, Sentiment, Zone};

/// Classify the current price and assemble a narrative.
///
/// Missing price or levels yield the fixed "insufficient data" insight. The asset
/// type only affects price formatting in the narrative.
pub fn generate_insight(
    current_price: Option<f64>,
    levels: &[FibLevel],
    asset_type: AssetType,
    swing_high: Option<f64>,
    swing_low: Option<f64>,
    settings: &InsightSettings,
) -> Insight {
    let Some(current_price) = current_price else {
        return Insight::insufficient_data();
    };
    let Some(nearest) = find_nearest_level(current_price, levels) else {
        return Insight::insufficient_data();
    };

    let next_support = find_next_target(current_price, levels, TargetSide::Support);
    let next_resistance = find_next_target(current_price, levels, TargetSide::Resistance);

    let zone = determine_zone(current_price, &nearest, levels, settings);
    let sentiment = determine_sentiment(current_price, swing_high, swing_low, settings);

    if PRINT_INSIGHT {
        log::info!(
            "Insight: price {} nearest {} ({}) -> {} / {}",
            current_price,
            nearest.level.label,
            nearest.level.price,
            zone,
            sentiment
        );
    }

    let next_target = match sentiment {
        Sentiment::Bearish => next_support.clone(),
        _ => next_resistance.clone(),
    };

    let narrative = Narrative {
        asset_type,
        current_price,
        nearest: &nearest.level,
        next_support: next_support.as_ref(),
        next_resistance: next_resistance.as_ref(),
    }
    .build(zone, sentiment);

    Insight {
        zone,
        sentiment,
        nearest_level: Some(nearest),
        next_support,
        next_resistance,
        next_target,
        narrative,
    }
}

/// Golden pocket first (within the band of the 0.618 level), then by the nearest
/// level's ratio, then by which side of the nearest level the price is on.
pub fn determine_zone(
    current_price: f64,
    nearest: &NearestLevel,
    levels: &[FibLevel],
    settings: &InsightSettings,
) -> Zone {
    if let (Some(first), Some(last)) = (levels.first(), levels.last()) {
        let total_range = (first.price - last.price).abs();
        let in_pocket = levels
            .iter()
            .find(|l| l.is_golden_pocket)
            .map(|gp| (current_price - gp.price).abs())
            .is_some_and(|d| total_range > 0.0 && d / total_range < settings.golden_pocket_band);
        if in_pocket {
            return Zone::GoldenPocket;
        }
    }

    let ratio = nearest.level.ratio;
    if ratio >= GOLDEN_POCKET_RATIO {
        Zone::Support
    } else if ratio <= 0.382 {
        Zone::Resistance
    } else if nearest.is_above {
        Zone::Resistance
    } else {
        Zone::Support
    }
}

/// Position inside the swing range, 0 at the low and 1 at the high.
/// Both thresholds are strict, so the boundaries themselves are neutral.
pub fn determine_sentiment(
    current_price: f64,
    swing_high: Option<f64>,
    swing_low: Option<f64>,
    settings: &InsightSettings,
) -> Sentiment {
    let (Some(high), Some(low)) = (swing_high, swing_low) else {
        return Sentiment::Neutral;
    };
    let range = high - low;
    if range <= 0.0 {
        return Sentiment::Neutral;
    }

    let position = (current_price - low) / range;
    if position > settings.bullish_above {
        Sentiment::Bullish
    } else if position < settings.bearish_below {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

struct Narrative<'a> {
    asset_type: AssetType,
    current_price: f64,
    nearest: &'a FibLevel,
    next_support: Option<&'a FibLevel>,
    next_resistance: Option<&'a FibLevel>,
}

impl Narrative<'_> {
    fn price(&self, p: f64) -> String {
        self.asset_type.format_price(p)
    }

    fn level(&self, level: &FibLevel) -> String {
        format!("{} ({})", level.label, self.price(level.price))
    }

    fn build(&self, zone: Zone, sentiment: Sentiment) -> String {
        let timeframe = self.asset_type.timeframe();
        let nearest = self.level(self.nearest);

        let mut text = format!(
            "This {} is currently trading at {}. ",
            self.asset_type.noun(),
            self.price(self.current_price)
        );

        match zone {
            Zone::GoldenPocket => {
                text.push_str(&format!(
                    "Price is sitting right in the GOLDEN POCKET at level {}. \
                     This is the strongest reversal zone in a Fibonacci retracement. ",
                    nearest
                ));
                if sentiment == Sentiment::Bullish {
                    text.push_str(&self.upside("If price holds above this level, a move toward "));
                } else {
                    text.push_str(&self.downside(timeframe));
                }
            }
            Zone::Support => {
                text.push_str(&format!("Price is holding at the support level {}. ", nearest));
                if sentiment == Sentiment::Bearish {
                    text.push_str(&self.downside(timeframe));
                } else {
                    text.push_str("There is potential for a bounce from this area. ");
                    if let Some(r) = self.next_resistance {
                        text.push_str(&format!("Nearest resistance target: {}.", self.level(r)));
                    }
                }
            }
            Zone::Resistance => {
                text.push_str(&format!("Price is approaching resistance at level {}. ", nearest));
                if sentiment == Sentiment::Bullish {
                    text.push_str(&self.upside("On a breakout above this level, the next target is "));
                } else {
                    text.push_str("Watch for a rejection in this area. ");
                    if let Some(s) = self.next_support {
                        text.push_str(&format!("Nearest support: {}.", self.level(s)));
                    }
                }
            }
            Zone::Unknown => {
                text.push_str(&format!(
                    "Price is between Fibonacci levels near {}. \
                     Watch how price reacts at the nearest levels.",
                    nearest
                ));
            }
        }

        text.trim_end().to_string()
    }

    fn upside(&self, lead: &str) -> String {
        match self.next_resistance {
            Some(r) => format!("{}{} is likely.", lead, self.level(r)),
            None => format!("{}new highs is open, with no retracement level above.", lead),
        }
    }

    fn downside(&self, timeframe: &str) -> String {
        match self.next_support {
            Some(s) => format!(
                "If a {} candle closes below this level, the next target is {}.",
                timeframe,
                self.level(s)
            ),
            None => format!(
                "If a {} candle closes below this level, watch for a further decline.",
                timeframe
            ),
        }
    }
}
