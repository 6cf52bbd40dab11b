//! One analysis run, start to finish.
//!
//! Every function here is pure in its inputs: runs own their price map, swing,
//! levels and insight, so any number of them can execute at once.

use rayon::prelude::*;

use crate::analysis::{
    build_manual_price_map, build_price_map, compute_levels, detect_swing_points,
    determine_trend, generate_insight,
};
use crate::config::{AnalysisConfig, InsightSettings};
use crate::domain::{AssetInfo, LabelObservation};
use crate::models::RasterImage;

use super::error::AnalysisError;
use super::messages::{Analysis, ChartScan, ManualInput, ManualScan, MarketSnapshot};

/// Levels and insight for a snapshot.
///
/// Without a current price the direction defaults to uptrend and the insight
/// reports insufficient data.
pub fn analyze(snapshot: &MarketSnapshot, settings: &InsightSettings) -> Result<Analysis, AnalysisError> {
    let (high, low) = match (snapshot.swing_high, snapshot.swing_low) {
        (Some(high), Some(low)) if high > low => (high, low),
        (high, low) => return Err(AnalysisError::DegenerateSwing { high, low }),
    };

    let direction = snapshot
        .current_price
        .map(|price| determine_trend(high, low, price))
        .unwrap_or_default();

    let levels = compute_levels(high, low, direction);
    let insight = generate_insight(
        snapshot.current_price,
        &levels,
        snapshot.asset.asset_type,
        Some(high),
        Some(low),
        settings,
    );

    Ok(Analysis {
        asset: snapshot.asset.clone(),
        swing_high: high,
        swing_low: low,
        current_price: snapshot.current_price,
        direction,
        levels,
        insight,
    })
}

/// Calibrate from axis labels, read the candles, and analyse.
pub fn scan_chart<I: RasterImage + ?Sized>(
    image: &I,
    labels: &[LabelObservation],
    asset: AssetInfo,
    config: &AnalysisConfig,
) -> Result<ChartScan, AnalysisError> {
    if labels.len() < 2 {
        return Err(AnalysisError::InsufficientLabels { found: labels.len() });
    }

    // Labels were read but no pair of them agrees on a scale
    let price_map = build_price_map(labels, image.height(), &config.calibration)
        .ok_or(AnalysisError::InsufficientLabels { found: 0 })?;

    let swing = detect_swing_points(image, Some(&price_map), config);
    log::info!(
        "Scan {}: swing {:?}..{:?}, current {:?}",
        asset.name,
        swing.swing_low,
        swing.swing_high,
        swing.current_price
    );

    let snapshot = MarketSnapshot {
        swing_high: swing.swing_high,
        swing_low: swing.swing_low,
        current_price: swing.current_price,
        asset,
    };
    let analysis = analyze(&snapshot, &config.insight)?;

    Ok(ChartScan {
        price_map,
        swing,
        analysis,
    })
}

/// Analyse user-entered bounds. A price map is built only when the image height is known.
pub fn scan_manual(
    input: &ManualInput,
    image_height: Option<u32>,
    config: &AnalysisConfig,
) -> Result<ManualScan, AnalysisError> {
    validate_manual(input)?;

    let price_map = image_height
        .and_then(|h| build_manual_price_map(input.high, input.low, h, &config.calibration));

    let analysis = analyze(&MarketSnapshot::from(input), &config.insight)?;

    Ok(ManualScan {
        price_map,
        analysis,
    })
}

fn validate_manual(input: &ManualInput) -> Result<(), AnalysisError> {
    if !input.high.is_finite() || !input.low.is_finite() {
        return Err(AnalysisError::InvalidManualInput(
            "high and low must be numbers".to_string(),
        ));
    }
    if input.high <= input.low {
        return Err(AnalysisError::InvalidManualInput(format!(
            "high ({}) must be greater than low ({})",
            input.high, input.low
        )));
    }
    if let Some(current) = input.current {
        if !current.is_finite() || current < 0.0 {
            return Err(AnalysisError::InvalidManualInput(format!(
                "current price {} is not a valid price",
                current
            )));
        }
    }
    Ok(())
}

/// Analyse independent snapshots in parallel. Output order matches input order.
pub fn analyze_batch(
    snapshots: &[MarketSnapshot],
    settings: &InsightSettings,
) -> Vec<Result<Analysis, AnalysisError>> {
    snapshots
        .par_iter()
        .map(|snapshot| analyze(snapshot, settings))
        .collect()
}

/// Manual inputs in parallel, each validated like `scan_manual`. Output order matches input order.
pub fn scan_manual_batch(
    inputs: &[ManualInput],
    settings: &InsightSettings,
) -> Vec<Result<Analysis, AnalysisError>> {
    inputs
        .par_iter()
        .map(|input| {
            validate_manual(input)?;
            analyze(&MarketSnapshot::from(input), settings)
        })
        .collect()
}
