//! Pixel/price calibration from noisy axis labels.
//!
//! Text recognition hands us `(value, row)` observations that may include misread
//! digits, duplicates, or text that was never a price. A single best pair is fragile
//! against one bad digit, so calibration runs in two passes:
//!
//! 1. Every valid label pair votes a pixels-per-unit scale; the median-indexed pair
//!    becomes the reference.
//! 2. Labels that agree with the reference (within a relative tolerance) are kept,
//!    and the outermost survivors define the final map.

use itertools::Itertools;

use crate::config::CalibrationSettings;
use crate::config::debug::PRINT_CALIBRATION;
use crate::domain::LabelObservation;
use crate::models::PriceMap;
use crate::utils::relative_error;

/// Two labels and the scale they imply
#[derive(Debug, Clone, Copy)]
struct ScalePair {
    top: LabelObservation,
    bottom: LabelObservation,
    pixels_per_unit: f64,
}

impl ScalePair {
    /// Price the reference scale predicts at `row`
    fn predict(&self, row: i32) -> f64 {
        self.top.value - (row - self.top.pixel_row) as f64 / self.pixels_per_unit
    }

    fn is_endpoint(&self, label: &LabelObservation) -> bool {
        *label == self.top || *label == self.bottom
    }
}

/// Build a price map from label observations.
///
/// Returns `None` when there are fewer than two labels or no pair survives the
/// noise filter; the caller should fall back to manual input.
pub fn build_price_map(
    labels: &[LabelObservation],
    image_height: u32,
    settings: &CalibrationSettings,
) -> Option<PriceMap> {
    if labels.len() < 2 {
        return None;
    }

    let mut sorted = labels.to_vec();
    sorted.sort_by_key(|l| l.pixel_row);

    let mut pairs: Vec<ScalePair> = sorted
        .iter()
        .tuple_combinations()
        .filter_map(|(p1, p2)| {
            // Lower on the image => lower price
            let pixel_diff = p2.pixel_row - p1.pixel_row;
            let price_diff = p1.value - p2.value;
            (pixel_diff > settings.min_pixel_gap && price_diff > 0.0).then(|| ScalePair {
                top: *p1,
                bottom: *p2,
                pixels_per_unit: pixel_diff as f64 / price_diff,
            })
        })
        .collect();

    if pairs.is_empty() {
        log::debug!(
            "Calibration: no usable label pair among {} labels (image height {})",
            labels.len(),
            image_height
        );
        return None;
    }

    // Stable: equal scales keep enumeration order
    pairs.sort_by(|a, b| a.pixels_per_unit.total_cmp(&b.pixels_per_unit));
    let reference = pairs[pairs.len() / 2];

    if PRINT_CALIBRATION {
        log::info!(
            "Calibration: {} candidate pairs, reference {:?} -> {:?} @ {:.6} px/unit",
            pairs.len(),
            reference.top,
            reference.bottom,
            reference.pixels_per_unit
        );
    }

    let valid: Vec<LabelObservation> = sorted
        .iter()
        .filter(|label| {
            reference.is_endpoint(label)
                || relative_error(reference.predict(label.pixel_row), label.value)
                    < settings.relative_tolerance
        })
        .copied()
        .collect();

    let reference_map = || {
        PriceMap::new(
            reference.top.value,
            reference.bottom.value,
            reference.top.pixel_row,
            reference.bottom.pixel_row,
            reference.pixels_per_unit,
        )
    };

    if valid.len() < 2 {
        return reference_map();
    }

    let rejected = sorted.len() - valid.len();
    if rejected > 0 {
        log::debug!("Calibration: rejected {} inconsistent label(s)", rejected);
    }

    // `valid` inherits the row order of `sorted`
    let top = valid.first()?;
    let bottom = valid.last()?;
    PriceMap::from_anchors(top, bottom).or_else(reference_map)
}

/// Price map for user-entered bounds.
///
/// The high/low sit `manual_margin_pct` of the height inside the top and bottom
/// edges, leaving room for chart header and footer. `None` if `high <= low` or the
/// image is too short to hold a span.
pub fn build_manual_price_map(
    high: f64,
    low: f64,
    image_height: u32,
    settings: &CalibrationSettings,
) -> Option<PriceMap> {
    let margin = (image_height as f64 * settings.manual_margin_pct).floor() as i32;
    let height = image_height as i32;
    let span = height - 2 * margin;

    PriceMap::new(high, low, margin, height - margin, span as f64 / (high - low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;

    fn label(value: f64, row: i32) -> LabelObservation {
        LabelObservation::new(value, row)
    }

    fn calibrate(labels: &[LabelObservation]) -> Option<PriceMap> {
        build_price_map(labels, 600, &ANALYSIS.calibration)
    }

    #[test]
    fn needs_two_labels() {
        assert!(calibrate(&[]).is_none());
        assert!(calibrate(&[label(69000.0, 10)]).is_none());
    }

    #[test]
    fn no_valid_pair_returns_none() {
        // Inverted: the lower row carries the higher price
        assert!(calibrate(&[label(200.0, 300), label(100.0, 100)]).is_none());
        // Same pair, correctly oriented, is usable
        assert!(calibrate(&[label(100.0, 300), label(200.0, 100)]).is_some());
        // Too close together
        assert!(calibrate(&[label(200.0, 100), label(100.0, 105)]).is_none());
        // Same value twice
        assert!(calibrate(&[label(100.0, 100), label(100.0, 300)]).is_none());
    }

    #[test]
    fn two_clean_labels_define_the_map() {
        let map = calibrate(&[label(15000.0, 500), label(69000.0, 10)]).unwrap();
        assert_eq!(map.top_price, 69000.0);
        assert_eq!(map.bottom_price, 15000.0);
        assert_eq!(map.top_pixel_row, 10);
        assert_eq!(map.bottom_pixel_row, 500);
        assert_eq!(map.pixels_per_unit, 490.0 / 54000.0);
    }

    #[test]
    fn hallucinated_label_is_rejected() {
        let labels = [
            label(70000.0, 100),
            label(60000.0, 200),
            label(99999.0, 250), // misread
            label(50000.0, 300),
            label(40000.0, 400),
            label(30000.0, 500),
        ];
        let map = calibrate(&labels).unwrap();

        assert_eq!(map.top_price, 70000.0);
        assert_eq!(map.bottom_price, 30000.0);
        assert!((map.pixels_per_unit - 0.01).abs() < 1e-12);
        assert!((map.pixel_row_to_price(250.0) - 55000.0).abs() < 1e-6);
    }

    #[test]
    fn slightly_off_label_within_tolerance_is_kept() {
        let labels = [
            label(70000.0, 100),
            label(60000.0, 200),
            label(99999.0, 250), // misread, rejected
            label(50000.0, 300),
            label(40000.0, 400),
            label(30000.0, 500),
            label(20400.0, 600), // ~2% off the line, kept
        ];
        let map = calibrate(&labels).unwrap();

        // The accepted label becomes the bottom anchor
        assert_eq!(map.bottom_price, 20400.0);
        assert_eq!(map.bottom_pixel_row, 600);
        assert!((map.pixels_per_unit - 500.0 / 49600.0).abs() < 1e-12);
    }

    #[test]
    fn label_beyond_tolerance_is_dropped_even_at_the_edge() {
        let labels = [
            label(70000.0, 100),
            label(60000.0, 200),
            label(50000.0, 300),
            label(40000.0, 400),
            label(30000.0, 500),
            label(12000.0, 600), // line says 20000: 40% off
        ];
        let map = calibrate(&labels).unwrap();
        assert_eq!(map.bottom_price, 30000.0);
        assert_eq!(map.bottom_pixel_row, 500);
    }

    #[test]
    fn manual_map_reserves_margins() {
        let map = build_manual_price_map(200.0, 100.0, 100, &ANALYSIS.calibration).unwrap();
        assert_eq!(map.top_pixel_row, 10);
        assert_eq!(map.bottom_pixel_row, 90);
        assert!((map.pixels_per_unit - 0.8).abs() < 1e-12);
        assert!((map.pixel_row_to_price(90.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn manual_map_rejects_inverted_bounds() {
        assert!(build_manual_price_map(100.0, 200.0, 100, &ANALYSIS.calibration).is_none());
        assert!(build_manual_price_map(100.0, 100.0, 100, &ANALYSIS.calibration).is_none());
    }
}
