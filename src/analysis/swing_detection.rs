//! Swing high/low and current price from raw candle pixels.
//!
//! Candles are found purely by colour: every pixel inside the chart body is
//! classified, and the topmost/bottommost classified rows become the swing
//! extremes. The latest price is the mean row of coloured pixels in a narrow strip
//! just left of the price gutter.

use statrs::statistics::Statistics;

use crate::config::debug::PRINT_SWING_SCAN;
use crate::config::{AnalysisConfig, ChartRegion, ColorThresholds, CurrentPriceStrip};
use crate::models::{PixelRect, PriceMap, RasterImage, Rgba, SwingResult};

// Absorbs float noise when scaling dimensions (e.g. 200 * (1 - 0.18))
const SCALE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelClass {
    Bullish,
    Bearish,
    /// Near-white; catches candles on monochrome themes
    NeutralBright,
    Background,
}

impl PixelClass {
    pub fn is_candle(&self) -> bool {
        !matches!(self, PixelClass::Background)
    }
}

/// Full classification used for the chart body. Translucent pixels are background.
pub fn classify_pixel(px: Rgba, t: &ColorThresholds) -> PixelClass {
    if px.a < t.alpha_min {
        return PixelClass::Background;
    }
    let (r, g, b) = (px.r as f64, px.g as f64, px.b as f64);
    let min = t.channel_min as f64;

    if g > min && g > r * t.dominance && g > b * t.dominance {
        PixelClass::Bullish
    } else if r > min && r > g * t.dominance && r > b * t.red_over_blue {
        PixelClass::Bearish
    } else if px.r > t.white_min && px.g > t.white_min && px.b > t.white_min {
        PixelClass::NeutralBright
    } else {
        PixelClass::Background
    }
}

/// Looser red/green test for the current-price strip: only red against green matters.
pub fn classify_marker_pixel(px: Rgba, t: &ColorThresholds) -> PixelClass {
    let (r, g) = (px.r as f64, px.g as f64);
    let min = t.channel_min as f64;

    if g > min && g > r * t.dominance {
        PixelClass::Bullish
    } else if r > min && r > g * t.dominance {
        PixelClass::Bearish
    } else {
        PixelClass::Background
    }
}

fn scaled(len: u32, pct: f64) -> u32 {
    ((len as f64 * pct) + SCALE_EPSILON).floor().max(0.0) as u32
}

/// Chart body: the image minus axis gutter, header, and footer. Never extends past the image.
pub fn chart_body(width: u32, height: u32, region: &ChartRegion) -> PixelRect {
    PixelRect::from_bounds(
        scaled(width, region.left_pct),
        scaled(height, region.top_pct),
        scaled(width, 1.0 - region.right_pct),
        scaled(height, 1.0 - region.bottom_pct),
    )
    .clamp_to(width, height)
}

/// Strip holding the most recent candles, spanning the chart body vertically
pub fn current_price_strip(
    width: u32,
    height: u32,
    region: &ChartRegion,
    strip: &CurrentPriceStrip,
) -> PixelRect {
    let body = chart_body(width, height, region);
    let x = scaled(width, strip.start_pct);
    PixelRect {
        x,
        y: body.y,
        width: scaled(width, strip.width_pct),
        height: body.height,
    }
    .clamp_to(width, height)
}

/// Topmost and bottommost rows holding a candle pixel
fn scan_extreme_rows<I: RasterImage + ?Sized>(
    image: &I,
    body: PixelRect,
    colors: &ColorThresholds,
) -> Option<(u32, u32)> {
    let mut extremes: Option<(u32, u32)> = None;

    for y in body.y..body.bottom() {
        let row_has_candle =
            (body.x..body.right()).any(|x| classify_pixel(image.pixel(x, y), colors).is_candle());
        if row_has_candle {
            extremes = Some(match extremes {
                Some((top, _)) => (top, y),
                None => (y, y),
            });
        }
    }

    extremes
}

/// Mean row of red/green pixels inside `strip`
fn mean_marker_row<I: RasterImage + ?Sized>(
    image: &I,
    strip: PixelRect,
    colors: &ColorThresholds,
) -> Option<f64> {
    let rows: Vec<f64> = (strip.y..strip.bottom())
        .flat_map(|y| (strip.x..strip.right()).map(move |x| (x, y)))
        .filter(|&(x, y)| classify_marker_pixel(image.pixel(x, y), colors).is_candle())
        .map(|(_, y)| y as f64)
        .collect();

    if rows.is_empty() {
        return None;
    }
    Some(rows.iter().mean())
}

/// Estimate the latest price from the right-hand strip
pub fn detect_current_price<I: RasterImage + ?Sized>(
    image: &I,
    price_map: &PriceMap,
    config: &AnalysisConfig,
) -> Option<f64> {
    let strip = current_price_strip(
        image.width(),
        image.height(),
        &config.chart_region,
        &config.current_price_strip,
    );
    if strip.is_empty() {
        return None;
    }
    mean_marker_row(image, strip, &config.colors).map(|row| price_map.pixel_row_to_price(row))
}

/// Find swing high/low and the current price.
///
/// Without a price map nothing can be converted and the result is empty. The two
/// extremes are re-ordered with max/min because noisy classification at the body
/// edges can invert them.
pub fn detect_swing_points<I: RasterImage + ?Sized>(
    image: &I,
    price_map: Option<&PriceMap>,
    config: &AnalysisConfig,
) -> SwingResult {
    let Some(price_map) = price_map else {
        return SwingResult::default();
    };

    let body = chart_body(image.width(), image.height(), &config.chart_region);
    let current_price = detect_current_price(image, price_map, config);

    let Some((top_row, bottom_row)) = scan_extreme_rows(image, body, &config.colors) else {
        log::warn!(
            "Swing scan: no candle pixels in chart body {:?} of {}x{} image",
            body,
            image.width(),
            image.height()
        );
        return SwingResult {
            swing_high: None,
            swing_low: None,
            current_price,
        };
    };

    if PRINT_SWING_SCAN {
        log::info!(
            "Swing scan: body {:?}, extreme rows {}..={}, current {:?}",
            body,
            top_row,
            bottom_row,
            current_price
        );
    }

    let high = price_map.pixel_row_to_price(top_row as f64);
    let low = price_map.pixel_row_to_price(bottom_row as f64);
    SwingResult::from_extremes(high, low, current_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::calibration::build_manual_price_map;
    use crate::config::ANALYSIS;
    use crate::models::RgbaBuffer;

    const BACKGROUND: Rgba = Rgba::opaque(20, 22, 30);
    const GREEN: Rgba = Rgba::opaque(38, 166, 154);
    const RED: Rgba = Rgba::opaque(239, 83, 80);
    const WHITE: Rgba = Rgba::opaque(240, 240, 240);

    // 200x100 chart; body is x 10..164, y 12..92; strip is x 150..162
    fn blank_chart() -> RgbaBuffer {
        RgbaBuffer::filled(200, 100, BACKGROUND)
    }

    // Rows 10..=90 span 200..100 at 0.8 px per unit
    fn manual_map() -> PriceMap {
        build_manual_price_map(200.0, 100.0, 100, &ANALYSIS.calibration).unwrap()
    }

    fn price_at(row: f64) -> f64 {
        200.0 - (row - 10.0) / 0.8
    }

    #[test]
    fn classifies_common_candle_colors() {
        let t = &ANALYSIS.colors;
        assert_eq!(classify_pixel(Rgba::opaque(0, 200, 0), t), PixelClass::Bullish);
        assert_eq!(classify_pixel(RED, t), PixelClass::Bearish);
        assert_eq!(classify_pixel(WHITE, t), PixelClass::NeutralBright);
        assert_eq!(classify_pixel(BACKGROUND, t), PixelClass::Background);
        assert_eq!(classify_pixel(Rgba::new(0, 200, 0, 40), t), PixelClass::Background);
        // Teal-ish green fails the blue dominance check in the body...
        assert_eq!(classify_pixel(GREEN, t), PixelClass::Background);
        // ...but counts in the strip, which ignores blue
        assert_eq!(classify_marker_pixel(GREEN, t), PixelClass::Bullish);
    }

    #[test]
    fn region_geometry_matches_fractions() {
        let body = chart_body(200, 100, &ANALYSIS.chart_region);
        assert_eq!(body, PixelRect::from_bounds(10, 12, 164, 92));

        let strip = current_price_strip(
            200,
            100,
            &ANALYSIS.chart_region,
            &ANALYSIS.current_price_strip,
        );
        assert_eq!(strip, PixelRect::from_bounds(150, 12, 162, 92));
    }

    #[test]
    fn out_of_range_region_stays_inside_image() {
        let mut region = ANALYSIS.chart_region;
        region.right_pct = -0.1;
        region.bottom_pct = -0.1;
        assert_eq!(chart_body(200, 100, &region), PixelRect::from_bounds(10, 12, 200, 100));

        let mut config = ANALYSIS;
        config.chart_region = region;
        let mut img = blank_chart();
        // Bottom-right corner pixel
        img.fill_rect(PixelRect::from_bounds(199, 99, 200, 100), Rgba::opaque(0, 200, 0));
        img.fill_rect(PixelRect::from_bounds(40, 20, 50, 41), Rgba::opaque(0, 200, 0));

        let result = detect_swing_points(&img, Some(&manual_map()), &config);
        assert!((result.swing_high.unwrap() - price_at(20.0)).abs() < 1e-9);
        assert!((result.swing_low.unwrap() - price_at(99.0)).abs() < 1e-9);
    }

    #[test]
    fn missing_price_map_gives_empty_result() {
        let img = blank_chart();
        assert_eq!(detect_swing_points(&img, None, &ANALYSIS), SwingResult::default());
    }

    #[test]
    fn finds_extremes_and_current_price() {
        let mut img = blank_chart();
        let bright_green = Rgba::opaque(0, 200, 0);
        img.fill_rect(PixelRect::from_bounds(40, 20, 50, 41), bright_green);
        img.fill_rect(PixelRect::from_bounds(60, 50, 70, 71), RED);
        // Latest candle, rows 40..=50
        img.fill_rect(PixelRect::from_bounds(152, 40, 156, 51), bright_green);

        let result = detect_swing_points(&img, Some(&manual_map()), &ANALYSIS);

        assert!((result.swing_high.unwrap() - price_at(20.0)).abs() < 1e-9);
        assert!((result.swing_low.unwrap() - price_at(70.0)).abs() < 1e-9);
        assert!((result.current_price.unwrap() - price_at(45.0)).abs() < 1e-9);
        assert!(result.swing_high.unwrap() > result.swing_low.unwrap());
    }

    #[test]
    fn ignores_header_footer_and_gutter() {
        let mut img = blank_chart();
        let bright_green = Rgba::opaque(0, 200, 0);
        // Ticker in header, time labels in footer, price labels in gutter
        img.fill_rect(PixelRect::from_bounds(20, 2, 60, 8), WHITE);
        img.fill_rect(PixelRect::from_bounds(20, 94, 60, 98), WHITE);
        img.fill_rect(PixelRect::from_bounds(170, 14, 190, 88), bright_green);
        // The only real candle
        img.fill_rect(PixelRect::from_bounds(80, 30, 84, 61), WHITE);

        let result = detect_swing_points(&img, Some(&manual_map()), &ANALYSIS);
        assert!((result.swing_high.unwrap() - price_at(30.0)).abs() < 1e-9);
        assert!((result.swing_low.unwrap() - price_at(60.0)).abs() < 1e-9);
        // White is not a marker colour
        assert_eq!(result.current_price, None);
    }

    #[test]
    fn empty_chart_has_no_swing() {
        let result = detect_swing_points(&blank_chart(), Some(&manual_map()), &ANALYSIS);
        assert_eq!(result.swing_high, None);
        assert_eq!(result.swing_low, None);
        assert_eq!(result.current_price, None);
    }

    #[test]
    fn thresholds_are_configurable() {
        let mut img = blank_chart();
        img.fill_rect(PixelRect::from_bounds(40, 20, 50, 41), GREEN);

        // Default blue-dominance rule rejects the teal candle
        let result = detect_swing_points(&img, Some(&manual_map()), &ANALYSIS);
        assert_eq!(result.swing_high, None);

        let mut config = ANALYSIS;
        config.colors.dominance = 1.05;
        let result = detect_swing_points(&img, Some(&manual_map()), &config);
        assert!((result.swing_high.unwrap() - price_at(20.0)).abs() < 1e-9);
        assert!((result.swing_low.unwrap() - price_at(40.0)).abs() < 1e-9);
    }
}
