//! Text recognition seam.
//!
//! The engine never talks to an OCR library directly. A `TextRecognizer` turns a
//! pre-processed crop into lines with vertical bounding boxes; everything after that
//! (label parsing, asset detection) is pure and lives here.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::debug::PRINT_OCR_LINES;
use crate::config::{CalibrationSettings, OcrRegions};
use crate::domain::{AssetInfo, LabelObservation, detect_asset};
use crate::models::{PixelRect, RasterImage, Rgba, RgbaBuffer};
use crate::utils::strip_to_numeric;

/// Vertical extent of a recognised line, in crop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    pub row0: i32,
    pub row1: i32,
}

impl RowSpan {
    /// Centre row, rounded half up
    pub fn center(&self) -> i32 {
        ((self.row0 + self.row1) as f64 / 2.0).round() as i32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    pub text: String,
    pub bounding_box: RowSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    pub lines: Vec<RecognizedLine>,
    pub text: String,
    /// 0-100, as reported by the recognizer
    pub confidence: f64,
}

/// Anything that can read text out of an image.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &RgbaBuffer) -> Result<OcrOutput>;

    /// Release engine resources. Called once, when the last handle is released.
    fn shutdown(&self) {}
}

/// Shared handle to an initialised recognizer.
///
/// Clones share one engine, so several scans can run at once. Dropping a handle
/// does nothing; `release` on the last clone shuts the engine down.
#[derive(Clone)]
pub struct RecognizerHandle {
    inner: Arc<Box<dyn TextRecognizer>>,
    regions: OcrRegions,
}

impl std::fmt::Debug for RecognizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerHandle")
            .field("handles", &Arc::strong_count(&self.inner))
            .field("regions", &self.regions)
            .finish()
    }
}

impl RecognizerHandle {
    pub fn init(recognizer: impl TextRecognizer + 'static, regions: OcrRegions) -> Self {
        log::info!("Text recognizer initialised");
        Self {
            inner: Arc::new(Box::new(recognizer)),
            regions,
        }
    }

    /// Give up this handle. Shuts the engine down if no other clone is alive.
    /// Exactly one of several concurrent releases sees the last reference.
    pub fn release(self) {
        if let Some(recognizer) = Arc::into_inner(self.inner) {
            recognizer.shutdown();
            log::info!("Text recognizer shut down");
        }
    }

    /// Read the right-hand price gutter into label observations.
    /// Rows are image rows: the crop keeps the full height.
    pub fn extract_price_scale<I: RasterImage + ?Sized>(
        &self,
        image: &I,
        settings: &CalibrationSettings,
    ) -> Result<Vec<LabelObservation>> {
        let crop_x = scaled(image.width(), 1.0 - self.regions.price_scale_pct);
        let rect = PixelRect::from_bounds(crop_x, 0, image.width(), image.height());
        let mut crop = RgbaBuffer::crop(image, rect);
        preprocess_for_ocr(&mut crop, self.regions.binarize_threshold);

        let output = self
            .inner
            .recognize(&crop)
            .context(format!("Failed to recognise price scale in {:?}", rect))?;

        if PRINT_OCR_LINES {
            for line in &output.lines {
                log::info!("OCR price line {:?}: {:?}", line.bounding_box, line.text);
            }
        }

        Ok(parse_price_labels(&output.lines, settings.dedupe_window_px))
    }

    /// Read the header band and guess the asset from it.
    pub fn extract_asset<I: RasterImage + ?Sized>(&self, image: &I) -> Result<AssetInfo> {
        let crop_h = scaled(image.height(), self.regions.header_pct);
        let rect = PixelRect::from_bounds(0, 0, image.width(), crop_h);
        let mut crop = RgbaBuffer::crop(image, rect);
        preprocess_for_ocr(&mut crop, self.regions.binarize_threshold);

        let output = self
            .inner
            .recognize(&crop)
            .context(format!("Failed to recognise chart header in {:?}", rect))?;

        if PRINT_OCR_LINES {
            log::info!("OCR header text ({:.0}%): {:?}", output.confidence, output.text);
        }

        Ok(detect_asset(&output.text.to_uppercase(), output.confidence))
    }
}

fn scaled(len: u32, pct: f64) -> u32 {
    ((len as f64 * pct) + 1e-9).floor().max(0.0) as u32
}

/// Grayscale, push darks down and lights up, then binarise.
pub fn preprocess_for_ocr(image: &mut RgbaBuffer, threshold: f64) {
    image.map_pixels(|px| {
        let gray = px.luma();
        let enhanced = if gray < 128.0 {
            gray * 0.5
        } else {
            128.0 + (gray - 128.0) * 1.5
        };
        let v = if enhanced > threshold { 255 } else { 0 };
        Rgba::new(v, v, v, px.a)
    });
}

/// Turn recognised lines into label observations, top to bottom.
///
/// Lines that do not start with a number are skipped silently. Observations whose
/// row falls within `dedupe_window` pixels of an earlier one are dropped.
pub fn parse_price_labels(lines: &[RecognizedLine], dedupe_window: i32) -> Vec<LabelObservation> {
    let mut labels: Vec<LabelObservation> = lines
        .iter()
        .filter_map(|line| {
            let value = parse_label_value(&line.text)?;
            Some(LabelObservation::new(value, line.bounding_box.center()))
        })
        .collect();

    labels.sort_by_key(|l| l.pixel_row);

    let mut kept: Vec<LabelObservation> = Vec::with_capacity(labels.len());
    for label in labels {
        // Sorted, so the last kept row is the closest
        let clustered = kept
            .last()
            .is_some_and(|k| (label.pixel_row - k.pixel_row).abs() < dedupe_window);
        if !clustered {
            kept.push(label);
        }
    }
    kept
}

/// "65 800.0" -> 65800, "1,234.5" -> 1234.5, "65.800.0" -> 65800
fn parse_label_value(text: &str) -> Option<f64> {
    let cleaned: String = strip_to_numeric(text)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    // Only the last dot survives as the decimal point
    let normalized = match cleaned.rfind('.') {
        Some(idx) => format!("{}.{}", cleaned[..idx].replace('.', ""), &cleaned[idx + 1..]),
        None => cleaned,
    };

    let value = leading_number(&normalized)?;
    (value != 0.0).then_some(value.abs())
}

/// Parse the longest numeric prefix, ignoring trailing junk
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        } else if has_digits {
            end += 1;
        }
    }
    if !has_digits {
        return None;
    }
    text[..end].parse().ok()
}
