use serde::{Deserialize, Serialize};

use crate::domain::LabelObservation;

/// Linear mapping between image rows and prices for one chart.
///
/// Row numbers grow downward while prices grow upward, so `top_price > bottom_price`
/// and `bottom_pixel_row > top_pixel_row`. Built once per run and never mutated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PriceMap {
    pub top_price: f64,
    pub bottom_price: f64,
    pub top_pixel_row: i32,
    pub bottom_pixel_row: i32,
    pub pixels_per_unit: f64,
}

impl PriceMap {
    /// Checked constructor; `None` if the invariants do not hold
    pub fn new(
        top_price: f64,
        bottom_price: f64,
        top_pixel_row: i32,
        bottom_pixel_row: i32,
        pixels_per_unit: f64,
    ) -> Option<Self> {
        let valid = top_price > bottom_price
            && bottom_pixel_row > top_pixel_row
            && pixels_per_unit.is_finite()
            && pixels_per_unit > 0.0;

        valid.then_some(Self {
            top_price,
            bottom_price,
            top_pixel_row,
            bottom_pixel_row,
            pixels_per_unit,
        })
    }

    /// Map spanning two anchor labels, scale derived from them
    pub fn from_anchors(top: &LabelObservation, bottom: &LabelObservation) -> Option<Self> {
        let pixel_range = (bottom.pixel_row - top.pixel_row) as f64;
        let price_range = top.value - bottom.value;
        Self::new(
            top.value,
            bottom.value,
            top.pixel_row,
            bottom.pixel_row,
            pixel_range / price_range,
        )
    }

    /// Price at a (possibly fractional) pixel row
    pub fn pixel_row_to_price(&self, row: f64) -> f64 {
        self.top_price - (row - self.top_pixel_row as f64) / self.pixels_per_unit
    }

    /// Pixel row (fractional) at which `price` sits
    pub fn price_to_pixel_row(&self, price: f64) -> f64 {
        self.top_pixel_row as f64 + (self.top_price - price) * self.pixels_per_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> PriceMap {
        PriceMap::new(69000.0, 15000.0, 10, 500, 490.0 / 54000.0).unwrap()
    }

    #[test]
    fn anchors_map_to_their_prices() {
        let m = map();
        assert!((m.pixel_row_to_price(10.0) - 69000.0).abs() < 1e-9);
        assert!((m.pixel_row_to_price(500.0) - 15000.0).abs() < 1e-6);
        assert!((m.price_to_pixel_row(15000.0) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn conversions_are_inverse() {
        let m = map();
        for row in [-40.0, 0.0, 10.0, 123.5, 255.0, 499.9, 900.0] {
            let back = m.price_to_pixel_row(m.pixel_row_to_price(row));
            assert!((back - row).abs() < 1e-6, "row {} came back as {}", row, back);
        }
        for price in [0.5, 15000.0, 42000.0, 123456.789] {
            let back = m.pixel_row_to_price(m.price_to_pixel_row(price));
            assert!((back - price).abs() < 1e-6);
        }
    }

    #[test]
    fn rejects_broken_invariants() {
        assert!(PriceMap::new(100.0, 100.0, 0, 10, 1.0).is_none());
        assert!(PriceMap::new(100.0, 50.0, 10, 10, 1.0).is_none());
        assert!(PriceMap::new(100.0, 50.0, 0, 10, 0.0).is_none());
        assert!(PriceMap::new(100.0, 50.0, 0, 10, f64::INFINITY).is_none());
    }
}
