use serde::{Deserialize, Serialize};

/// A candidate axis price read at a vertical pixel position.
/// Comes from text recognition, so duplicates and misreads are expected.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelObservation {
    pub value: f64,
    pub pixel_row: i32,
}

impl LabelObservation {
    pub fn new(value: f64, pixel_row: i32) -> Self {
        Self { value, pixel_row }
    }
}
