// Calibration, swing detection, retracement math and insight rules
pub mod calibration;
pub mod fibonacci;
pub mod insight;
pub mod swing_detection;

// Re-export commonly used functions
pub use calibration::{build_manual_price_map, build_price_map};
pub use fibonacci::{compute_levels, determine_trend, find_nearest_level, find_next_target};
pub use insight::generate_insight;
pub use swing_detection::{PixelClass, detect_current_price, detect_swing_points};
