// Data models produced and consumed by one analysis run.
// Pure data, no I/O.

pub mod fib_level;
pub mod insight;
pub mod price_map;
pub mod raster;
pub mod scan_record;
pub mod swing;

// Re-export key types for convenience
pub use fib_level::{FIB_RATIOS, FibLevel, GOLDEN_POCKET_RATIO, NearestLevel};
pub use insight::{Insight, Sentiment, Zone};
pub use price_map::PriceMap;
pub use raster::{PixelRect, RasterImage, Rgba, RgbaBuffer};
pub use scan_record::ScanRecord;
pub use swing::SwingResult;
