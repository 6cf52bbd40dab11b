// Domain types and value objects
pub mod asset;
pub mod label;
pub mod trend;

// Re-export commonly used types
pub use asset::{ASSET_RULES, AssetInfo, AssetType, detect_asset};
pub use label::LabelObservation;
pub use trend::{TargetSide, TrendDirection};
