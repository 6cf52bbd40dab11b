#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod utils;

// The pipeline and its owner
pub mod engine;

// Re-export commonly used types
pub use config::{ANALYSIS, AnalysisConfig};
pub use data::{JsonFileScanStore, MemoryScanStore, RecognizerHandle, ScanStore, TextRecognizer};
pub use domain::{AssetInfo, AssetType, LabelObservation, TrendDirection};
pub use engine::{AnalysisError, ChartEngine, ManualInput, MarketSnapshot};
pub use models::{FibLevel, Insight, PriceMap, RgbaBuffer, ScanRecord, SwingResult};

// CLI argument parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fibonacci levels and insight from chart screenshots", long_about = None)]
pub struct Cli {
    /// JSON file overriding any subset of the analysis configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Scan history file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the seven retracement levels for a swing
    Levels {
        #[arg(long)]
        high: f64,
        #[arg(long)]
        low: f64,
        /// uptrend | downtrend
        #[arg(long, default_value = "uptrend")]
        direction: TrendDirection,
    },
    /// Analyse a manually entered swing
    Manual {
        #[arg(long)]
        high: f64,
        #[arg(long)]
        low: f64,
        #[arg(long)]
        current: Option<f64>,
        /// crypto | forex | stock
        #[arg(long, default_value = "crypto", value_parser = AssetType::parse_arg)]
        asset: AssetType,
        #[arg(long)]
        name: Option<String>,
        /// Screenshot height, to also print the manual price map
        #[arg(long)]
        image_height: Option<u32>,
        /// Persist the scan to the history file
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Build a price map from a JSON array of {"value", "pixelRow"} labels
    Calibrate {
        #[arg(long)]
        labels: PathBuf,
        #[arg(long)]
        image_height: u32,
    },
    /// Analyse manual-input JSON files in parallel
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List saved scans, or delete one
    History {
        #[arg(long)]
        delete: Option<u64>,
    },
}
