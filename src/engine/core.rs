use std::sync::Arc;

use anyhow::{Result, bail};

use crate::config::{ANALYSIS, AnalysisConfig};
use crate::data::{RecognizerHandle, ScanStore};
use crate::models::{RasterImage, ScanRecord};

use super::error::AnalysisError;
use super::messages::{Analysis, ChartScan, ManualInput, ManualScan, MarketSnapshot};
use super::pipeline;

/// Owns the collaborators a run needs: configuration, the text recognizer and the
/// scan history. The engine itself keeps no per-run state.
pub struct ChartEngine {
    /// The Live Configuration State
    pub current_config: AnalysisConfig,

    recognizer: Option<RecognizerHandle>,
    store: Option<Arc<dyn ScanStore>>,
}

impl ChartEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            current_config: config,
            recognizer: None,
            store: None,
        }
    }

    pub fn with_recognizer(mut self, recognizer: RecognizerHandle) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ScanStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn update_config(&mut self, new_config: AnalysisConfig) {
        self.current_config = new_config;
    }

    /// Read a screenshot end to end: header and price gutter through the
    /// recognizer, then calibration, swing detection and analysis.
    pub fn scan_screenshot<I: RasterImage + ?Sized>(&self, image: &I) -> Result<ChartScan, AnalysisError> {
        let Some(recognizer) = &self.recognizer else {
            return Err(AnalysisError::Recognition(
                "no text recognizer configured".to_string(),
            ));
        };

        let asset = recognizer.extract_asset(image)?;
        let labels = recognizer.extract_price_scale(image, &self.current_config.calibration)?;
        log::info!(
            "Screenshot {}x{}: {} ({}, {:.0}%), {} price label(s)",
            image.width(),
            image.height(),
            asset.name,
            asset.asset_type,
            asset.confidence,
            labels.len()
        );

        pipeline::scan_chart(image, &labels, asset, &self.current_config)
    }

    pub fn scan_manual(&self, input: &ManualInput, image_height: Option<u32>) -> Result<ManualScan, AnalysisError> {
        pipeline::scan_manual(input, image_height, &self.current_config)
    }

    pub fn analyze(&self, snapshot: &MarketSnapshot) -> Result<Analysis, AnalysisError> {
        pipeline::analyze(snapshot, &self.current_config.insight)
    }

    pub fn analyze_batch(&self, snapshots: &[MarketSnapshot]) -> Vec<Result<Analysis, AnalysisError>> {
        pipeline::analyze_batch(snapshots, &self.current_config.insight)
    }

    pub fn scan_manual_batch(&self, inputs: &[ManualInput]) -> Vec<Result<Analysis, AnalysisError>> {
        pipeline::scan_manual_batch(inputs, &self.current_config.insight)
    }

    // --- HISTORY ---

    fn store(&self) -> Result<&dyn ScanStore> {
        match &self.store {
            Some(store) => Ok(store.as_ref()),
            None => bail!("No scan store configured"),
        }
    }

    pub fn save(&self, analysis: &Analysis) -> Result<ScanRecord> {
        let record = self.store()?.create(ScanRecord::from_analysis(analysis))?;
        log::info!("Saved scan #{} ({})", record.id, record.asset_name);
        Ok(record)
    }

    pub fn history(&self) -> Result<Vec<ScanRecord>> {
        self.store()?.list()
    }

    pub fn delete(&self, id: u64) -> Result<bool> {
        self.store()?.delete(id)
    }

    /// Recompute levels and insight for a stored scan
    pub fn reanalyze(&self, id: u64) -> Result<Option<Analysis>> {
        let Some(record) = self.store()?.get(id)? else {
            return Ok(None);
        };
        let analysis = self.analyze(&MarketSnapshot::from(&record))?;
        Ok(Some(analysis))
    }

    /// Release the recognizer handle held by this engine
    pub fn shutdown(self) {
        if let Some(recognizer) = self.recognizer {
            recognizer.release();
        }
    }
}

impl Default for ChartEngine {
    fn default() -> Self {
        Self::new(ANALYSIS)
    }
}
