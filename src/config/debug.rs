//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet.

/// Emit the pairwise scale candidates and the chosen reference pair while calibrating.
pub const PRINT_CALIBRATION: bool = false;

/// Emit the chart body and extreme rows found by the swing detector.
pub const PRINT_SWING_SCAN: bool = false;

/// Emit every line returned by the text recognizer.
pub const PRINT_OCR_LINES: bool = false;

/// Emit zone/sentiment decisions made by the insight engine.
pub const PRINT_INSIGHT: bool = false;

/// Emit scan store reads and writes.
pub const PRINT_STORE_EVENTS: bool = false;
