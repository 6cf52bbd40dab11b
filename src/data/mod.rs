// Collaborators at the edge of the engine: text recognition and scan history
pub mod ocr;
pub mod scan_store;

// Re-export commonly used types
pub use ocr::{
    OcrOutput, RecognizedLine, RecognizerHandle, RowSpan, TextRecognizer, parse_price_labels,
    preprocess_for_ocr,
};
pub use scan_store::{JsonFileScanStore, MemoryScanStore, ScanStore};
