use thiserror::Error;

/// Conditions that stop a single analysis run.
///
/// Everything except `InvalidManualInput` means "the screenshot could not be read";
/// the caller should offer manual entry instead of giving up.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("only {found} usable axis label(s) found, enter the price range manually")]
    InsufficientLabels { found: usize },

    #[error("no usable swing (high {high:?}, low {low:?}), enter the swing manually")]
    DegenerateSwing { high: Option<f64>, low: Option<f64> },

    #[error("invalid manual input: {0}")]
    InvalidManualInput(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),
}

impl AnalysisError {
    /// True when the manual-entry path can still produce a result
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AnalysisError::InvalidManualInput(_))
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        AnalysisError::Recognition(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bad_manual_input_is_final() {
        assert!(AnalysisError::InsufficientLabels { found: 1 }.is_recoverable());
        assert!(
            AnalysisError::DegenerateSwing { high: None, low: Some(1.0) }.is_recoverable()
        );
        assert!(AnalysisError::Recognition("timeout".into()).is_recoverable());
        assert!(!AnalysisError::InvalidManualInput("high <= low".into()).is_recoverable());
    }

    #[test]
    fn recognizer_errors_keep_their_chain() {
        let err = anyhow::anyhow!("timeout").context("Failed to recognise chart header");
        let converted = AnalysisError::from(err);
        assert_eq!(
            converted.to_string(),
            "text recognition failed: Failed to recognise chart header: timeout"
        );
    }
}
