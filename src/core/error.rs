use thiserror::Error;

use super::fields::FieldKey;

/// A strategy blew up on its input. Never leaves the strategy stack: the
/// runner logs it and treats the attempt as "no match".
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid selector `{selector}`")]
    InvalidSelector { selector: String },

    #[error("invalid pattern for label `{label}`: {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// Capture-level failures, surfaced as strings in `ParsingResult::errors`.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Missing required field: {0}")]
    FieldMissing(FieldKey),

    #[error("No EMR detected with sufficient confidence")]
    DetectionFailed,

    #[error("Parse already in progress for this capture")]
    ParseInProgress,

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Storage error: {0}")]
    Store(String),
}

/// Non-fatal problems while replaying a record into a target form.
#[derive(Debug, Error)]
pub enum FillError {
    #[error("Field not found: {0}")]
    ControlNotFound(String),

    #[error("Dropdown not found: {0}")]
    DropdownNotFound(String),

    #[error("Dropdown option not found for {selector}: {value}")]
    OptionNotFound { selector: String, value: String },

    #[error("Fill cancelled after {0} fields")]
    Cancelled(usize),

    #[error("No primary insurance data")]
    NoPrimaryInsurance,

    #[error("No captured data available to fill")]
    NothingCaptured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        assert_eq!(
            CaptureError::FieldMissing(FieldKey::LastName).to_string(),
            "Missing required field: lastName"
        );
        assert_eq!(
            FillError::ControlNotFound("#mrn".into()).to_string(),
            "Field not found: #mrn"
        );
    }
}
