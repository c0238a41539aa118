use thiserror::Error;

/// Failures raised by the cleaning and aggregation stages.
///
/// Malformed records are not errors: the validator drops and counts them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("row {row}: field {field} value '{value}' is not numeric")]
    Parse {
        row: usize,
        field: usize,
        value: String,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Config(message.into())
    }
}
