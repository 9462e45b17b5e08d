use thiserror::Error;

/// Fatal conversion failure. Everything short of unreadable input is
/// recovered and reported as a [`ConvertWarning`] instead.
#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct ConvertError {
    pub code: &'static str,
    pub message: String,
    pub file: Option<String>,
}

impl ConvertError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertWarning {
    #[error("W3001: offset {offset_ms}ms exceeds {limit_ms}ms, using 0ms instead")]
    OffsetOutOfRange { offset_ms: f64, limit_ms: f64 },
}

impl ConvertWarning {
    pub fn code(&self) -> &'static str {
        match self {
            ConvertWarning::OffsetOutOfRange { .. } => "W3001",
        }
    }
}
