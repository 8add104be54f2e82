use thiserror::Error;

/// Errors raised while building or loading event templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid template `{pattern}`: {reason}")]
    Construction { pattern: String, reason: String },

    #[error("Unsupported template file format: {0}. Supported formats are .toml and .txt")]
    UnsupportedFormat(String),

    #[error("Invalid template source {path}: {reason}")]
    InvalidSource { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TemplateError {
    pub(crate) fn construction(pattern: &str, reason: impl Into<String>) -> Self {
        TemplateError::Construction {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
