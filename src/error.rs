//! Error types for the extraction wizard

use thiserror::Error;

/// Result type alias for the extraction wizard
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the extraction wizard
#[derive(Error, Debug)]
pub enum Error {
    /// Local, pre-network validation failure (file type/size, schema completeness)
    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    /// Any failed API call, normalized to one message
    #[error("Request failed: {message}")]
    Request { message: String },

    /// Export-specific failure, reported apart from processing failures
    #[error("Export failed: {message}")]
    Export { message: String },

    /// Action not permitted from the current wizard step
    #[error("Cannot {action} from the {step} step")]
    InvalidTransition { step: String, action: String },

    /// A long-running call is already in flight
    #[error("Another operation is in progress")]
    Busy,

    /// Invalid base URL or endpoint
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Spreadsheet writer error
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    pub fn validation<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Error::Validation {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Error::Request {
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Error::Export {
            message: message.into(),
        }
    }

    /// Return the single notification text shown to the user for this error.
    /// Library details (paths, IO errors) stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            Error::Validation { errors } => errors.join("; "),
            Error::Request { message } => message.clone(),
            Error::Export { message } => message.clone(),
            Error::InvalidTransition { step, action } => {
                format!("Cannot {} from the {} step", action, step)
            }
            Error::Busy => "Please wait for the current operation to finish".to_string(),
            Error::InvalidUrl(_) => "Invalid server URL".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Serialization(_) => "Invalid response from server".to_string(),
            Error::Workbook(_) => "Failed to export results".to_string(),
        }
    }

    /// True for errors raised locally before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::InvalidTransition { .. } | Error::Busy
        )
    }
}
