//! Error types for the roster manager
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//!
//! Validation failures of roster mutations are not errors; they are returned
//! as [`crate::roster::Rejection`] values.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Fetch errors (3xx)
    FetchFailed = 300,
    FetchTimeout = 301,
    FetchStatus = 302,

    // Data errors (4xx)
    DataMalformed = 400,

    // Roster command errors (5xx)
    InvalidArgument = 500,
    StudentNotFound = 501,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Fetch errors
            400..=499 => 40, // Data errors
            500..=599 => 50, // Roster command errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the roster manager
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Fetch Errors
    // ─────────────────────────────────────────────────────────────

    /// Request could not be completed
    #[error("Failed to fetch {location}: {message}")]
    FetchFailed { location: String, message: String },

    /// Request timed out
    #[error("Fetching {location} timed out after {timeout_secs}s")]
    FetchTimeout { location: String, timeout_secs: u64 },

    /// Server answered with a non-success status
    #[error("Fetching {location} failed with HTTP status {status}")]
    FetchStatus { location: String, status: u16 },

    // ─────────────────────────────────────────────────────────────
    // Data Errors
    // ─────────────────────────────────────────────────────────────

    /// Document is not the expected JSON shape
    #[error("Malformed data in {location}: {message}")]
    DataMalformed { location: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Roster Command Errors
    // ─────────────────────────────────────────────────────────────

    /// Bad filter, sort key, direction or row argument
    #[error("Invalid {what} '{value}': {message}")]
    InvalidArgument {
        what: &'static str,
        value: String,
        message: String,
    },

    /// No student matched a lookup
    #[error("No student matches '{query}'")]
    StudentNotFound { query: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::FetchFailed { .. } => ErrorCode::FetchFailed,
            Error::FetchTimeout { .. } => ErrorCode::FetchTimeout,
            Error::FetchStatus { .. } => ErrorCode::FetchStatus,

            Error::DataMalformed { .. } => ErrorCode::DataMalformed,

            Error::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Error::StudentNotFound { .. } => ErrorCode::StudentNotFound,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether the error happened while loading the roster documents
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Error::FetchFailed { .. }
                | Error::FetchTimeout { .. }
                | Error::FetchStatus { .. }
                | Error::DataMalformed { .. }
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'hogwarts-roster config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'hogwarts-roster config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),

            Error::FetchFailed { .. } | Error::FetchTimeout { .. } => Some(
                "Please check your internet connection and try again."
            ),
            Error::FetchStatus { .. } => Some(
                "Verify the configured students_url and families_url point at the student and family documents."
            ),
            Error::DataMalformed { .. } => Some(
                "The source must be a JSON list of {fullname, house, gender} records and a {half, pure} family document."
            ),

            Error::InvalidArgument { .. } => Some(
                "Run 'hogwarts-roster --help' or type 'help' in the shell for valid values."
            ),
            Error::StudentNotFound { .. } => Some(
                "Use 'hogwarts-roster list --search <name>' to find the exact spelling."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a fetch failed error
    pub fn fetch_failed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::FetchFailed {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a malformed data error
    pub fn data_malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DataMalformed {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(
        what: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            what,
            value: value.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
