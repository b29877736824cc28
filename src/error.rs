// Error handling module
// Defines the CLI error taxonomy and its mapping to exit codes

use serde_json::json;
use thiserror::Error;

/// Process exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code for any failure other than missing authentication
pub const EXIT_ERROR: i32 = 1;

/// Process exit code when the user has to log in (again)
pub const EXIT_AUTH_REQUIRED: i32 = 2;

/// Errors that can surface from a command
#[derive(Error, Debug)]
pub enum CliError {
    /// No usable credentials; the user must run `meerkat login`
    #[error("{0}")]
    AuthRequired(String),

    /// Non-2xx response from the receipt service.
    /// The message is the server's `detail` when present.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Password grant rejected by the auth provider
    #[error("{0}")]
    Login(String),

    /// Auth-config discovery failed and no fallback was configured
    #[error("{0}")]
    Discovery(String),

    /// Local input validation error
    #[error("{0}")]
    Validation(String),

    /// Polling gave up before a terminal status was observed
    #[error("{0}")]
    Timeout(String),

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Anything else (I/O, JSON, prompts)
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    /// Build the default "not logged in" error
    pub fn auth_required() -> Self {
        CliError::AuthRequired("Authentication required. Run `meerkat login` first.".to_string())
    }

    /// Build the "no config.json yet" error
    pub fn config_missing() -> Self {
        CliError::AuthRequired("Configuration missing. Run `meerkat login` first.".to_string())
    }

    /// Exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::AuthRequired(_) => EXIT_AUTH_REQUIRED,
            _ => EXIT_ERROR,
        }
    }

    /// Whether this error asks the user to authenticate
    pub fn is_auth_required(&self) -> bool {
        matches!(self, CliError::AuthRequired(_))
    }

    /// JSON rendering used in `--json` mode
    pub fn to_json(&self) -> serde_json::Value {
        json!({ "error": self.to_string() })
    }
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CliError>;
