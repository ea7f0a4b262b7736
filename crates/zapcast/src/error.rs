//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use zapcast_config::ConfigError;
use zapcast_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to gateway at {url}")]
    #[diagnostic(
        code(zapcast::connection_failed),
        help(
            "Check that the gateway is running and accessible.\n\
             URL: {url}\n\
             Try: zapcast accounts list --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(zapcast::auth_failed),
        help(
            "The gateway rejected the bearer token.\n\
             Run: zapcast config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(zapcast::no_credentials),
        help(
            "Configure a token with: zapcast config init\n\
             Or set the ZAPCAST_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Gateway ──────────────────────────────────────────────────────
    // The HTTP status behind the message is logged by the core layer;
    // the CLI surfaces only the normalized message.
    #[error("Gateway error: {message}")]
    #[diagnostic(code(zapcast::gateway_error))]
    Gateway { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(zapcast::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(zapcast::profile_not_found),
        help(
            "List profiles with: zapcast config show\n\
             Create one with: zapcast config init"
        )
    )]
    ProfileNotFound { name: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(zapcast::no_config),
        help(
            "Create one with: zapcast config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(zapcast::config))]
    Config(Box<figment::Error>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(zapcast::timeout),
        help("Increase the timeout with --timeout or check gateway responsiveness.")
    )]
    Timeout,

    #[error("Gave up waiting for the device to pair after {seconds}s")]
    #[diagnostic(
        code(zapcast::pairing_timeout),
        help("Re-run with a longer --watch-timeout, or pair without --watch.")
    )]
    PairingTimedOut { seconds: u64 },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout | Self::PairingTimedOut { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { .. } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::OperationFailed { message }
            | CoreError::Internal(message)
            | CoreError::Api { message, .. } => CliError::Gateway { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound { name: profile },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_map_by_failure_class() {
        let auth = CliError::from(CoreError::AuthenticationFailed {
            message: "bad token".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let timeout = CliError::from(CoreError::Timeout);
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let usage = CliError::from(CoreError::ValidationFailed {
            message: "missing field".into(),
        });
        assert_eq!(usage.exit_code(), exit_code::USAGE);

        let connect = CliError::from(CoreError::ConnectionFailed {
            url: "https://gw".into(),
            reason: "refused".into(),
        });
        assert_eq!(connect.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn gateway_errors_surface_the_normalized_message() {
        let err = CliError::from(CoreError::Api {
            message: "quota exceeded".into(),
            status: Some(429),
        });
        assert!(matches!(
            err,
            CliError::Gateway { ref message } if message == "quota exceeded"
        ));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
