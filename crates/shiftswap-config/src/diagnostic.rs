// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup configuration errors rendered as miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error surfaced at startup.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to merge or deserialize the configuration sources.
    #[error("failed to load configuration: {message}")]
    #[diagnostic(
        code(shiftswap::config::load),
        help("check shiftswap.toml and SHIFTSWAP_* environment variables")
    )]
    Load {
        /// Description of the load failure.
        message: String,
    },

    /// A semantic validation failure on a loaded value.
    #[error("validation error: {message}")]
    #[diagnostic(code(shiftswap::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load {
            message: err.to_string(),
        }
    }
}

/// Render collected configuration errors to stderr via miette.
pub fn render_errors(errors: &[ConfigError]) {
    for err in errors {
        let report = miette::Report::msg(format!("{err}"));
        eprintln!("{report:?}");
        if let Some(help) = err.help() {
            eprintln!("  help: {help}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figment_error_converts_to_load_variant() {
        let err: figment::Error = figment::Error::from("boom".to_string());
        let config_err: ConfigError = err.into();
        assert!(matches!(config_err, ConfigError::Load { .. }));
    }
}
