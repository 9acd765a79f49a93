//! JSON run-configuration input.
//!
//! The run configuration is produced by a separate tool; the controller
//! only consumes it. Two pieces are read: the cell count the run was
//! prepared for (cross-checked against the model's declaration, warn
//! only) and the input channels the run actually uses (restricting what
//! the controller offers during negotiation). Everything else in the
//! document is ignored, so newer tool versions stay compatible.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Error type for run-configuration operations.
#[derive(Debug, Error)]
pub enum RunConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error reading run config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON content could not be parsed.
    #[error("failed to parse run config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The consumed subset of the run configuration document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Cell count the run was prepared for.
    #[serde(default)]
    pub cells: Option<i32>,
    /// Input channel names the run uses; `None` means no restriction.
    #[serde(default)]
    pub inputs: Option<Vec<String>>,
}

/// Loads the run configuration from `path`, returning the empty default
/// (no restriction, no cross-check) if the file does not exist.
///
/// # Errors
///
/// Returns [`RunConfigError::Io`] for file-system errors other than
/// "not found", and [`RunConfigError::Parse`] if the JSON is malformed.
pub fn load_run_config(path: &Path) -> Result<RunConfig, RunConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: RunConfig = serde_json::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RunConfig::default()),
        Err(e) => Err(RunConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let json = r#"{"cells": 67420, "inputs": ["co2", "temperature", "landuse"]}"#;

        let cfg: RunConfig = serde_json::from_str(json).expect("parse");

        assert_eq!(cfg.cells, Some(67420));
        assert_eq!(
            cfg.inputs,
            Some(vec![
                "co2".to_string(),
                "temperature".to_string(),
                "landuse".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_empty_document_means_unrestricted() {
        let cfg: RunConfig = serde_json::from_str("{}").expect("parse");

        assert_eq!(cfg, RunConfig::default());
        assert_eq!(cfg.inputs, None);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        // Tool versions add fields we do not consume.
        let json = r#"{"cells": 4, "version": 9, "outputs": ["fluxes"], "sim_name": "demo"}"#;

        let cfg: RunConfig = serde_json::from_str(json).expect("parse");

        assert_eq!(cfg.cells, Some(4));
        assert_eq!(cfg.inputs, None);
    }

    #[test]
    fn test_parse_malformed_json_reports_error() {
        let result: Result<RunConfig, serde_json::Error> = serde_json::from_str("{not json");

        assert!(result.is_err());
    }

    #[test]
    fn test_load_run_config_returns_default_when_file_absent() {
        let path = PathBuf::from("/nonexistent/path/run.json");

        let cfg = load_run_config(&path).expect("absent file must yield default");

        assert_eq!(cfg, RunConfig::default());
    }
}
