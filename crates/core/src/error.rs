use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Failure talking to the generative model service.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model request timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure talking to the video metadata service. Never leaves the metadata
/// client: callers only ever see an empty result.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Missing model API key: supply a Gemini API key before running an analysis")]
    MissingCredential,

    #[error("Trend analysis request failed: {0}")]
    ModelRequest(#[source] ModelError),

    #[error("Could not read the model's answer as JSON: {reason}")]
    ResponseParse { reason: String },
}

impl AnalysisError {
    /// Whether a misconfigured API key is a likely cause worth hinting at.
    pub fn is_credential_hint(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingCredential | AnalysisError::ModelRequest(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No API key captured yet: run a trend analysis first")]
    MissingCredential,

    #[error("Script generation request failed: {0}")]
    Request(#[source] ModelError),

    #[error(transparent)]
    Selection(#[from] SessionError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("No trend report is available yet")]
    NoReport,

    #[error("Content idea {index} does not exist (report has {len} ideas)")]
    IdeaOutOfRange { index: usize, len: usize },

    #[error("No content idea is selected")]
    NothingSelected,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}
