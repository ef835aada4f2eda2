//! CLI error handling (§7: CLI surface is outside the core, but still
//! reports failures through a typed error the way every other crate does).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error reading {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("{path} has no header row")]
    EmptyTable { path: String },

    #[error("analysis job failed: {0}")]
    Engine(#[from] clause_engine::EngineError),

    #[error("could not parse --as-of date {0:?}: {1}")]
    InvalidDate(String, chrono::ParseError),

    #[error("JSON serialisation failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
