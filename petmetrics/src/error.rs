use std::net::AddrParseError;

use petmetrics_ingest::IngestError;
use petmetrics_observability::ObservabilityError;
use petmetrics_store::{ErrorKind, ResourceError, StoreError};
use snafu::Snafu;

/// CLI error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CliError {
    #[snafu(display("Invalid {resource} name"))]
    InvalidResourceName {
        resource: &'static str,
        source: ResourceError,
    },
    #[snafu(display("Failed store operation {operation}"))]
    Store {
        operation: &'static str,
        source: StoreError,
    },
    #[snafu(display("Ingestion error"))]
    Ingest { source: IngestError },
    #[snafu(display("Failed to initialize observability"))]
    Observability { source: ObservabilityError },
    #[snafu(display("Invalid server URL"))]
    InvalidServerUrl { source: AddrParseError },
    #[snafu(display("IO error"))]
    Io { source: std::io::Error },
    #[snafu(display("JSON parse error"))]
    JsonParse { source: serde_json::Error },
    #[snafu(display("HTTP request error"))]
    Http { source: reqwest::Error },
    #[snafu(display("Query failed with status {status}: {message}"))]
    QueryFailed { status: u16, message: String },
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

impl CliError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::Store { source, .. } => source.kind(),
            CliError::InvalidResourceName { .. }
            | CliError::Ingest { .. }
            | CliError::InvalidServerUrl { .. }
            | CliError::JsonParse { .. } => ErrorKind::Validation,
            CliError::QueryFailed { status: 404, .. } => ErrorKind::NotFound,
            CliError::QueryFailed { status, .. } if *status < 500 => ErrorKind::Validation,
            CliError::Http { .. } | CliError::QueryFailed { .. } => ErrorKind::Temporary,
            CliError::Observability { .. } | CliError::Io { .. } => ErrorKind::Internal,
        }
    }
}
