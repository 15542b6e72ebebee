use snafu::Snafu;

/// Errors raised while setting up an ingestion run.
///
/// Store failures during the run are reported per batch and never surface
/// here.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IngestError {
    #[snafu(display("Invalid ingestion config: {message}"))]
    InvalidConfig { message: String },
    #[snafu(display("Time {time} cannot be represented in nanoseconds since the epoch"))]
    TimeOutOfRange { time: String },
}

pub type Result<T, E = IngestError> = ::std::result::Result<T, E>;
