use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum QueryError {
    #[snafu(display("Unknown granularity '{granularity}'"))]
    UnknownGranularity { granularity: String },
    #[snafu(display("Invalid query event: {message}"))]
    InvalidEvent { message: String },
    #[snafu(display("Invalid bucket label {label}"))]
    InvalidLabel { label: String },
}

pub type Result<T, E = QueryError> = ::std::result::Result<T, E>;
