use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Failure of an upstream call or of a pipeline that depends on one.
///
/// Every variant renders a message that can be shown to an end user as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("No internet connection")]
    NoConnectivity,

    #[error("The server took too long to respond. Check your connection.")]
    Timeout,

    #[error("Unable to connect to the server")]
    ConnectionRefused,

    #[error("Unable to read weather data: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("No place found for '{0}'")]
    GeocodeNotFound(String),

    #[error("No provider could name this location")]
    AllProvidersFailed,

    #[error("Current location is unavailable")]
    LocationUnavailable,
}

impl FetchError {
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: &str) -> Self {
        FetchError::Network(format!(
            "{provider} request failed with status {status}: {}",
            truncate_body(body)
        ))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return FetchError::Timeout;
        }

        if err.is_connect() {
            return classify_connect(&err);
        }

        if err.is_decode() {
            return FetchError::MalformedResponse(err.to_string());
        }

        FetchError::Network(err.to_string())
    }
}

impl From<PayloadError> for FetchError {
    fn from(err: PayloadError) -> Self {
        FetchError::MalformedResponse(err.to_string())
    }
}

/// Walks the source chain of a connect error looking for the I/O cause.
fn classify_connect(err: &reqwest::Error) -> FetchError {
    let mut source: Option<&(dyn StdError + 'static)> = err.source();

    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return FetchError::ConnectionRefused,
                io::ErrorKind::TimedOut => return FetchError::Timeout,
                io::ErrorKind::NetworkUnreachable
                | io::ErrorKind::HostUnreachable
                | io::ErrorKind::NetworkDown
                | io::ErrorKind::NotConnected => return FetchError::NoConnectivity,
                _ => {}
            }
        }

        // hyper-util reports resolver failures as "dns error"
        if cause.to_string().contains("dns error") {
            return FetchError::NoConnectivity;
        }

        source = cause.source();
    }

    FetchError::Network(err.to_string())
}

/// A provider payload that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("'{field}' has {actual} entries but the time axis has {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("time series '{0}' is not in ascending order")]
    Unsorted(&'static str),
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
