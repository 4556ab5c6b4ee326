use datascope_types::Problem;
use std::fmt;

/// Result type for datascope-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the client layer
#[derive(Debug)]
pub enum Error {
    /// The backend answered with a problem-details payload
    Backend(Problem),

    /// The request never completed (connect, timeout, TLS)
    Http(reqwest::Error),

    /// The response body could not be decoded
    Decode(serde_json::Error),
}

impl Error {
    /// Collapse any client failure into the problem shape the UI
    /// surfaces. Transport and decode failures become synthetic
    /// problems with status 0.
    pub fn into_problem(self) -> Problem {
        match self {
            Error::Backend(problem) => problem,
            Error::Http(err) => Problem::transport(err.to_string()),
            Error::Decode(err) => Problem::transport(format!("Invalid response body: {}", err)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Backend(problem) => write!(f, "Backend error: {}", problem),
            Error::Http(err) => write!(f, "HTTP error: {}", err),
            Error::Decode(err) => write!(f, "Decode error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Backend(problem) => Some(problem),
            Error::Http(err) => Some(err),
            Error::Decode(err) => Some(err),
        }
    }
}

impl From<Problem> for Error {
    fn from(problem: Problem) -> Self {
        Error::Backend(problem)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err)
    }
}
