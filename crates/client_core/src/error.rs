use shared::{domain::AdId, protocol::DecisionKind};
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Failure of a list, item, or stats read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with {status}: {message}")]
    Server { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return FetchError::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => FetchError::Server {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// A decision write that did not reach a confirmed server state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?} for ad {id} failed: {source}")]
pub struct DecisionWriteError {
    pub id: AdId,
    pub kind: DecisionKind,
    #[source]
    pub source: FetchError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("page numbers start at 1")]
    InvalidPage,
    #[error("price range [{min}, {max}] must satisfy 0 <= min <= max <= 100000")]
    InvalidPriceRange { min: u32, max: u32 },
    #[error("unknown filter key '{0}'")]
    UnknownFilterKey(String),
    #[error("invalid value for filter '{key}': {value}")]
    InvalidFilterValue { key: &'static str, value: String },
}

/// Refusals raised before any write is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("no listing is loaded")]
    NotLoaded,
    #[error("decision form is incomplete: {0}")]
    Incomplete(ValidationIssue),
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("unsupported API base URL scheme '{0}'")]
    Scheme(String),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
