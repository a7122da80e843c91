//! Remote query contracts.
//!
//! # Responsibility
//! - Define the two remote operations (semantic search, similarity lookup).
//! - Define the transport/response failure taxonomy returned as values.
//!
//! # Invariants
//! - Gateways hold no mutable state and never cache.
//! - Every call is a single attempt; retries belong to the caller.
//! - Gateways do not validate id membership or reject blank queries.

use crate::model::article::ArticleId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Transport-level failure: unreachable host, refused connection, timeout.
    Network {
        endpoint: String,
        message: String,
        timed_out: bool,
    },
    /// Boundary reachable but answered with a non-success status or a
    /// payload that does not decode.
    Response {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },
}

impl GatewayError {
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Response {
            endpoint: endpoint.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Stable short code used in log events and UI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network {
                timed_out: true, ..
            } => "network_timeout",
            Self::Network { .. } => "network",
            Self::Response {
                status: Some(_), ..
            } => "response_status",
            Self::Response { .. } => "response_malformed",
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network {
                endpoint,
                message,
                timed_out: true,
            } => write!(f, "request to `{endpoint}` timed out: {message}"),
            Self::Network {
                endpoint, message, ..
            } => write!(f, "request to `{endpoint}` failed: {message}"),
            Self::Response {
                endpoint,
                status: Some(status),
                message,
            } => write!(f, "`{endpoint}` returned status {status}: {message}"),
            Self::Response {
                endpoint, message, ..
            } => write!(f, "`{endpoint}` returned a malformed payload: {message}"),
        }
    }
}

impl Error for GatewayError {}

/// Result shape of a semantic search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHits {
    /// Ranked article ids (primary contract).
    Ids(Vec<ArticleId>),
    /// Text labels to match locally (legacy contract).
    Labels(Vec<String>),
}

impl SearchHits {
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Labels(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Request/response boundary for remote query operations.
///
/// Implementations are shared across dispatch worker threads.
pub trait QueryGateway: Send + Sync {
    /// Semantic search for `query`; blank queries are forwarded as-is.
    fn search(&self, query: &str) -> GatewayResult<SearchHits>;

    /// Ids of articles similar to `id`, ranked by the backend.
    fn find_similar(&self, id: &ArticleId) -> GatewayResult<Vec<ArticleId>>;
}

impl<G: QueryGateway + ?Sized> QueryGateway for std::sync::Arc<G> {
    fn search(&self, query: &str) -> GatewayResult<SearchHits> {
        (**self).search(query)
    }

    fn find_similar(&self, id: &ArticleId) -> GatewayResult<Vec<ArticleId>> {
        (**self).find_similar(id)
    }
}

/// Trims and collapses internal whitespace runs to single spaces.
pub fn normalize_query(query: &str) -> String {
    WHITESPACE_RE.replace_all(query.trim(), " ").into_owned()
}
