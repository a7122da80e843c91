//! HTTP implementation of the remote boundary.
//!
//! # Responsibility
//! - Issue `GET /raw-data`, `POST /search`, `GET /similar/{id}` against one
//!   backend base URL.
//! - Map transport and status failures into `GatewayError` values.
//!
//! # Invariants
//! - One attempt per call; no retries, no caching.
//! - Response bodies are decoded by `gateway::wire`, never trusted blindly.

use crate::config::{ExplorerConfig, SearchContract};
use crate::gateway::query::{
    normalize_query, GatewayError, GatewayResult, QueryGateway, SearchHits,
};
use crate::gateway::wire::{decode_articles, decode_id_results, decode_label_results};
use crate::model::article::ArticleId;
use crate::repo::article_repo::{ArticleSource, FetchedArticles, LoadError};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct SearchRequestBody<'a> {
    query: &'a str,
}

/// Blocking HTTP gateway over one backend.
///
/// Calls block the calling thread; the dispatcher runs them off the
/// session's event loop.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    contract: SearchContract,
}

impl HttpGateway {
    /// Builds a gateway from resolved explorer configuration.
    ///
    /// # Errors
    /// - Returns `GatewayError::Network` when the HTTP client cannot be built.
    pub fn new(config: &ExplorerConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| GatewayError::network(config.base_url.as_str(), err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            contract: config.search_contract,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn execute(&self, url: &Url, request: RequestBuilder) -> GatewayResult<String> {
        let endpoint = url.path().to_string();
        let response = request
            .send()
            .map_err(|err| transport_error(&endpoint, &err))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| transport_error(&endpoint, &err))?;

        debug!(
            "event=http_exchange module=gateway status={} endpoint={} bytes={}",
            status.as_u16(),
            endpoint,
            body.len()
        );

        if !status.is_success() {
            return Err(GatewayError::Response {
                endpoint,
                status: Some(status.as_u16()),
                message: summarize_body(&body),
            });
        }
        Ok(body)
    }
}

impl QueryGateway for HttpGateway {
    fn search(&self, query: &str) -> GatewayResult<SearchHits> {
        let url = self.endpoint(&["search"]);
        let normalized = normalize_query(query);
        let request = self
            .client
            .post(url.clone())
            .json(&SearchRequestBody {
                query: normalized.as_str(),
            });
        let body = self.execute(&url, request)?;

        let hits = match self.contract {
            SearchContract::Ids => decode_id_results(&body).map(SearchHits::Ids),
            SearchContract::Labels => decode_label_results(&body).map(SearchHits::Labels),
        };
        hits.map_err(|message| GatewayError::malformed(url.path(), message))
    }

    fn find_similar(&self, id: &ArticleId) -> GatewayResult<Vec<ArticleId>> {
        let url = self.endpoint(&["similar", id.as_str()]);
        let body = self.execute(&url, self.client.get(url.clone()))?;
        decode_id_results(&body).map_err(|message| GatewayError::malformed(url.path(), message))
    }
}

impl ArticleSource for HttpGateway {
    fn describe(&self) -> String {
        self.endpoint(&["raw-data"]).to_string()
    }

    fn fetch_articles(&self) -> Result<FetchedArticles, LoadError> {
        let url = self.endpoint(&["raw-data"]);
        let body = self.execute(&url, self.client.get(url.clone()))?;
        decode_articles(&body)
            .map_err(|message| LoadError::Gateway(GatewayError::malformed(url.path(), message)))
    }
}

fn transport_error(endpoint: &str, err: &reqwest::Error) -> GatewayError {
    if err.is_decode() || err.is_body() {
        return GatewayError::malformed(endpoint, err.to_string());
    }
    GatewayError::Network {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
        timed_out: err.is_timeout(),
    }
}

fn summarize_body(body: &str) -> String {
    const MAX_BODY_CHARS: usize = 200;
    let flattened = body.replace(['\n', '\r'], " ");
    let trimmed = flattened.trim();
    if trimmed.is_empty() {
        return "empty body".to_string();
    }
    let mut summary = trimmed.chars().take(MAX_BODY_CHARS).collect::<String>();
    if trimmed.chars().count() > MAX_BODY_CHARS {
        summary.push_str("...");
    }
    summary
}
