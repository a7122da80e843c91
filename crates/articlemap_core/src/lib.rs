//! Core state machine for the semantic article map explorer.
//! This crate is the single source of truth for dataset/view/selection
//! invariants; UI layers only render frames and forward events.

pub mod config;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, ExplorerConfig, SearchContract};
pub use gateway::http::HttpGateway;
pub use gateway::query::{GatewayError, GatewayResult, QueryGateway, SearchHits};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{Article, ArticleId};
pub use model::collection::Collection;
pub use repo::article_repo::{
    ArticleRepository, ArticleSource, FetchedArticles, JsonFileSource, LoadError, LoadStatus,
};
pub use search::plot::PlotPoint;
pub use search::projector::{project, Operation};
pub use service::dispatch::RequestDispatcher;
pub use service::session::ExplorerSession;
pub use service::session_controller::{
    Completion, PendingRequest, RequestKind, Resolution, Response, SearchTrigger,
    SessionController, SessionFailure, SessionFrame, Ticket, TransitionError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
