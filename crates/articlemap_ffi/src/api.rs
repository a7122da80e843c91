//! FFI use-case API for the Flutter map view.
//!
//! # Responsibility
//! - Expose one explorer session per handle to Dart via FRB.
//! - Flatten core frames into plain, UI-ready envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Session state lives in the handle, never in process globals.
//! - Network work never runs while the session lock is held.

use articlemap_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Article,
    ArticleId, ArticleSource, ExplorerConfig, ExplorerSession, HttpGateway, LoadStatus,
    Resolution, SearchContract, SessionFrame,
};
use flutter_rust_bridge::frb;
use log::warn;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One scatter-plot marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub selected: bool,
}

/// Details panel payload for the selected article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDetails {
    pub id: String,
    pub title: String,
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub year: i32,
}

/// Render envelope returned by every session call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerFrame {
    pub points: Vec<MapPoint>,
    pub selected: Option<ArticleDetails>,
    pub query: String,
    /// `pending|loaded|failed`.
    pub load_status: String,
    /// `search|similar` while a request is in flight.
    pub busy: Option<String>,
    /// Error indicator text; previous results stay on screen.
    pub error: Option<String>,
    /// Human-readable outcome of the call, for diagnostics.
    pub message: String,
}

/// Explorer session handle owned by the Dart side.
#[frb(opaque)]
pub struct ExplorerHandle {
    gateway: Arc<HttpGateway>,
    session: Mutex<ExplorerSession<HttpGateway>>,
}

/// Opens a session against `base_url`.
///
/// `timeout_ms` and `search_contract` (`ids|labels`) fall back to
/// environment/default configuration when `None`.
///
/// # FFI contract
/// - Sync call, non-blocking (no network I/O).
/// - Returns an error message for invalid configuration.
#[frb(sync)]
pub fn explorer_open(
    base_url: String,
    timeout_ms: Option<u64>,
    search_contract: Option<String>,
) -> Result<ExplorerHandle, String> {
    let mut config = ExplorerConfig::from_env()
        .map_err(|err| err.to_string())?
        .with_base_url(&base_url)
        .map_err(|err| err.to_string())?;
    if let Some(timeout_ms) = timeout_ms {
        config = config
            .with_timeout_ms(timeout_ms)
            .map_err(|err| err.to_string())?;
    }
    if let Some(raw) = search_contract {
        config.search_contract = SearchContract::parse(&raw)
            .ok_or_else(|| format!("unsupported search contract `{raw}`; expected ids|labels"))?;
    }

    let gateway = Arc::new(HttpGateway::new(&config).map_err(|err| err.to_string())?);
    Ok(ExplorerHandle {
        session: Mutex::new(ExplorerSession::new(Arc::clone(&gateway))),
        gateway,
    })
}

impl ExplorerHandle {
    /// Fetches `/raw-data` and installs it as the session dataset.
    ///
    /// # FFI contract
    /// - Async call (network I/O); the session lock is not held while fetching.
    /// - No request is sent once the dataset is loaded.
    /// - Never throws; failure is reported in `error`/`message`.
    pub fn load(&self) -> ExplorerFrame {
        {
            let session = self.lock();
            if session.controller().load_status() == LoadStatus::Loaded {
                let count = session.controller().repository().canonical().len();
                return to_frame(session.frame(), format!("Already loaded {count} article(s)."));
            }
        }

        let outcome = self.gateway.fetch_articles();
        let mut session = self.lock();
        let message = match session.complete_load(outcome) {
            Ok(count) => format!("Loaded {count} article(s)."),
            Err(err) => format!("load failed: {err}"),
        };
        to_frame(session.frame(), message)
    }

    /// Stores query text without searching.
    #[frb(sync)]
    pub fn set_query(&self, text: String) -> ExplorerFrame {
        let mut session = self.lock();
        session.set_query(text);
        to_frame(session.frame(), String::new())
    }

    /// Starts a semantic search for the stored query; poll for the result.
    #[frb(sync)]
    pub fn search(&self) -> ExplorerFrame {
        let mut session = self.lock();
        let message = match session.search() {
            Some(ticket) => format!("Search #{} started.", ticket.token),
            None => "Blank query; showing all articles.".to_string(),
        };
        to_frame(session.frame(), message)
    }

    /// Starts a similarity lookup for a displayed article.
    #[frb(sync)]
    pub fn find_similar(&self, id: String) -> ExplorerFrame {
        let mut session = self.lock();
        let message = match parse_id(&id) {
            Ok(article_id) => match session.find_similar(&article_id) {
                Ok(ticket) => format!("Similar lookup #{} started.", ticket.token),
                Err(err) => format!("find_similar rejected: {err}"),
            },
            Err(err) => err,
        };
        to_frame(session.frame(), message)
    }

    /// Filters the dataset locally by the stored query.
    #[frb(sync)]
    pub fn local_filter(&self) -> ExplorerFrame {
        let mut session = self.lock();
        session.local_filter();
        to_frame(session.frame(), String::new())
    }

    /// Selects a plotted article; ids outside the view are ignored.
    #[frb(sync)]
    pub fn click_point(&self, id: String) -> ExplorerFrame {
        let mut session = self.lock();
        let message = match parse_id(&id) {
            Ok(article_id) if session.click(&article_id) => String::new(),
            Ok(_) => "Point is not in the current view.".to_string(),
            Err(err) => err,
        };
        to_frame(session.frame(), message)
    }

    /// Restores the full dataset and clears query and selection.
    #[frb(sync)]
    pub fn reset(&self) -> ExplorerFrame {
        let mut session = self.lock();
        session.reset();
        to_frame(session.frame(), String::new())
    }

    /// Applies completed remote requests and returns the current frame.
    #[frb(sync)]
    pub fn poll(&self) -> ExplorerFrame {
        let mut session = self.lock();
        let message = session
            .pump()
            .iter()
            .filter_map(describe_resolution)
            .last()
            .unwrap_or_default();
        to_frame(session.frame(), message)
    }

    fn lock(&self) -> MutexGuard<'_, ExplorerSession<HttpGateway>> {
        self.session.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("event=session_lock module=ffi status=recovered reason=poisoned");
            poisoned.into_inner()
        })
    }
}

fn parse_id(raw: &str) -> Result<ArticleId, String> {
    raw.parse::<ArticleId>().map_err(|err| err.to_string())
}

fn describe_resolution(resolution: &Resolution) -> Option<String> {
    match resolution {
        Resolution::Applied { kind, shown } => {
            Some(format!("{} returned {shown} article(s).", kind.as_str()))
        }
        Resolution::Failed { kind, error } => Some(format!("{} failed: {error}", kind.as_str())),
        Resolution::Discarded { .. } => None,
    }
}

fn to_frame(frame: SessionFrame, message: String) -> ExplorerFrame {
    ExplorerFrame {
        points: frame
            .points
            .into_iter()
            .map(|point| MapPoint {
                id: point.id.to_string(),
                x: point.x,
                y: point.y,
                label: point.label,
                selected: point.selected,
            })
            .collect(),
        selected: frame.selected.map(to_details),
        query: frame.query,
        load_status: frame.load_status.as_str().to_string(),
        busy: frame.busy.map(|kind| kind.as_str().to_string()),
        error: frame.error,
        message,
    }
}

fn to_details(article: Article) -> ArticleDetails {
    ArticleDetails {
        id: article.id.to_string(),
        title: article.title,
        abstract_text: article.abstract_text,
        authors: article.authors,
        journal: article.journal,
        year: article.year,
    }
}
