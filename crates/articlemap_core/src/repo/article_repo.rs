//! Article repository: canonical dataset plus reset snapshot.
//!
//! # Responsibility
//! - Own the canonical collection received from the backend.
//! - Freeze an immutable snapshot at load time for reset.
//! - Track load status so the UI can show a load-error indicator.
//!
//! # Invariants
//! - `canonical` and `snapshot` are only replaced by a successful load.
//! - `snapshot` is never mutated after it is taken.
//! - A failed load leaves both collections empty and is not retried here.
//! - Once loaded, further loads are no-ops for the session.

use crate::gateway::query::GatewayError;
use crate::gateway::wire::{decode_articles, DecodedArticles};
use crate::model::article::Article;
use crate::model::collection::Collection;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Articles fetched from a source, with the count of rejected records.
pub type FetchedArticles = DecodedArticles;

/// Initial dataset could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Remote `/raw-data` failed at transport or response level.
    Gateway(GatewayError),
    /// Local dataset file could not be read.
    File { path: PathBuf, message: String },
    /// Local dataset file is not an article array.
    Decode { path: PathBuf, message: String },
}

impl LoadError {
    /// Stable machine-readable code for logs and UI mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Gateway(err) => err.code(),
            Self::File { .. } => "file_read",
            Self::Decode { .. } => "file_decode",
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gateway(err) => write!(f, "failed to load articles: {err}"),
            Self::File { path, message } => {
                write!(f, "failed to read dataset `{}`: {message}", path.display())
            }
            Self::Decode { path, message } => {
                write!(f, "invalid dataset `{}`: {message}", path.display())
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Gateway(err) => Some(err),
            Self::File { .. } | Self::Decode { .. } => None,
        }
    }
}

impl From<GatewayError> for LoadError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

/// Provider of the full article dataset.
pub trait ArticleSource {
    /// Human-readable origin used in diagnostics (URL or file path).
    fn describe(&self) -> String;

    fn fetch_articles(&self) -> Result<FetchedArticles, LoadError>;
}

/// Reads a `/raw-data`-shaped JSON array from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ArticleSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_articles(&self) -> Result<FetchedArticles, LoadError> {
        let body = std::fs::read_to_string(&self.path).map_err(|err| LoadError::File {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        decode_articles(&body).map_err(|message| LoadError::Decode {
            path: self.path.clone(),
            message,
        })
    }
}

/// Lifecycle of the initial dataset load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Loaded,
    Failed,
}

impl LoadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
        }
    }
}

/// Session-scoped owner of the canonical dataset and its reset snapshot.
#[derive(Debug)]
pub struct ArticleRepository {
    canonical: Arc<Collection>,
    snapshot: Arc<Collection>,
    status: LoadStatus,
    last_error: Option<LoadError>,
}

impl Default for ArticleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleRepository {
    pub fn new() -> Self {
        Self {
            canonical: Arc::new(Collection::empty()),
            snapshot: Arc::new(Collection::empty()),
            status: LoadStatus::Pending,
            last_error: None,
        }
    }

    /// Fetches from `source` and applies the outcome.
    ///
    /// Already-loaded repositories return the current size without
    /// contacting the source.
    pub fn load(&mut self, source: &dyn ArticleSource) -> Result<usize, LoadError> {
        if self.status == LoadStatus::Loaded {
            return Ok(self.canonical.len());
        }
        self.complete_load(source.fetch_articles())
    }

    /// Applies a fetch outcome produced elsewhere (e.g. on a worker thread).
    pub fn complete_load(
        &mut self,
        outcome: Result<FetchedArticles, LoadError>,
    ) -> Result<usize, LoadError> {
        if self.status == LoadStatus::Loaded {
            warn!("event=load_resolved module=repo status=ignored reason=already_loaded");
            return Ok(self.canonical.len());
        }

        match outcome {
            Ok(fetched) => {
                let (collection, duplicates) = Collection::from_articles(fetched.articles);
                if fetched.skipped > 0 {
                    warn!(
                        "event=dataset_records_skipped module=repo count={}",
                        fetched.skipped
                    );
                }
                if !duplicates.is_empty() {
                    warn!(
                        "event=dataset_duplicates_dropped module=repo count={}",
                        duplicates.len()
                    );
                }
                let collection = Arc::new(collection);
                self.canonical = Arc::clone(&collection);
                self.snapshot = collection;
                self.status = LoadStatus::Loaded;
                self.last_error = None;
                info!(
                    "event=load_resolved module=repo status=ok articles={}",
                    self.canonical.len()
                );
                Ok(self.canonical.len())
            }
            Err(err) => {
                self.status = LoadStatus::Failed;
                self.last_error = Some(err.clone());
                warn!(
                    "event=load_resolved module=repo status=error code={} error={err}",
                    err.code()
                );
                Err(err)
            }
        }
    }

    /// Convenience for callers that already hold decoded articles.
    pub fn load_articles(&mut self, articles: Vec<Article>) -> Result<usize, LoadError> {
        self.complete_load(Ok(FetchedArticles {
            articles,
            skipped: 0,
        }))
    }

    pub fn canonical(&self) -> &Collection {
        &self.canonical
    }

    pub fn snapshot(&self) -> &Collection {
        &self.snapshot
    }

    pub fn load_status(&self) -> LoadStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }
}
