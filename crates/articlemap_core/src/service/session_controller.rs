//! Selection & session controller.
//!
//! # Responsibility
//! - Own the per-session explorer state: query, active operation, selection
//!   and the in-flight remote request.
//! - Turn user events into operations and token-guarded remote requests.
//! - Reconcile remote completions with local state.
//!
//! # Invariants
//! - The view is always `project(canonical, snapshot, operation)`, computed
//!   on demand and never cached across transitions.
//! - After every transition `selected_id` is `None` or present in the view.
//! - Search and similarity share one monotonic token stream: issuing either
//!   kind, running a local filter, or resetting invalidates whatever was in
//!   flight. Only the completion carrying the latest token is applied.
//! - Failed requests leave `operation` untouched; they only set the error
//!   indicator.
//! - Query text is never logged, only its length.

use crate::gateway::query::{GatewayError, GatewayResult, SearchHits};
use crate::model::article::{Article, ArticleId};
use crate::model::collection::Collection;
use crate::repo::article_repo::{
    ArticleRepository, ArticleSource, FetchedArticles, LoadError, LoadStatus,
};
use crate::search::plot::{plot_points, PlotPoint};
use crate::search::projector::{match_labels, project, Operation};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Kind of remote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Search,
    Similar,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Similar => "similar",
        }
    }
}

/// Generation token attached to one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub kind: RequestKind,
    pub token: u64,
}

/// Remote work the caller must execute and feed back via
/// [`SessionController::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    Search { ticket: Ticket, query: String },
    Similar { ticket: Ticket, id: ArticleId },
}

impl PendingRequest {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Search { ticket, .. } | Self::Similar { ticket, .. } => *ticket,
        }
    }
}

/// Gateway outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Search(GatewayResult<SearchHits>),
    Similar(GatewayResult<Vec<ArticleId>>),
}

impl Response {
    fn kind(&self) -> RequestKind {
        match self {
            Self::Search(_) => RequestKind::Search,
            Self::Similar(_) => RequestKind::Similar,
        }
    }
}

/// A resolved request on its way back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticket: Ticket,
    pub response: Response,
}

/// What triggering a search produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTrigger {
    /// Remote search must be executed.
    Remote(PendingRequest),
    /// Blank query; the full dataset is shown without a remote call.
    ShowAll,
}

/// Effect of applying one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Result became the active operation; `shown` is the new view size.
    Applied { kind: RequestKind, shown: usize },
    /// Request failed; previous view kept, error indicator set.
    Failed {
        kind: RequestKind,
        error: GatewayError,
    },
    /// Completion was stale (superseded or invalidated) and dropped.
    Discarded { kind: RequestKind },
}

/// Most recent failure, backing the UI error indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    Load(LoadError),
    Search(GatewayError),
    Similar(GatewayError),
}

impl Display for SessionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "search failed: {err}"),
            Self::Similar(err) => write!(f, "similar lookup failed: {err}"),
        }
    }
}

impl Error for SessionFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Search(err) | Self::Similar(err) => Some(err),
        }
    }
}

/// User event refused because its precondition does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Find-similar was requested for an article not in the current view.
    NotInView(ArticleId),
}

impl Display for TransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInView(id) => write!(f, "article {id} is not in the current view"),
        }
    }
}

impl Error for TransitionError {}

/// Render snapshot handed to UI collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFrame {
    pub points: Vec<PlotPoint>,
    pub selected: Option<Article>,
    pub query: String,
    pub load_status: LoadStatus,
    pub operation: &'static str,
    pub busy: Option<RequestKind>,
    pub error: Option<String>,
}

/// Session-scoped explorer state machine.
///
/// Created at session start, dropped at session end; nothing here is
/// process-global.
#[derive(Debug)]
pub struct SessionController {
    session_id: Uuid,
    repo: ArticleRepository,
    query: String,
    operation: Operation,
    selected_id: Option<ArticleId>,
    in_flight: Option<Ticket>,
    latest_token: u64,
    last_failure: Option<SessionFailure>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        let session_id = Uuid::new_v4();
        info!("event=session_open module=controller session={session_id}");
        Self {
            session_id,
            repo: ArticleRepository::new(),
            query: String::new(),
            operation: Operation::ShowAll,
            selected_id: None,
            in_flight: None,
            latest_token: 0,
            last_failure: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Loads the dataset from `source` unless the session already has one.
    pub fn load(&mut self, source: &dyn ArticleSource) -> Result<usize, LoadError> {
        if self.repo.load_status() == LoadStatus::Loaded {
            return Ok(self.repo.canonical().len());
        }
        let outcome = self.repo.load(source);
        self.settle_load(outcome)
    }

    /// Applies an initial-load outcome fetched elsewhere.
    ///
    /// Success shows the whole dataset with no selection; failure sets the
    /// load-error indicator and leaves the dataset empty.
    pub fn on_load_resolved(
        &mut self,
        outcome: Result<FetchedArticles, LoadError>,
    ) -> Result<usize, LoadError> {
        if self.repo.load_status() == LoadStatus::Loaded {
            return Ok(self.repo.canonical().len());
        }
        let outcome = self.repo.complete_load(outcome);
        self.settle_load(outcome)
    }

    /// Loads an already-decoded article list.
    pub fn on_load_success(&mut self, articles: Vec<Article>) -> Result<usize, LoadError> {
        if self.repo.load_status() == LoadStatus::Loaded {
            return Ok(self.repo.canonical().len());
        }
        let outcome = self.repo.load_articles(articles);
        self.settle_load(outcome)
    }

    /// Stores the query text; the view is untouched until a search runs.
    pub fn on_query_change(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    /// Starts a semantic search for the current query.
    ///
    /// A blank query shows the whole dataset locally instead.
    pub fn on_search_triggered(&mut self) -> SearchTrigger {
        if self.query.trim().is_empty() {
            self.invalidate_in_flight();
            self.operation = Operation::ShowAll;
            self.selected_id = None;
            debug!("event=search_blank module=controller status=ok operation=show_all");
            return SearchTrigger::ShowAll;
        }

        let ticket = self.issue(RequestKind::Search);
        debug!(
            "event=request_issued module=controller kind=search token={} query_len={}",
            ticket.token,
            self.query.chars().count()
        );
        SearchTrigger::Remote(PendingRequest::Search {
            ticket,
            query: self.query.clone(),
        })
    }

    /// Starts a similarity lookup for an article in the current view.
    ///
    /// # Errors
    /// - `TransitionError::NotInView` when `id` is not displayed; no state
    ///   changes in that case.
    pub fn on_find_similar(&mut self, id: &ArticleId) -> Result<PendingRequest, TransitionError> {
        if !self.view().contains(id) {
            warn!("event=request_rejected module=controller kind=similar reason=not_in_view");
            return Err(TransitionError::NotInView(id.clone()));
        }

        let ticket = self.issue(RequestKind::Similar);
        debug!(
            "event=request_issued module=controller kind=similar token={}",
            ticket.token
        );
        Ok(PendingRequest::Similar {
            ticket,
            id: id.clone(),
        })
    }

    /// Filters the dataset locally by the current query text.
    pub fn on_local_filter(&mut self) {
        self.invalidate_in_flight();
        self.operation = Operation::LocalFilter(self.query.clone());
        self.revalidate_selection();
        debug!(
            "event=local_filter module=controller status=ok query_len={}",
            self.query.chars().count()
        );
    }

    /// Selects `id` when it is in the current view; otherwise no-op.
    ///
    /// Returns whether the selection changed to `id`.
    pub fn on_point_clicked(&mut self, id: &ArticleId) -> bool {
        if !self.view().contains(id) {
            debug!("event=selection_changed module=controller status=ignored reason=not_in_view");
            return false;
        }
        self.selected_id = Some(id.clone());
        debug!("event=selection_changed module=controller status=ok");
        true
    }

    /// Restores the load-time snapshot and clears query, selection, errors
    /// and in-flight work.
    pub fn on_reset(&mut self) {
        self.invalidate_in_flight();
        self.operation = Operation::Reset;
        self.query.clear();
        self.selected_id = None;
        self.last_failure = None;
        info!(
            "event=reset module=controller status=ok token={}",
            self.latest_token
        );
    }

    /// Applies one remote completion if it is still the latest request.
    pub fn apply(&mut self, completion: Completion) -> Resolution {
        let Completion { ticket, response } = completion;
        let is_current = self.in_flight == Some(ticket) && ticket.token == self.latest_token;
        if !is_current || response.kind() != ticket.kind {
            debug!(
                "event=request_discarded module=controller status=stale kind={} token={} latest={}",
                ticket.kind.as_str(),
                ticket.token,
                self.latest_token
            );
            return Resolution::Discarded { kind: ticket.kind };
        }
        self.in_flight = None;

        let ids = match response {
            Response::Search(Ok(SearchHits::Ids(ids))) | Response::Similar(Ok(ids)) => {
                ids.into_iter().collect()
            }
            Response::Search(Ok(SearchHits::Labels(labels))) => {
                match_labels(self.repo.canonical(), &labels)
            }
            Response::Search(Err(error)) => {
                return self.fail(ticket, SessionFailure::Search(error.clone()), error)
            }
            Response::Similar(Err(error)) => {
                return self.fail(ticket, SessionFailure::Similar(error.clone()), error)
            }
        };

        self.operation = Operation::IdFilter(ids);
        self.selected_id = None;
        self.last_failure = None;
        let shown = self.view().len();
        info!(
            "event=request_applied module=controller status=ok kind={} token={} shown={}",
            ticket.kind.as_str(),
            ticket.token,
            shown
        );
        Resolution::Applied {
            kind: ticket.kind,
            shown,
        }
    }

    /// Currently displayed subset, recomputed on every call.
    pub fn view(&self) -> Collection {
        project(
            self.repo.canonical(),
            self.repo.snapshot(),
            &self.operation,
        )
    }

    pub fn plot_points(&self) -> Vec<PlotPoint> {
        plot_points(&self.view(), self.selected_id.as_ref())
    }

    /// Full record of the selected article, for the details panel.
    pub fn selected_article(&self) -> Option<Article> {
        let id = self.selected_id.as_ref()?;
        self.view().get(id).cloned()
    }

    pub fn frame(&self) -> SessionFrame {
        let view = self.view();
        let selected = self
            .selected_id
            .as_ref()
            .and_then(|id| view.get(id).cloned());
        SessionFrame {
            points: plot_points(&view, self.selected_id.as_ref()),
            selected,
            query: self.query.clone(),
            load_status: self.repo.load_status(),
            operation: self.operation.kind(),
            busy: self.in_flight.map(|ticket| ticket.kind),
            error: self.last_failure.as_ref().map(ToString::to_string),
        }
    }

    pub fn selected_id(&self) -> Option<&ArticleId> {
        self.selected_id.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight
    }

    pub fn last_failure(&self) -> Option<&SessionFailure> {
        self.last_failure.as_ref()
    }

    pub fn load_status(&self) -> LoadStatus {
        self.repo.load_status()
    }

    pub fn repository(&self) -> &ArticleRepository {
        &self.repo
    }

    fn issue(&mut self, kind: RequestKind) -> Ticket {
        self.latest_token += 1;
        let ticket = Ticket {
            kind,
            token: self.latest_token,
        };
        self.in_flight = Some(ticket);
        ticket
    }

    fn invalidate_in_flight(&mut self) {
        self.latest_token += 1;
        if let Some(ticket) = self.in_flight.take() {
            debug!(
                "event=request_invalidated module=controller kind={} token={}",
                ticket.kind.as_str(),
                ticket.token
            );
        }
    }

    fn fail(
        &mut self,
        ticket: Ticket,
        failure: SessionFailure,
        error: GatewayError,
    ) -> Resolution {
        warn!(
            "event=request_failed module=controller status=error kind={} token={} code={}",
            ticket.kind.as_str(),
            ticket.token,
            error.code()
        );
        self.last_failure = Some(failure);
        Resolution::Failed {
            kind: ticket.kind,
            error,
        }
    }

    fn settle_load(&mut self, outcome: Result<usize, LoadError>) -> Result<usize, LoadError> {
        match outcome {
            Ok(count) => {
                self.operation = Operation::ShowAll;
                self.selected_id = None;
                self.last_failure = None;
                Ok(count)
            }
            Err(err) => {
                self.last_failure = Some(SessionFailure::Load(err.clone()));
                Err(err)
            }
        }
    }

    fn revalidate_selection(&mut self) {
        let Some(id) = self.selected_id.as_ref() else {
            return;
        };
        if !self.view().contains(id) {
            self.selected_id = None;
            debug!("event=selection_changed module=controller status=cleared reason=left_view");
        }
    }
}
