//! Explorer session: controller plus request dispatcher.
//!
//! # Responsibility
//! - Provide the UI-facing hooks (query change, search, find similar,
//!   point click, reset) over one session-scoped controller.
//! - Pump remote completions back into the controller on the owning thread.
//!
//! # Invariants
//! - All state mutation happens on the thread that owns the session.
//! - Hooks return immediately; remote work runs on dispatcher workers.

use crate::gateway::query::QueryGateway;
use crate::model::article::ArticleId;
use crate::repo::article_repo::{ArticleSource, FetchedArticles, LoadError};
use crate::service::dispatch::RequestDispatcher;
use crate::service::session_controller::{
    Resolution, SearchTrigger, SessionController, SessionFrame, Ticket, TransitionError,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One user's explorer session against one gateway.
#[derive(Debug)]
pub struct ExplorerSession<G: QueryGateway + 'static> {
    controller: SessionController,
    dispatcher: RequestDispatcher<G>,
}

impl<G: QueryGateway + 'static> ExplorerSession<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            controller: SessionController::new(),
            dispatcher: RequestDispatcher::new(gateway),
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Loads the initial dataset; blocks on `source`.
    pub fn load(&mut self, source: &dyn ArticleSource) -> Result<usize, LoadError> {
        self.controller.load(source)
    }

    /// Applies a dataset fetched outside the session lock.
    pub fn complete_load(
        &mut self,
        outcome: Result<FetchedArticles, LoadError>,
    ) -> Result<usize, LoadError> {
        self.controller.on_load_resolved(outcome)
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.controller.on_query_change(text);
    }

    /// Triggers a search; returns the ticket when a remote call was issued.
    pub fn search(&mut self) -> Option<Ticket> {
        match self.controller.on_search_triggered() {
            SearchTrigger::Remote(request) => {
                let ticket = request.ticket();
                self.dispatcher.submit(request);
                Some(ticket)
            }
            SearchTrigger::ShowAll => None,
        }
    }

    pub fn find_similar(&mut self, id: &ArticleId) -> Result<Ticket, TransitionError> {
        let request = self.controller.on_find_similar(id)?;
        let ticket = request.ticket();
        self.dispatcher.submit(request);
        Ok(ticket)
    }

    pub fn local_filter(&mut self) {
        self.controller.on_local_filter();
    }

    pub fn click(&mut self, id: &ArticleId) -> bool {
        self.controller.on_point_clicked(id)
    }

    pub fn reset(&mut self) {
        self.controller.on_reset();
    }

    /// Applies every completion that has already arrived.
    pub fn pump(&mut self) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        while let Some(completion) = self.dispatcher.try_next() {
            resolutions.push(self.controller.apply(completion));
        }
        resolutions
    }

    /// Applies completions until nothing is in flight or `timeout` elapses.
    ///
    /// Stale completions that arrive meanwhile are applied (and dropped) too.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<Resolution> {
        let deadline = Instant::now() + timeout;
        let mut resolutions = self.pump();
        while self.controller.in_flight().is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.dispatcher.next_timeout(remaining) {
                Some(completion) => resolutions.push(self.controller.apply(completion)),
                None => break,
            }
        }
        resolutions
    }

    pub fn frame(&self) -> SessionFrame {
        self.controller.frame()
    }
}
