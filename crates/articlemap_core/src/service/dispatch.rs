//! Off-loop execution of remote requests.
//!
//! # Responsibility
//! - Run each `PendingRequest` against the gateway on its own worker thread.
//! - Deliver `Completion`s back to the single thread that owns the session.
//!
//! # Invariants
//! - Workers never touch session state; they only send completions.
//! - Requests are never aborted; staleness is decided by the controller.
//! - Every submitted request yields exactly one completion, including when
//!   a worker cannot be spawned.

use crate::gateway::query::{GatewayError, QueryGateway};
use crate::service::session_controller::{Completion, PendingRequest, RequestKind, Response};
use log::error;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Executes one request synchronously on the calling thread.
pub fn execute<G: QueryGateway + ?Sized>(gateway: &G, request: PendingRequest) -> Completion {
    match request {
        PendingRequest::Search { ticket, query } => Completion {
            ticket,
            response: Response::Search(gateway.search(&query)),
        },
        PendingRequest::Similar { ticket, id } => Completion {
            ticket,
            response: Response::Similar(gateway.find_similar(&id)),
        },
    }
}

/// Worker-thread dispatcher with a completion queue.
#[derive(Debug)]
pub struct RequestDispatcher<G: QueryGateway + 'static> {
    gateway: Arc<G>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl<G: QueryGateway + 'static> RequestDispatcher<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            gateway,
            sender,
            receiver,
        }
    }

    /// Starts `request` on a worker thread and returns immediately.
    pub fn submit(&self, request: PendingRequest) {
        let ticket = request.ticket();
        let gateway = Arc::clone(&self.gateway);
        let sender = self.sender.clone();

        let spawned = thread::Builder::new()
            .name(format!("articlemap-{}-{}", ticket.kind.as_str(), ticket.token))
            .spawn(move || {
                let completion = execute(gateway.as_ref(), request);
                // Receiver gone means the session ended; nothing left to notify.
                let _ = sender.send(completion);
            });

        if let Err(err) = spawned {
            error!(
                "event=dispatch_spawn module=dispatch status=error kind={} token={} error={err}",
                ticket.kind.as_str(),
                ticket.token
            );
            let failure = GatewayError::network("dispatch", format!("worker spawn failed: {err}"));
            let response = match ticket.kind {
                RequestKind::Search => Response::Search(Err(failure)),
                RequestKind::Similar => Response::Similar(Err(failure)),
            };
            let _ = self.sender.send(Completion { ticket, response });
        }
    }

    /// Returns a completion if one is ready, without waiting.
    pub fn try_next(&self) -> Option<Completion> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next completion.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Completion> {
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
