//! Query service collaborator contract.

use crate::query::options::FeatureRequest;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Outcome delivered by the event loop for one dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResponse {
    /// The service answered; `status` is the HTTP status code.
    Http { status: u16, body: String },
    /// No answer (DNS, connection reset, timeout, ...).
    TransportFailure(String),
}

impl QueryResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Http {
            status: 200,
            body: body.into(),
        }
    }
}

/// Sends feature requests without blocking.
///
/// The answer is delivered later through `FeatureQueryBinding::complete`.
pub trait FeatureQueryService {
    /// Hands `request` to the transport. `Err` means it could not be sent.
    fn dispatch(&mut self, request: &FeatureRequest) -> Result<(), String>;
}

/// Service that queues requests for an outer event loop to execute.
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct QueuedQueryService {
    pending: Rc<RefCell<VecDeque<FeatureRequest>>>,
}

impl QueuedQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains queued requests in dispatch order.
    pub fn take_pending(&self) -> Vec<FeatureRequest> {
        self.pending.borrow_mut().drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl FeatureQueryService for QueuedQueryService {
    fn dispatch(&mut self, request: &FeatureRequest) -> Result<(), String> {
        self.pending.borrow_mut().push_back(request.clone());
        Ok(())
    }
}
