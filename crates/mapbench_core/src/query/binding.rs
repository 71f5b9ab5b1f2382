//! Feature query lifecycle and selection sync for one vector layer.
//!
//! # Responsibility
//! - Issue feature queries and load their results into the bound layer.
//! - Own the selection shared by the map highlight and the grid rows.
//! - Expose query state, errors and truncation to the grid UI.
//!
//! # Invariants
//! - Only the latest issued request may complete; older answers are
//!   discarded on arrival.
//! - The feature store is replaced in one step, never partially.
//! - The selection is always a subset of the current collection ids.
//! - Query failures become binding state; they are not returned from
//!   `complete`.

use crate::events::{Listeners, SubscriptionId};
use crate::model::feature::{FeatureCollection, FeatureId};
use crate::model::geometry::hit_test;
use crate::model::layer::{FeatureStore, LayerId};
use crate::query::geojson::{decode_feature_collection, DecodeContext, DecodedCollection};
use crate::query::grid::{FeatureGrid, FeatureProperties};
use crate::query::options::{FeatureQueryOptions, FeatureRequest, RequestId};
use crate::query::service::{FeatureQueryService, QueryResponse};
use geo::Coord;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Errors from the query lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Options violate the query invariants; nothing was issued.
    InvalidOptions(String),
    /// Network failure or non-success status (query transport error).
    Transport(String),
    /// Body could not be decoded (query format error).
    Format(String),
    /// `retry` called outside the failed state.
    NothingToRetry,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOptions(reason) => write!(f, "invalid query options: {reason}"),
            Self::Transport(reason) => write!(f, "query transport error: {reason}"),
            Self::Format(reason) => write!(f, "query format error: {reason}"),
            Self::NothingToRetry => write!(f, "no failed query to retry"),
        }
    }
}

impl Error for QueryError {}

/// Query lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    Loading {
        request: RequestId,
    },
    Loaded {
        count: usize,
        possibly_truncated: bool,
        total_matched: Option<u64>,
    },
    Failed(QueryError),
}

impl QueryState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Loaded { .. } => "loaded",
            Self::Failed(_) => "failed",
        }
    }
}

/// What `complete` did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Loaded,
    Failed,
    /// Response belonged to a superseded or already finished request.
    Discarded,
}

/// Change notification consumed by the map and the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    StateChanged(QueryState),
    FeaturesReplaced {
        count: usize,
        possibly_truncated: bool,
    },
    SelectionChanged(Vec<FeatureId>),
}

/// Binds query results and selection to one vector layer.
pub struct FeatureQueryBinding<S: FeatureQueryService> {
    service: S,
    url: String,
    layer_id: LayerId,
    store: FeatureStore,
    state: QueryState,
    next_request: RequestId,
    latest: Option<(RequestId, FeatureQueryOptions)>,
    possibly_truncated: bool,
    selection: Vec<FeatureId>,
    listeners: Listeners<QueryEvent>,
}

impl<S: FeatureQueryService> FeatureQueryBinding<S> {
    /// Binds `store` of layer `layer_id` to the service at `url`.
    pub fn new(service: S, url: impl Into<String>, layer_id: LayerId, store: FeatureStore) -> Self {
        Self {
            service,
            url: url.into(),
            layer_id,
            store,
            state: QueryState::Idle,
            next_request: 1,
            latest: None,
            possibly_truncated: false,
            selection: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading { .. })
    }

    pub fn last_error(&self) -> Option<&QueryError> {
        match &self.state {
            QueryState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn possibly_truncated(&self) -> bool {
        self.possibly_truncated
    }

    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Current collection snapshot of the bound layer.
    pub fn features(&self) -> Rc<FeatureCollection> {
        self.store.snapshot()
    }

    pub fn selected_ids(&self) -> &[FeatureId] {
        &self.selection
    }

    pub fn is_selected(&self, id: &FeatureId) -> bool {
        self.selection.contains(id)
    }

    pub fn on_changed(&mut self, listener: impl FnMut(&QueryEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    /// Issues a query and transitions to `Loading`.
    ///
    /// Supersedes any request still in flight. A request the service cannot
    /// send moves the binding straight to `Failed`.
    ///
    /// # Errors
    /// - `InvalidOptions` when `options` violate the query invariants. The
    ///   state is left untouched.
    pub fn query(&mut self, options: FeatureQueryOptions) -> Result<RequestId, QueryError> {
        options.validate()?;
        let request_id = self.next_request;
        self.next_request += 1;

        if let Some((superseded, _)) = &self.latest {
            if matches!(self.state, QueryState::Loading { .. }) {
                debug!(
                    "event=query_superseded module=query status=ok request_id={} by={}",
                    superseded, request_id
                );
            }
        }
        self.latest = Some((request_id, options.clone()));
        info!(
            "event=query_issue module=query status=start request_id={} layer_id={} cap={}",
            request_id, self.layer_id, options.max_features
        );
        self.set_state(QueryState::Loading {
            request: request_id,
        });

        let request = FeatureRequest {
            id: request_id,
            url: self.url.clone(),
            options,
        };
        if let Err(reason) = self.service.dispatch(&request) {
            self.fail(request_id, QueryError::Transport(reason));
        }
        Ok(request_id)
    }

    /// Re-issues the last options. Only allowed from `Failed`.
    pub fn retry(&mut self) -> Result<RequestId, QueryError> {
        if !matches!(self.state, QueryState::Failed(_)) {
            return Err(QueryError::NothingToRetry);
        }
        let options = self
            .latest
            .as_ref()
            .map(|(_, options)| options.clone())
            .ok_or(QueryError::NothingToRetry)?;
        self.query(options)
    }

    /// Delivers the service answer for `request_id`.
    pub fn complete(&mut self, request_id: RequestId, response: QueryResponse) -> Completion {
        let options = match (&self.state, &self.latest) {
            (QueryState::Loading { request }, Some((latest, options)))
                if *request == request_id && *latest == request_id =>
            {
                options.clone()
            }
            _ => {
                debug!(
                    "event=query_complete module=query status=discarded request_id={}",
                    request_id
                );
                return Completion::Discarded;
            }
        };

        match decode_response(response, &options) {
            Ok(decoded) => {
                self.apply(request_id, decoded, options.max_features);
                Completion::Loaded
            }
            Err(err) => {
                self.fail(request_id, err);
                Completion::Failed
            }
        }
    }

    /// Replaces the selection with `ids`.
    ///
    /// Unknown ids are dropped, duplicates collapse to their first position.
    /// Returns the effective selection.
    pub fn select_by_ids<I>(&mut self, ids: I) -> &[FeatureId]
    where
        I: IntoIterator,
        I::Item: Into<FeatureId>,
    {
        let features = self.store.snapshot();
        let mut seen = HashSet::new();
        let next = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| features.contains(id))
            .filter(|id| seen.insert(id.clone()))
            .collect::<Vec<_>>();
        self.replace_selection(next);
        &self.selection
    }

    /// Selects every feature hit at `at` within `tolerance` map units.
    ///
    /// An empty hit clears the selection.
    pub fn select_from_map_click(&mut self, at: Coord, tolerance: f64) -> &[FeatureId] {
        let hits = self
            .store
            .snapshot()
            .iter()
            .filter(|feature| {
                feature
                    .geometry()
                    .is_some_and(|geometry| hit_test(geometry, at, tolerance))
            })
            .map(|feature| feature.id.clone())
            .collect::<Vec<_>>();
        self.select_by_ids(hits)
    }

    pub fn clear_selection(&mut self) {
        self.replace_selection(Vec::new());
    }

    /// Grid contents for the current collection and selection.
    pub fn grid(&self) -> FeatureGrid {
        FeatureGrid::build(&self.store.snapshot(), &self.selection, self.possibly_truncated)
    }

    /// Property tables for `ids`, skipping unknown ids.
    pub fn feature_properties(&self, ids: &[FeatureId]) -> Vec<FeatureProperties> {
        let features = self.store.snapshot();
        ids.iter()
            .filter_map(|id| features.get(id))
            .map(FeatureProperties::from_feature)
            .collect()
    }

    /// Stores `decoded` and prunes the selection before any listener runs.
    fn apply(&mut self, request_id: RequestId, decoded: DecodedCollection, cap: usize) {
        let DecodedCollection {
            collection,
            dropped,
        } = decoded;
        let count = collection.len();
        let possibly_truncated = dropped > 0 || count == cap;
        let total_matched = collection.total_matched();
        let current = self.store.replace(collection);
        self.possibly_truncated = possibly_truncated;

        let kept = self
            .selection
            .iter()
            .filter(|id| current.contains(id))
            .cloned()
            .collect::<Vec<_>>();
        let selection_changed = kept != self.selection;
        self.selection = kept;

        info!(
            "event=query_complete module=query status=ok request_id={} count={} possibly_truncated={}",
            request_id, count, possibly_truncated
        );
        self.listeners.emit(&QueryEvent::FeaturesReplaced {
            count,
            possibly_truncated,
        });
        if selection_changed {
            self.listeners
                .emit(&QueryEvent::SelectionChanged(self.selection.clone()));
        }

        self.set_state(QueryState::Loaded {
            count,
            possibly_truncated,
            total_matched,
        });
    }

    fn fail(&mut self, request_id: RequestId, err: QueryError) {
        warn!(
            "event=query_complete module=query status=error request_id={} kind={}",
            request_id,
            match &err {
                QueryError::Transport(_) => "transport",
                QueryError::Format(_) => "format",
                _ => "other",
            }
        );
        self.set_state(QueryState::Failed(err));
    }

    fn replace_selection(&mut self, next: Vec<FeatureId>) {
        if next == self.selection {
            return;
        }
        self.selection = next;
        self.listeners
            .emit(&QueryEvent::SelectionChanged(self.selection.clone()));
    }

    fn set_state(&mut self, state: QueryState) {
        self.state = state;
        self.listeners
            .emit(&QueryEvent::StateChanged(self.state.clone()));
    }
}

fn decode_response(
    response: QueryResponse,
    options: &FeatureQueryOptions,
) -> Result<DecodedCollection, QueryError> {
    match response {
        QueryResponse::TransportFailure(reason) => Err(QueryError::Transport(reason)),
        QueryResponse::Http { status, .. } if !(200..300).contains(&status) => Err(
            QueryError::Transport(format!("service answered with status {status}")),
        ),
        QueryResponse::Http { body, .. } => {
            let id_prefix = options
                .feature_types
                .first()
                .map(String::as_str)
                .unwrap_or("feature");
            decode_feature_collection(
                &body,
                DecodeContext {
                    srs_name: &options.srs_name,
                    geometry_name: &options.geometry_name,
                    id_prefix,
                    max_features: options.max_features,
                },
            )
            .map_err(|err| QueryError::Format(err.reason().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Completion, FeatureQueryBinding, QueryError, QueryEvent, QueryState};
    use crate::model::feature::FeatureId;
    use crate::model::layer::FeatureStore;
    use crate::query::options::{FeatureQueryOptions, FeatureRequest};
    use crate::query::service::{FeatureQueryService, QueryResponse, QueuedQueryService};
    use geo::Coord;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    struct RefusingService;

    impl FeatureQueryService for RefusingService {
        fn dispatch(&mut self, _request: &FeatureRequest) -> Result<(), String> {
            Err("offline".to_string())
        }
    }

    fn binding() -> FeatureQueryBinding<QueuedQueryService> {
        FeatureQueryBinding::new(
            QueuedQueryService::new(),
            "https://example.test/wfs",
            Uuid::new_v4(),
            FeatureStore::new(),
        )
    }

    fn body(ids: &[&str]) -> String {
        let features = ids
            .iter()
            .enumerate()
            .map(|(index, id)| {
                json!({
                    "type": "Feature",
                    "id": id,
                    "geometry": {"type": "Point", "coordinates": [index as f64 * 10.0, 0.0]},
                    "properties": {"n": index}
                })
            })
            .collect::<Vec<_>>();
        json!({"type": "FeatureCollection", "features": features}).to_string()
    }

    #[test]
    fn invalid_options_leave_state_idle() {
        let mut binding = binding();
        let options = FeatureQueryOptions {
            max_features: 0,
            ..FeatureQueryOptions::default()
        };
        assert!(matches!(
            binding.query(options),
            Err(QueryError::InvalidOptions(_))
        ));
        assert_eq!(binding.state(), &QueryState::Idle);
        assert_eq!(binding.service().pending_len(), 0);
    }

    #[test]
    fn dispatch_failure_fails_immediately_and_retry_reissues() {
        let mut binding = FeatureQueryBinding::new(
            RefusingService,
            "https://example.test/wfs",
            Uuid::new_v4(),
            FeatureStore::new(),
        );
        binding.query(FeatureQueryOptions::default()).unwrap();
        assert_eq!(
            binding.last_error(),
            Some(&QueryError::Transport("offline".to_string()))
        );
        let second = binding.retry().unwrap();
        assert_eq!(second, 2);
        assert!(matches!(binding.state(), QueryState::Failed(_)));
    }

    #[test]
    fn retry_requires_failed_state() {
        let mut binding = binding();
        assert_eq!(binding.retry(), Err(QueryError::NothingToRetry));
        binding.query(FeatureQueryOptions::default()).unwrap();
        assert_eq!(binding.retry(), Err(QueryError::NothingToRetry));
    }

    #[test]
    fn status_and_body_errors_are_classified() {
        let mut binding = binding();
        let first = binding.query(FeatureQueryOptions::default()).unwrap();
        let outcome = binding.complete(
            first,
            QueryResponse::Http {
                status: 503,
                body: String::new(),
            },
        );
        assert_eq!(outcome, Completion::Failed);
        assert!(matches!(binding.last_error(), Some(QueryError::Transport(_))));

        let second = binding.retry().unwrap();
        binding.complete(second, QueryResponse::ok("<html>"));
        assert!(matches!(binding.last_error(), Some(QueryError::Format(_))));
    }

    #[test]
    fn completion_twice_is_discarded() {
        let mut binding = binding();
        let id = binding.query(FeatureQueryOptions::default()).unwrap();
        assert_eq!(binding.complete(id, QueryResponse::ok(body(&["a"]))), Completion::Loaded);
        assert_eq!(
            binding.complete(id, QueryResponse::ok(body(&["b"]))),
            Completion::Discarded
        );
        assert_eq!(binding.features().ids(), vec![FeatureId::from("a")]);
    }

    #[test]
    fn over_cap_body_is_cut_and_flagged() {
        let mut binding = binding();
        let options = FeatureQueryOptions {
            max_features: 2,
            ..FeatureQueryOptions::default()
        };
        let id = binding.query(options).unwrap();
        binding.complete(id, QueryResponse::ok(body(&["a", "b", "c"])));
        assert_eq!(binding.features().len(), 2);
        assert!(binding.possibly_truncated());
    }

    #[test]
    fn map_click_selects_hits_and_empty_click_clears() {
        let mut binding = binding();
        let id = binding.query(FeatureQueryOptions::default()).unwrap();
        binding.complete(id, QueryResponse::ok(body(&["a", "b"])));

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        binding.on_changed(move |event| sink.borrow_mut().push(event.clone()));

        let selected = binding
            .select_from_map_click(Coord { x: 10.5, y: 0.0 }, 1.0)
            .to_vec();
        assert_eq!(selected, vec![FeatureId::from("b")]);
        assert!(binding.grid().rows[1].selected);

        binding.select_from_map_click(Coord { x: 500.0, y: 500.0 }, 1.0);
        assert!(binding.selected_ids().is_empty());
        assert_eq!(
            *events.borrow(),
            vec![
                QueryEvent::SelectionChanged(vec![FeatureId::from("b")]),
                QueryEvent::SelectionChanged(Vec::new()),
            ]
        );
    }

    #[test]
    fn select_by_ids_drops_unknown_and_duplicates() {
        let mut binding = binding();
        let id = binding.query(FeatureQueryOptions::default()).unwrap();
        binding.complete(id, QueryResponse::ok(body(&["a", "b", "c"])));

        let selected = binding.select_by_ids(["c", "zzz", "a", "c"]).to_vec();
        assert_eq!(selected, vec![FeatureId::from("c"), FeatureId::from("a")]);

        let properties = binding.feature_properties(&selected);
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].id, FeatureId::from("c"));
    }
}
