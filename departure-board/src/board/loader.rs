//! Generation-tagged board loading.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, Abortable};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{DepartureRecord, TransitMode};
use crate::reconcile::{Reconciliation, reconcile};
use crate::resolve::resolve_routes;
use crate::transit::{TransitApi, TransportError};

/// Configuration for the board loader.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Transit mode to show.
    pub mode: TransitMode,

    /// Abort the in-flight load when a newer one starts. Stale results are
    /// discarded either way; this only saves the wasted request.
    pub cancel_superseded: bool,
}

impl BoardConfig {
    /// Create a config for the given mode.
    pub fn new(mode: TransitMode) -> Self {
        Self {
            mode,
            cancel_superseded: false,
        }
    }

    /// Set whether superseded loads are aborted.
    pub fn with_cancel_superseded(mut self, cancel: bool) -> Self {
        self.cancel_superseded = cancel;
        self
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(TransitMode::default())
    }
}

/// Load status shown alongside the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadStatus {
    /// A load is in flight.
    Pending,
    /// The last load failed; the message is for the user.
    Error(String),
    /// Records are from a completed load.
    Ready,
}

/// What the board currently shows.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    /// Generation of the load that produced `records`; 0 before any load.
    pub generation: u64,
    pub status: LoadStatus,
    pub records: Arc<[DepartureRecord]>,
    /// Scheduled stops dropped during reconciliation.
    pub dropped: usize,
    /// Instant the records were loaded for.
    pub as_of: Option<DateTime<Utc>>,
}

impl BoardSnapshot {
    fn initial() -> Self {
        Self {
            generation: 0,
            status: LoadStatus::Pending,
            records: Arc::from(Vec::new()),
            dropped: 0,
            as_of: None,
        }
    }
}

/// Errors from a single load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Fetching routes or schedules failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A newer load was issued before this one finished
    #[error("load {generation} superseded by load {latest}")]
    Stale { generation: u64, latest: u64 },

    /// The load was aborted
    #[error("load {0} cancelled")]
    Cancelled(u64),
}

/// Loads the board and holds the latest snapshot.
pub struct BoardLoader<A> {
    api: A,
    config: BoardConfig,
    issued: AtomicU64,
    snapshot: RwLock<BoardSnapshot>,
    in_flight: Mutex<Option<(u64, AbortHandle)>>,
}

impl<A: TransitApi> BoardLoader<A> {
    /// Create a loader. Nothing is fetched until [`BoardLoader::load`].
    pub fn new(api: A, config: BoardConfig) -> Self {
        Self {
            api,
            config,
            issued: AtomicU64::new(0),
            snapshot: RwLock::new(BoardSnapshot::initial()),
            in_flight: Mutex::new(None),
        }
    }

    /// The configured mode.
    pub fn mode(&self) -> TransitMode {
        self.config.mode
    }

    /// A copy of the current snapshot.
    pub async fn snapshot(&self) -> BoardSnapshot {
        self.snapshot.read().await.clone()
    }

    /// The newest generation issued so far.
    pub fn latest_generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Abort the in-flight load, if any. Returns whether one was aborted.
    pub fn cancel(&self) -> bool {
        match self.lock_in_flight().take() {
            Some((generation, handle)) => {
                debug!(generation, "cancelling load");
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Load the board as of now.
    pub async fn load(&self) -> Result<BoardSnapshot, LoadError> {
        self.load_at(Utc::now()).await
    }

    /// Load the board as of the given instant.
    ///
    /// Publishes the result only if no newer load was issued meanwhile. A
    /// transport failure is published as [`LoadStatus::Error`] and also
    /// returned.
    pub async fn load_at(&self, as_of: DateTime<Utc>) -> Result<BoardSnapshot, LoadError> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let (handle, registration) = AbortHandle::new_pair();

        let superseded = self.lock_in_flight().replace((generation, handle));
        if let Some((previous, previous_handle)) = superseded {
            if self.config.cancel_superseded {
                debug!(generation = previous, "aborting superseded load");
                previous_handle.abort();
            }
        }

        self.mark_pending(generation).await;

        let outcome = Abortable::new(self.fetch(as_of), registration).await;
        self.clear_in_flight(generation);

        let mut snapshot = self.snapshot.write().await;
        let latest = self.latest_generation();

        let Ok(outcome) = outcome else {
            if generation == latest {
                snapshot.status = LoadStatus::Error("load cancelled".to_string());
            }
            debug!(generation, "load cancelled");
            return Err(LoadError::Cancelled(generation));
        };

        if generation != latest {
            debug!(generation, latest, "discarding stale load");
            return Err(LoadError::Stale { generation, latest });
        }

        match outcome {
            Ok(reconciliation) => {
                info!(
                    generation,
                    records = reconciliation.records.len(),
                    dropped = reconciliation.dropped,
                    "board loaded"
                );
                *snapshot = BoardSnapshot {
                    generation,
                    status: LoadStatus::Ready,
                    records: Arc::from(reconciliation.records),
                    dropped: reconciliation.dropped,
                    as_of: Some(reconciliation.as_of),
                };
                Ok(snapshot.clone())
            }
            Err(e) => {
                warn!(generation, error = %e, "board load failed");
                *snapshot = BoardSnapshot {
                    generation,
                    status: LoadStatus::Error(e.to_string()),
                    records: Arc::from(Vec::new()),
                    dropped: 0,
                    as_of: Some(as_of),
                };
                Err(LoadError::Transport(e))
            }
        }
    }

    async fn fetch(&self, as_of: DateTime<Utc>) -> Result<Reconciliation, TransportError> {
        let routes = resolve_routes(&self.api, self.config.mode).await?;
        reconcile(&self.api, &routes, as_of).await
    }

    async fn mark_pending(&self, generation: u64) {
        let mut snapshot = self.snapshot.write().await;
        if generation == self.latest_generation() {
            snapshot.status = LoadStatus::Pending;
        }
    }

    fn clear_in_flight(&self, generation: u64) {
        let mut in_flight = self.lock_in_flight();
        if in_flight.as_ref().is_some_and(|(g, _)| *g == generation) {
            *in_flight = None;
        }
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, Option<(u64, AbortHandle)>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use tokio::sync::Notify;

    use crate::domain::RouteId;
    use crate::transit::{Document, MockTransitApi};

    fn as_of() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T06:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn routes(ids: &[&str]) -> Document {
        let data: Vec<_> = ids
            .iter()
            .map(|id| serde_json::json!({"id": id, "type": "route"}))
            .collect();
        serde_json::from_value(serde_json::json!({ "data": data })).unwrap()
    }

    /// One scheduled stop on trip `train` at Porter.
    fn schedules(train: &str) -> Document {
        serde_json::from_value(serde_json::json!({
            "data": [{
                "id": format!("s-{train}"),
                "type": "schedule",
                "attributes": {"departure_time": "2024-01-01T08:00:00Z"},
                "relationships": {
                    "route": {"data": {"id": "CR-Fitchburg", "type": "route"}},
                    "stop": {"data": {"id": "porter", "type": "stop"}},
                    "trip": {"data": {"id": train, "type": "trip"}},
                    "prediction": {"data": null}
                }
            }],
            "included": [
                {"id": "CR-Fitchburg", "type": "route"},
                {"id": "porter", "type": "stop", "attributes": {"name": "Porter"}},
                {"id": train, "type": "trip", "attributes": {"name": train}}
            ]
        }))
        .unwrap()
    }

    /// API whose n-th schedules request waits for `release(n)`.
    #[derive(Clone)]
    struct GatedApi {
        routes: Arc<Document>,
        responses: Arc<Vec<Document>>,
        gates: Arc<Vec<Notify>>,
        calls: Arc<AtomicUsize>,
    }

    impl GatedApi {
        fn new(responses: Vec<Document>) -> Self {
            let gates = responses.iter().map(|_| Notify::new()).collect();
            Self {
                routes: Arc::new(routes(&["CR-Fitchburg"])),
                responses: Arc::new(responses),
                gates: Arc::new(gates),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn release(&self, n: usize) {
            self.gates[n].notify_one();
        }

        async fn wait_for_calls(&self, n: usize) {
            while self.calls.load(Ordering::SeqCst) < n {
                tokio::task::yield_now().await;
            }
        }
    }

    impl TransitApi for GatedApi {
        async fn fetch_routes(&self, _mode: TransitMode) -> Result<Document, TransportError> {
            Ok(Document::clone(&self.routes))
        }

        async fn fetch_schedules(
            &self,
            _route_ids: &[RouteId],
        ) -> Result<Document, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.gates[n].notified().await;
            Ok(self.responses[n].clone())
        }
    }

    /// API whose routes response is taken from a queue, one per load.
    struct ShrinkingApi {
        routes: Mutex<Vec<Document>>,
        schedule_calls: AtomicUsize,
    }

    impl ShrinkingApi {
        fn new(mut routes: Vec<Document>) -> Self {
            routes.reverse();
            Self {
                routes: Mutex::new(routes),
                schedule_calls: AtomicUsize::new(0),
            }
        }
    }

    impl TransitApi for ShrinkingApi {
        async fn fetch_routes(&self, _mode: TransitMode) -> Result<Document, TransportError> {
            Ok(self.routes.lock().unwrap().pop().unwrap_or_default())
        }

        async fn fetch_schedules(
            &self,
            _route_ids: &[RouteId],
        ) -> Result<Document, TransportError> {
            self.schedule_calls.fetch_add(1, Ordering::SeqCst);
            Ok(schedules("101"))
        }
    }

    fn train_numbers(snapshot: &BoardSnapshot) -> Vec<String> {
        snapshot
            .records
            .iter()
            .map(|r| r.train_number.clone())
            .collect()
    }

    #[tokio::test]
    async fn initial_snapshot_is_pending_and_empty() {
        let loader = BoardLoader::new(
            MockTransitApi::new("data/mock").unwrap(),
            BoardConfig::default(),
        );
        let snapshot = loader.snapshot().await;

        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.status, LoadStatus::Pending);
        assert!(snapshot.records.is_empty());
    }

    #[tokio::test]
    async fn load_publishes_records() {
        let loader = BoardLoader::new(
            MockTransitApi::new("data/mock").unwrap(),
            BoardConfig::default(),
        );

        let snapshot = loader.load_at(as_of()).await.unwrap();

        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.status, LoadStatus::Ready);
        assert_eq!(snapshot.records.len(), 3);
        assert_eq!(snapshot.dropped, 2);
        assert_eq!(snapshot.as_of, Some(as_of()));
        assert_eq!(loader.snapshot().await.records.len(), 3);
    }

    #[tokio::test]
    async fn transport_error_is_published() {
        let api = MockTransitApi::new("data/mock").unwrap().failing_with(503);
        let loader = BoardLoader::new(api, BoardConfig::default());

        let err = loader.load_at(as_of()).await.unwrap_err();
        assert!(matches!(err, LoadError::Transport(_)));

        let snapshot = loader.snapshot().await;
        assert!(matches!(snapshot.status, LoadStatus::Error(ref m) if m.contains("503")));
        assert!(snapshot.records.is_empty());
    }

    #[tokio::test]
    async fn empty_route_list_gives_empty_ready_board() {
        let api = MockTransitApi::from_documents(routes(&[]), schedules("101"));
        let loader = BoardLoader::new(api.clone(), BoardConfig::default());

        let snapshot = loader.load_at(as_of()).await.unwrap();

        assert_eq!(snapshot.status, LoadStatus::Ready);
        assert!(snapshot.records.is_empty());
        assert!(api.schedule_requests().is_empty());
    }

    #[tokio::test]
    async fn later_load_with_no_routes_clears_board() {
        let api = ShrinkingApi::new(vec![routes(&["CR-Fitchburg"]), routes(&[])]);
        let loader = BoardLoader::new(api, BoardConfig::default());

        let first = loader.load_at(as_of()).await.unwrap();
        assert_eq!(train_numbers(&first), vec!["101"]);

        let second = loader.load_at(as_of()).await.unwrap();
        assert_eq!(second.generation, 2);
        assert_eq!(second.status, LoadStatus::Ready);
        assert!(second.records.is_empty());
        assert_eq!(second.dropped, 0);

        let current = loader.snapshot().await;
        assert_eq!(current.generation, 2);
        assert!(current.records.is_empty());
        assert_eq!(loader.api.schedule_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_load_replaces_first() {
        let first = BoardLoader::new(
            MockTransitApi::from_documents(routes(&["CR-Fitchburg"]), schedules("101")),
            BoardConfig::default(),
        );
        first.load_at(as_of()).await.unwrap();
        assert_eq!(train_numbers(&first.snapshot().await), vec!["101"]);

        let second = first.load_at(as_of()).await.unwrap();
        assert_eq!(second.generation, 2);
        assert_eq!(train_numbers(&second), vec!["101"]);
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let api = GatedApi::new(vec![schedules("101"), schedules("202")]);
        let loader = Arc::new(BoardLoader::new(api.clone(), BoardConfig::default()));

        let older = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load_at(as_of()).await }
        });
        api.wait_for_calls(1).await;

        let newer = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load_at(as_of()).await }
        });
        api.wait_for_calls(2).await;

        api.release(1);
        let newer = newer.await.unwrap().unwrap();
        assert_eq!(newer.generation, 2);

        api.release(0);
        let older = older.await.unwrap();
        assert!(matches!(
            older,
            Err(LoadError::Stale {
                generation: 1,
                latest: 2
            })
        ));

        let snapshot = loader.snapshot().await;
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.status, LoadStatus::Ready);
        assert_eq!(train_numbers(&snapshot), vec!["202"]);
    }

    #[tokio::test]
    async fn older_response_arriving_first_is_discarded() {
        let api = GatedApi::new(vec![schedules("101"), schedules("202")]);
        let loader = Arc::new(BoardLoader::new(api.clone(), BoardConfig::default()));

        let older = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load_at(as_of()).await }
        });
        api.wait_for_calls(1).await;

        let newer = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load_at(as_of()).await }
        });
        api.wait_for_calls(2).await;

        api.release(0);
        assert!(matches!(
            older.await.unwrap(),
            Err(LoadError::Stale { .. })
        ));
        assert_eq!(loader.snapshot().await.status, LoadStatus::Pending);
        assert!(loader.snapshot().await.records.is_empty());

        api.release(1);
        newer.await.unwrap().unwrap();
        assert_eq!(train_numbers(&loader.snapshot().await), vec!["202"]);
    }

    #[tokio::test]
    async fn superseded_load_can_be_aborted() {
        let api = GatedApi::new(vec![schedules("101"), schedules("202")]);
        let config = BoardConfig::default().with_cancel_superseded(true);
        let loader = Arc::new(BoardLoader::new(api.clone(), config));

        let older = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load_at(as_of()).await }
        });
        api.wait_for_calls(1).await;

        let newer = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load_at(as_of()).await }
        });
        api.wait_for_calls(2).await;

        assert!(matches!(older.await.unwrap(), Err(LoadError::Cancelled(1))));

        api.release(1);
        let snapshot = newer.await.unwrap().unwrap();
        assert_eq!(train_numbers(&snapshot), vec!["202"]);
    }

    #[tokio::test]
    async fn cancel_in_flight_load() {
        let api = GatedApi::new(vec![schedules("101")]);
        let loader = Arc::new(BoardLoader::new(api.clone(), BoardConfig::default()));

        let load = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load_at(as_of()).await }
        });
        api.wait_for_calls(1).await;

        assert!(loader.cancel());
        assert!(matches!(load.await.unwrap(), Err(LoadError::Cancelled(1))));
        assert!(!loader.cancel());

        let snapshot = loader.snapshot().await;
        assert_eq!(snapshot.status, LoadStatus::Error("load cancelled".into()));
    }

    #[test]
    fn load_status_serialization() {
        assert_eq!(
            serde_json::to_value(LoadStatus::Ready).unwrap(),
            serde_json::json!({"state": "ready"})
        );
        assert_eq!(
            serde_json::to_value(LoadStatus::Error("API error 503: down".into())).unwrap(),
            serde_json::json!({"state": "error", "message": "API error 503: down"})
        );
    }
}
