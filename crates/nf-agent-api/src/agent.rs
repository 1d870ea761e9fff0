//! Agent lifecycle: background dataset loads and atomic store publication.
//!
//! State lives in a `watch` channel. A load builds a fresh `TabularStore`
//! off the async runtime, then publishes it with a single send, so readers
//! see either the old store or the new one and never a mix.

use std::sync::Arc;

use nf_protocol::DatasetInfo;
use nf_tabular::{DatasetSource, LoadError, LoadResult, TabularStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::router::{QueryOutcome, QueryRouter};

/// Where the agent is in its load cycle.
#[derive(Debug, Clone)]
pub enum Lifecycle {
    Uninitialized,
    /// A load is in flight. `previous` is restored if it fails.
    Loading {
        previous: Option<Arc<TabularStore>>,
    },
    Ready(Arc<TabularStore>),
}

impl Lifecycle {
    /// The store that may serve queries (only in `Ready`).
    pub fn store(&self) -> Option<&Arc<TabularStore>> {
        match self {
            Lifecycle::Ready(store) => Some(store),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Lifecycle::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Lifecycle::Loading { .. })
    }
}

/// Snapshot of the agent state.
#[derive(Debug, Clone)]
pub struct AgentStatus {
    pub lifecycle: Lifecycle,
    /// Message of the most recent failed load, cleared on success.
    pub last_error: Option<String>,
}

/// A started load; await it or drop it to let it finish in the background.
pub struct ReloadHandle {
    task: JoinHandle<LoadResult<DatasetInfo>>,
}

impl ReloadHandle {
    pub async fn wait(self) -> LoadResult<DatasetInfo> {
        self.task
            .await
            .unwrap_or_else(|e| Err(LoadError::Task(e.to_string())))
    }
}

struct Inner {
    status: watch::Sender<AgentStatus>,
    source: Arc<dyn DatasetSource>,
    router: QueryRouter,
}

/// Shared handle to the dataset lifecycle and the query router.
#[derive(Clone)]
pub struct AgentContext {
    inner: Arc<Inner>,
}

impl AgentContext {
    /// New agent in `Uninitialized`; call `reload` to start the first load.
    pub fn new(source: Arc<dyn DatasetSource>, router: QueryRouter) -> Self {
        Self::with_lifecycle(source, router, Lifecycle::Uninitialized)
    }

    /// New agent already `Ready` with `store`.
    pub fn preloaded(
        source: Arc<dyn DatasetSource>,
        router: QueryRouter,
        store: TabularStore,
    ) -> Self {
        Self::with_lifecycle(source, router, Lifecycle::Ready(Arc::new(store)))
    }

    fn with_lifecycle(
        source: Arc<dyn DatasetSource>,
        router: QueryRouter,
        lifecycle: Lifecycle,
    ) -> Self {
        let (status, _) = watch::channel(AgentStatus {
            lifecycle,
            last_error: None,
        });
        Self {
            inner: Arc::new(Inner {
                status,
                source,
                router,
            }),
        }
    }

    pub fn status(&self) -> AgentStatus {
        self.inner.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AgentStatus> {
        self.inner.status.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.status.borrow().lifecycle.is_ready()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.status.borrow().lifecycle.is_loading()
    }

    /// Current store, if `Ready`. Holding the `Arc` keeps it alive across reloads.
    pub fn snapshot(&self) -> Option<Arc<TabularStore>> {
        self.inner.status.borrow().lifecycle.store().cloned()
    }

    pub fn router(&self) -> &QueryRouter {
        &self.inner.router
    }

    /// Start a background load. Returns `None` if one is already in flight.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn reload(&self) -> Option<ReloadHandle> {
        let started = self.inner.status.send_if_modified(|status| {
            if status.lifecycle.is_loading() {
                return false;
            }
            let previous = status.lifecycle.store().cloned();
            status.lifecycle = Lifecycle::Loading { previous };
            true
        });
        if !started {
            tracing::info!("load already in progress, ignoring reload request");
            return None;
        }

        let agent = self.clone();
        let task = tokio::spawn(async move { agent.run_load().await });
        Some(ReloadHandle { task })
    }

    async fn run_load(&self) -> LoadResult<DatasetInfo> {
        let source = Arc::clone(&self.inner.source);
        tracing::info!(source = %source.describe(), "loading dataset");
        let result = tokio::task::spawn_blocking(move || source.load())
            .await
            .unwrap_or_else(|e| Err(LoadError::Task(e.to_string())));
        self.publish(result)
    }

    fn publish(&self, result: LoadResult<TabularStore>) -> LoadResult<DatasetInfo> {
        match result {
            Ok(store) => {
                let info = store.info().clone();
                tracing::info!(
                    dataset_id = %info.id,
                    headers = info.total_headers,
                    items = info.total_items,
                    "dataset ready"
                );
                self.inner.status.send_replace(AgentStatus {
                    lifecycle: Lifecycle::Ready(Arc::new(store)),
                    last_error: None,
                });
                Ok(info)
            }
            Err(e) => {
                tracing::error!(error = %e, "dataset load failed");
                self.inner.status.send_modify(|status| {
                    let current =
                        std::mem::replace(&mut status.lifecycle, Lifecycle::Uninitialized);
                    if let Lifecycle::Loading {
                        previous: Some(previous),
                    } = current
                    {
                        status.lifecycle = Lifecycle::Ready(previous);
                    }
                    status.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Wait until no load is in flight and return that status.
    pub async fn wait_settled(&self) -> AgentStatus {
        let mut rx = self.subscribe();
        match rx.wait_for(|status| !status.lifecycle.is_loading()).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    /// Route a question against a single snapshot of the current store.
    pub async fn query(&self, question: &str) -> QueryOutcome {
        let snapshot = self.snapshot();
        self.inner.router.query(snapshot.as_deref(), question).await
    }
}
