// Refresh Trigger - request-driven queue discovery
//
// Every inbound view request calls `trigger()`. Triggers that arrive while a
// cycle is running join that cycle instead of starting another one, and each
// cycle carries a generation stamp so an older result can never replace a
// newer one in the registry.

mod outcome;

pub use outcome::{RefreshFailure, RefreshOutcome, RefreshReport, RefreshState};

use crate::application::adapter::HandleBuilder;
use crate::application::constants::{DEFAULT_CONNECT_TIMEOUT, INITIAL_GENERATION};
use crate::application::extractor::extract_queue_ids;
use crate::application::registry::QueueRegistry;
use crate::application::scanner::KeyScanner;
use crate::domain::DEFAULT_KEY_PREFIX;
use crate::error::AppError;
use crate::port::{KeyStore, KeyStoreSession, TimeProvider};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Discovery settings
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Key namespace to scan (`<namespace>:*`)
    pub namespace: String,
    pub connect_timeout: Duration,
}

impl DiscoveryConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

type SharedCycle = Shared<BoxFuture<'static, RefreshOutcome>>;

struct InFlight {
    generation: u64,
    cycle: SharedCycle,
}

type InFlightSlot = Arc<Mutex<Option<InFlight>>>;

/// Coordinates refresh cycles and publishes their results
pub struct RefreshCoordinator {
    pipeline: Arc<Pipeline>,
    in_flight: InFlightSlot,
}

impl RefreshCoordinator {
    /// Create a coordinator publishing into `registry`
    ///
    /// # Arguments
    /// * `store` - Key-value store to scan
    /// * `builder` - Handle builder for the configured engine variant
    /// * `registry` - Registry shared with the rendering layer
    /// * `config` - Namespace and connect timeout
    /// * `time_provider` - Clock for report timestamps
    pub fn new(
        store: Arc<dyn KeyStore>,
        builder: Arc<dyn HandleBuilder>,
        registry: Arc<QueueRegistry>,
        config: DiscoveryConfig,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let (state, _) = watch::channel(RefreshState::Idle);
        Self {
            pipeline: Arc::new(Pipeline {
                scanner: KeyScanner::new(store, config.connect_timeout),
                builder,
                registry,
                namespace: config.namespace,
                time_provider,
                state,
                generation: AtomicU64::new(INITIAL_GENERATION),
                last_outcome: Mutex::new(None),
            }),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Run a refresh cycle, or join the one already in flight
    ///
    /// Never fails: a failed cycle leaves the registry unchanged and the
    /// caller renders whatever is currently published. The cycle runs on
    /// its own task and completes even if every caller goes away.
    pub async fn trigger(&self) -> RefreshOutcome {
        self.join_or_start().await
    }

    /// Registry this coordinator publishes into
    pub fn registry(&self) -> &Arc<QueueRegistry> {
        &self.pipeline.registry
    }

    pub fn namespace(&self) -> &str {
        &self.pipeline.namespace
    }

    /// Current state of the cycle state machine
    pub fn state(&self) -> RefreshState {
        *self.pipeline.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.pipeline.state.subscribe()
    }

    /// Outcome of the most recently finished cycle
    pub fn last_outcome(&self) -> Option<RefreshOutcome> {
        lock(&self.pipeline.last_outcome).clone()
    }

    /// Whether a cycle is currently running
    pub fn is_refreshing(&self) -> bool {
        lock(&self.in_flight).is_some()
    }

    fn join_or_start(&self) -> SharedCycle {
        let mut slot = lock(&self.in_flight);
        if let Some(in_flight) = slot.as_ref() {
            debug!(generation = in_flight.generation, "Joining in-flight refresh");
            return in_flight.cycle.clone();
        }

        let generation = self.pipeline.next_generation();
        let pipeline = Arc::clone(&self.pipeline);
        let task_slot = Arc::clone(&self.in_flight);
        let task = tokio::spawn(async move {
            let cycle = AssertUnwindSafe(Arc::clone(&pipeline).run_cycle(generation));
            let outcome = match cycle.catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => pipeline.panicked(generation, panic),
            };
            clear_slot(&task_slot, generation);
            outcome
        });

        let pipeline = Arc::clone(&self.pipeline);
        let join_slot = Arc::clone(&self.in_flight);
        let cycle = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    clear_slot(&join_slot, generation);
                    pipeline.abort(generation, join_err)
                }
            }
        }
        .boxed()
        .shared();

        *slot = Some(InFlight {
            generation,
            cycle: cycle.clone(),
        });
        cycle
    }
}

fn clear_slot(slot: &InFlightSlot, generation: u64) {
    let mut slot = lock(slot);
    if slot.as_ref().is_some_and(|f| f.generation == generation) {
        *slot = None;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Pipeline {
    scanner: KeyScanner,
    builder: Arc<dyn HandleBuilder>,
    registry: Arc<QueueRegistry>,
    namespace: String,
    time_provider: Arc<dyn TimeProvider>,
    state: watch::Sender<RefreshState>,
    generation: AtomicU64,
    last_outcome: Mutex<Option<RefreshOutcome>>,
}

impl Pipeline {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn enter(&self, state: RefreshState, generation: u64) {
        debug!(generation, state = %state, "Refresh state");
        self.state.send_replace(state);
    }

    /// connect -> scan -> extract -> build -> publish -> disconnect
    async fn run_cycle(self: Arc<Self>, generation: u64) -> RefreshOutcome {
        let started = Instant::now();

        self.enter(RefreshState::Connecting, generation);
        let mut session = match self.scanner.connect().await {
            Ok(session) => session,
            Err(e) => {
                let outcome = self.fail(generation, RefreshState::Connecting, e);
                return self.finish(outcome);
            }
        };

        let outcome = match self.discover(generation, session.as_mut(), started).await {
            Ok(outcome) => outcome,
            Err((stage, e)) => self.fail(generation, stage, e),
        };

        // Released on every path, success or failure
        self.enter(RefreshState::Disconnecting, generation);
        self.scanner.release(session).await;

        self.finish(outcome)
    }

    async fn discover(
        &self,
        generation: u64,
        session: &mut dyn KeyStoreSession,
        started: Instant,
    ) -> Result<RefreshOutcome, (RefreshState, AppError)> {
        self.enter(RefreshState::Scanning, generation);
        let keys = self
            .scanner
            .scan(session, &self.namespace)
            .await
            .map_err(|e| (RefreshState::Scanning, e))?;

        self.enter(RefreshState::Extracting, generation);
        let extraction = extract_queue_ids(&self.namespace, &keys);

        self.enter(RefreshState::Building, generation);
        let handles = self
            .builder
            .build_all(&extraction.queues)
            .map_err(|e| (RefreshState::Building, e))?;

        self.enter(RefreshState::Publishing, generation);
        let now = self.time_provider.now_millis();
        let published = self.registry.publish(generation, handles, now);

        let report = RefreshReport {
            generation,
            queues: extraction.queues,
            scanned_keys: keys.len(),
            malformed_keys: extraction.malformed,
            duration_ms: started.elapsed().as_millis() as u64,
            finished_at_ms: now,
        };

        if published {
            info!(
                generation,
                namespace = %self.namespace,
                queues = report.queues.len(),
                keys = report.scanned_keys,
                duration_ms = report.duration_ms,
                "Queue registry refreshed"
            );
            Ok(RefreshOutcome::Published(report))
        } else {
            warn!(
                generation,
                published_generation = self.registry.generation(),
                "Refresh result superseded by a newer generation"
            );
            Ok(RefreshOutcome::Stale(report))
        }
    }

    fn fail(&self, generation: u64, stage: RefreshState, err: AppError) -> RefreshOutcome {
        error!(
            generation,
            stage = %stage,
            kind = err.kind(),
            error = %err,
            "Refresh cycle failed, keeping previous queue list"
        );
        self.enter(RefreshState::Failed, generation);
        RefreshOutcome::Failed(RefreshFailure {
            generation,
            stage,
            error: Arc::new(err),
            finished_at_ms: self.time_provider.now_millis(),
        })
    }

    // Recorded from inside the task, so status never shows a phantom cycle
    fn panicked(&self, generation: u64, panic: Box<dyn Any + Send>) -> RefreshOutcome {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let stage = *self.state.borrow();
        let outcome = self.fail(
            generation,
            stage,
            AppError::Internal(format!("refresh cycle panicked: {}", message)),
        );
        self.finish(outcome)
    }

    // The cycle task was cancelled by runtime shutdown
    fn abort(&self, generation: u64, join_err: tokio::task::JoinError) -> RefreshOutcome {
        let stage = *self.state.borrow();
        let outcome = self.fail(
            generation,
            stage,
            AppError::Internal(format!("refresh task aborted: {}", join_err)),
        );
        self.finish(outcome)
    }

    fn finish(&self, outcome: RefreshOutcome) -> RefreshOutcome {
        *lock(&self.last_outcome) = Some(outcome.clone());
        self.enter(RefreshState::Idle, outcome.generation());
        outcome
    }
}
