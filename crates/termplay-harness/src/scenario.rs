//! Scenario helpers: a coordinator wired to in-memory sessions.

use std::{future::Future, sync::Arc, time::Duration};

use termplay_core::{GameFactory, SessionId};
use termplay_proto::{Event, Message};
use termplay_server::{
    CodeSource, Coordinator, CoordinatorConfig, CoordinatorHandle, MemoryResultSink, ResultSink,
    SessionHandle, SessionRegistry,
};

use crate::sim_env::SimEnv;

/// How long helpers wait before declaring a scenario stuck.
const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Coordinator under test plus everything a test needs to observe it.
pub struct SimServer<S: ResultSink = MemoryResultSink> {
    /// Running coordinator
    pub coordinator: CoordinatorHandle<SimEnv>,
    /// Registry sessions are connected through
    pub registry: Arc<SessionRegistry>,
    /// Where finished matches are recorded
    pub sink: S,
    /// Shared simulated environment
    pub env: SimEnv,
    buffer_size: usize,
}

impl SimServer<MemoryResultSink> {
    /// Start a coordinator recording results in memory.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid or no tokio runtime is running.
    pub fn start(
        config: CoordinatorConfig,
        env: SimEnv,
        factory: impl GameFactory,
        codes: impl CodeSource,
    ) -> Self {
        Self::with_sink(config, env, factory, codes, MemoryResultSink::new())
    }
}

impl<S: ResultSink> SimServer<S> {
    /// Start a coordinator recording results in `sink`.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid or no tokio runtime is running.
    #[allow(clippy::expect_used)]
    pub fn with_sink(
        config: CoordinatorConfig,
        env: SimEnv,
        factory: impl GameFactory,
        codes: impl CodeSource,
        sink: S,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let buffer_size = config.session_buffer_size;
        let coordinator =
            Coordinator::new(config, env.clone(), Arc::clone(&registry), factory, sink.clone())
                .expect("scenario config must be valid")
                .with_code_source(codes)
                .spawn();

        Self { coordinator, registry, sink, env, buffer_size }
    }

    /// Register a new session with the configured buffer size.
    pub fn connect(&self, id: &str) -> SessionHandle {
        self.connect_with_capacity(id, self.buffer_size)
    }

    /// Register a new session with an explicit buffer size.
    pub fn connect_with_capacity(&self, id: &str, capacity: usize) -> SessionHandle {
        let session = SessionHandle::new(id, capacity);
        self.registry.register(session.clone());
        session
    }

    /// Simulate a client hanging up: close, unregister, notify the
    /// coordinator.
    pub fn hang_up(&self, session: &SessionHandle) {
        session.close();
        self.registry.unregister(session.id());
        self.send(Message::SessionDisconnected { session_id: session.id().clone() });
    }

    /// Submit a message, panicking if the queue rejects it.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator queue is full or stopped.
    #[allow(clippy::expect_used)]
    pub fn send(&self, message: Message) {
        self.coordinator.submit(message).expect("coordinator accepts message");
    }

    /// Submit a message and wait until it has been applied.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator queue is full or stopped.
    #[allow(clippy::expect_used)]
    pub async fn apply(&self, message: Message) {
        self.send(message);
        self.coordinator.barrier().await.expect("coordinator is running");
    }

    /// Whether `session_id` is still registered.
    pub fn is_connected(&self, session_id: &SessionId) -> bool {
        self.registry.contains(session_id)
    }
}

/// Wait for the next event on `session`.
///
/// # Panics
///
/// Panics if nothing arrives within five (possibly virtual) seconds or the
/// session closes.
#[allow(clippy::panic)]
pub async fn next_event(session: &SessionHandle) -> Event {
    match tokio::time::timeout(STEP_TIMEOUT, session.recv()).await {
        Ok(Some(event)) => event,
        Ok(None) => panic!("session {} closed while waiting for an event", session.id()),
        Err(_) => panic!("no event for session {} within {STEP_TIMEOUT:?}", session.id()),
    }
}

/// Wait for the next event that is not a snapshot.
///
/// # Panics
///
/// Same as [`next_event`].
pub async fn next_lifecycle_event(session: &SessionHandle) -> Event {
    loop {
        let event = next_event(session).await;
        if !event.is_snapshot() {
            return event;
        }
    }
}

/// Poll `check` until it returns true.
///
/// # Panics
///
/// Panics if `check` is still false after five (possibly virtual) seconds.
#[allow(clippy::panic)]
pub async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + STEP_TIMEOUT;
    while !check().await {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {STEP_TIMEOUT:?}");
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}
