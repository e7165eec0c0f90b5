use navigator_core::{Catalog, ChatPanel, HubSession, NavigatorError, WizardSession};
use navigator_gateway::{Gateway, GatewayError, GatewayResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Longest a single gateway call may run before its panel turn is completed as failed.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(90);

/// Sessions untouched for longer than this are dropped when the next session opens.
pub const SESSION_IDLE_LIMIT: Duration = Duration::from_secs(2 * 60 * 60);

/// Reads a gateway timeout in whole seconds, as given by `NAVIGATOR_AI_TIMEOUT_SECS`.
/// An unset value gives [`DEFAULT_GATEWAY_TIMEOUT`].
pub fn gateway_timeout(secs: Option<&str>) -> anyhow::Result<Duration> {
    let Some(secs) = secs.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_GATEWAY_TIMEOUT);
    };
    match secs.parse::<u64>() {
        Ok(0) | Err(_) => {
            anyhow::bail!("gateway timeout must be a positive number of seconds, got '{secs}'")
        }
        Ok(n) => Ok(Duration::from_secs(n)),
    }
}

/// Application state for the REST API server
///
/// Holds the static catalogue, the AI gateway and the in-memory panel sessions. Session
/// maps are only locked for synchronous state transitions, never across a gateway call.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub gateway: Arc<dyn Gateway>,
    pub gateway_configured: bool,
    gateway_timeout: Duration,
    wizard_sessions: Arc<Mutex<SessionStore<WizardSession>>>,
    knowledge_chats: Arc<Mutex<SessionStore<ChatPanel>>>,
    hubs: Arc<Mutex<SessionStore<HubSession>>>,
}

impl AppState {
    pub fn new(catalog: Catalog, gateway: Arc<dyn Gateway>, gateway_configured: bool) -> Self {
        Self {
            catalog: Arc::new(catalog),
            gateway,
            gateway_configured,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            wizard_sessions: Arc::new(Mutex::new(SessionStore::new(SESSION_IDLE_LIMIT))),
            knowledge_chats: Arc::new(Mutex::new(SessionStore::new(SESSION_IDLE_LIMIT))),
            hubs: Arc::new(Mutex::new(SessionStore::new(SESSION_IDLE_LIMIT))),
        }
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub(crate) fn wizard_sessions(&self) -> MutexGuard<'_, SessionStore<WizardSession>> {
        self.wizard_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn knowledge_chats(&self) -> MutexGuard<'_, SessionStore<ChatPanel>> {
        self.knowledge_chats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn hubs(&self) -> MutexGuard<'_, SessionStore<HubSession>> {
        self.hubs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a gateway call under the configured timeout.
    pub(crate) async fn bounded<T>(
        &self,
        call: impl Future<Output = GatewayResult<T>>,
    ) -> GatewayResult<T> {
        match tokio::time::timeout(self.gateway_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.gateway_timeout, "gateway call timed out");
                Err(GatewayError::Timeout(self.gateway_timeout))
            }
        }
    }
}

/// In-memory sessions of one kind, keyed by id and stamped with their last use.
pub(crate) struct SessionStore<T> {
    entries: HashMap<Uuid, (T, Instant)>,
    idle_limit: Duration,
}

impl<T> SessionStore<T> {
    pub(crate) fn new(idle_limit: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            idle_limit,
        }
    }

    /// Stores a new session, first dropping any that have sat idle past the limit.
    pub(crate) fn insert(&mut self, id: Uuid, session: T) {
        let now = Instant::now();
        let evicted = self.evict_idle(now);
        if evicted > 0 {
            tracing::info!(evicted, "dropped idle sessions");
        }
        self.entries.insert(id, (session, now));
    }

    /// Looks up a session and marks it as used.
    pub(crate) fn get_mut(&mut self, id: Uuid) -> Result<&mut T, NavigatorError> {
        let (session, last_used) = self
            .entries
            .get_mut(&id)
            .ok_or(NavigatorError::UnknownSession(id))?;
        *last_used = Instant::now();
        Ok(session)
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Result<T, NavigatorError> {
        self.entries
            .remove(&id)
            .map(|(session, _)| session)
            .ok_or(NavigatorError::UnknownSession(id))
    }

    /// Drops sessions last used more than the idle limit before `now`.
    pub(crate) fn evict_idle(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let limit = self.idle_limit;
        self.entries
            .retain(|_, (_, last_used)| now.saturating_duration_since(*last_used) <= limit);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_gateway::GatewayRequest;

    const LIMIT: Duration = Duration::from_secs(60);

    #[test]
    fn test_idle_sessions_are_evicted() {
        let mut store = SessionStore::new(LIMIT);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.insert(a, "dicom");
        store.insert(b, "hl7");

        assert_eq!(store.evict_idle(Instant::now()), 0);
        assert_eq!(store.evict_idle(Instant::now() + LIMIT + Duration::from_secs(1)), 2);
        assert!(matches!(
            store.get_mut(a),
            Err(NavigatorError::UnknownSession(id)) if id == a
        ));
    }

    #[test]
    fn test_use_keeps_session_alive() {
        let mut store = SessionStore::new(LIMIT);
        let (used, idle) = (Uuid::new_v4(), Uuid::new_v4());
        store.insert(used, 1);
        store.insert(idle, 2);
        std::thread::sleep(Duration::from_millis(5));

        let touched_after = Instant::now();
        *store.get_mut(used).unwrap() += 10;

        assert_eq!(store.evict_idle(touched_after + LIMIT), 1);
        assert_eq!(*store.get_mut(used).unwrap(), 11);
        assert!(store.remove(idle).is_err());
        assert_eq!(store.remove(used).unwrap(), 11);
    }

    #[test]
    fn test_gateway_timeout_parsing() {
        assert_eq!(gateway_timeout(None).unwrap(), DEFAULT_GATEWAY_TIMEOUT);
        assert_eq!(gateway_timeout(Some(" ")).unwrap(), DEFAULT_GATEWAY_TIMEOUT);
        assert_eq!(gateway_timeout(Some("30")).unwrap(), Duration::from_secs(30));
        assert!(gateway_timeout(Some("0")).is_err());
        assert!(gateway_timeout(Some("soon")).is_err());
    }

    struct Hung;

    #[async_trait::async_trait]
    impl Gateway for Hung {
        async fn complete(&self, _request: GatewayRequest) -> GatewayResult<String> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_bounded_times_out_hung_gateway() {
        let state = AppState::new(Catalog::builtin().unwrap(), Arc::new(Hung), true)
            .with_gateway_timeout(Duration::from_millis(20));
        let result = state
            .bounded(navigator_gateway::ask(state.gateway.as_ref(), "KB", "Is IRIS up?"))
            .await;
        assert!(matches!(result, Err(GatewayError::Timeout(_))));
    }
}
