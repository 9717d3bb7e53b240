use crate::context::{CLIENT_METADATA_ID_KEY, ContextMap, RequestContext};
use crate::error::{GResult, HandoffError};
use crate::host::ExternalAuthority;
use crate::resume::HandoffResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone, Debug)]
pub struct StartedHandoff {
    pub target: Url,
    pub context: ContextMap,
    pub expires_at: Instant,
}

/// Stands in for the browser: remembers what it was handed and echoes it back once.
pub struct InMemoryAuthority {
    store: RwLock<HashMap<String, StartedHandoff>>,
    launches: RwLock<Vec<Url>>,
    refuse_with: RwLock<Option<String>>,
    ttl: Duration,
}

impl Default for InMemoryAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthority {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            launches: RwLock::new(Vec::new()),
            refuse_with: RwLock::new(None),
            ttl,
        }
    }

    /// Makes subsequent `start` calls fail as a device that cannot open the target would.
    pub fn refuse_launch(&self, reason: impl Into<String>) {
        *self.refuse_with.write() = Some(reason.into());
    }

    pub fn launches(&self) -> Vec<Url> {
        self.launches.read().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.store.read().len()
    }

    /// The user finished on the authority's side and it redirected to `returned_uri`.
    pub fn complete(&self, correlation_id: &str, returned_uri: &str) -> Option<HandoffResult> {
        self.take(correlation_id)
            .map(|entry| HandoffResult::completed(returned_uri, entry.context))
    }

    /// The platform reported the user closed the authority.
    pub fn cancel(&self, correlation_id: &str) -> Option<HandoffResult> {
        self.take(correlation_id)
            .map(|entry| HandoffResult::user_canceled(entry.context))
    }

    /// Closed before the authority persisted the context.
    pub fn dismiss(&self, correlation_id: &str) -> Option<HandoffResult> {
        self.take(correlation_id)
            .map(|_| HandoffResult::user_canceled(ContextMap::new()))
    }

    fn take(&self, correlation_id: &str) -> Option<StartedHandoff> {
        let entry = self.store.write().remove(correlation_id)?;
        if Self::is_expired(&entry) {
            tracing::debug!(correlation_id, "pending handoff expired");
            return None;
        }
        Some(entry)
    }

    fn is_expired(entry: &StartedHandoff) -> bool {
        Instant::now() > entry.expires_at
    }
}

impl ExternalAuthority for InMemoryAuthority {
    fn start(&self, target: &Url, context: &RequestContext) -> GResult<()> {
        if let Some(reason) = self.refuse_with.read().clone() {
            return Err(HandoffError::CallbackSurfaceMisconfigured {
                scheme: target.scheme().to_string(),
                reason,
            });
        }
        let map = context.to_map();
        let key = map
            .get(CLIENT_METADATA_ID_KEY)
            .cloned()
            .unwrap_or_default();
        self.launches.write().push(target.clone());
        self.store.write().insert(
            key,
            StartedHandoff {
                target: target.clone(),
                context: map,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }
}
