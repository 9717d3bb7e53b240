use crate::host::TelemetrySink;
use std::sync::Arc;

pub struct FnTelemetrySink {
    inner: Arc<dyn Fn(&str) + Send + Sync>,
}

impl FnTelemetrySink {
    pub fn new<F>(func: F) -> Self
    where
        F: Send + Sync + 'static + Fn(&str),
    {
        Self {
            inner: Arc::new(func),
        }
    }

    /// Forwards every event to `tracing` only.
    pub fn logging() -> Self {
        Self::new(|event| tracing::info!(event, "analytics"))
    }
}

impl TelemetrySink for FnTelemetrySink {
    fn emit(&self, event: &str) {
        (self.inner)(event)
    }
}
