use crate::host::TelemetrySink;
use parking_lot::Mutex;

#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<String>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| e.as_str() == event).count()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.count(event) > 0
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn emit(&self, event: &str) {
        self.events.lock().push(event.to_string());
    }
}
