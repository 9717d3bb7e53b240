use tracing::Span;
use tracing::field::Empty;

use crate::api::FlowKind;
use crate::host::TelemetrySink;

pub const DEFAULT_ANALYTICS_PREFIX: &str = "paypal";

/// Builds analytics event names under a common prefix.
#[derive(Clone, Debug)]
pub struct EventNames {
    prefix: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYTICS_PREFIX)
    }
}

impl EventNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn selected(&self, kind: FlowKind) -> String {
        format!("{}.{}.selected", self.prefix, kind.payment_type())
    }

    pub fn credit_offered(&self, kind: FlowKind) -> String {
        format!("{}.{}.credit.offered", self.prefix, kind.payment_type())
    }

    pub fn browser_switch_started(&self, kind: FlowKind) -> String {
        self.browser_switch(Some(kind), "started")
    }

    pub fn browser_switch_succeeded(&self, kind: Option<FlowKind>) -> String {
        self.browser_switch(kind, "succeeded")
    }

    pub fn browser_switch_canceled(&self, kind: Option<FlowKind>) -> String {
        self.browser_switch(kind, "canceled")
    }

    pub fn credit_accepted(&self) -> String {
        format!("{}.credit.accepted", self.prefix)
    }

    fn browser_switch(&self, kind: Option<FlowKind>, phase: &str) -> String {
        match kind {
            Some(kind) => format!(
                "{}.{}.browser-switch.{phase}",
                self.prefix,
                kind.payment_type()
            ),
            None => format!("{}.browser-switch.{phase}", self.prefix),
        }
    }
}

pub(crate) fn emit(sink: &dyn TelemetrySink, event: &str) {
    tracing::debug!(event, "analytics event");
    sink.emit(event);
}

#[derive(Debug, Clone, Default)]
pub struct FlowSpanAttributes<'a> {
    pub payment_type: Option<&'a str>,
    pub handoff_id: Option<&'a str>,
    pub correlation_id: Option<&'a str>,
}

pub fn flow_span(phase: &'static str) -> Span {
    tracing::info_span!(
        "checkout_handoff",
        phase,
        payment_type = Empty,
        handoff_id = Empty,
        correlation_id = Empty
    )
}

pub fn annotate_span(span: &Span, attrs: &FlowSpanAttributes<'_>) {
    if let Some(payment_type) = attrs.payment_type {
        span.record("payment_type", payment_type);
    }
    if let Some(handoff_id) = attrs.handoff_id {
        span.record("handoff_id", handoff_id);
    }
    if let Some(correlation_id) = attrs.correlation_id {
        span.record("correlation_id", correlation_id);
    }
}
