use crate::api::PaymentMethod;
use crate::host::CapabilityRegistry;
use parking_lot::RwLock;
use std::collections::HashSet;

/// Capability registry with a fixed set of enabled methods and registered return schemes.
#[derive(Default)]
pub struct StaticCapabilities {
    enabled: RwLock<HashSet<PaymentMethod>>,
    schemes: RwLock<HashSet<String>>,
}

impl StaticCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(self, method: PaymentMethod) -> Self {
        self.enabled.write().insert(method);
        self
    }

    pub fn register_scheme(self, scheme: impl Into<String>) -> Self {
        self.schemes.write().insert(scheme.into());
        self
    }
}

impl CapabilityRegistry for StaticCapabilities {
    fn is_enabled(&self, method: PaymentMethod) -> bool {
        self.enabled.read().contains(&method)
    }

    fn is_callback_surface_registered(&self, return_url_scheme: &str) -> bool {
        self.schemes.read().contains(return_url_scheme)
    }
}
