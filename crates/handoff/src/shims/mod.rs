pub mod authority_shim;
pub mod registry_shim;
pub mod telemetry_shim;

pub use authority_shim::{InMemoryAuthority, StartedHandoff};
pub use registry_shim::StaticCapabilities;
pub use telemetry_shim::RecordingTelemetry;
