pub mod authorization_bridge;
pub mod backend_bridge;
pub mod telemetry_bridge;

pub use authorization_bridge::FnAuthorizationProvider;
pub use backend_bridge::{FnApprovalBackend, FnTokenizer};
pub use telemetry_bridge::FnTelemetrySink;
