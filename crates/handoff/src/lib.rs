#![forbid(unsafe_code)]

pub mod api;
pub mod authorization;
pub mod builder;
pub mod challenge;
pub mod client;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod glue;
pub mod host;
pub mod initiator;
pub mod line_item;
pub mod payload;
pub mod preflight;
pub mod resume;
pub mod shims;
pub mod telemetry;

pub use api::{
    CancelReason, CreditFinancing, FlowKind, FlowOutcome, FlowRequest, MoneyAmount,
    PaymentCredential, PaymentMethod,
};
pub use authorization::{Authorization, AuthorizationLoader, AuthorizationProvider};
pub use builder::{ClientBuilder, ClientSettings};
pub use client::CheckoutClient;
pub use config::HandoffConfig;
pub use context::{ContextMap, RequestContext};
pub use error::{ErrorKind, GResult, HandoffError};
pub use host::{
    ApprovalBackend, ApprovalRequest, ApprovalResponse, CapabilityRegistry, ExternalAuthority,
    HostBundle, TelemetrySink, Tokenizer,
};
pub use initiator::{FlowInitiator, PendingHandoff};
pub use payload::TokenizationPayload;
pub use resume::{
    CancelDiscriminator, HandoffResult, HandoffStatus, PathSegmentDiscriminator, ResumeInterpreter,
};
