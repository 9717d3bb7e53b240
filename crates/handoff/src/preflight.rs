use crate::api::{FlowKind, PaymentMethod};
use crate::error::{GResult, HandoffError};
use crate::host::CapabilityRegistry;

/// Synchronous, side-effect-free gate run before any backend call.
pub fn check(
    kind: FlowKind,
    method_enabled: bool,
    callback_surface_registered: bool,
    return_url_scheme: &str,
) -> GResult<()> {
    check_method(kind.method(), method_enabled)?;
    if !callback_surface_registered {
        return Err(HandoffError::CallbackSurfaceMisconfigured {
            scheme: return_url_scheme.to_string(),
            reason: "return surface not registered".into(),
        });
    }
    Ok(())
}

pub fn check_method(method: PaymentMethod, enabled: bool) -> GResult<()> {
    if enabled {
        Ok(())
    } else {
        Err(HandoffError::FeatureDisabled { method })
    }
}

/// Resolves both inputs from the registry and runs [`check`].
pub fn check_with(
    registry: &dyn CapabilityRegistry,
    kind: FlowKind,
    return_url_scheme: &str,
) -> GResult<()> {
    check(
        kind,
        registry.is_enabled(kind.method()),
        registry.is_callback_surface_registered(return_url_scheme),
        return_url_scheme,
    )
}
