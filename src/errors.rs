//! Error types for construction and interception.
//!
//! Every failure here is synchronous, final, and names both the offending
//! type and the violated precondition, so a test author can pick a
//! workaround (capability wrapper, manual stub, composition) immediately.

use thiserror::Error;

use crate::strategy::InterceptReason;

/// No declared constructor of the requested type accepts the supplied
/// arguments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no constructor of `{type_name}` accepts arguments ({arg_shapes})")]
pub struct ConstructionError {
    /// The type the factory attempted to construct.
    pub type_name: &'static str,
    /// Comma-joined shapes of the supplied arguments.
    pub arg_shapes: String,
}

/// Failures of the interception layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InterceptError {
    /// The requested concrete type fails subclass-interception eligibility.
    #[error("cannot intercept `{type_name}`: {reason}")]
    Ineligible {
        type_name: &'static str,
        reason: InterceptReason,
    },

    /// Subclass-based replay was requested with no bound target. Not
    /// implemented upstream; fails loudly instead of approximating.
    #[error(
        "replay without a live target is not supported for subclass interception of `{type_name}`"
    )]
    ReplayUnsupported { type_name: &'static str },

    /// A capability proxy in replay mode has no target to forward to.
    #[error("capability proxy for `{type_name}` has no bound target to forward to")]
    Unbound { type_name: &'static str },
}
