//! Interception strategy selection.
//!
//! Two structurally different interception techniques exist: wrapping a
//! capability set behind dynamic dispatch, and shadowing a concrete type
//! through a synthesized subtype. Which one applies is a pure decision over
//! [`TypeProfile`] data, and an infeasible choice must explain itself with a
//! specific reason a test author can act on — never a generic failure.

use crate::profile::TypeProfile;

/// The interception technique selected for a type/target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Stand-in satisfying a capability set, forwarding via dynamic dispatch.
    Capability,
    /// Delegation wrapper shadowing a concrete type's overridable surface.
    Subclass,
}

/// Why subclass-based interception is (or is not) feasible for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptReason {
    Eligible,
    /// The type is sealed/final; no subtype can exist.
    NotExtendable,
    /// No publicly reachable constructor.
    NoPublicConstructor,
    /// No publicly reachable, overridable, non-static member to intercept.
    NoOverridableMember,
}

impl std::fmt::Display for InterceptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            InterceptReason::Eligible => "type is eligible for interception",
            InterceptReason::NotExtendable => {
                "type is not extendable; consider wrapping it in a capability trait"
            }
            InterceptReason::NoPublicConstructor => {
                "type exposes no publicly reachable constructor"
            }
            InterceptReason::NoOverridableMember => {
                "type has no publicly reachable, overridable, non-static member"
            }
        };
        f.write_str(text)
    }
}

/// Pick the interception technique for a requested type token and an
/// optional live target.
///
/// Capability tokens always intercept via dynamic dispatch. A concrete token
/// whose bound target satisfies some forwardable capability set also goes
/// the capability route (backward-compatibility preference). Everything else
/// falls to subclass-based interception, contingent on [`explain`].
pub fn choose_strategy(requested: &TypeProfile, target: Option<&TypeProfile>) -> Strategy {
    if requested.is_capability() {
        return Strategy::Capability;
    }
    if target.map_or(false, TypeProfile::has_forwardable_capability) {
        return Strategy::Capability;
    }
    Strategy::Subclass
}

/// Why the given type can or cannot be intercepted. Consult this before
/// attempting interception so a failure carries an actionable reason.
pub fn explain(profile: &TypeProfile) -> InterceptReason {
    if profile.is_capability() {
        return InterceptReason::Eligible;
    }
    if !profile.extendable {
        return InterceptReason::NotExtendable;
    }
    if profile.public_constructors == 0 {
        return InterceptReason::NoPublicConstructor;
    }
    if !profile.has_interceptable_member() {
        return InterceptReason::NoOverridableMember;
    }
    InterceptReason::Eligible
}

/// Whether interception is feasible at all for the given type.
pub fn can_intercept(profile: &TypeProfile) -> bool {
    explain(profile) == InterceptReason::Eligible
}
