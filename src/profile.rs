//! Type metadata consumed by strategy selection and name resolution.
//!
//! Rust has no runtime reflection, so every type that passes through the
//! factory or gets wrapped by a proxy carries a [`TypeProfile`]: its name,
//! whether it is a capability set or a concrete type, whether it can be
//! extended, its publicly reachable constructors and members, and the
//! capability sets it declares. Profiles are plain data built once per type,
//! typically held in a `once_cell::sync::Lazy` static.
//!
//! [`Recordable`] is the object-safe access point for that metadata, and it
//! also carries the constructor-notification hook: the factory invokes
//! `constructor_called_with` on every instance it produces, and test doubles
//! that care override the default no-op body.

use std::any::Any;

use crate::value::ConstructorParam;

/// Name of the constructor-notification capability. Excluded from
/// capability-name resolution and from the "satisfies some capability set"
/// check, since forwarding through it records nothing useful.
pub const NOTIFICATION_CAPABILITY: &str = "ConstructorCalledWith";

/// Whether a profile describes a pure capability set or a concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// An interface/trait: behavior without storage or construction.
    Capability,
    /// A concrete type with storage and constructors.
    Concrete,
}

/// One capability set a concrete type declares: its name and the names of
/// the members it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySurface {
    pub name: &'static str,
    pub members: Vec<&'static str>,
}

/// One publicly visible member of a concrete type. Members inherited from
/// the universal root are never listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSurface {
    pub name: &'static str,
    pub public: bool,
    pub overridable: bool,
    pub static_member: bool,
}

impl MemberSurface {
    /// Reachable through a synthesized subtype: public, overridable, and
    /// bound to an instance.
    pub fn interceptable(&self) -> bool {
        self.public && self.overridable && !self.static_member
    }
}

/// Static description of a type, standing in for the host reflection
/// facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeProfile {
    pub name: &'static str,
    pub kind: ProfileKind,
    /// Whether a subtype of this type can exist (not sealed/final).
    pub extendable: bool,
    /// Count of publicly reachable constructors.
    pub public_constructors: usize,
    pub members: Vec<MemberSurface>,
    pub capabilities: Vec<CapabilitySurface>,
}

impl TypeProfile {
    /// A pure capability set.
    pub fn capability(name: &'static str) -> Self {
        TypeProfile {
            name,
            kind: ProfileKind::Capability,
            extendable: true,
            public_constructors: 0,
            members: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// A concrete, extendable type with no metadata yet.
    pub fn concrete(name: &'static str) -> Self {
        TypeProfile {
            name,
            kind: ProfileKind::Concrete,
            extendable: true,
            public_constructors: 0,
            members: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// Mark the type as non-extendable (sealed/final).
    pub fn sealed(mut self) -> Self {
        self.extendable = false;
        self
    }

    pub fn with_public_constructor(mut self) -> Self {
        self.public_constructors += 1;
        self
    }

    /// Declare a public, overridable instance member.
    pub fn with_member(mut self, name: &'static str) -> Self {
        self.members.push(MemberSurface {
            name,
            public: true,
            overridable: true,
            static_member: false,
        });
        self
    }

    /// Declare a member with explicit flags.
    pub fn with_member_flags(
        mut self,
        name: &'static str,
        public: bool,
        overridable: bool,
        static_member: bool,
    ) -> Self {
        self.members.push(MemberSurface {
            name,
            public,
            overridable,
            static_member,
        });
        self
    }

    /// Declare a capability set this type satisfies, with its member names.
    pub fn with_capability(mut self, name: &'static str, members: &[&'static str]) -> Self {
        self.capabilities.push(CapabilitySurface {
            name,
            members: members.to_vec(),
        });
        self
    }

    pub fn is_capability(&self) -> bool {
        self.kind == ProfileKind::Capability
    }

    /// Whether this type satisfies at least one capability set worth
    /// forwarding through (non-empty and not the notification capability).
    pub fn has_forwardable_capability(&self) -> bool {
        self.capabilities
            .iter()
            .any(|cap| !cap.members.is_empty() && cap.name != NOTIFICATION_CAPABILITY)
    }

    pub fn has_interceptable_member(&self) -> bool {
        self.members.iter().any(MemberSurface::interceptable)
    }
}

/// Implemented by every type the factory can produce or a proxy can wrap.
///
/// The default `constructor_called_with` body is a no-op; a test double that
/// wants to observe construction overrides it. Capability traits used as
/// factory tokens or proxy targets declare `Recordable` as a supertrait so
/// their trait objects expose the same surface.
pub trait Recordable: Any + Send + Sync {
    /// This type's static metadata.
    fn type_profile(&self) -> &'static TypeProfile;

    /// Constructor-notification hook, invoked by the factory with the
    /// resolved parameter descriptors of the construction request.
    fn constructor_called_with(&self, _params: &[ConstructorParam]) {}
}
