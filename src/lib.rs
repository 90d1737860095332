//! Call-recording test doubles with approval-style transcripts.
//!
//! Legacy code under test gets two seams: a controllable factory that lets a
//! test substitute any collaborator the production code constructs, and an
//! interception layer that wraps a collaborator and renders every call into
//! a deterministic text transcript for approval-style diffing.
//!
//! ## Modules
//!
//! - [`value`] - Dynamic values, shape matching, and canonical formatting
//! - [`transcript`] - The shared transcript buffer and its wire format
//! - [`recorder`] - Fluent single-entry recording
//! - [`context`] - Call-scoped suppression and annotation directives
//! - [`profile`] - Static type metadata and the [`Recordable`] access point
//! - [`strategy`] - Interception strategy selection and eligibility
//! - [`proxy`] - The interception engine and the [`record_capability!`] macro
//! - [`factory`] - Controllable construction with substitute precedence
//! - [`errors`] - Construction and interception failures
//!
//! ## Recording a collaborator
//!
//! ```ignore
//! record_capability! {
//!     pub struct BillingSpy wraps Billing {
//!         fn charge(&self, account: &str, amount: f64) -> bool;
//!     }
//! }
//!
//! let transcript = Transcript::new();
//! let billing = BillingSpy::new(real_billing, transcript.clone(), "🧾");
//! run_legacy_flow(&billing);
//! insta::assert_snapshot!(transcript.render());
//! ```

pub mod context;
pub mod errors;
pub mod factory;
pub mod profile;
pub mod proxy;
pub mod recorder;
pub mod strategy;
pub mod transcript;
pub mod value;

// Re-exports for convenient access to core types
pub use context::{
    annotate, set_capability_name, set_constructor_parameter_names, suppress_all_arguments,
    suppress_argument, suppress_call, suppress_return_value,
};
pub use errors::{ConstructionError, InterceptError};
pub use factory::{
    global, match_constructor, Construct, ConstructorSpec, Implements, ObjectFactory, ParamSpec,
};
pub use profile::{CapabilitySurface, MemberSurface, ProfileKind, Recordable, TypeProfile};
pub use proxy::{InterceptedCall, InterceptionProxy};
pub use recorder::{CallRecorder, DEFAULT_EMOJI};
pub use strategy::{can_intercept, choose_strategy, explain, InterceptReason, Strategy};
pub use transcript::{Entry, EntryKind, Field, FieldRole, Transcript};
pub use value::{format_value, ConstructorParam, Value, ValueKind};
