//! The interception engine.
//!
//! An [`InterceptionProxy`] sits between production code and a real
//! collaborator. Every call is forwarded untouched and simultaneously
//! rendered into the transcript: the proxy arms the ambient
//! [`context`](crate::context) state, invokes the target, captures the
//! result or failure, and emits exactly one entry — honoring whatever
//! suppression directives the wrapped implementation issued while it ran.
//!
//! One call moves through a fixed lifecycle: idle → context armed → target
//! invoked → succeeded/failed → emitted → idle. [`InterceptedCall`] encodes
//! that lifecycle as an RAII guard: [`begin`](InterceptionProxy::begin) arms
//! the context, [`emit`](InterceptedCall::emit) or
//! [`fail`](InterceptedCall::fail) renders and disarms, and dropping the
//! guard without either (a panic mid-call) still disarms.
//!
//! Capability stand-ins are synthesized at build time with
//! [`record_capability!`](crate::record_capability); concrete types go
//! through [`InterceptionProxy::subclass`], a delegation wrapper gated by
//! [`strategy`](crate::strategy) eligibility.

use std::fmt;
use std::sync::Arc;

use crate::context;
use crate::context::SuppressionState;
use crate::errors::InterceptError;
use crate::profile::{Recordable, TypeProfile, NOTIFICATION_CAPABILITY};
use crate::recorder::CallRecorder;
use crate::strategy::{explain, InterceptReason};
use crate::transcript::Transcript;
use crate::value::{ConstructorParam, Value};

/// A call-recording stand-in for a target of type `T` (usually a capability
/// trait object such as `dyn Billing`).
#[derive(Debug)]
pub struct InterceptionProxy<T: ?Sized> {
    target: Option<Arc<T>>,
    transcript: Transcript,
    emoji: String,
    capability_name: Option<String>,
    type_name: &'static str,
}

impl<T: ?Sized + Recordable> InterceptionProxy<T> {
    /// Capability-based interception around a live target.
    pub fn capability(target: Arc<T>, transcript: Transcript, emoji: &str) -> Self {
        let type_name = target.type_profile().name;
        InterceptionProxy {
            target: Some(target),
            transcript,
            emoji: emoji.to_string(),
            capability_name: None,
            type_name,
        }
    }

    /// Capability-based interception with no bound target (replay shell).
    /// The proxy itself is valid; every forwarding attempt fails at the
    /// binding layer with [`InterceptError::Unbound`].
    pub fn replay(transcript: Transcript, emoji: &str) -> Self {
        InterceptionProxy {
            target: None,
            transcript,
            emoji: emoji.to_string(),
            capability_name: None,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Subclass-based (delegation) interception of a concrete type.
    ///
    /// Eligibility is consulted first so an infeasible type fails with its
    /// specific [`InterceptReason`]. Replay (no target) is not implemented
    /// for this strategy and fails eagerly. The target instance is composed,
    /// never reconstructed, so no constructor of the original type runs.
    pub fn subclass(
        profile: &'static TypeProfile,
        target: Option<Arc<T>>,
        transcript: Transcript,
        emoji: &str,
    ) -> Result<Self, InterceptError> {
        match explain(profile) {
            InterceptReason::Eligible => {}
            reason => {
                return Err(InterceptError::Ineligible {
                    type_name: profile.name,
                    reason,
                })
            }
        }
        let target = match target {
            Some(target) => target,
            None => {
                return Err(InterceptError::ReplayUnsupported {
                    type_name: profile.name,
                })
            }
        };
        Ok(InterceptionProxy {
            target: Some(target),
            transcript,
            emoji: emoji.to_string(),
            capability_name: None,
            type_name: profile.name,
        })
    }

    /// Pin the capability name used for constructor entries, bypassing the
    /// most-members heuristic.
    pub fn with_capability_name(mut self, name: &str) -> Self {
        self.capability_name = Some(name.to_string());
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The bound target, or the binding-layer failure for replay proxies.
    pub fn target(&self) -> Result<&Arc<T>, InterceptError> {
        self.target.as_ref().ok_or(InterceptError::Unbound {
            type_name: self.type_name,
        })
    }

    /// Arm the ambient context and hand back the per-call guard. The caller
    /// invokes the target while the guard is live, then records fields and
    /// finishes with [`emit`](InterceptedCall::emit) or
    /// [`fail`](InterceptedCall::fail).
    pub fn begin(&self, label: &str) -> InterceptedCall<'_> {
        context::arm(label);
        InterceptedCall {
            transcript: &self.transcript,
            emoji: &self.emoji,
            label: label.to_string(),
            fields: Vec::new(),
            return_value: None,
            finished: false,
        }
    }

    /// Record a constructor notification.
    ///
    /// The bound target (if any) is notified first, so an interested test
    /// double can rename parameters, suppress fields, or annotate before the
    /// entry is rendered. The entry label is resolved from, in order: an
    /// override issued during the notification, the name pinned on this
    /// proxy, the most-members heuristic over the target's declared
    /// capability sets, and finally the concrete type's own name.
    pub fn record_constructor(&self, params: &[ConstructorParam]) {
        context::arm("constructor_called_with");
        if let Some(target) = &self.target {
            target.constructor_called_with(params);
        }
        let state = context::disarm().unwrap_or_default();
        if state.ignore_call {
            return;
        }

        let label = self.resolve_capability_name(&state);
        let mut recorder = CallRecorder::new(self.transcript.clone(), &self.emoji);
        recorder.for_capability(&label);

        if !state.ignore_all_arguments {
            let overrides = state.constructor_parameter_names.as_ref();
            for (index, param) in params.iter().enumerate() {
                if state.ignored_arguments.contains(&index) {
                    continue;
                }
                let name = overrides
                    .and_then(|names| names.get(index))
                    .cloned()
                    .unwrap_or_else(|| param.name.clone());
                recorder.with_argument(&name, param.value.clone());
            }
        }
        for note in &state.notes {
            recorder.with_note(note);
        }
        recorder.log_constructor();
    }

    fn resolve_capability_name(&self, state: &SuppressionState) -> String {
        if let Some(name) = &state.capability_name {
            return name.clone();
        }
        if let Some(name) = &self.capability_name {
            return name.clone();
        }
        match &self.target {
            Some(target) => main_capability_name(target.type_profile()),
            None => self.type_name.to_string(),
        }
    }
}

/// The documented "most members wins" heuristic: among the profile's
/// declared capability sets — excluding zero-member markers and the
/// notification capability — pick the one with the most declared members.
/// A tie, or no candidate at all, falls back to the concrete type's name.
///
/// Known to be brittle when member counts are close; preserved as observable
/// behavior rather than silently replaced. Pin a name explicitly where it
/// matters.
pub(crate) fn main_capability_name(profile: &TypeProfile) -> String {
    let candidates: Vec<_> = profile
        .capabilities
        .iter()
        .filter(|cap| !cap.members.is_empty() && cap.name != NOTIFICATION_CAPABILITY)
        .collect();
    let max = match candidates.iter().map(|cap| cap.members.len()).max() {
        Some(max) => max,
        None => return profile.name.to_string(),
    };
    let mut best = candidates.iter().filter(|cap| cap.members.len() == max);
    match (best.next(), best.next()) {
        (Some(winner), None) => winner.name.to_string(),
        _ => profile.name.to_string(),
    }
}

/// Per-call recording guard. See the module docs for the lifecycle.
#[derive(Debug)]
pub struct InterceptedCall<'p> {
    transcript: &'p Transcript,
    emoji: &'p str,
    label: String,
    fields: Vec<RecordedField>,
    return_value: Option<Value>,
    finished: bool,
}

#[derive(Debug)]
struct RecordedField {
    name: String,
    value: Value,
    out: bool,
}

impl<'p> InterceptedCall<'p> {
    /// Record an input argument under its declared parameter name.
    pub fn arg<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.fields.push(RecordedField {
            name: name.to_string(),
            value: value.into(),
            out: false,
        });
        self
    }

    /// Record an output field.
    pub fn out<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.fields.push(RecordedField {
            name: name.to_string(),
            value: value.into(),
            out: true,
        });
        self
    }

    /// Record the return value.
    pub fn returns<V: Into<Value>>(mut self, value: V) -> Self {
        self.return_value = Some(value.into());
        self
    }

    /// The call succeeded: consume the suppression state and render the
    /// entry (unless the wrapped implementation suppressed it).
    pub fn emit(mut self) {
        self.finished = true;
        let state = context::disarm().unwrap_or_default();
        if state.ignore_call {
            return;
        }

        let mut recorder = CallRecorder::new(self.transcript.clone(), self.emoji);
        let mut argument_index = 0;
        for field in self.fields.drain(..) {
            if field.out {
                recorder.with_out(&field.name, field.value);
                continue;
            }
            let suppressed =
                state.ignore_all_arguments || state.ignored_arguments.contains(&argument_index);
            argument_index += 1;
            if !suppressed {
                recorder.with_argument(&field.name, field.value);
            }
        }
        for note in &state.notes {
            recorder.with_note(note);
        }
        if !state.ignore_return {
            if let Some(value) = self.return_value.take() {
                recorder.with_return(value);
            }
        }
        recorder.log(&self.label);
    }

    /// The target failed: render a note-only entry and disarm. Arguments and
    /// return value are never rendered on this path; the caller re-raises
    /// the original error untouched.
    pub fn fail(mut self, error: &dyn fmt::Display) {
        self.finished = true;
        context::disarm();
        let mut recorder = CallRecorder::new(self.transcript.clone(), self.emoji);
        recorder.with_note(&format!("Exception: {}", error));
        recorder.log(&self.label);
    }
}

impl<'p> Drop for InterceptedCall<'p> {
    fn drop(&mut self) {
        // A call abandoned mid-flight (target panicked) must not leak its
        // suppression state into the next call on this thread.
        if !self.finished {
            context::disarm();
        }
    }
}

/// Synthesize a call-recording stand-in for a capability trait.
///
/// Expands to a wrapper struct that implements the trait by forwarding every
/// listed method to a bound `Arc<dyn Trait>` target through an
/// [`InterceptionProxy`], recording each call. The trait must extend
/// [`Recordable`], arguments and returns must convert `Into<Value>` and be
/// `Clone`, and methods take `&self`. `Result`-returning methods record a
/// note-only `Exception:` entry on `Err` and pass the original error through
/// by value.
///
/// # Example
///
/// ```ignore
/// record_capability! {
///     pub struct BillingSpy wraps Billing {
///         fn charge(&self, account: &str, amount: f64) -> bool;
///         fn close(&self);
///     }
/// }
///
/// let spy = BillingSpy::new(target, transcript.clone(), "🧾");
/// ```
#[macro_export]
macro_rules! record_capability {
    (
        $(#[$meta:meta])*
        $vis:vis struct $wrapper:ident wraps $capability:path {
            $($methods:tt)*
        }
    ) => {
        $(#[$meta])*
        $vis struct $wrapper {
            target: ::std::sync::Arc<dyn $capability>,
            proxy: $crate::proxy::InterceptionProxy<dyn $capability>,
        }

        impl $wrapper {
            $vis fn new(
                target: ::std::sync::Arc<dyn $capability>,
                transcript: $crate::transcript::Transcript,
                emoji: &str,
            ) -> Self {
                Self {
                    target: ::std::sync::Arc::clone(&target),
                    proxy: $crate::proxy::InterceptionProxy::capability(
                        target, transcript, emoji,
                    ),
                }
            }

            /// Pin the capability name used for constructor entries.
            $vis fn for_capability(mut self, name: &str) -> Self {
                self.proxy = self.proxy.with_capability_name(name);
                self
            }
        }

        impl $crate::profile::Recordable for $wrapper {
            fn type_profile(&self) -> &'static $crate::profile::TypeProfile {
                self.target.type_profile()
            }

            fn constructor_called_with(&self, params: &[$crate::value::ConstructorParam]) {
                self.proxy.record_constructor(params);
            }
        }

        impl $capability for $wrapper {
            $crate::__record_methods! { $($methods)* }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_methods {
    () => {};

    // Fallible method: note-only entry on Err, original error passed through.
    (fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*) -> Result<$ok:ty, $err:ty>;
     $($rest:tt)*) => {
        fn $method(&self $(, $arg: $arg_ty)*) -> Result<$ok, $err> {
            let __call = self.proxy.begin(stringify!($method));
            match self.target.$method($($arg.clone()),*) {
                Ok(__ret) => {
                    __call
                        $(.arg(stringify!($arg), $arg))*
                        .returns(__ret.clone())
                        .emit();
                    Ok(__ret)
                }
                Err(__err) => {
                    __call.fail(&__err);
                    Err(__err)
                }
            }
        }
        $crate::__record_methods! { $($rest)* }
    };

    // Value-returning method.
    (fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*) -> $ret:ty;
     $($rest:tt)*) => {
        fn $method(&self $(, $arg: $arg_ty)*) -> $ret {
            let __call = self.proxy.begin(stringify!($method));
            let __ret = self.target.$method($($arg.clone()),*);
            __call
                $(.arg(stringify!($arg), $arg))*
                .returns(__ret.clone())
                .emit();
            __ret
        }
        $crate::__record_methods! { $($rest)* }
    };

    // Unit method.
    (fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*);
     $($rest:tt)*) => {
        fn $method(&self $(, $arg: $arg_ty)*) {
            let __call = self.proxy.begin(stringify!($method));
            self.target.$method($($arg.clone()),*);
            __call
                $(.arg(stringify!($arg), $arg))*
                .emit();
        }
        $crate::__record_methods! { $($rest)* }
    };
}
