//! Ambient, call-scoped suppression and annotation state.
//!
//! Wrapped implementations are unmodified legacy code: they cannot accept an
//! extra "recording options" parameter. Instead, the proxy arms a
//! thread-local [`SuppressionState`] just before forwarding a call, the
//! wrapped code mutates it through the free functions here, and the proxy
//! consumes it when the entry is rendered. Every directive is a no-op when
//! no call is in flight, so legacy code may call these unconditionally.
//!
//! The state is strictly per call and per thread. It is created on arm,
//! destroyed on disarm, and never shared across calls or threads; leaking a
//! directive from one call into the next is a defect.

use std::cell::RefCell;
use std::collections::BTreeSet;

/// Directives collected while one intercepted call is in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuppressionState {
    /// Label of the call being recorded (method name, or the
    /// constructor-notification label).
    pub label: String,
    /// Drop the entry entirely. The call itself still executes.
    pub ignore_call: bool,
    /// Zero-based indexes of arguments to omit.
    pub ignored_arguments: BTreeSet<usize>,
    /// Omit every input argument.
    pub ignore_all_arguments: bool,
    /// Omit the `Returns:` line.
    pub ignore_return: bool,
    /// Notes to render, in the order they were added.
    pub notes: Vec<String>,
    /// Overriding names for constructor arguments, positionally.
    pub constructor_parameter_names: Option<Vec<String>>,
    /// Overriding capability name for the entry header.
    pub capability_name: Option<String>,
}

thread_local! {
    static CURRENT: RefCell<Option<SuppressionState>> = RefCell::new(None);
}

/// Begin a recording scope for one call. Called by the proxy, never by
/// wrapped code. Any previous state is discarded, so a leak from an
/// abandoned call cannot bleed into this one.
pub(crate) fn arm(label: &str) {
    CURRENT.with(|cell| {
        *cell.borrow_mut() = Some(SuppressionState {
            label: label.to_string(),
            ..SuppressionState::default()
        });
    });
}

/// End the recording scope, yielding whatever directives the wrapped call
/// issued. Returns `None` if no call was in flight.
pub(crate) fn disarm() -> Option<SuppressionState> {
    CURRENT.with(|cell| cell.borrow_mut().take())
}

/// Whether a recording scope is currently armed on this thread.
pub fn is_recording() -> bool {
    CURRENT.with(|cell| cell.borrow().is_some())
}

fn with_state(f: impl FnOnce(&mut SuppressionState)) {
    CURRENT.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            f(state);
        }
    });
}

/// Hide the current call from the transcript entirely. Execution and the
/// returned value are unaffected; only recording is suppressed.
pub fn suppress_call() {
    with_state(|state| state.ignore_call = true);
}

/// Hide the argument at `index` (zero-based). Idempotent.
pub fn suppress_argument(index: usize) {
    with_state(|state| {
        state.ignored_arguments.insert(index);
    });
}

/// Hide every input argument of the current call.
pub fn suppress_all_arguments() {
    with_state(|state| state.ignore_all_arguments = true);
}

/// Hide the return value of the current call.
pub fn suppress_return_value() {
    with_state(|state| state.ignore_return = true);
}

/// Attach a note line to the current entry. May be called repeatedly; notes
/// render in the order they were added.
pub fn annotate(text: &str) {
    with_state(|state| state.notes.push(text.to_string()));
}

/// Override constructor argument names positionally for the current
/// constructor entry.
pub fn set_constructor_parameter_names<I, S>(names: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    with_state(|state| {
        state.constructor_parameter_names = Some(names.into_iter().map(Into::into).collect());
    });
}

/// The constructor argument name overrides set so far, if any.
pub fn get_constructor_parameter_names() -> Option<Vec<String>> {
    CURRENT.with(|cell| {
        cell.borrow()
            .as_ref()
            .and_then(|state| state.constructor_parameter_names.clone())
    })
}

/// Override the capability name used in the entry header for the current
/// call. Takes precedence over any name configured on the proxy.
pub fn set_capability_name(name: &str) {
    with_state(|state| state.capability_name = Some(name.to_string()));
}
