//! Controllable construction of collaborators.
//!
//! Legacy code that news up its dependencies inline cannot be tested without
//! seams. The [`ObjectFactory`] is that seam: production code asks the
//! factory instead of calling a constructor, and a test pre-loads the
//! factory with substitutes. Retrieval precedence is fixed: a queued one-shot
//! substitute wins, then a persistent substitute, then a freshly constructed
//! instance. Every produced instance — substitute or fresh — receives the
//! constructor notification with the resolved parameter descriptors.
//!
//! Construction itself goes through the [`Construct`] trait: a type declares
//! its constructor table (parameter names, shapes, and a build function) and
//! the factory picks the first declared constructor whose parameters accept
//! the supplied argument shapes, with the same widening rules the host
//! overload resolution would apply.

use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::errors::ConstructionError;
use crate::profile::Recordable;
use crate::value::{ConstructorParam, Value, ValueKind};

/// One declared constructor parameter: its name and shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl ParamSpec {
    pub fn new(name: &'static str, kind: ValueKind) -> Self {
        ParamSpec { name, kind }
    }
}

/// One declared constructor of `T`: its parameter list and a build function
/// over the matched argument values.
pub struct ConstructorSpec<T> {
    pub params: Vec<ParamSpec>,
    pub build: fn(&[Value]) -> T,
}

/// Implemented by every type the factory can construct fresh. The table is
/// consulted in declaration order; the first matching constructor wins.
pub trait Construct: Sized + 'static {
    fn constructors() -> Vec<ConstructorSpec<Self>>;
}

/// The first declared constructor of `T` whose parameters accept the
/// supplied argument shapes, position by position.
pub fn match_constructor<T: Construct>(args: &[Value]) -> Option<ConstructorSpec<T>> {
    T::constructors().into_iter().find(|spec| {
        spec.params.len() == args.len()
            && spec
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.kind.accepts(arg.kind()))
    })
}

/// Parameter descriptors for a construction request: declared names and
/// shapes where a constructor matches, synthesized `arg0`, `arg1`, …
/// descriptors where none does (a substitute is served regardless of
/// argument shapes, but its observer still deserves positional names).
pub fn describe_params<T: Construct>(args: &[Value]) -> Vec<ConstructorParam> {
    match match_constructor::<T>(args) {
        Some(spec) => spec
            .params
            .iter()
            .zip(args)
            .map(|(param, arg)| ConstructorParam::new(param.name, param.kind, arg.clone()))
            .collect(),
        None => args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                ConstructorParam::new(format!("arg{}", index), arg.kind(), arg.clone())
            })
            .collect(),
    }
}

/// Upcasting seam from a concrete type to the token it is registered under
/// (itself, or a capability trait object). The identity case is blanket
/// implemented; a concrete type that should be retrievable as
/// `dyn SomeCapability` adds one more impl:
///
/// ```ignore
/// impl Implements<dyn Billing> for RealBilling {
///     fn upcast(this: Arc<Self>) -> Arc<dyn Billing> {
///         this
///     }
/// }
/// ```
pub trait Implements<R: ?Sized>: Recordable {
    fn upcast(this: Arc<Self>) -> Arc<R>;
}

impl<T: Recordable> Implements<T> for T {
    fn upcast(this: Arc<Self>) -> Arc<T> {
        this
    }
}

type Slot = Box<dyn Any + Send + Sync>;

/// Registry of substitutes plus fresh-construction fallback.
///
/// Substitutes are keyed by the requested token type `R`, so a queue for
/// `dyn Billing` and a queue for `RealBilling` are independent. Instances
/// are handed out by shared handle; identity is preserved, which is what
/// lets a test assert that the very substitute it queued was the one served.
#[derive(Default)]
pub struct ObjectFactory {
    queued: HashMap<TypeId, VecDeque<Slot>>,
    always: HashMap<TypeId, Slot>,
}

impl ObjectFactory {
    pub fn new() -> Self {
        ObjectFactory::default()
    }

    /// Queue a one-shot substitute for token `R`. Queued substitutes are
    /// served in FIFO order, each exactly once.
    pub fn set_one<R: ?Sized + Recordable>(&mut self, instance: Arc<R>) {
        self.queued
            .entry(TypeId::of::<R>())
            .or_insert_with(VecDeque::new)
            .push_back(Box::new(instance));
    }

    /// Register a persistent substitute for token `R`, served on every
    /// request once the one-shot queue is empty. Replaces any previous
    /// persistent substitute for the same token.
    pub fn set_always<R: ?Sized + Recordable>(&mut self, instance: Arc<R>) {
        self.always.insert(TypeId::of::<R>(), Box::new(instance));
    }

    /// Drop all substitutes registered for token `R`.
    pub fn clear<R: ?Sized + Recordable>(&mut self) {
        self.queued.remove(&TypeId::of::<R>());
        self.always.remove(&TypeId::of::<R>());
    }

    /// Drop every registration. Tests sharing the global factory call this
    /// between cases.
    pub fn clear_all(&mut self) {
        self.queued.clear();
        self.always.clear();
    }

    /// Produce an instance of `T` under its own token.
    pub fn create<T: Construct + Recordable>(
        &mut self,
        args: &[Value],
    ) -> Result<Arc<T>, ConstructionError> {
        self.create_as::<T, T>(args)
    }

    /// Produce an instance for token `R`, constructing a fresh `T` when no
    /// substitute is registered. Precedence: queued, persistent, fresh.
    /// Whatever is produced is notified of the construction request before
    /// being returned.
    pub fn create_as<R, T>(&mut self, args: &[Value]) -> Result<Arc<R>, ConstructionError>
    where
        R: ?Sized + Recordable,
        T: Construct + Implements<R>,
    {
        let produced = match self.next_substitute::<R>() {
            Some(substitute) => substitute,
            None => {
                let spec = match_constructor::<T>(args).ok_or_else(|| ConstructionError {
                    type_name: std::any::type_name::<T>(),
                    arg_shapes: args
                        .iter()
                        .map(|arg| arg.kind().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                })?;
                <T as Implements<R>>::upcast(Arc::new((spec.build)(args)))
            }
        };
        produced.constructor_called_with(&describe_params::<T>(args));
        Ok(produced)
    }

    fn next_substitute<R: ?Sized + Recordable>(&mut self) -> Option<Arc<R>> {
        let key = TypeId::of::<R>();
        if let Some(queue) = self.queued.get_mut(&key) {
            while let Some(slot) = queue.pop_front() {
                // The slot was stored under R's TypeId, so the downcast
                // only fails if something bypassed set_one; skip it.
                if let Ok(instance) = slot.downcast::<Arc<R>>() {
                    return Some(*instance);
                }
            }
        }
        self.always
            .get(&key)
            .and_then(|slot| slot.downcast_ref::<Arc<R>>())
            .cloned()
    }
}

static GLOBAL: Lazy<Mutex<ObjectFactory>> = Lazy::new(|| Mutex::new(ObjectFactory::new()));

/// The process-wide factory instance legacy call sites reach for when no
/// factory can be threaded through. Tests using it must clear it between
/// cases; prefer a locally owned factory where the code allows one.
pub fn global() -> &'static Mutex<ObjectFactory> {
    &GLOBAL
}
