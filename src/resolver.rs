//! Module defining the interfaces between the core and the surrounding command layer.
//!
//! The core never owns variables, commands or custom selectors. It reaches
//! them through the three resolver traits below, and it calls back into the
//! command layer through [`Command`]. Everything else in the crate is
//! self-contained.

use crate::{EvalResult, Selector, Value};
use std::any::Any;

/// Trait that maps to `Send + Sync` only under the `sync` feature.
#[cfg(feature = "sync")]
pub trait SendSync: Send + Sync {}
/// Trait that maps to `Send + Sync` only under the `sync` feature.
#[cfg(feature = "sync")]
impl<T: Send + Sync> SendSync for T {}

/// Trait that maps to `Send + Sync` only under the `sync` feature.
#[cfg(not(feature = "sync"))]
pub trait SendSync {}
/// Trait that maps to `Send + Sync` only under the `sync` feature.
#[cfg(not(feature = "sync"))]
impl<T> SendSync for T {}

/// Immutable reference-counted container.
#[cfg(not(feature = "sync"))]
pub use std::rc::Rc as Shared;
/// Immutable reference-counted container.
#[cfg(feature = "sync")]
pub use std::sync::Arc as Shared;

/// Synchronized shared object.
#[cfg(not(feature = "sync"))]
pub use std::cell::RefCell as Locked;
/// Synchronized shared object.
#[cfg(feature = "sync")]
pub use std::sync::RwLock as Locked;

/// Opaque evaluation context.
///
/// The token given to [`Executor::new`][crate::Executor::new] is handed
/// unchanged to every [`Command`]; the core never looks inside it. The
/// command layer typically stores its scope here, wrapped in a [`Locked`]
/// cell when commands need to mutate it.
#[cfg(not(feature = "sync"))]
pub type Context = Shared<dyn Any>;
/// Opaque evaluation context.
#[cfg(feature = "sync")]
pub type Context = Shared<dyn Any + Send + Sync>;

/// Resolver for variable names.
pub trait VariableResolver: SendSync {
    /// Look up a variable by name.
    ///
    /// [`None`] means the variable is unknown; the executor turns it into a
    /// `cannot resolve variable "..."` error.
    fn resolve(&self, name: &str) -> Option<Value>;
}

/// Resolver for command names.
pub trait CommandResolver: SendSync {
    /// Look up a command by its name value.
    ///
    /// [`None`] means the command is unknown; the executor turns it into a
    /// `cannot resolve command "..."` error.
    fn resolve(&self, name: &Value) -> Option<Shared<dyn Command>>;
}

/// Resolver for generic selectors.
pub trait SelectorResolver: SendSync {
    /// Resolve a list of selector rules into an applicable [`Selector`].
    ///
    /// Absence of a matching selector is reported as an `Err` carrying an
    /// ERROR result.
    fn resolve(&self, rules: &[Value]) -> Result<Selector, EvalResult>;
}

/// A command callable from a sentence.
///
/// Commands live in the command layer; the core only ever sees them through
/// this trait. `args[0]` is the command name value, followed by the literal
/// arguments in sentence order.
pub trait Command: SendSync {
    /// Execute the command.
    fn execute(&self, args: &[Value], context: Option<&Context>) -> EvalResult;

    /// Resume the command after a YIELD.
    ///
    /// `result` is the last result stored in the program state. Its `value`
    /// is the yield-back value provided by the caller and its `data` is the
    /// command-private state attached to the original YIELD.
    ///
    /// The default implementation completes the command with the yield-back
    /// value as its result.
    fn resume(&self, result: EvalResult, context: Option<&Context>) -> EvalResult {
        let _ = context;
        EvalResult::ok(result.value)
    }
}
