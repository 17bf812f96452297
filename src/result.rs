//! Module defining the result protocol shared by the executor and commands.
//!
//! Control flow is data. A command reports success, early return, suspension,
//! failure or loop control by returning an [`EvalResult`] with the matching
//! [`ResultCode`]; nothing in the core is signalled through Rust errors or
//! panics.

use crate::{ImmutableString, Shared, Value};
use std::any::Any;
use std::fmt;

/// Opaque command-private state carried across a YIELD.
#[cfg(not(feature = "sync"))]
pub type ResumeState = Shared<dyn Any>;
/// Opaque command-private state carried across a YIELD.
#[cfg(feature = "sync")]
pub type ResumeState = Shared<dyn Any + Send + Sync>;

/// Code of an evaluation result.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ResultCode {
    /// Successful completion.
    Ok,
    /// Early return from a user-defined body.
    Return,
    /// Cooperative suspension. The executor may be re-entered later with the
    /// same program state.
    Yield,
    /// Hard failure. The result value is the error message.
    Error,
    /// Breaking out of a loop.
    Break,
    /// Skipping to the next loop iteration.
    Continue,
    /// Reserved for user-defined protocols.
    Custom(ImmutableString),
}

/// Result of an evaluation step.
///
/// The executor interprets [`Ok`][ResultCode::Ok] and
/// [`Yield`][ResultCode::Yield] specially; every other code propagates
/// unchanged out of [`Executor::execute`][crate::Executor::execute].
#[derive(Clone)]
pub struct EvalResult {
    /// The result code.
    pub code: ResultCode,
    /// The result value. For [`Error`][ResultCode::Error] results this is
    /// the error message.
    pub value: Value,
    /// Opaque resume state attached by a yielding command.
    pub data: Option<ResumeState>,
}

impl fmt::Debug for EvalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalResult")
            .field("code", &self.code)
            .field("value", &self.value)
            .field("data", &self.data.as_ref().map(|_| "..."))
            .finish()
    }
}

impl EvalResult {
    /// Successful result carrying `value`.
    #[inline(always)]
    #[must_use]
    pub fn ok(value: Value) -> Self {
        Self {
            code: ResultCode::Ok,
            value,
            data: None,
        }
    }
    /// Successful result carrying NIL.
    #[inline(always)]
    #[must_use]
    pub fn nil() -> Self {
        Self::ok(Value::Nil)
    }
    /// Early return carrying `value`.
    #[inline(always)]
    #[must_use]
    pub fn return_value(value: Value) -> Self {
        Self {
            code: ResultCode::Return,
            value,
            data: None,
        }
    }
    /// Suspension carrying `value` and optional command-private resume state.
    #[inline(always)]
    #[must_use]
    pub fn yield_value(value: Value, data: Option<ResumeState>) -> Self {
        Self {
            code: ResultCode::Yield,
            value,
            data,
        }
    }
    /// Failure carrying `message`.
    #[inline(always)]
    #[must_use]
    pub fn error(message: impl Into<ImmutableString>) -> Self {
        Self {
            code: ResultCode::Error,
            value: Value::String(message.into()),
            data: None,
        }
    }
    /// Loop break.
    #[inline(always)]
    #[must_use]
    pub fn break_loop() -> Self {
        Self {
            code: ResultCode::Break,
            value: Value::Nil,
            data: None,
        }
    }
    /// Loop continue.
    #[inline(always)]
    #[must_use]
    pub fn continue_loop() -> Self {
        Self {
            code: ResultCode::Continue,
            value: Value::Nil,
            data: None,
        }
    }
    /// Custom result code carrying `value`.
    #[inline(always)]
    #[must_use]
    pub fn custom(name: impl Into<ImmutableString>, value: Value) -> Self {
        Self {
            code: ResultCode::Custom(name.into()),
            value,
            data: None,
        }
    }
    /// Is this a successful result?
    #[inline(always)]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::Ok
    }
    /// Error message of an [`Error`][ResultCode::Error] result.
    #[inline]
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match (&self.code, &self.value) {
            (ResultCode::Error, Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}
