//! Module defining the deferred-evaluation driver.
//!
//! User-level bodies (macro and proc bodies, loop and conditional arms) must
//! not grow the host call stack, however deeply they nest. A command defers
//! a body by yielding a [`DeferredValue`]; the [`Process`] driver catches it,
//! runs the body as a sibling frame on an explicit stack, and feeds the
//! completion value back into the suspended command.

use crate::ast::{Sentence, WordOrValue};
use crate::compile::{Compiler, Program};
use crate::executor::{Executor, ProgramState};
use crate::result::{EvalResult, ResultCode};
use crate::value::{CustomValue, Value};
use std::any::Any;

/// Sentinel requesting the trampoline to evaluate a script or tuple.
///
/// A command returns this (wrapped in a value, as the value of a YIELD) to
/// have the driver evaluate `value` without re-entering the host stack. The
/// `executor` carries the resolvers and opaque context of the scope the body
/// must run in.
#[derive(Debug, Clone)]
pub struct DeferredValue {
    /// The body: a script or a tuple.
    pub value: Value,
    /// Executor wired to the scope the body runs in.
    pub executor: Executor,
}

impl DeferredValue {
    /// Create a new [`DeferredValue`].
    #[inline(always)]
    #[must_use]
    pub fn new(value: Value, executor: Executor) -> Self {
        Self { value, executor }
    }

    /// Wrap into a [`Value`] ready to be carried by a YIELD result.
    #[inline(always)]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::custom(self)
    }
}

impl CustomValue for DeferredValue {
    #[inline(always)]
    fn type_tag(&self) -> &'static str {
        "deferred"
    }
    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One entry of the driver's context stack.
struct ProcessFrame {
    program: Program,
    state: ProgramState,
    executor: Executor,
}

/// Driver layered above [`Executor`] that interprets deferred values.
///
/// The driver owns an explicit stack of program contexts; nested deferred
/// bodies push sibling frames instead of recursing, so user-level recursion
/// never grows the host call stack.
pub struct Process {
    compiler: Compiler,
    frames: Vec<ProcessFrame>,
}

impl Process {
    /// Create a new [`Process`] for a program and the executor to run it on.
    #[must_use]
    pub fn new(program: Program, executor: Executor) -> Self {
        Self {
            compiler: Compiler::new(),
            frames: vec![ProcessFrame {
                program,
                state: ProgramState::new(),
                executor,
            }],
        }
    }

    /// Store a yield-back value for the innermost suspended command.
    pub fn yield_back(&mut self, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.state.yield_back(value);
        }
    }

    /// Drive the process until it completes or suspends.
    ///
    /// Returns the final result, or a YIELD when a command suspended the
    /// process; store a value with [`yield_back`][Process::yield_back] and
    /// call [`run`][Process::run] again to resume.
    pub fn run(&mut self) -> EvalResult {
        loop {
            let frame = self.frames.last_mut().expect("process has a frame");
            let result = frame.executor.execute(&frame.program, &mut frame.state);

            if result.code == ResultCode::Yield {
                match as_deferred(&result.value) {
                    Some(deferred) => match self.push_deferred(deferred) {
                        Ok(()) => continue,
                        Err(error) => return error,
                    },
                    // A plain YIELD suspends the whole process.
                    None => return result,
                }
            }

            if self.frames.len() == 1 {
                return result;
            }
            self.frames.pop();
            match result.code {
                // Feed the body's value back into the deferring command.
                ResultCode::Ok => self
                    .frames
                    .last_mut()
                    .expect("process has a frame")
                    .state
                    .yield_back(result.value),
                // Early returns and every other code cut through the whole
                // deferral chain.
                _ => return result,
            }
        }
    }

    /// Compile a deferred body and push its frame.
    fn push_deferred(&mut self, deferred: DeferredValue) -> Result<(), EvalResult> {
        let program = match &deferred.value {
            Value::Script(script) => match self.compiler.compile(&script.script) {
                Ok(program) => program,
                Err(error) => return Err(EvalResult::error(error.to_string())),
            },
            Value::Tuple(items) => {
                let sentence = Sentence {
                    words: items.iter().cloned().map(WordOrValue::Value).collect(),
                    position: None,
                };
                match self.compiler.compile_sentence(&sentence) {
                    Ok(program) => program,
                    Err(error) => return Err(EvalResult::error(error.to_string())),
                }
            }
            _ => return Err(EvalResult::error("body must be a script or tuple")),
        };
        self.frames.push(ProcessFrame {
            program,
            state: ProgramState::new(),
            executor: deferred.executor,
        });
        Ok(())
    }
}

/// Extract a [`DeferredValue`] out of a yielded value.
fn as_deferred(value: &Value) -> Option<DeferredValue> {
    match value {
        Value::Custom(custom) => custom.as_any().downcast_ref::<DeferredValue>().cloned(),
        _ => None,
    }
}
