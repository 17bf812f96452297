//! Module defining the executor.
//!
//! The executor is a synchronous dispatch loop over a program's opcodes. It
//! owns nothing: values live on the [`ProgramState`] stack, and variables,
//! commands and custom selectors are reached through resolvers. Any non-OK
//! result returns immediately; a YIELD leaves the state resumable and a
//! later call to [`Executor::execute`] with the same state picks up where
//! the suspended command left off.

use crate::compile::{OpCode, Program};
use crate::resolver::{Command, CommandResolver, Context, SelectorResolver, VariableResolver};
use crate::result::{EvalResult, ResultCode};
use crate::selector::{IndexedSelector, KeyedSelector, Selector};
use crate::value::{QualifiedValue, Value};
use crate::{Shared, SmartString};
use std::fmt;
use std::mem;

/// Execution state of a program.
///
/// A fresh state has an empty stack, one empty frame, both counters at zero
/// and an OK NIL result. Across a YIELD the state is preserved verbatim;
/// storing a yield-back value with [`yield_back`][ProgramState::yield_back]
/// and re-entering the executor resumes the suspended command.
#[derive(Clone)]
pub struct ProgramState {
    /// The value stack.
    pub(crate) stack: Vec<Value>,
    /// Start indexes of the open frames.
    pub(crate) frames: Vec<usize>,
    /// Copy of the last closed frame.
    pub(crate) last_frame: Vec<Value>,
    /// Program counter.
    pub(crate) pc: usize,
    /// Constant counter.
    pub(crate) cc: usize,
    /// The most recent command executed.
    pub(crate) command: Option<Shared<dyn Command>>,
    /// The last result.
    pub(crate) result: EvalResult,
}

impl Default for ProgramState {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramState")
            .field("stack", &self.stack)
            .field("frames", &self.frames)
            .field("pc", &self.pc)
            .field("cc", &self.cc)
            .field("result", &self.result)
            .finish()
    }
}

impl ProgramState {
    /// Create a fresh [`ProgramState`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            frames: vec![0],
            last_frame: Vec::new(),
            pc: 0,
            cc: 0,
            command: None,
            result: EvalResult::nil(),
        }
    }

    /// The last result.
    #[inline(always)]
    #[must_use]
    pub fn result(&self) -> &EvalResult {
        &self.result
    }

    /// The value stack. Empty after a successful completion.
    #[inline(always)]
    #[must_use]
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Store a yield-back value for the suspended command.
    ///
    /// On re-entry the executor forwards the updated result to the
    /// command's [`resume`][Command::resume].
    #[inline(always)]
    pub fn yield_back(&mut self, value: Value) {
        self.result.value = value;
    }
}

/// The opcode interpreter.
///
/// An executor is only a bundle of resolvers plus the opaque context; it is
/// cheap to clone and multiple executors may share the same resolvers. A
/// single [`ProgramState`] must not be driven from two callers at once.
#[derive(Clone, Default)]
pub struct Executor {
    variable_resolver: Option<Shared<dyn VariableResolver>>,
    command_resolver: Option<Shared<dyn CommandResolver>>,
    selector_resolver: Option<Shared<dyn SelectorResolver>>,
    context: Option<Context>,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("variables", &self.variable_resolver.is_some())
            .field("commands", &self.command_resolver.is_some())
            .field("selectors", &self.selector_resolver.is_some())
            .field("context", &self.context.is_some())
            .finish()
    }
}

impl Executor {
    /// Create a new [`Executor`].
    #[inline(always)]
    #[must_use]
    pub fn new(
        variable_resolver: Option<Shared<dyn VariableResolver>>,
        command_resolver: Option<Shared<dyn CommandResolver>>,
        selector_resolver: Option<Shared<dyn SelectorResolver>>,
        context: Option<Context>,
    ) -> Self {
        Self {
            variable_resolver,
            command_resolver,
            selector_resolver,
            context,
        }
    }

    /// Execute a program on a fresh state.
    #[inline]
    pub fn execute_program(&self, program: &Program) -> EvalResult {
        let mut state = ProgramState::new();
        self.execute(program, &mut state)
    }

    /// Execute a program, continuing from the state's program counter.
    ///
    /// If the state carries a suspended YIELD, the suspended command is
    /// resumed first with the state's result; a non-OK resumption returns
    /// immediately, otherwise the opcode loop continues in place.
    pub fn execute(&self, program: &Program, state: &mut ProgramState) -> EvalResult {
        if state.result.code == ResultCode::Yield {
            if let Some(command) = state.command.clone() {
                state.result = command.resume(state.result.clone(), self.context.as_ref());
                if state.result.code != ResultCode::Ok {
                    return state.result.clone();
                }
            }
        }

        while state.pc < program.opcodes.len() {
            let opcode = program.opcodes[state.pc];
            state.pc += 1;
            match opcode {
                OpCode::PushNil => state.stack.push(Value::Nil),
                OpCode::PushConstant => {
                    let constant = program.constants[state.cc].clone();
                    state.cc += 1;
                    state.stack.push(constant);
                }
                OpCode::OpenFrame => state.frames.push(state.stack.len()),
                OpCode::CloseFrame => {
                    let start = state.frames.pop().expect("a frame is open");
                    state.last_frame = state.stack.split_off(start);
                }
                OpCode::MakeTuple => {
                    let items = mem::take(&mut state.last_frame);
                    state.stack.push(Value::tuple(items));
                }
                OpCode::JoinStrings => {
                    let frame = mem::take(&mut state.last_frame);
                    let mut joined = SmartString::new();
                    for item in &frame {
                        match item.string_value() {
                            Some(s) => joined.push_str(&s),
                            None => {
                                state.result =
                                    EvalResult::error("value has no string representation");
                                return state.result.clone();
                            }
                        }
                    }
                    state.stack.push(Value::String(joined.into()));
                }
                OpCode::ResolveValue => {
                    let value = state.stack.pop().expect("stack holds a value");
                    match self.resolve_value(&value) {
                        Ok(resolved) => state.stack.push(resolved),
                        Err(result) => {
                            state.result = result;
                            return state.result.clone();
                        }
                    }
                }
                OpCode::ExpandValue => {
                    if matches!(state.stack.last(), Some(Value::Tuple(_))) {
                        if let Some(Value::Tuple(items)) = state.stack.pop() {
                            state.stack.extend(items.iter().cloned());
                        }
                    }
                }
                OpCode::SetSource => {
                    let value = state.stack.pop().expect("stack holds a value");
                    state.stack.push(Value::qualified(QualifiedValue::new(value)));
                }
                OpCode::SelectIndex => {
                    let index = state.stack.pop().expect("stack holds an index");
                    let target = state.stack.pop().expect("stack holds a target");
                    let selector = Selector::Indexed(IndexedSelector::new(index));
                    match self.select_into(&target, selector) {
                        Ok(selected) => state.stack.push(selected),
                        Err(result) => {
                            state.result = result;
                            return state.result.clone();
                        }
                    }
                }
                OpCode::SelectKeys => {
                    let keys = mem::take(&mut state.last_frame);
                    if keys.is_empty() {
                        state.result = EvalResult::error("empty selector");
                        return state.result.clone();
                    }
                    let target = state.stack.pop().expect("stack holds a target");
                    let selector = Selector::Keyed(KeyedSelector::new(keys.into_iter().collect()));
                    match self.select_into(&target, selector) {
                        Ok(selected) => state.stack.push(selected),
                        Err(result) => {
                            state.result = result;
                            return state.result.clone();
                        }
                    }
                }
                OpCode::SelectRules => {
                    let rules = mem::take(&mut state.last_frame);
                    let target = state.stack.pop().expect("stack holds a target");
                    let selector = match self.resolve_selector(&rules) {
                        Ok(selector) => selector,
                        Err(result) => {
                            state.result = result;
                            return state.result.clone();
                        }
                    };
                    match self.select_into(&target, selector) {
                        Ok(selected) => state.stack.push(selected),
                        Err(result) => {
                            state.result = result;
                            return state.result.clone();
                        }
                    }
                }
                OpCode::EvaluateSentence => {
                    let args = mem::take(&mut state.last_frame);
                    if args.is_empty() {
                        continue;
                    }
                    let command = match self.resolve_command(&args[0]) {
                        Ok(command) => command,
                        Err(result) => {
                            state.result = result;
                            return state.result.clone();
                        }
                    };
                    state.command = Some(command.clone());
                    state.result = command.execute(&args, self.context.as_ref());
                    if state.result.code != ResultCode::Ok {
                        return state.result.clone();
                    }
                }
                OpCode::PushResult => state.stack.push(state.result.value.clone()),
            }
        }

        if !state.stack.is_empty() {
            let value = state.stack.pop().expect("stack is not empty");
            state.result = EvalResult::ok(value);
        }
        state.result.clone()
    }

    /// Resolve a value.
    ///
    /// Tuples resolve element-wise and recursively. Qualified values resolve
    /// their source and then apply their selectors in order. Everything else
    /// is taken as a variable name for the variable resolver.
    pub(crate) fn resolve_value(&self, value: &Value) -> Result<Value, EvalResult> {
        match value {
            Value::Tuple(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items.iter() {
                    resolved.push(self.resolve_value(item)?);
                }
                Ok(Value::tuple(resolved))
            }
            Value::Qualified(qualified) => {
                let mut current = self.resolve_value(&qualified.source)?;
                for selector in &qualified.selectors {
                    let result = self.apply_selector(selector, &current);
                    if !result.is_ok() {
                        return Err(result);
                    }
                    current = result.value;
                }
                Ok(current)
            }
            _ => {
                let name = value
                    .string_value()
                    .ok_or_else(|| EvalResult::error("invalid variable name"))?;
                let resolver = self
                    .variable_resolver
                    .as_ref()
                    .ok_or_else(|| EvalResult::error("no variable resolver"))?;
                resolver.resolve(name.as_str()).ok_or_else(|| {
                    EvalResult::error(format!("cannot resolve variable \"{}\"", name))
                })
            }
        }
    }

    /// Resolve the first word of a sentence into a command.
    fn resolve_command(&self, name: &Value) -> Result<Shared<dyn Command>, EvalResult> {
        let display = name
            .string_value()
            .ok_or_else(|| EvalResult::error("invalid command name"))?;
        let resolver = self
            .command_resolver
            .as_ref()
            .ok_or_else(|| EvalResult::error("no command resolver"))?;
        resolver.resolve(name).ok_or_else(|| {
            EvalResult::error(format!("cannot resolve command \"{}\"", display))
        })
    }

    /// Resolve selector rules through the selector resolver.
    fn resolve_selector(&self, rules: &[Value]) -> Result<Selector, EvalResult> {
        let resolver = self
            .selector_resolver
            .as_ref()
            .ok_or_else(|| EvalResult::error("no selector resolver"))?;
        resolver.resolve(rules)
    }

    /// Apply a selector to a value, resolving generic selectors first.
    pub(crate) fn apply_selector(&self, selector: &Selector, value: &Value) -> EvalResult {
        match selector {
            Selector::Generic(generic) => match self.resolve_selector(&generic.rules) {
                Ok(resolved) => resolved.apply(value),
                Err(result) => result,
            },
            _ => selector.apply(value),
        }
    }

    /// Apply a selector to a target, or append it when the target is a
    /// qualified value.
    fn select_into(&self, target: &Value, selector: Selector) -> Result<Value, EvalResult> {
        if let Value::Qualified(qualified) = target {
            return Ok(Value::qualified(qualified.with_selector(selector)));
        }
        let result = self.apply_selector(&selector, target);
        if result.is_ok() {
            Ok(result.value)
        } else {
            Err(result)
        }
    }
}
