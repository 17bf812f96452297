//! # Helena - embedded scripting core for Rust
//!
//! Helena is a small dynamic scripting language in the Tcl lineage, built
//! around word-based syntax, first-class scripts and tuples, and pervasive
//! substitution and selector syntax.
//!
//! This crate is the language core: the source-to-result pipeline going
//! through the [tokenizer][tokenize], the [parser][Parser], the
//! [compiler][Compiler] and the resumable [executor][Executor], together
//! with the [result protocol][EvalResult] that makes every command
//! suspendable. The surface command library, scopes and host bindings live
//! outside the core and plug in through the [resolver][VariableResolver]
//! and [`Command`] interfaces.
//!
//! # A Quick Example
//!
//! ```no_run
//! use helena::{
//!     Command, CommandResolver, Compiler, Context, EvalResult, Executor, Shared, Value,
//! };
//!
//! // A command that echoes its first argument.
//! struct EchoCommand;
//!
//! impl Command for EchoCommand {
//!     fn execute(&self, args: &[Value], _context: Option<&Context>) -> EvalResult {
//!         EvalResult::ok(args.get(1).cloned().unwrap_or(Value::Nil))
//!     }
//! }
//!
//! struct Commands;
//!
//! impl CommandResolver for Commands {
//!     fn resolve(&self, _name: &Value) -> Option<Shared<dyn Command>> {
//!         Some(Shared::new(EchoCommand))
//!     }
//! }
//!
//! fn main() -> Result<(), helena::ParseError> {
//!     let program = Compiler::new().compile_source("echo hello")?;
//!     let executor = Executor::new(None, Some(Shared::new(Commands)), None, None);
//!     let result = executor.execute_program(&program);
//!     assert_eq!(result.value, Value::string("hello"));
//!     Ok(())
//! }
//! ```

mod ast;
mod compile;
mod error;
mod executor;
mod parse;
mod process;
mod resolver;
mod result;
mod selector;
mod string;
mod syntax;
mod token;
mod value;

/// The system integer type. It is defined as [`i64`].
pub type INT = i64;

/// The system floating-point type. It is defined as [`f64`].
pub type FLOAT = f64;

pub use ast::{Morpheme, Script, Sentence, Word, WordOrValue};
pub use compile::{Compiler, OpCode, Program};
pub use error::{ParseError, ParseErrorType};
pub use executor::{Executor, ProgramState};
pub use parse::Parser;
pub use process::{DeferredValue, Process};
pub use resolver::{
    Command, CommandResolver, Context, Locked, SelectorResolver, SendSync, Shared,
    VariableResolver,
};
pub use result::{EvalResult, ResultCode, ResumeState};
pub use selector::{CustomSelector, GenericSelector, IndexedSelector, KeyedSelector, Selector};
pub use string::ImmutableString;
pub use syntax::{check_word, WordType};
pub use token::{tokenize, Position, Token, TokenIterator, TokenKind};
pub use value::{CustomValue, Dict, QualifiedValue, ScriptValue, Value, ValueType};

/// Alias to [`smallvec::SmallVec<[T; 4]>`](https://crates.io/crates/smallvec), which is a
/// specialized [`Vec`] backed by a small, inline, fixed-size array when there are ≤ 4 items stored.
///
/// Words rarely count more than a few morphemes and access paths rarely
/// stack more than a few selectors, so inline storage covers the common
/// case without allocating.
pub(crate) type StaticVec<T> = smallvec::SmallVec<[T; 4]>;

/// An inline-capable string for token and morpheme text.
/// [`SmartString`](https://crates.io/crates/smartstring) is used because most
/// literals are ASCII and short, fewer than 23 characters, so they can be
/// stored inline.
pub(crate) type SmartString = smartstring::SmartString<smartstring::Compact>;
