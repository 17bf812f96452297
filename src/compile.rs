//! Module defining the compiler.
//!
//! The compiler lowers scripts to immutable [`Program`]s of opcodes and
//! constants. Compilation is deterministic and side-effect free; programs
//! are freely shareable across executors afterwards.

use crate::ast::{Morpheme, Script, Sentence, Word, WordOrValue};
use crate::error::{ParseError, ParseErrorType};
use crate::syntax::{check_word, substitution_chain_end, WordType};
use crate::token::{tokenize, Position};
use crate::value::{ScriptValue, Value};
use crate::Parser;

/// An instruction of a compiled [`Program`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum OpCode {
    /// Push NIL onto the stack.
    PushNil,
    /// Push the next constant onto the stack.
    PushConstant,
    /// Open a new frame at the current stack depth.
    OpenFrame,
    /// Close the current frame, making it the last closed frame.
    CloseFrame,
    /// Pop a value and push its resolution.
    ResolveValue,
    /// Spread a tuple on top of the stack onto the stack.
    ExpandValue,
    /// Pop a value and push it as a qualified value with no selectors.
    SetSource,
    /// Pop an index and a target, and select by index.
    SelectIndex,
    /// Select the last closed frame as keys into the popped target.
    SelectKeys,
    /// Resolve the last closed frame as selector rules and select into the
    /// popped target.
    SelectRules,
    /// Evaluate the last closed frame as a sentence.
    EvaluateSentence,
    /// Push the value of the last result.
    PushResult,
    /// Join the string representations of the last closed frame.
    JoinStrings,
    /// Make a tuple out of the last closed frame.
    MakeTuple,
}

/// A compiled program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The instructions.
    pub opcodes: Vec<OpCode>,
    /// The constants, consumed in order by
    /// [`PushConstant`][OpCode::PushConstant].
    pub constants: Vec<Value>,
    /// Source positions of the instructions, captured only when the
    /// compiler is configured for diagnostics.
    pub positions: Option<Vec<Option<Position>>>,
}

/// Accumulator for a [`Program`] under construction.
struct Builder {
    opcodes: Vec<OpCode>,
    constants: Vec<Value>,
    positions: Option<Vec<Option<Position>>>,
}

impl Builder {
    fn new(capture_positions: bool) -> Self {
        Self {
            opcodes: Vec::new(),
            constants: Vec::new(),
            positions: if capture_positions {
                Some(Vec::new())
            } else {
                None
            },
        }
    }

    fn emit(&mut self, opcode: OpCode, position: Option<Position>) {
        self.opcodes.push(opcode);
        if let Some(positions) = &mut self.positions {
            positions.push(position);
        }
    }

    fn emit_constant(&mut self, value: Value, position: Option<Position>) {
        self.emit(OpCode::PushConstant, position);
        self.constants.push(value);
    }

    fn finish(self) -> Program {
        Program {
            opcodes: self.opcodes,
            constants: self.constants,
            positions: self.positions,
        }
    }
}

/// The compiler.
///
/// Holds only configuration; every compilation is independent.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    capture_positions: bool,
}

impl Compiler {
    /// Create a new [`Compiler`] that does not capture source positions.
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            capture_positions: false,
        }
    }
    /// Create a new [`Compiler`] that captures source positions for
    /// diagnostics.
    #[inline(always)]
    #[must_use]
    pub fn with_positions() -> Self {
        Self {
            capture_positions: true,
        }
    }

    /// Compile a script into a [`Program`].
    pub fn compile(&self, script: &Script) -> Result<Program, ParseError> {
        let mut builder = Builder::new(self.capture_positions);
        self.emit_script(&mut builder, script)?;
        Ok(builder.finish())
    }

    /// Tokenize, parse and compile a source text.
    pub fn compile_source(&self, source: &str) -> Result<Program, ParseError> {
        let tokens = tokenize(source);
        let script = Parser::new(&tokens).parse()?;
        self.compile(&script)
    }

    /// Compile a single sentence into a [`Program`].
    ///
    /// The sentence may contain constant values; this is how synthesized
    /// sentences (e.g. a tuple evaluated as a sentence) are executed.
    pub fn compile_sentence(&self, sentence: &Sentence) -> Result<Program, ParseError> {
        let mut builder = Builder::new(self.capture_positions);
        self.emit_sentence(&mut builder, sentence)?;
        Ok(builder.finish())
    }

    /// Compile a single word into a [`Program`].
    pub fn compile_word(&self, word: &Word) -> Result<Program, ParseError> {
        let mut builder = Builder::new(self.capture_positions);
        self.emit_word(&mut builder, word)?;
        Ok(builder.finish())
    }

    fn emit_script(&self, builder: &mut Builder, script: &Script) -> Result<(), ParseError> {
        if script.sentences.is_empty() {
            builder.emit(OpCode::PushNil, script.position);
            return Ok(());
        }
        for sentence in &script.sentences {
            self.emit_sentence(builder, sentence)?;
        }
        builder.emit(OpCode::PushResult, script.position);
        Ok(())
    }

    fn emit_sentence(
        &self,
        builder: &mut Builder,
        sentence: &Sentence,
    ) -> Result<(), ParseError> {
        builder.emit(OpCode::OpenFrame, sentence.position);
        for word in &sentence.words {
            match word {
                WordOrValue::Word(word) => self.emit_word(builder, word)?,
                WordOrValue::Value(value) => {
                    builder.emit_constant(value.clone(), sentence.position)
                }
            }
        }
        builder.emit(OpCode::CloseFrame, sentence.position);
        builder.emit(OpCode::EvaluateSentence, sentence.position);
        Ok(())
    }

    fn emit_word(&self, builder: &mut Builder, word: &Word) -> Result<(), ParseError> {
        let position = word.position;
        match check_word(word) {
            WordType::Root => self.emit_root(builder, &word.morphemes[0], position),
            WordType::Compound => {
                builder.emit(OpCode::OpenFrame, position);
                self.emit_stems(builder, &word.morphemes, position)?;
                builder.emit(OpCode::CloseFrame, position);
                builder.emit(OpCode::JoinStrings, position);
                Ok(())
            }
            WordType::Substitution => self.emit_substitution(builder, &word.morphemes, position),
            WordType::Qualified => self.emit_qualified(builder, &word.morphemes, position),
            WordType::Ignored => Ok(()),
            WordType::Invalid => Err(ParseErrorType::InvalidWordStructure
                .into_err(position.unwrap_or(Position::NONE))),
        }
    }

    fn emit_root(
        &self,
        builder: &mut Builder,
        morpheme: &Morpheme,
        position: Option<Position>,
    ) -> Result<(), ParseError> {
        match morpheme {
            Morpheme::Literal(literal) => {
                builder.emit_constant(Value::string(literal.as_str()), position);
                Ok(())
            }
            Morpheme::Tuple(script) => self.emit_tuple(builder, script, position),
            Morpheme::Block { script, source } => {
                let value = ScriptValue::new(script.clone(), Some(source.as_str().into()));
                builder.emit_constant(Value::script(value), position);
                Ok(())
            }
            Morpheme::Expression(script) => self.emit_script(builder, script),
            Morpheme::String(morphemes) => {
                builder.emit(OpCode::OpenFrame, position);
                self.emit_stems(builder, morphemes, position)?;
                builder.emit(OpCode::CloseFrame, position);
                builder.emit(OpCode::JoinStrings, position);
                Ok(())
            }
            Morpheme::HereString { literal, .. } | Morpheme::TaggedString { literal, .. } => {
                builder.emit_constant(Value::string(literal.as_str()), position);
                Ok(())
            }
            _ => Err(ParseErrorType::UnexpectedMorpheme
                .into_err(position.unwrap_or(Position::NONE))),
        }
    }

    /// Lower a tuple: all the words of all the sentences accumulate into one
    /// frame.
    fn emit_tuple(
        &self,
        builder: &mut Builder,
        script: &Script,
        position: Option<Position>,
    ) -> Result<(), ParseError> {
        builder.emit(OpCode::OpenFrame, position);
        self.emit_flattened_words(builder, script)?;
        builder.emit(OpCode::CloseFrame, position);
        builder.emit(OpCode::MakeTuple, position);
        Ok(())
    }

    /// Emit the words of every sentence of `script` without evaluating
    /// anything.
    fn emit_flattened_words(
        &self,
        builder: &mut Builder,
        script: &Script,
    ) -> Result<(), ParseError> {
        for sentence in &script.sentences {
            for word in &sentence.words {
                match word {
                    WordOrValue::Word(word) => self.emit_word(builder, word)?,
                    WordOrValue::Value(value) => {
                        builder.emit_constant(value.clone(), sentence.position)
                    }
                }
            }
        }
        Ok(())
    }

    /// Lower the stems of a compound word or string.
    fn emit_stems(
        &self,
        builder: &mut Builder,
        morphemes: &[Morpheme],
        position: Option<Position>,
    ) -> Result<(), ParseError> {
        let mut i = 0;
        while i < morphemes.len() {
            match &morphemes[i] {
                Morpheme::Literal(literal) => {
                    builder.emit_constant(Value::string(literal.as_str()), position);
                    i += 1;
                }
                Morpheme::Expression(script) => {
                    self.emit_script(builder, script)?;
                    i += 1;
                }
                Morpheme::SubstituteNext { .. } => {
                    let end = substitution_chain_end(morphemes, i).ok_or_else(|| {
                        ParseErrorType::UnexpectedMorpheme
                            .into_err(position.unwrap_or(Position::NONE))
                    })?;
                    self.emit_substitution(builder, &morphemes[i..end], position)?;
                    i = end;
                }
                _ => {
                    return Err(ParseErrorType::UnexpectedMorpheme
                        .into_err(position.unwrap_or(Position::NONE)))
                }
            }
        }
        Ok(())
    }

    /// Lower a substitution chain: the selectable, its selectors, the extra
    /// resolution levels, then the optional expansion.
    fn emit_substitution(
        &self,
        builder: &mut Builder,
        morphemes: &[Morpheme],
        position: Option<Position>,
    ) -> Result<(), ParseError> {
        let (expansion, levels) = match &morphemes[0] {
            Morpheme::SubstituteNext {
                expansion, levels, ..
            } => (*expansion, *levels),
            _ => {
                return Err(ParseErrorType::UnexpectedMorpheme
                    .into_err(position.unwrap_or(Position::NONE)))
            }
        };
        match morphemes.get(1) {
            Some(Morpheme::Literal(literal)) => {
                builder.emit_constant(Value::string(literal.as_str()), position);
                builder.emit(OpCode::ResolveValue, position);
            }
            Some(Morpheme::Tuple(script)) => {
                self.emit_tuple(builder, script, position)?;
                builder.emit(OpCode::ResolveValue, position);
            }
            Some(Morpheme::Block { source, .. }) => {
                builder.emit_constant(Value::string(source.as_str()), position);
                builder.emit(OpCode::ResolveValue, position);
            }
            // An expression has already resolved its own sentence result.
            Some(Morpheme::Expression(script)) => self.emit_script(builder, script)?,
            _ => {
                return Err(ParseErrorType::UnexpectedMorpheme
                    .into_err(position.unwrap_or(Position::NONE)))
            }
        }
        for selector in &morphemes[2..] {
            self.emit_selector(builder, selector, position)?;
        }
        for _ in 1..levels {
            builder.emit(OpCode::ResolveValue, position);
        }
        if expansion {
            builder.emit(OpCode::ExpandValue, position);
        }
        Ok(())
    }

    /// Lower one selector morpheme.
    fn emit_selector(
        &self,
        builder: &mut Builder,
        morpheme: &Morpheme,
        position: Option<Position>,
    ) -> Result<(), ParseError> {
        match morpheme {
            // Key list: a plain frame, read in place by SelectKeys.
            Morpheme::Tuple(script) => {
                builder.emit(OpCode::OpenFrame, position);
                self.emit_flattened_words(builder, script)?;
                builder.emit(OpCode::CloseFrame, position);
                builder.emit(OpCode::SelectKeys, position);
                Ok(())
            }
            Morpheme::Expression(script) => {
                self.emit_script(builder, script)?;
                builder.emit(OpCode::SelectIndex, position);
                Ok(())
            }
            // Rule list: one tuple per sentence.
            Morpheme::Block { script, .. } => {
                builder.emit(OpCode::OpenFrame, position);
                for sentence in &script.sentences {
                    builder.emit(OpCode::OpenFrame, position);
                    for word in &sentence.words {
                        match word {
                            WordOrValue::Word(word) => self.emit_word(builder, word)?,
                            WordOrValue::Value(value) => {
                                builder.emit_constant(value.clone(), sentence.position)
                            }
                        }
                    }
                    builder.emit(OpCode::CloseFrame, position);
                    builder.emit(OpCode::MakeTuple, position);
                }
                builder.emit(OpCode::CloseFrame, position);
                builder.emit(OpCode::SelectRules, position);
                Ok(())
            }
            _ => Err(ParseErrorType::UnexpectedMorpheme
                .into_err(position.unwrap_or(Position::NONE))),
        }
    }

    /// Lower a qualified word: the root becomes a qualified value and the
    /// selectors append to it as they are evaluated.
    fn emit_qualified(
        &self,
        builder: &mut Builder,
        morphemes: &[Morpheme],
        position: Option<Position>,
    ) -> Result<(), ParseError> {
        match &morphemes[0] {
            Morpheme::Literal(literal) => {
                builder.emit_constant(Value::string(literal.as_str()), position)
            }
            Morpheme::Tuple(script) => self.emit_tuple(builder, script, position)?,
            Morpheme::Block { source, .. } => {
                builder.emit_constant(Value::string(source.as_str()), position)
            }
            _ => {
                return Err(ParseErrorType::UnexpectedMorpheme
                    .into_err(position.unwrap_or(Position::NONE)))
            }
        }
        builder.emit(OpCode::SetSource, position);
        for selector in &morphemes[1..] {
            self.emit_selector(builder, selector, position)?;
        }
        Ok(())
    }
}
