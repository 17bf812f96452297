//! Module defining the parsed representation of scripts.
//!
//! A [`Script`] is a sequence of [sentences][Sentence], a sentence a sequence
//! of [words][Word], and a word a sequence of [morphemes][Morpheme]. The
//! parser produces this structure verbatim; classification of word shapes is
//! the [syntax checker's][crate::check_word] job and happens on demand.

use crate::{Position, SmartString, StaticVec, Value};

/// A parsed script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    /// Sentences of the script, in source order.
    pub sentences: Vec<Sentence>,
    /// Position of the first token of the script, if known.
    pub position: Option<Position>,
}

impl Script {
    /// Create a new empty [`Script`].
    #[inline(always)]
    #[must_use]
    pub fn new(position: Option<Position>) -> Self {
        Self {
            sentences: Vec::new(),
            position,
        }
    }
}

/// A sentence of a script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sentence {
    /// Words of the sentence, in source order.
    pub words: Vec<WordOrValue>,
    /// Position of the first token of the sentence, if known.
    pub position: Option<Position>,
}

impl Sentence {
    /// Create a new empty [`Sentence`].
    #[inline(always)]
    #[must_use]
    pub fn new(position: Option<Position>) -> Self {
        Self {
            words: Vec::new(),
            position,
        }
    }
}

/// One element of a sentence.
///
/// The parser only ever produces [`Word`][WordOrValue::Word]s. Constant
/// [`Value`][WordOrValue::Value]s appear in sentences synthesized at runtime,
/// e.g. when a tuple is evaluated as a sentence by the
/// [`Process`][crate::Process] trampoline.
#[derive(Debug, Clone, PartialEq)]
pub enum WordOrValue {
    /// A parsed word.
    Word(Word),
    /// A raw constant value.
    Value(Value),
}

/// A parsed word.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// Morphemes of the word, in source order. Never empty.
    pub morphemes: StaticVec<Morpheme>,
    /// Position of the first token of the word, if known.
    pub position: Option<Position>,
}

impl Word {
    /// Create a new empty [`Word`].
    #[inline(always)]
    #[must_use]
    pub fn new(position: Option<Position>) -> Self {
        Self {
            morphemes: StaticVec::new(),
            position,
        }
    }
}

/// A lexical sub-unit of a word.
#[derive(Debug, Clone, PartialEq)]
pub enum Morpheme {
    /// A literal character sequence, after escape processing.
    Literal(SmartString),
    /// A `(...)` tuple.
    Tuple(Script),
    /// A `{...}` block.
    ///
    /// Blocks keep the verbatim source text between the braces in addition
    /// to the parsed subscript, so that script values can display themselves
    /// and blocks can act as string variable names.
    Block {
        /// Parsed subscript.
        script: Script,
        /// Verbatim source text between the braces.
        source: SmartString,
    },
    /// A `[...]` expression.
    Expression(Script),
    /// A `"..."` string.
    ///
    /// Strings never nest other strings, but any other morpheme kind may
    /// appear as a stem.
    String(Vec<Morpheme>),
    /// A `"""..."""` here-string. The literal is taken verbatim, with no
    /// escape processing.
    HereString {
        /// Verbatim content.
        literal: SmartString,
        /// Length of the opening quote run.
        delimiter_length: usize,
    },
    /// A `""tag ... tag""` tagged string.
    TaggedString {
        /// Content with the closing line's indentation stripped.
        literal: SmartString,
        /// The tag.
        tag: SmartString,
    },
    /// A `#...` line comment.
    LineComment {
        /// Text after the `#` run.
        literal: SmartString,
        /// Length of the `#` run.
        delimiter_length: usize,
    },
    /// A `#{...}#` block comment.
    BlockComment {
        /// Verbatim content between the delimiters.
        literal: SmartString,
        /// Length of the `#` runs.
        delimiter_length: usize,
    },
    /// A `$` substitution prefix.
    ///
    /// Runs of `$` collapse into a single morpheme whose `levels` equals the
    /// number of dollars. The morpheme applies to the next morpheme of the
    /// word (the selectable), optionally followed by selector morphemes.
    SubstituteNext {
        /// Is this an expanding `$*` substitution?
        expansion: bool,
        /// Number of resolutions to perform. At least 1.
        levels: usize,
        /// Raw source sequence.
        sequence: SmartString,
    },
}

impl Morpheme {
    /// Is this morpheme a comment?
    #[inline(always)]
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(
            self,
            Self::LineComment { .. } | Self::BlockComment { .. }
        )
    }
}
