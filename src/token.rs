//! Module defining the tokenizer.
//!
//! The tokenizer is a flat character classifier. It never fails: malformed
//! escape sequences degrade to their verbatim characters and structural
//! errors (unbalanced brackets, unterminated strings) are left for the
//! parser to detect.

use crate::SmartString;
use std::{fmt, iter::Peekable, str::Chars};

/// A location in the input script.
///
/// Tracks the byte index into the source together with a 1-based line and
/// column. Line 0 is the [`NONE`][Position::NONE] sentinel.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy)]
pub struct Position {
    /// Byte index into the source.
    index: usize,
    /// Line number. 0 = none.
    line: u32,
    /// Column number. 1-based, in characters.
    column: u32,
}

impl Position {
    /// A [`Position`] representing no position.
    pub const NONE: Self = Self {
        index: 0,
        line: 0,
        column: 0,
    };
    /// A [`Position`] representing the first character of a script.
    pub const START: Self = Self {
        index: 0,
        line: 1,
        column: 1,
    };

    /// Create a new [`Position`].
    ///
    /// # Panics
    ///
    /// Panics if `line` is zero.
    #[inline(always)]
    #[must_use]
    pub fn new(index: usize, line: u32, column: u32) -> Self {
        assert!(line != 0, "line cannot be zero");

        Self {
            index,
            line,
            column,
        }
    }
    /// Get the byte index, or [`None`] if there is no position.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        if self.is_none() {
            None
        } else {
            Some(self.index)
        }
    }
    /// Get the line number (1-based), or [`None`] if there is no position.
    #[inline(always)]
    #[must_use]
    pub const fn line(self) -> Option<usize> {
        if self.is_none() {
            None
        } else {
            Some(self.line as usize)
        }
    }
    /// Get the column number (1-based), or [`None`] if there is no position.
    #[inline(always)]
    #[must_use]
    pub const fn column(self) -> Option<usize> {
        if self.is_none() {
            None
        } else {
            Some(self.column as usize)
        }
    }
    /// Is there no [`Position`]?
    #[inline(always)]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.line == 0
    }
    /// Advance past one character.
    #[inline]
    pub(crate) fn advance(&mut self, ch: char) {
        self.index += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Position {
    #[inline(always)]
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("none")
        } else {
            write!(f, "line {}, column {}", self.line, self.column)
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("none")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Kind of a Helena token.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TokenKind {
    /// A run of non-newline whitespace.
    Whitespace,
    /// A single `\n`.
    Newline,
    /// A backslash-newline sequence, equivalent to a single space.
    Continuation,
    /// A run of ordinary characters.
    Text,
    /// A backslash escape sequence.
    Escape,
    /// A run of `#`.
    Comment,
    /// `(`
    OpenTuple,
    /// `)`
    CloseTuple,
    /// `{`
    OpenBlock,
    /// `}`
    CloseBlock,
    /// `[`
    OpenExpression,
    /// `]`
    CloseExpression,
    /// A run of `"`.
    StringDelimiter,
    /// `$`
    Dollar,
    /// `;`
    Semicolon,
    /// `*`
    Asterisk,
}

/// A Helena token.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Token {
    /// Kind of the token.
    pub kind: TokenKind,
    /// Position of the first character of the token.
    pub position: Position,
    /// Raw character sequence.
    pub sequence: SmartString,
    /// Literal value after escape processing.
    pub literal: SmartString,
}

impl Token {
    /// Length in characters of the raw sequence.
    ///
    /// For [`Comment`][TokenKind::Comment] and
    /// [`StringDelimiter`][TokenKind::StringDelimiter] runs this is the
    /// delimiter length.
    #[inline]
    #[must_use]
    pub fn delimiter_length(&self) -> usize {
        self.sequence.chars().count()
    }
}

/// Tokenize a whole script in one call.
#[inline]
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    TokenIterator::new(input).collect()
}

/// An iterator on a script text that returns [tokens][Token].
pub struct TokenIterator<'a> {
    stream: Peekable<Chars<'a>>,
    position: Position,
}

impl<'a> TokenIterator<'a> {
    /// Create a new [`TokenIterator`] over `input`.
    #[inline(always)]
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            stream: input.chars().peekable(),
            position: Position::START,
        }
    }

    /// Consume the next character.
    #[inline]
    fn eat(&mut self) -> Option<char> {
        let ch = self.stream.next()?;
        self.position.advance(ch);
        Some(ch)
    }

    /// Consume the next character and append it to `seq`.
    #[inline]
    fn eat_into(&mut self, seq: &mut SmartString) -> Option<char> {
        let ch = self.eat()?;
        seq.push(ch);
        Some(ch)
    }

    /// Token whose literal equals its raw sequence.
    #[inline]
    fn plain(kind: TokenKind, position: Position, sequence: SmartString) -> Token {
        Token {
            kind,
            position,
            literal: sequence.clone(),
            sequence,
        }
    }

    /// Scan a backslash escape sequence. The leading `\` has already been
    /// consumed into `seq`.
    fn scan_escape(&mut self, position: Position, mut seq: SmartString) -> Token {
        let ch = match self.stream.peek() {
            // Backslash at end of input stands for itself.
            None => {
                return Token {
                    kind: TokenKind::Escape,
                    position,
                    sequence: seq,
                    literal: "\\".into(),
                }
            }
            Some(&ch) => ch,
        };

        // Line continuation: swallow the newline and the leading whitespace
        // of the next line, and stand for a single space.
        if ch == '\n' {
            self.eat_into(&mut seq);
            while let Some(&next) = self.stream.peek() {
                match next {
                    ' ' | '\t' | '\r' | '\x0C' => {
                        self.eat_into(&mut seq);
                    }
                    _ => break,
                }
            }
            return Token {
                kind: TokenKind::Continuation,
                position,
                sequence: seq,
                literal: " ".into(),
            };
        }

        self.eat_into(&mut seq);

        let literal: SmartString = match ch {
            'a' => "\x07".into(),
            'b' => "\x08".into(),
            'f' => "\x0C".into(),
            'n' => "\n".into(),
            'r' => "\r".into(),
            't' => "\t".into(),
            'v' => "\x0B".into(),
            '\\' => "\\".into(),
            '0'..='7' => {
                let mut value = ch.to_digit(8).expect("octal digit");
                let mut digits = 1;
                while digits < 3 {
                    match self.stream.peek() {
                        Some(&next) if next.is_digit(8) => {
                            self.eat_into(&mut seq);
                            value = value * 8 + next.to_digit(8).expect("octal digit");
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                codepoint_literal(value)
            }
            'x' | 'u' | 'U' => {
                let max_digits = match ch {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < max_digits {
                    match self.stream.peek() {
                        Some(&next) if next.is_ascii_hexdigit() => {
                            self.eat_into(&mut seq);
                            value = value * 16 + next.to_digit(16).expect("hex digit");
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                if digits == 0 {
                    // No digit at all: the marker character stands for itself.
                    char_literal(ch)
                } else {
                    codepoint_literal(value)
                }
            }
            // Any other character stands for itself.
            _ => char_literal(ch),
        };

        Token {
            kind: TokenKind::Escape,
            position,
            sequence: seq,
            literal,
        }
    }
}

/// Literal for a single character.
#[inline]
fn char_literal(ch: char) -> SmartString {
    let mut s = SmartString::new();
    s.push(ch);
    s
}

/// Literal for a numeric escape, substituting U+FFFD for invalid codepoints.
#[inline]
fn codepoint_literal(value: u32) -> SmartString {
    char_literal(char::from_u32(value).unwrap_or('\u{FFFD}'))
}

/// Is this character a token on its own or the start of a run?
#[inline(always)]
const fn is_special(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\r'
            | '\x0C'
            | '\n'
            | '\\'
            | '#'
            | '('
            | ')'
            | '{'
            | '}'
            | '['
            | ']'
            | '"'
            | '$'
            | ';'
            | '*'
    )
}

impl Iterator for TokenIterator<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.position;
        let ch = *self.stream.peek()?;
        let mut sequence = SmartString::new();

        match ch {
            ' ' | '\t' | '\r' | '\x0C' => {
                while let Some(&next) = self.stream.peek() {
                    match next {
                        ' ' | '\t' | '\r' | '\x0C' => {
                            self.eat_into(&mut sequence);
                        }
                        _ => break,
                    }
                }
                Some(Self::plain(TokenKind::Whitespace, position, sequence))
            }
            '\n' => {
                self.eat_into(&mut sequence);
                Some(Self::plain(TokenKind::Newline, position, sequence))
            }
            '\\' => {
                self.eat_into(&mut sequence);
                Some(self.scan_escape(position, sequence))
            }
            '#' => {
                while let Some('#') = self.stream.peek() {
                    self.eat_into(&mut sequence);
                }
                Some(Self::plain(TokenKind::Comment, position, sequence))
            }
            '"' => {
                while let Some('"') = self.stream.peek() {
                    self.eat_into(&mut sequence);
                }
                Some(Self::plain(TokenKind::StringDelimiter, position, sequence))
            }
            '(' | ')' | '{' | '}' | '[' | ']' | '$' | ';' | '*' => {
                self.eat_into(&mut sequence);
                let kind = match ch {
                    '(' => TokenKind::OpenTuple,
                    ')' => TokenKind::CloseTuple,
                    '{' => TokenKind::OpenBlock,
                    '}' => TokenKind::CloseBlock,
                    '[' => TokenKind::OpenExpression,
                    ']' => TokenKind::CloseExpression,
                    '$' => TokenKind::Dollar,
                    ';' => TokenKind::Semicolon,
                    _ => TokenKind::Asterisk,
                };
                Some(Self::plain(kind, position, sequence))
            }
            _ => {
                while let Some(&next) = self.stream.peek() {
                    if is_special(next) {
                        break;
                    }
                    self.eat_into(&mut sequence);
                }
                Some(Self::plain(TokenKind::Text, position, sequence))
            }
        }
    }
}

impl std::iter::FusedIterator for TokenIterator<'_> {}
