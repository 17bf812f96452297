//! Module defining the parser.
//!
//! The parser folds the flat token stream into the recursive AST of
//! [`Script`]s, [`Sentence`]s, [`Word`]s and [`Morpheme`]s. Word shapes are
//! NOT validated here; the [syntax checker][crate::check_word] classifies
//! words on demand and the compiler surfaces structural errors.

use crate::ast::{Morpheme, Script, Sentence, Word, WordOrValue};
use crate::error::{ParseError, ParseErrorType};
use crate::token::{Position, Token, TokenKind};
use crate::SmartString;

/// Bracketing context of a script being parsed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum ScriptContext {
    Root,
    Tuple,
    Block,
    Expression,
}

impl ScriptContext {
    /// Token kind closing this context, if any.
    const fn close_kind(self) -> Option<TokenKind> {
        match self {
            Self::Root => None,
            Self::Tuple => Some(TokenKind::CloseTuple),
            Self::Block => Some(TokenKind::CloseBlock),
            Self::Expression => Some(TokenKind::CloseExpression),
        }
    }
    /// Error for this context's opening token never being closed.
    const fn unmatched_open(self) -> ParseErrorType {
        match self {
            Self::Root | Self::Tuple => ParseErrorType::UnmatchedLeftParenthesis,
            Self::Block => ParseErrorType::UnmatchedLeftBrace,
            Self::Expression => ParseErrorType::UnmatchedLeftBracket,
        }
    }
}

/// Error for a stray closing token.
const fn unmatched_close(kind: TokenKind) -> ParseErrorType {
    match kind {
        TokenKind::CloseTuple => ParseErrorType::UnmatchedRightParenthesis,
        TokenKind::CloseBlock => ParseErrorType::UnmatchedRightBrace,
        _ => ParseErrorType::UnmatchedRightBracket,
    }
}

/// Is this token kind a closing bracket?
const fn is_close(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::CloseTuple | TokenKind::CloseBlock | TokenKind::CloseExpression
    )
}

/// A parser over a token stream.
pub struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] over `tokens`.
    #[inline(always)]
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, index: 0 }
    }

    /// Parse the whole token stream into a [`Script`].
    pub fn parse(mut self) -> Result<Script, ParseError> {
        self.parse_script(ScriptContext::Root, Position::NONE)
    }

    #[inline(always)]
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    #[inline(always)]
    fn token_at(&self, index: usize) -> Option<&'a Token> {
        self.tokens.get(index)
    }

    #[inline(always)]
    fn advance(&mut self) {
        self.index += 1;
    }

    #[inline]
    fn current_position(&self) -> Option<Position> {
        self.peek().map(|token| token.position)
    }

    fn parse_script(
        &mut self,
        context: ScriptContext,
        open_position: Position,
    ) -> Result<Script, ParseError> {
        let mut script = Script::new(self.current_position());
        loop {
            // Skip sentence separators and blank space.
            while let Some(token) = self.peek() {
                match token.kind {
                    TokenKind::Whitespace
                    | TokenKind::Continuation
                    | TokenKind::Newline
                    | TokenKind::Semicolon => self.advance(),
                    _ => break,
                }
            }
            let token = match self.peek() {
                None => {
                    return if context.close_kind().is_none() {
                        Ok(script)
                    } else {
                        Err(context.unmatched_open().into_err(open_position))
                    };
                }
                Some(token) => token,
            };
            if Some(token.kind) == context.close_kind() {
                self.advance();
                return Ok(script);
            }
            if is_close(token.kind) {
                return Err(unmatched_close(token.kind).into_err(token.position));
            }
            let sentence = self.parse_sentence()?;
            script.sentences.push(sentence);
        }
    }

    fn parse_sentence(&mut self) -> Result<Sentence, ParseError> {
        let mut sentence = Sentence::new(self.current_position());
        loop {
            // Skip word separators.
            while let Some(token) = self.peek() {
                match token.kind {
                    TokenKind::Whitespace | TokenKind::Continuation => self.advance(),
                    _ => break,
                }
            }
            match self.peek() {
                None => break,
                Some(token) => match token.kind {
                    TokenKind::Newline | TokenKind::Semicolon => break,
                    kind if is_close(kind) => break,
                    _ => {
                        let word = self.parse_word()?;
                        sentence.words.push(WordOrValue::Word(word));
                    }
                },
            }
        }
        Ok(sentence)
    }

    fn parse_word(&mut self) -> Result<Word, ParseError> {
        let mut word = Word::new(self.current_position());
        loop {
            let (kind, position) = match self.peek() {
                None => break,
                Some(token) => (token.kind, token.position),
            };
            match kind {
                TokenKind::Whitespace
                | TokenKind::Continuation
                | TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::CloseTuple
                | TokenKind::CloseBlock
                | TokenKind::CloseExpression => break,
                TokenKind::Text | TokenKind::Escape | TokenKind::Asterisk => {
                    let literal = self.scan_literal();
                    word.morphemes.push(Morpheme::Literal(literal));
                }
                TokenKind::Dollar => {
                    let morpheme = self.scan_substitute_next();
                    word.morphemes.push(morpheme);
                }
                TokenKind::OpenTuple => {
                    self.advance();
                    let script = self.parse_script(ScriptContext::Tuple, position)?;
                    word.morphemes.push(Morpheme::Tuple(script));
                }
                TokenKind::OpenBlock => {
                    let morpheme = self.parse_block(position)?;
                    word.morphemes.push(morpheme);
                }
                TokenKind::OpenExpression => {
                    self.advance();
                    let script = self.parse_script(ScriptContext::Expression, position)?;
                    word.morphemes.push(Morpheme::Expression(script));
                }
                TokenKind::StringDelimiter => {
                    let morpheme = self.parse_string_family()?;
                    word.morphemes.push(morpheme);
                }
                TokenKind::Comment => {
                    let morpheme = self.parse_comment()?;
                    word.morphemes.push(morpheme);
                }
            }
        }
        Ok(word)
    }

    /// Consume a run of literal content tokens into a single literal.
    fn scan_literal(&mut self) -> SmartString {
        let mut literal = SmartString::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Text | TokenKind::Escape | TokenKind::Asterisk => {
                    literal.push_str(&token.literal);
                    self.advance();
                }
                _ => break,
            }
        }
        literal
    }

    /// Consume a run of `$` tokens, plus the expansion `*` if present.
    fn scan_substitute_next(&mut self) -> Morpheme {
        let mut sequence = SmartString::new();
        let mut levels = 0;
        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Dollar {
                break;
            }
            sequence.push_str(&token.sequence);
            levels += 1;
            self.advance();
        }
        let expansion = match self.peek() {
            Some(token) if token.kind == TokenKind::Asterisk => {
                sequence.push_str(&token.sequence);
                self.advance();
                true
            }
            _ => false,
        };
        Morpheme::SubstituteNext {
            expansion,
            levels,
            sequence,
        }
    }

    /// Parse a `{...}` block, keeping its verbatim source text.
    fn parse_block(&mut self, open_position: Position) -> Result<Morpheme, ParseError> {
        self.advance();
        let start = self.index;
        let script = self.parse_script(ScriptContext::Block, open_position)?;
        // Everything between the braces, verbatim. The last consumed token
        // is the closing brace itself.
        let mut source = SmartString::new();
        for token in &self.tokens[start..self.index - 1] {
            source.push_str(&token.sequence);
        }
        Ok(Morpheme::Block { script, source })
    }

    /// Parse a string morpheme of any flavor. The opening delimiter run is
    /// the current token.
    fn parse_string_family(&mut self) -> Result<Morpheme, ParseError> {
        let token = self.peek().expect("string delimiter token");
        let position = token.position;
        let delimiter_length = token.delimiter_length();
        self.advance();
        match delimiter_length {
            1 => self.parse_string(position),
            2 => self.parse_tagged_string(position),
            _ => self.parse_here_string(position, delimiter_length),
        }
    }

    /// Parse a regular string up to its closing delimiter.
    ///
    /// Only substitutions and embedded expressions are recognized inside
    /// strings; every other token contributes literal text. Tuple and block
    /// morphemes appear only as part of a substitution chain.
    fn parse_string(&mut self, open_position: Position) -> Result<Morpheme, ParseError> {
        let mut morphemes: Vec<Morpheme> = Vec::new();
        // True right after a substitution prefix: the next morpheme is the
        // chain's selectable.
        let mut selectable = false;
        // True while tuple/block/expression tokens attach to the current
        // substitution chain as selectors.
        let mut chain = false;
        loop {
            let (kind, position) = match self.peek() {
                None => {
                    return Err(ParseErrorType::UnterminatedString.into_err(open_position))
                }
                Some(token) => (token.kind, token.position),
            };
            match kind {
                TokenKind::StringDelimiter
                    if self.peek().expect("peeked").delimiter_length() == 1 =>
                {
                    self.advance();
                    break;
                }
                TokenKind::Dollar => {
                    morphemes.push(self.scan_substitute_next());
                    selectable = true;
                    chain = false;
                }
                TokenKind::OpenExpression => {
                    self.advance();
                    let script = self.parse_script(ScriptContext::Expression, position)?;
                    morphemes.push(Morpheme::Expression(script));
                    chain = selectable || chain;
                    selectable = false;
                }
                TokenKind::OpenTuple if selectable || chain => {
                    self.advance();
                    let script = self.parse_script(ScriptContext::Tuple, position)?;
                    morphemes.push(Morpheme::Tuple(script));
                    chain = true;
                    selectable = false;
                }
                TokenKind::OpenBlock if selectable || chain => {
                    let morpheme = self.parse_block(position)?;
                    morphemes.push(morpheme);
                    chain = true;
                    selectable = false;
                }
                TokenKind::Text | TokenKind::Escape | TokenKind::Asterisk if selectable => {
                    // The chain's selectable name stops at the first
                    // non-literal token.
                    let literal = self.scan_literal();
                    morphemes.push(Morpheme::Literal(literal));
                    selectable = false;
                    chain = true;
                }
                _ => {
                    let literal = self.scan_string_literal();
                    morphemes.push(Morpheme::Literal(literal));
                    selectable = false;
                    chain = false;
                }
            }
        }
        Ok(Morpheme::String(morphemes))
    }

    /// Consume a run of in-string literal content.
    ///
    /// Stops at substitutions, embedded expressions and the single-quote
    /// closing delimiter; everything else is literal inside a string.
    fn scan_string_literal(&mut self) -> SmartString {
        let mut literal = SmartString::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Dollar | TokenKind::OpenExpression => break,
                TokenKind::StringDelimiter if token.delimiter_length() == 1 => break,
                // Longer quote runs inside a string are content.
                _ => {
                    literal.push_str(&token.literal);
                    self.advance();
                }
            }
        }
        literal
    }

    /// Parse a tagged string. The `""` delimiter has been consumed; when no
    /// tag line follows, this is the empty string.
    fn parse_tagged_string(&mut self, open_position: Position) -> Result<Morpheme, ParseError> {
        let tag = match (self.peek(), self.token_at(self.index + 1)) {
            (Some(first), Some(second))
                if first.kind == TokenKind::Text && second.kind == TokenKind::Newline =>
            {
                let tag = first.literal.clone();
                self.advance();
                self.advance();
                tag
            }
            _ => return Ok(Morpheme::String(Vec::new())),
        };

        let mut content = SmartString::new();
        loop {
            // Closing line: optional indentation, the tag, then `""`.
            let mut i = self.index;
            let mut indent = SmartString::new();
            if let Some(token) = self.token_at(i) {
                if token.kind == TokenKind::Whitespace {
                    indent = token.sequence.clone();
                    i += 1;
                }
            }
            let closes = matches!(
                (self.token_at(i), self.token_at(i + 1)),
                (Some(first), Some(second))
                    if first.kind == TokenKind::Text
                        && first.literal == tag
                        && second.kind == TokenKind::StringDelimiter
                        && second.delimiter_length() == 2
            );
            if closes {
                match self.token_at(i + 2) {
                    None => (),
                    Some(token) if token.kind == TokenKind::Newline => (),
                    Some(token) => {
                        return Err(
                            ParseErrorType::ExtraCharactersAfterTag.into_err(token.position)
                        )
                    }
                }
                self.index = i + 2;
                return Ok(Morpheme::TaggedString {
                    literal: strip_indent(&content, &indent),
                    tag,
                });
            }

            // Consume one full content line, verbatim.
            loop {
                match self.peek() {
                    None => return Err(ParseErrorType::MissingTag.into_err(open_position)),
                    Some(token) => {
                        let newline = token.kind == TokenKind::Newline;
                        content.push_str(&token.sequence);
                        self.advance();
                        if newline {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Parse a here-string. The opening delimiter run has been consumed;
    /// content runs verbatim until a quote run of the same length.
    fn parse_here_string(
        &mut self,
        open_position: Position,
        delimiter_length: usize,
    ) -> Result<Morpheme, ParseError> {
        let mut literal = SmartString::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ParseErrorType::UnterminatedHereString.into_err(open_position))
                }
                Some(token)
                    if token.kind == TokenKind::StringDelimiter
                        && token.delimiter_length() == delimiter_length =>
                {
                    self.advance();
                    return Ok(Morpheme::HereString {
                        literal,
                        delimiter_length,
                    });
                }
                Some(token) => {
                    literal.push_str(&token.sequence);
                    self.advance();
                }
            }
        }
    }

    /// Parse a comment morpheme. The current token is the `#` run.
    fn parse_comment(&mut self) -> Result<Morpheme, ParseError> {
        let token = self.peek().expect("comment token");
        let open_position = token.position;
        let delimiter_length = token.delimiter_length();
        self.advance();

        // `#...{` opens a block comment.
        if let Some(token) = self.peek() {
            if token.kind == TokenKind::OpenBlock {
                return self.parse_block_comment(open_position, delimiter_length);
            }
        }

        // Line comment: everything up to the end of the line.
        let mut literal = SmartString::new();
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Newline {
                break;
            }
            literal.push_str(&token.literal);
            self.advance();
        }
        Ok(Morpheme::LineComment {
            literal,
            delimiter_length,
        })
    }

    /// Parse a block comment. Content runs verbatim until a `}` immediately
    /// followed by a `#` run of the opening length.
    fn parse_block_comment(
        &mut self,
        open_position: Position,
        delimiter_length: usize,
    ) -> Result<Morpheme, ParseError> {
        self.advance();
        let mut literal = SmartString::new();
        loop {
            match self.peek() {
                None => {
                    return Err(
                        ParseErrorType::UnterminatedBlockComment.into_err(open_position)
                    )
                }
                Some(token) if token.kind == TokenKind::CloseBlock => {
                    match self.token_at(self.index + 1) {
                        Some(next)
                            if next.kind == TokenKind::Comment
                                && next.delimiter_length() == delimiter_length =>
                        {
                            self.index += 2;
                            return Ok(Morpheme::BlockComment {
                                literal,
                                delimiter_length,
                            });
                        }
                        _ => {
                            literal.push_str(&token.sequence);
                            self.advance();
                        }
                    }
                }
                Some(token) => {
                    literal.push_str(&token.sequence);
                    self.advance();
                }
            }
        }
    }
}

/// Strip the closing line's indentation from every content line.
fn strip_indent(content: &str, indent: &str) -> SmartString {
    if indent.is_empty() {
        return content.into();
    }
    let mut stripped = SmartString::new();
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            stripped.push('\n');
        }
        stripped.push_str(line.strip_prefix(indent).unwrap_or(line));
    }
    stripped
}
