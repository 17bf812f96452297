use helena::{tokenize, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).iter().map(|t| t.kind).collect()
}

#[test]
fn test_tokens_words_and_whitespace() {
    assert_eq!(
        kinds("cmd arg1 arg2"),
        vec![
            TokenKind::Text,
            TokenKind::Whitespace,
            TokenKind::Text,
            TokenKind::Whitespace,
            TokenKind::Text,
        ]
    );

    // Tabs, carriage returns and form feeds coalesce into one run.
    let tokens = tokenize("a \t\r\x0C b");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1].kind, TokenKind::Whitespace);
    assert_eq!(tokens[1].sequence.as_str(), " \t\r\x0C");
}

#[test]
fn test_tokens_singletons() {
    assert_eq!(
        kinds("()[]{}$;*"),
        vec![
            TokenKind::OpenTuple,
            TokenKind::CloseTuple,
            TokenKind::OpenExpression,
            TokenKind::CloseExpression,
            TokenKind::OpenBlock,
            TokenKind::CloseBlock,
            TokenKind::Dollar,
            TokenKind::Semicolon,
            TokenKind::Asterisk,
        ]
    );

    // Dollars do not coalesce; each is a single token.
    assert_eq!(
        kinds("$$$"),
        vec![TokenKind::Dollar, TokenKind::Dollar, TokenKind::Dollar]
    );
}

#[test]
fn test_tokens_newlines() {
    assert_eq!(
        kinds("a\nb"),
        vec![TokenKind::Text, TokenKind::Newline, TokenKind::Text]
    );

    // Each newline is a single token.
    assert_eq!(kinds("\n\n"), vec![TokenKind::Newline, TokenKind::Newline]);
}

#[test]
fn test_tokens_comment_and_delimiter_runs() {
    let tokens = tokenize("###");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].delimiter_length(), 3);

    let tokens = tokenize("\"\"\"");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::StringDelimiter);
    assert_eq!(tokens[0].delimiter_length(), 3);
}

#[test]
fn test_tokens_escape_characters() {
    for (source, expected) in [
        ("\\a", "\x07"),
        ("\\b", "\x08"),
        ("\\f", "\x0C"),
        ("\\n", "\n"),
        ("\\r", "\r"),
        ("\\t", "\t"),
        ("\\v", "\x0B"),
        ("\\\\", "\\"),
        ("\\q", "q"),
        ("\\ ", " "),
    ] {
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 1, "token count for {:?}", source);
        assert_eq!(tokens[0].kind, TokenKind::Escape);
        assert_eq!(tokens[0].literal.as_str(), expected, "literal for {:?}", source);
        assert_eq!(tokens[0].sequence.as_str(), source);
    }
}

#[test]
fn test_tokens_escape_codepoints() {
    // Octal, up to three digits.
    assert_eq!(tokenize("\\101")[0].literal.as_str(), "A");
    assert_eq!(tokenize("\\0")[0].literal.as_str(), "\0");

    // Hexadecimal escapes of increasing width.
    assert_eq!(tokenize("\\x41")[0].literal.as_str(), "A");
    assert_eq!(tokenize("\\u0041")[0].literal.as_str(), "A");
    assert_eq!(tokenize("\\U00000041")[0].literal.as_str(), "A");
    assert_eq!(tokenize("\\u00e9")[0].literal.as_str(), "\u{e9}");

    // Shorter digit runs stop at the first non-digit.
    let tokens = tokenize("\\x4g");
    assert_eq!(tokens[0].literal.as_str(), "\x04");
    assert_eq!(tokens[1].literal.as_str(), "g");

    // No digit at all: the marker stands for itself.
    let tokens = tokenize("\\xzz");
    assert_eq!(tokens[0].literal.as_str(), "x");
    assert_eq!(tokens[1].kind, TokenKind::Text);
    assert_eq!(tokens[1].literal.as_str(), "zz");
}

#[test]
fn test_tokens_escape_at_end_of_input() {
    let tokens = tokenize("a\\");
    assert_eq!(tokens[1].kind, TokenKind::Escape);
    assert_eq!(tokens[1].literal.as_str(), "\\");
}

#[test]
fn test_tokens_continuation() {
    let tokens = tokenize("a \\\n   b");
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Text,
            TokenKind::Whitespace,
            TokenKind::Continuation,
            TokenKind::Text,
        ]
    );
    // The continuation swallows the newline and the next line's leading
    // whitespace, and stands for a single space.
    assert_eq!(tokens[2].literal.as_str(), " ");
    assert_eq!(tokens[2].sequence.as_str(), "\\\n   ");
}

#[test]
fn test_tokens_text_coalescing() {
    // Ordinary characters coalesce into a single token.
    let tokens = tokenize("hello,world.42");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Text);
    assert_eq!(tokens[0].literal.as_str(), "hello,world.42");

    // Escapes break text runs into separate tokens.
    let tokens = tokenize("a\\tb");
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![TokenKind::Text, TokenKind::Escape, TokenKind::Text]
    );
}

#[test]
fn test_tokens_positions() {
    let tokens = tokenize("ab\ncd");
    assert_eq!(tokens[0].position.line(), Some(1));
    assert_eq!(tokens[0].position.column(), Some(1));
    assert_eq!(tokens[1].position.line(), Some(1));
    assert_eq!(tokens[1].position.column(), Some(3));
    assert_eq!(tokens[2].position.line(), Some(2));
    assert_eq!(tokens[2].position.column(), Some(1));
    assert_eq!(tokens[2].position.index(), Some(3));
}
