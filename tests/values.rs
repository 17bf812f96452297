use helena::{
    tokenize, Compiler, Dict, Executor, Morpheme, Parser, ResultCode, ScriptValue, Value,
    ValueType, WordOrValue, FLOAT, INT,
};

#[test]
fn test_values_types() {
    assert_eq!(Value::Nil.value_type(), ValueType::Nil);
    assert_eq!(Value::Boolean(true).value_type(), ValueType::Boolean);
    assert_eq!(Value::Integer(1).value_type(), ValueType::Integer);
    assert_eq!(Value::Real(1.5).value_type(), ValueType::Real);
    assert_eq!(Value::string("x").value_type(), ValueType::String);
    assert_eq!(Value::list(vec![]).value_type(), ValueType::List);
    assert_eq!(Value::dict(Dict::default()).value_type(), ValueType::Dict);
    assert_eq!(Value::tuple(vec![]).value_type(), ValueType::Tuple);
}

#[test]
fn test_values_boolean_conversions() {
    assert_eq!(Value::Boolean(true).as_boolean(), Some(true));
    assert_eq!(Value::string("true").as_boolean(), Some(true));
    assert_eq!(Value::string("false").as_boolean(), Some(false));

    // Only the exact strings round-trip.
    assert_eq!(Value::string("TRUE").as_boolean(), None);
    assert_eq!(Value::string("1").as_boolean(), None);
    assert_eq!(Value::Integer(1).as_boolean(), None);
}

#[test]
fn test_values_integer_conversions() {
    assert_eq!(Value::Integer(42).as_integer(), Some(42));
    assert_eq!(Value::string("42").as_integer(), Some(42));
    assert_eq!(Value::string("-7").as_integer(), Some(-7));

    // Decimal only.
    assert_eq!(Value::string("0x10").as_integer(), None);
    assert_eq!(Value::string("1.0").as_integer(), None);

    // Reals convert only when exactly integral.
    assert_eq!(Value::Real(2.0).as_integer(), Some(2));
    assert_eq!(Value::Real(2.5).as_integer(), None);
    assert_eq!(Value::Real(FLOAT::INFINITY).as_integer(), None);
    assert_eq!(Value::Real(1e300).as_integer(), None);
}

#[test]
fn test_values_real_conversions() {
    assert_eq!(Value::Real(1.5).as_real(), Some(1.5));
    assert_eq!(Value::string("1.5").as_real(), Some(1.5));
    assert_eq!(Value::string("42").as_real(), Some(42.0));

    // Small integers are exactly representable.
    assert_eq!(Value::Integer(42).as_real(), Some(42.0));

    // Huge integers are not.
    assert_eq!(Value::Integer(INT::MAX).as_real(), None);
}

#[test]
fn test_values_string_representations() {
    assert_eq!(
        Value::Boolean(true).string_value().map(|s| s.to_string()),
        Some("true".to_string())
    );
    assert_eq!(
        Value::Integer(42).string_value().map(|s| s.to_string()),
        Some("42".to_string())
    );
    assert_eq!(Value::Nil.string_value(), None);
    assert_eq!(Value::list(vec![]).string_value(), None);
    assert_eq!(Value::tuple(vec![]).string_value(), None);
}

#[test]
fn test_values_display_simple() {
    assert_eq!(Value::Nil.to_string(), "[]");
    assert_eq!(Value::Boolean(true).to_string(), "true");
    assert_eq!(Value::Boolean(false).to_string(), "false");
    assert_eq!(Value::Integer(42).to_string(), "42");
    assert_eq!(Value::Real(1.5).to_string(), "1.5");
    assert_eq!(Value::Real(1.0).to_string(), "1.0");
    assert_eq!(Value::string("hello").to_string(), "hello");
    assert_eq!(Value::string("").to_string(), "\"\"");
}

#[test]
fn test_values_display_quoting() {
    assert_eq!(
        Value::string("hello world").to_string(),
        "\"hello world\""
    );
    assert_eq!(Value::string("a\"b").to_string(), "\"a\\\"b\"");
    assert_eq!(Value::string("a\\b").to_string(), "\"a\\\\b\"");
    assert_eq!(Value::string("a$b").to_string(), "\"a\\$b\"");
    assert_eq!(Value::string("a\nb").to_string(), "\"a\\nb\"");
    assert_eq!(Value::string("a#b").to_string(), "\"a#b\"");
    assert_eq!(Value::string("a(b)c").to_string(), "\"a(b)c\"");
}

/// Displaying a string and parsing the result back yields a single word
/// evaluating to the original string.
#[test]
fn test_values_display_round_trip() {
    for original in [
        "hello",
        "hello world",
        "quote\"inside",
        "back\\slash",
        "dollar$sign",
        "hash#tag",
        "semi;colon",
        "new\nline",
        "tab\there",
        "(parens)",
        "{braces}",
        "[brackets]",
        "bell\x07ring",
    ] {
        let displayed = Value::string(original).to_string();
        let tokens = tokenize(&displayed);
        let script = Parser::new(&tokens)
            .parse()
            .unwrap_or_else(|err| panic!("display of {:?} should parse: {}", original, err));
        assert_eq!(script.sentences.len(), 1, "display of {:?}", original);
        assert_eq!(script.sentences[0].words.len(), 1, "display of {:?}", original);
        let word = match &script.sentences[0].words[0] {
            WordOrValue::Word(word) => word.clone(),
            WordOrValue::Value(_) => panic!("expected a parsed word"),
        };
        let program = Compiler::new()
            .compile_word(&word)
            .expect("displayed word should compile");
        let result = Executor::default().execute_program(&program);
        assert_eq!(result.code, ResultCode::Ok, "display of {:?}", original);
        assert_eq!(
            result.value,
            Value::string(original),
            "display of {:?}",
            original
        );
    }
}

#[test]
fn test_values_display_compounds() {
    assert_eq!(
        Value::tuple(vec![
            Value::string("a"),
            Value::Integer(1),
            Value::tuple(vec![Value::string("b")]),
        ])
        .to_string(),
        "(a 1 (b))"
    );

    // Lists and dicts have no parseable form.
    assert_eq!(
        Value::list(vec![]).to_string(),
        "{#{undisplayable value}#}"
    );
    assert_eq!(
        Value::dict(Dict::default()).to_string(),
        "{#{undisplayable value}#}"
    );
}

#[test]
fn test_values_display_scripts() {
    let tokens = tokenize("cmd a b");
    let script = Parser::new(&tokens).parse().expect("script should parse");
    let with_source = Value::script(ScriptValue::new(script.clone(), Some("cmd a b".into())));
    assert_eq!(with_source.to_string(), "{cmd a b}");

    let without_source = Value::script(ScriptValue::new(script, None));
    assert_eq!(without_source.to_string(), "{#{undisplayable script}#}");
}

#[test]
fn test_values_dict_preserves_insertion_order() {
    let mut map = Dict::default();
    map.insert("zebra".into(), Value::Integer(1));
    map.insert("alpha".into(), Value::Integer(2));
    map.insert("mike".into(), Value::Integer(3));
    let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["zebra", "alpha", "mike"]);
}

#[test]
fn test_values_equality() {
    assert_eq!(Value::string("a"), Value::string("a"));
    assert_ne!(Value::string("a"), Value::string("b"));
    assert_ne!(Value::string("1"), Value::Integer(1));
    assert_eq!(
        Value::tuple(vec![Value::Integer(1)]),
        Value::tuple(vec![Value::Integer(1)])
    );
    assert_ne!(Value::tuple(vec![]), Value::list(vec![]));
}

#[test]
fn test_values_block_script_constants() {
    // A block word becomes a script value carrying its source.
    let tokens = tokenize("{a $b}");
    let script = Parser::new(&tokens).parse().expect("script should parse");
    let word = match &script.sentences[0].words[0] {
        WordOrValue::Word(word) => word.clone(),
        WordOrValue::Value(_) => panic!("expected a parsed word"),
    };
    assert!(matches!(&word.morphemes[0], Morpheme::Block { .. }));
    let program = Compiler::new()
        .compile_word(&word)
        .expect("word should compile");
    let result = Executor::default().execute_program(&program);
    match &result.value {
        Value::Script(value) => {
            assert_eq!(value.source.as_ref().map(|s| s.as_str()), Some("a $b"));
        }
        other => panic!("expected a script value, got {:?}", other),
    }
}
