use helena::{Compiler, OpCode, ParseErrorType, Program, Value};

fn compile(source: &str) -> Program {
    Compiler::new()
        .compile_source(source)
        .expect("source should compile")
}

fn constants_as_strings(program: &Program) -> Vec<String> {
    program
        .constants
        .iter()
        .map(|value| {
            value
                .string_value()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("{}", value))
        })
        .collect()
}

#[test]
fn test_compile_sentence() {
    let program = compile("cmd arg");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::PushConstant,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
    assert_eq!(constants_as_strings(&program), vec!["cmd", "arg"]);
}

#[test]
fn test_compile_is_deterministic() {
    let source = "cmd $var(key) \"a $b c\"; other {block}";
    assert_eq!(compile(source), compile(source));
}

#[test]
fn test_compile_empty_script() {
    let program = compile("");
    assert_eq!(program.opcodes, vec![OpCode::PushNil]);
    assert!(program.constants.is_empty());
}

#[test]
fn test_compile_empty_expression() {
    let program = compile("[]");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushNil,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_tuple() {
    let program = compile("(a b)");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::PushConstant,
            OpCode::CloseFrame,
            OpCode::MakeTuple,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_block() {
    let program = compile("{a b}");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
    match &program.constants[0] {
        Value::Script(script) => {
            assert_eq!(script.source.as_ref().map(|s| s.as_str()), Some("a b"));
            assert_eq!(script.script.sentences.len(), 1);
        }
        other => panic!("expected a script constant, got {:?}", other),
    }
}

#[test]
fn test_compile_substitution() {
    let program = compile("$var");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::ResolveValue,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
    assert_eq!(constants_as_strings(&program), vec!["var"]);
}

#[test]
fn test_compile_substitution_levels() {
    // Each extra dollar resolves the value one more time, after the
    // selectors.
    let program = compile("$$$var");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::ResolveValue,
            OpCode::ResolveValue,
            OpCode::ResolveValue,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_substitution_selectors() {
    // Keyed selector: the key list is a plain frame, read in place.
    let program = compile("$var(key)");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::ResolveValue,
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::CloseFrame,
            OpCode::SelectKeys,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );

    // Indexed selector: the index expression pushes one value.
    let program = compile("$var[idx]");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::ResolveValue,
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
            OpCode::SelectIndex,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );

    // Rule selector: one tuple per rule sentence.
    let program = compile("$var{rule arg}");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::ResolveValue,
            OpCode::OpenFrame,
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::PushConstant,
            OpCode::CloseFrame,
            OpCode::MakeTuple,
            OpCode::CloseFrame,
            OpCode::SelectRules,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_expansion() {
    let program = compile("cmd $*args");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::PushConstant,
            OpCode::ResolveValue,
            OpCode::ExpandValue,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_qualified() {
    // No ResolveValue: the qualified word builds a deferred access path.
    let program = compile("var(key)");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::SetSource,
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::CloseFrame,
            OpCode::SelectKeys,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_strings() {
    let program = compile("\"a $var b\"");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::PushConstant,
            OpCode::ResolveValue,
            OpCode::PushConstant,
            OpCode::CloseFrame,
            OpCode::JoinStrings,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
    assert_eq!(constants_as_strings(&program), vec!["a ", "var", " b"]);

    // An empty string still joins an empty frame.
    let program = compile("\"\"");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::OpenFrame,
            OpCode::CloseFrame,
            OpCode::JoinStrings,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_compound() {
    let program = compile("pre$var");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::OpenFrame,
            OpCode::PushConstant,
            OpCode::PushConstant,
            OpCode::ResolveValue,
            OpCode::CloseFrame,
            OpCode::JoinStrings,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_ignored_words() {
    // Comments compile to nothing; the sentence frame stays empty.
    let program = compile("# just a comment");
    assert_eq!(
        program.opcodes,
        vec![
            OpCode::OpenFrame,
            OpCode::CloseFrame,
            OpCode::EvaluateSentence,
            OpCode::PushResult,
        ]
    );
}

#[test]
fn test_compile_invalid_words() {
    let err = Compiler::new()
        .compile_source("a\"b\"")
        .expect_err("should not compile");
    assert_eq!(err.error_type(), ParseErrorType::InvalidWordStructure);
}

#[test]
fn test_compile_positions() {
    let program = Compiler::new()
        .compile_source("cmd arg")
        .expect("source should compile");
    assert!(program.positions.is_none());

    let program = Compiler::with_positions()
        .compile_source("cmd arg")
        .expect("source should compile");
    let positions = program.positions.as_ref().expect("positions captured");
    assert_eq!(positions.len(), program.opcodes.len());
    assert!(positions[0].is_some());
}
