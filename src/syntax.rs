//! Module implementing the word-shape checker.
//!
//! Words are classified on demand, independently of compilation. The checker
//! only validates shape and counts stems; lowering to opcodes is the
//! [compiler's][crate::Compiler] job.

use crate::ast::{Morpheme, Word};

/// Shape of a word.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum WordType {
    /// A single morpheme of a root kind.
    Root,
    /// Two or more stems concatenated as strings.
    Compound,
    /// A substitution chain resolving to a single value.
    Substitution,
    /// A root morpheme followed by one or more selectors.
    Qualified,
    /// A single comment morpheme.
    Ignored,
    /// Any other shape.
    Invalid,
}

/// Classify a word.
#[must_use]
pub fn check_word(word: &Word) -> WordType {
    let morphemes = &word.morphemes[..];
    match morphemes {
        [] => WordType::Invalid,
        [morpheme] => check_single(morpheme),
        _ => check_multi(morphemes),
    }
}

fn check_single(morpheme: &Morpheme) -> WordType {
    match morpheme {
        Morpheme::LineComment { .. } | Morpheme::BlockComment { .. } => WordType::Ignored,
        Morpheme::SubstituteNext { .. } => WordType::Invalid,
        _ => WordType::Root,
    }
}

fn check_multi(morphemes: &[Morpheme]) -> WordType {
    if morphemes.iter().any(Morpheme::is_comment) {
        return WordType::Invalid;
    }
    match &morphemes[0] {
        // A tuple or block root must be followed by selectors only.
        Morpheme::Tuple(_) | Morpheme::Block { .. } => check_qualified(morphemes),
        Morpheme::Literal(_) => match &morphemes[1] {
            // A literal root followed by a tuple or block is qualified;
            // followed by anything else it concatenates.
            Morpheme::Tuple(_) | Morpheme::Block { .. } => check_qualified(morphemes),
            _ => check_compound(morphemes),
        },
        Morpheme::SubstituteNext { .. } => match substitution_chain_end(morphemes, 0) {
            // A single chain covering the whole word resolves to one value;
            // anything more makes it a compound.
            Some(end) if end == morphemes.len() => WordType::Substitution,
            Some(_) => check_compound(morphemes),
            None => WordType::Invalid,
        },
        Morpheme::Expression(_) => check_compound(morphemes),
        _ => WordType::Invalid,
    }
}

fn check_qualified(morphemes: &[Morpheme]) -> WordType {
    for morpheme in &morphemes[1..] {
        if !is_selector(morpheme) {
            return WordType::Invalid;
        }
    }
    WordType::Qualified
}

fn check_compound(morphemes: &[Morpheme]) -> WordType {
    let mut i = 0;
    while i < morphemes.len() {
        match &morphemes[i] {
            Morpheme::Literal(_) | Morpheme::Expression(_) => i += 1,
            Morpheme::SubstituteNext { .. } => match substitution_chain_end(morphemes, i) {
                Some(end) => i = end,
                None => return WordType::Invalid,
            },
            // Tuples and blocks only appear inside substitution chains;
            // strings never mix with other morphemes.
            _ => return WordType::Invalid,
        }
    }
    WordType::Compound
}

/// Is this morpheme usable as a selector?
#[inline]
pub(crate) fn is_selector(morpheme: &Morpheme) -> bool {
    matches!(
        morpheme,
        Morpheme::Tuple(_) | Morpheme::Block { .. } | Morpheme::Expression(_)
    )
}

/// End of the substitution chain starting at `start`.
///
/// `morphemes[start]` must be a [`SubstituteNext`][Morpheme::SubstituteNext].
/// The chain consumes the selectable morpheme plus any trailing selectors;
/// the returned index is one past the chain. [`None`] means the chain is
/// malformed (no selectable follows).
pub(crate) fn substitution_chain_end(morphemes: &[Morpheme], start: usize) -> Option<usize> {
    debug_assert!(matches!(
        morphemes[start],
        Morpheme::SubstituteNext { .. }
    ));

    let mut i = start + 1;
    match morphemes.get(i)? {
        Morpheme::Literal(_)
        | Morpheme::Tuple(_)
        | Morpheme::Block { .. }
        | Morpheme::Expression(_) => i += 1,
        _ => return None,
    }
    while let Some(morpheme) = morphemes.get(i) {
        if !is_selector(morpheme) {
            break;
        }
        i += 1;
    }
    Some(i)
}
