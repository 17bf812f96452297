//! Module defining selectors.
//!
//! A selector extracts a subvalue from a value. Selectors apply element-wise
//! and recursively over tuples, so selecting into a tuple returns the tuple
//! of the selections.

use crate::{EvalResult, SendSync, Shared, StaticVec, Value, INT};
use std::fmt;

/// A selector provided by the command layer, produced by a
/// [`SelectorResolver`][crate::SelectorResolver].
pub trait CustomSelector: fmt::Debug + SendSync {
    /// Apply the selector to a value.
    fn apply(&self, value: &Value) -> EvalResult;
}

/// An operation applied to a value to extract a subvalue.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Selection by integer index.
    Indexed(IndexedSelector),
    /// Selection by one or more keys.
    Keyed(KeyedSelector),
    /// Selection by generic rules, resolved externally.
    Generic(GenericSelector),
    /// An externally implemented selector.
    Custom(Shared<dyn CustomSelector>),
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Indexed(a), Self::Indexed(b)) => a == b,
            (Self::Keyed(a), Self::Keyed(b)) => a == b,
            (Self::Generic(a), Self::Generic(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Shared::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Selector {
    /// Apply the selector to a value.
    ///
    /// Generic selectors cannot be applied directly; they need a
    /// [`SelectorResolver`][crate::SelectorResolver] and are resolved by the
    /// executor before application.
    pub fn apply(&self, value: &Value) -> EvalResult {
        match self {
            Self::Indexed(selector) => selector.apply(value),
            Self::Keyed(selector) => selector.apply(value),
            Self::Generic(selector) => selector.apply(value),
            Self::Custom(selector) => apply_custom(&**selector, value),
        }
    }
}

/// Custom selectors handle tuple recursion here so that implementors do not
/// have to.
fn apply_custom(selector: &dyn CustomSelector, value: &Value) -> EvalResult {
    if let Value::Tuple(items) = value {
        return map_tuple(items, |item| apply_custom(selector, item));
    }
    selector.apply(value)
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indexed(selector) => fmt::Display::fmt(selector, f),
            Self::Keyed(selector) => fmt::Display::fmt(selector, f),
            Self::Generic(selector) => fmt::Display::fmt(selector, f),
            Self::Custom(_) => f.write_str("{#{custom selector}#}"),
        }
    }
}

/// Selection of a single element by integer index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedSelector {
    /// The index value. Must be an integer or an integer string at
    /// application time.
    pub index: Value,
}

impl IndexedSelector {
    /// Create a new [`IndexedSelector`].
    #[inline(always)]
    #[must_use]
    pub fn new(index: Value) -> Self {
        Self { index }
    }

    /// Apply the selector to a value.
    ///
    /// The value must be index-selectable: a list, a string, or a tuple of
    /// index-selectable values.
    pub fn apply(&self, value: &Value) -> EvalResult {
        select_index(value, &self.index)
    }
}

impl fmt::Display for IndexedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.index)
    }
}

/// Selection by a non-empty sequence of keys, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedSelector {
    /// The keys, applied first to last.
    pub keys: StaticVec<Value>,
}

impl KeyedSelector {
    /// Create a new [`KeyedSelector`].
    ///
    /// The key list must not be empty; applying an empty selector fails.
    #[inline(always)]
    #[must_use]
    pub fn new(keys: StaticVec<Value>) -> Self {
        Self { keys }
    }

    /// Apply the selector to a value.
    ///
    /// The value must be key-selectable at every step: a dict, or a tuple of
    /// key-selectable values.
    pub fn apply(&self, value: &Value) -> EvalResult {
        if self.keys.is_empty() {
            return EvalResult::error("empty selector");
        }
        let mut current = value.clone();
        for key in &self.keys {
            let result = select_key(&current, key);
            if !result.is_ok() {
                return result;
            }
            current = result.value;
        }
        EvalResult::ok(current)
    }
}

impl fmt::Display for KeyedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            write!(f, "({})", key)?;
        }
        Ok(())
    }
}

/// Selection by arbitrary rules, resolved through the external
/// [`SelectorResolver`][crate::SelectorResolver].
#[derive(Debug, Clone, PartialEq)]
pub struct GenericSelector {
    /// The rules. Each rule is a tuple of the words of one rule sentence.
    pub rules: Vec<Value>,
}

impl GenericSelector {
    /// Create a new [`GenericSelector`].
    #[inline(always)]
    #[must_use]
    pub fn new(rules: Vec<Value>) -> Self {
        Self { rules }
    }

    /// Apply the selector to a value.
    ///
    /// Without a resolver there is nothing to apply; the executor resolves
    /// generic selectors before application.
    pub fn apply(&self, value: &Value) -> EvalResult {
        let _ = value;
        EvalResult::error("value is not selectable")
    }
}

impl fmt::Display for GenericSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            // A rule is a tuple of the words of one rule sentence.
            match rule {
                Value::Tuple(words) => {
                    for (j, word) in words.iter().enumerate() {
                        if j > 0 {
                            f.write_str(" ")?;
                        }
                        write!(f, "{}", word)?;
                    }
                }
                other => write!(f, "{}", other)?,
            }
        }
        f.write_str("}")
    }
}

/// Apply `f` to every element of a tuple, collecting the results into a new
/// tuple. The first non-OK result aborts the recursion.
pub(crate) fn map_tuple(
    items: &[Value],
    f: impl Fn(&Value) -> EvalResult,
) -> EvalResult {
    let mut selected = Vec::with_capacity(items.len());
    for item in items {
        let result = f(item);
        if !result.is_ok() {
            return result;
        }
        selected.push(result.value);
    }
    EvalResult::ok(Value::tuple(selected))
}

fn select_index(value: &Value, index: &Value) -> EvalResult {
    match value {
        Value::Tuple(items) => map_tuple(items, |item| select_index(item, index)),
        Value::List(items) => match resolve_index(index, items.len()) {
            Ok(i) => EvalResult::ok(items[i].clone()),
            Err(err) => err,
        },
        Value::String(s) => match resolve_index(index, s.chars().count()) {
            Ok(i) => {
                let ch = s.chars().nth(i).expect("index is in range");
                EvalResult::ok(Value::String(ch.into()))
            }
            Err(err) => err,
        },
        _ => EvalResult::error("value is not index-selectable"),
    }
}

fn select_key(value: &Value, key: &Value) -> EvalResult {
    match value {
        Value::Tuple(items) => map_tuple(items, |item| select_key(item, key)),
        Value::Dict(map) => {
            let name = match key.string_value() {
                Some(name) => name,
                None => return EvalResult::error("invalid key"),
            };
            match map.get(name.as_str()) {
                Some(found) => EvalResult::ok(found.clone()),
                None => EvalResult::error("unknown key"),
            }
        }
        _ => EvalResult::error("value is not key-selectable"),
    }
}

/// Check an index value against a length, producing a usable offset.
fn resolve_index(index: &Value, length: usize) -> Result<usize, EvalResult> {
    let parsed: Option<INT> = match index {
        Value::Integer(i) => Some(*i),
        Value::String(s) => s.as_str().parse().ok(),
        _ => None,
    };
    let i = match parsed {
        Some(i) => i,
        None => {
            return Err(EvalResult::error(format!(
                "invalid integer \"{}\"",
                index
            )))
        }
    };
    if i < 0 || i as usize >= length {
        return Err(EvalResult::error(format!("index out of range \"{}\"", i)));
    }
    Ok(i as usize)
}
