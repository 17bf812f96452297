//! Module defining the value model.
//!
//! Values are immutable and cheap to clone: compound values share their
//! payload through [`Shared`] references. Values form a DAG; the core never
//! creates reference cycles.

use crate::{
    ImmutableString, Script, Selector, SendSync, Shared, StaticVec, FLOAT, INT,
};
use indexmap::IndexMap;
use num_traits::ToPrimitive;
use std::any::Any;
use std::fmt;

/// An insertion-order-preserving map from string keys to values.
pub type Dict = IndexMap<ImmutableString, Value, ahash::RandomState>;

/// Type of a [`Value`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ValueType {
    /// The nil value.
    Nil,
    /// A boolean value.
    Boolean,
    /// An integer value.
    Integer,
    /// A floating-point value.
    Real,
    /// A string value.
    String,
    /// An ordered sequence of values.
    List,
    /// A map from string keys to values.
    Dict,
    /// An ordered sequence of values with element-wise selection.
    Tuple,
    /// A parsed script value.
    Script,
    /// A value paired with a deferred access path.
    Qualified,
    /// An externally defined value, identified by its tag.
    Custom(&'static str),
}

/// Trait for externally defined values.
pub trait CustomValue: fmt::Debug + SendSync {
    /// Tag identifying the custom type.
    fn type_tag(&self) -> &'static str;

    /// Convert this trait object to [`&dyn Any`][Any] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// String representation of the value, if the type has one.
    fn string_value(&self) -> Option<ImmutableString> {
        None
    }
}

/// A script value: a parsed [`Script`] plus its source text when known.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptValue {
    /// The parsed script.
    pub script: Script,
    /// The source text, if known.
    pub source: Option<ImmutableString>,
}

impl ScriptValue {
    /// Create a new [`ScriptValue`].
    #[inline(always)]
    #[must_use]
    pub fn new(script: Script, source: Option<ImmutableString>) -> Self {
        Self { script, source }
    }
}

/// A source value paired with an ordered list of selectors, representing a
/// deferred access path.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedValue {
    /// The source value.
    pub source: Value,
    /// The selectors, applied first to last.
    pub selectors: StaticVec<Selector>,
}

impl QualifiedValue {
    /// Create a new [`QualifiedValue`] with an empty selector list.
    #[inline(always)]
    #[must_use]
    pub fn new(source: Value) -> Self {
        Self {
            source,
            selectors: StaticVec::new(),
        }
    }

    /// Return a copy of this value with one more selector appended.
    ///
    /// Adjacent keyed selectors coalesce: appending a keyed selector after a
    /// keyed selector extends the latter's key list instead.
    #[must_use]
    pub fn with_selector(&self, selector: Selector) -> Self {
        let mut selectors = self.selectors.clone();
        let appended = match (selectors.last_mut(), selector) {
            (Some(Selector::Keyed(last)), Selector::Keyed(keyed)) => {
                last.keys.extend(keyed.keys);
                None
            }
            (_, selector) => Some(selector),
        };
        if let Some(selector) = appended {
            selectors.push(selector);
        }
        Self {
            source: self.source.clone(),
            selectors,
        }
    }
}

/// A Helena value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The nil value.
    Nil,
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(INT),
    /// A floating-point value.
    Real(FLOAT),
    /// A string value.
    String(ImmutableString),
    /// A list value.
    List(Shared<Vec<Value>>),
    /// A dict value.
    Dict(Shared<Dict>),
    /// A tuple value.
    Tuple(Shared<Vec<Value>>),
    /// A script value.
    Script(Shared<ScriptValue>),
    /// A qualified value.
    Qualified(Shared<QualifiedValue>),
    /// An externally defined value.
    Custom(Shared<dyn CustomValue>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Script(a), Self::Script(b)) => a == b,
            (Self::Qualified(a), Self::Qualified(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Shared::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Default for Value {
    #[inline(always)]
    fn default() -> Self {
        Self::Nil
    }
}

impl From<bool> for Value {
    #[inline(always)]
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<INT> for Value {
    #[inline(always)]
    fn from(value: INT) -> Self {
        Self::Integer(value)
    }
}

impl From<FLOAT> for Value {
    #[inline(always)]
    fn from(value: FLOAT) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    #[inline(always)]
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<ImmutableString> for Value {
    #[inline(always)]
    fn from(value: ImmutableString) -> Self {
        Self::String(value)
    }
}

impl Value {
    /// Create a string value.
    #[inline(always)]
    #[must_use]
    pub fn string(value: impl Into<ImmutableString>) -> Self {
        Self::String(value.into())
    }
    /// Create a list value.
    #[inline(always)]
    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Self::List(Shared::new(items))
    }
    /// Create a dict value.
    #[inline(always)]
    #[must_use]
    pub fn dict(map: Dict) -> Self {
        Self::Dict(Shared::new(map))
    }
    /// Create a tuple value.
    #[inline(always)]
    #[must_use]
    pub fn tuple(items: Vec<Value>) -> Self {
        Self::Tuple(Shared::new(items))
    }
    /// Create a script value.
    #[inline(always)]
    #[must_use]
    pub fn script(value: ScriptValue) -> Self {
        Self::Script(Shared::new(value))
    }
    /// Create a qualified value.
    #[inline(always)]
    #[must_use]
    pub fn qualified(value: QualifiedValue) -> Self {
        Self::Qualified(Shared::new(value))
    }
    /// Create a custom value.
    #[inline(always)]
    #[must_use]
    pub fn custom(value: impl CustomValue + 'static) -> Self {
        Self::Custom(Shared::new(value))
    }

    /// Type of the value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Nil => ValueType::Nil,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Real(_) => ValueType::Real,
            Self::String(_) => ValueType::String,
            Self::List(_) => ValueType::List,
            Self::Dict(_) => ValueType::Dict,
            Self::Tuple(_) => ValueType::Tuple,
            Self::Script(_) => ValueType::Script,
            Self::Qualified(_) => ValueType::Qualified,
            Self::Custom(custom) => ValueType::Custom(custom.type_tag()),
        }
    }

    /// Is this the nil value?
    #[inline(always)]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// String representation of the value.
    ///
    /// Only booleans, numbers, strings and opting-in custom values have one;
    /// [`None`] means "value has no string representation".
    #[must_use]
    pub fn string_value(&self) -> Option<ImmutableString> {
        match self {
            Self::Boolean(true) => Some("true".into()),
            Self::Boolean(false) => Some("false".into()),
            Self::Integer(i) => Some(i.to_string().into()),
            Self::Real(r) => Some(r.to_string().into()),
            Self::String(s) => Some(s.clone()),
            Self::Custom(custom) => custom.string_value(),
            _ => None,
        }
    }

    /// Boolean conversion.
    ///
    /// Only booleans and the strings `"true"`/`"false"` convert.
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Integer conversion.
    ///
    /// Strings convert through decimal syntax only; reals convert only when
    /// they represent an integer exactly.
    #[must_use]
    pub fn as_integer(&self) -> Option<INT> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Real(r) => {
                if r.is_finite() && r.fract() == 0.0 {
                    r.to_i64()
                } else {
                    None
                }
            }
            Self::String(s) => s.as_str().parse().ok(),
            _ => None,
        }
    }

    /// Real conversion.
    ///
    /// Strings convert through integer and float syntaxes; integers convert
    /// only when the float represents them exactly.
    #[must_use]
    pub fn as_real(&self) -> Option<FLOAT> {
        match self {
            Self::Real(r) => Some(*r),
            Self::Integer(i) => {
                let r = i.to_f64()?;
                if r.to_i64() == Some(*i) {
                    Some(r)
                } else {
                    None
                }
            }
            Self::String(s) => s.as_str().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("[]"),
            Self::Boolean(true) => f.write_str("true"),
            Self::Boolean(false) => f.write_str("false"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write_real(f, *r),
            Self::String(s) => write_literal(f, s),
            Self::List(_) | Self::Dict(_) => write_undisplayable(f, "undisplayable value"),
            Self::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Self::Script(script) => match &script.source {
                Some(source) => write!(f, "{{{}}}", source),
                None => write_undisplayable(f, "undisplayable script"),
            },
            Self::Qualified(qualified) => {
                match &qualified.source {
                    Value::String(name) => write_variable_name(f, name)?,
                    source => write!(f, "{}", source)?,
                }
                for selector in &qualified.selectors {
                    write!(f, "{}", selector)?;
                }
                Ok(())
            }
            Self::Custom(custom) => match custom.string_value() {
                Some(s) => write_literal(f, &s),
                None => write_undisplayable(f, "undisplayable value"),
            },
        }
    }
}

/// Write the undisplayable placeholder. The block-comment form guarantees
/// the output never parses back into a value.
#[inline]
fn write_undisplayable(f: &mut fmt::Formatter<'_>, label: &str) -> fmt::Result {
    write!(f, "{{#{{{}}}#}}", label)
}

fn write_real(f: &mut fmt::Formatter<'_>, r: FLOAT) -> fmt::Result {
    if r.is_finite() && r.fract() == 0.0 {
        write!(f, "{:.1}", r)
    } else {
        write!(f, "{}", r)
    }
}

/// Does this character force a string literal into its quoted form?
#[inline]
fn is_display_special(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '"' | '\\' | '$' | '#' | ';' | '(' | ')' | '{' | '}' | '[' | ']'
        )
}

/// Write a string as a bare literal, or as a quoted and escaped string when
/// it contains special characters.
fn write_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if !s.is_empty() && !s.chars().any(is_display_special) {
        return f.write_str(s);
    }
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '\\' | '"' | '$' | '[' => write!(f, "\\{}", ch)?,
            '\x07' => f.write_str("\\a")?,
            '\x08' => f.write_str("\\b")?,
            '\x0C' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\x0B' => f.write_str("\\v")?,
            _ => write!(f, "{}", ch)?,
        }
    }
    f.write_str("\"")
}

/// Write a variable name the way it appears as a qualified word root: bare
/// when possible, in block form otherwise.
fn write_variable_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if !name.is_empty() && !name.chars().any(is_display_special) {
        f.write_str(name)
    } else {
        write!(f, "{{{}}}", name)
    }
}
