//! Parameter keys, parameter sets and bind options.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use sea_orm::Value;

/// Identifies a placeholder or a result column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    /// 1-based position, as used by `?` placeholders and column numbers.
    Position(usize),
    /// Named placeholder such as `:id`.
    Name(String),
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Position(pos) => write!(f, "{}", pos),
            ParamKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for ParamKey {
    fn from(pos: usize) -> Self {
        ParamKey::Position(pos)
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Name(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Name(name)
    }
}

/// Values keyed by placeholder, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<ParamKey, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a positional set; the first value is bound at position 1.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| (ParamKey::Position(idx + 1), value.into()))
            .collect()
    }

    pub fn with(mut self, key: impl Into<ParamKey>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<ParamKey>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &ParamKey) -> Option<&Value> {
        self.0.get(key)
    }

    /// Copy every entry of `other` into `self`, replacing values on key collision.
    pub fn merge(&mut self, other: &Params) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Returns the merged set without touching `self`.
    pub fn merged(&self, other: Option<&Params>) -> Params {
        let mut merged = self.clone();
        if let Some(other) = other {
            merged.merge(other);
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values in position order when the keys are exactly `1..=n`.
    ///
    /// Returns `None` if any key is named or a position is missing.
    pub fn positional_values(&self) -> Option<Vec<Value>> {
        self.0
            .iter()
            .enumerate()
            .map(|(idx, (key, value))| match key {
                ParamKey::Position(pos) if *pos == idx + 1 => Some(value.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<K: Into<ParamKey>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Params(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a ParamKey, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, ParamKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A shared variable handed to `bind_param` / `bind_column`.
///
/// The driver keeps a handle and reads (or, for columns, writes) it later.
#[derive(Debug, Clone)]
pub struct Variable(Rc<RefCell<Value>>);

impl Variable {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Rc::new(RefCell::new(value.into())))
    }

    pub fn get(&self) -> Value {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: impl Into<Value>) {
        *self.0.borrow_mut() = value.into();
    }
}

/// Declared type of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Null,
    Int,
    Str,
    Lob,
    Bool,
}

/// Optional trailing arguments of the bind operations.
///
/// Fields left as `None` are not passed on, so the driver applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindOptions {
    pub param_type: Option<ParamType>,
    pub length: Option<usize>,
    pub driver_options: Option<Value>,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = Some(param_type);
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_driver_options(mut self, options: impl Into<Value>) -> Self {
        self.driver_options = Some(options.into());
        self
    }
}
