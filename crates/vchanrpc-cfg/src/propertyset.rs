use core::fmt;
use std::borrow::Cow;
use std::collections::BTreeMap;

pub type Key = Cow<'static, str>;

/// Key-value store for configuration keys.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    inner: BTreeMap<Key, Value>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let (key, value) = (key.into(), value.into());
        trace!(%key, %value, "PropertySet::insert");
        self.inner.insert(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.inner.remove(key)
    }

    pub fn get<'a, V: ExtractFrom<'a>>(&'a self, key: &str) -> Option<V> {
        let value = self.inner.get(key)?;
        let extracted = V::extract_from(value);

        if extracted.is_none() {
            warn!(key, %value, "Property has an unexpected type");
        }

        extracted
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

/// A configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            Self::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Str(value) => write!(f, "\"{value}\""),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Int(i64::from(value))
    }
}

/// Typed extraction out of a [`Value`]
pub trait ExtractFrom<'a>: Sized {
    fn extract_from(value: &'a Value) -> Option<Self>;
}

impl<'a> ExtractFrom<'a> for &'a str {
    fn extract_from(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl ExtractFrom<'_> for i64 {
    fn extract_from(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl ExtractFrom<'_> for u32 {
    fn extract_from(value: &Value) -> Option<Self> {
        value.as_int().and_then(|v| u32::try_from(v).ok())
    }
}

impl ExtractFrom<'_> for usize {
    fn extract_from(value: &Value) -> Option<Self> {
        value.as_int().and_then(|v| usize::try_from(v).ok())
    }
}

/// Anything that is not 0 is considered to be `true`.
impl ExtractFrom<'_> for bool {
    fn extract_from(value: &Value) -> Option<Self> {
        value.as_int().map(|value| value != 0)
    }
}
