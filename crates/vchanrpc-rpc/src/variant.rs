use core::fmt;

/// The type tag of a [`Variant`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Blob,
    UInt32,
    /// Any other type tag the runtime knows about (strings, signed integers, …)
    Other(u16),
}

/// A typed value attached to a message
#[derive(Clone, PartialEq, Eq)]
pub enum Variant {
    Blob(Vec<u8>),
    UInt32(u32),
    Other { kind: u16 },
}

impl Variant {
    pub fn kind(&self) -> VariantKind {
        match self {
            Variant::Blob(_) => VariantKind::Blob,
            Variant::UInt32(_) => VariantKind::UInt32,
            Variant::Other { kind } => VariantKind::Other(*kind),
        }
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, Variant::Blob(_))
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Variant::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Variant::UInt32(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Blobs can be megabytes of clipboard content, only show their size.
        match self {
            Variant::Blob(bytes) => write!(f, "Blob({} bytes)", bytes.len()),
            Variant::UInt32(value) => write!(f, "UInt32({value:#010x})"),
            Variant::Other { kind } => write!(f, "Other({kind})"),
        }
    }
}

impl From<Vec<u8>> for Variant {
    fn from(value: Vec<u8>) -> Self {
        Variant::Blob(value)
    }
}

impl From<&[u8]> for Variant {
    fn from(value: &[u8]) -> Self {
        Variant::Blob(value.to_vec())
    }
}

impl From<u32> for Variant {
    fn from(value: u32) -> Self {
        Variant::UInt32(value)
    }
}

/// A message parameter with its declared name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParam {
    pub name: String,
    pub value: Variant,
}

impl NamedParam {
    pub fn new(name: impl Into<String>, value: impl Into<Variant>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Older peers append parameters without a name.
    pub fn unnamed(value: impl Into<Variant>) -> Self {
        Self::new(String::new(), value)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }
}
