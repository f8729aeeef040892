#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use core::fmt;

/// Source error which can be stored inside an [`Error`].
pub trait Source: std::error::Error + Sync + Send + 'static {}

impl<T> Source for T where T: std::error::Error + Sync + Send + 'static {}

/// An error holding a context string along a domain-specific kind
#[derive(Debug)]
#[non_exhaustive]
pub struct Error<Kind> {
    /// Where the error was raised, usually a function or operation name
    pub context: &'static str,
    /// Domain-specific error kind
    pub kind: Kind,
    source: Option<Box<dyn std::error::Error + Sync + Send>>,
}

impl<Kind> Error<Kind> {
    /// Creates a new error of the given kind.
    #[cold]
    #[must_use]
    pub fn new(context: &'static str, kind: Kind) -> Self {
        Self {
            context,
            kind,
            source: None,
        }
    }

    /// Attaches a source to this error.
    #[cold]
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Source,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Converts this error into another one with a compatible kind, keeping context and source.
    pub fn into_other_kind<OtherKind>(self) -> Error<OtherKind>
    where
        Kind: Into<OtherKind>,
    {
        Error {
            context: self.context,
            kind: self.kind.into(),
            source: self.source,
        }
    }

    /// Returns the error kind
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Returns a struct for formatting this error along its whole source chain
    pub fn report(&self) -> ErrorReport<'_, Kind> {
        ErrorReport(self)
    }
}

impl<Kind> fmt::Display for Error<Kind>
where
    Kind: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.context, self.kind)
    }
}

impl<Kind> std::error::Error for Error<Kind>
where
    Kind: std::error::Error,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Some(source) = self.kind.source() {
            return Some(source);
        }

        match &self.source {
            Some(e) => Some(e.as_ref()),
            None => None,
        }
    }
}

/// The reporting type to use when logging the final error
pub struct ErrorReport<'a, Kind>(&'a Error<Kind>);

impl<Kind> fmt::Display for ErrorReport<'_, Kind>
where
    Kind: std::error::Error,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::error::Error as _;

        write!(f, "{}", self.0)?;

        let mut next_source = self.0.source();

        while let Some(e) = next_source {
            write!(f, ", caused by: {e}")?;
            next_source = e.source();
        }

        Ok(())
    }
}

/// Wrapper around a `&'static str` which can be used as an error source
#[derive(Debug, PartialEq, Eq)]
pub struct StrError(pub &'static str);

impl std::error::Error for StrError {}

impl fmt::Display for StrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
