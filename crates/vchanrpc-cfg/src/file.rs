use core::fmt;

use crate::{PropertySet, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownType { ty: String },
    InvalidValue { ty: String, value: String },
    MalformedLine { line: String },
}

/// A line of configuration text that could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub line: usize,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line;

        match &self.kind {
            ErrorKind::UnknownType { ty } => write!(f, "unknown type at line {line} ({ty})"),
            ErrorKind::InvalidValue { ty, value } => write!(f, "invalid {ty} value at line {line} ({value})"),
            ErrorKind::MalformedLine { line: content } => write!(f, "malformed line {line} ({content})"),
        }
    }
}

/// Loads `key:type:value` lines into `properties`.
///
/// Blank lines and lines starting with `#` are skipped. Every other line that cannot be loaded is
/// reported, and the valid ones are still inserted.
pub fn load(properties: &mut PropertySet, input: &str) -> Result<(), Vec<Error>> {
    let mut errors = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut split = trimmed.splitn(3, ':');

        let (Some(key), Some(ty), Some(value)) = (split.next(), split.next(), split.next()) else {
            errors.push(Error {
                kind: ErrorKind::MalformedLine {
                    line: trimmed.to_owned(),
                },
                line: idx,
            });
            continue;
        };

        match ty {
            "i" => match value.trim().parse::<i64>() {
                Ok(value) => {
                    properties.insert(key.to_owned(), value);
                }
                Err(_) => errors.push(Error {
                    kind: ErrorKind::InvalidValue {
                        ty: ty.to_owned(),
                        value: value.to_owned(),
                    },
                    line: idx,
                }),
            },
            "s" => {
                properties.insert(key.to_owned(), value);
            }
            _ => errors.push(Error {
                kind: ErrorKind::UnknownType { ty: ty.to_owned() },
                line: idx,
            }),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub struct ParseResult {
    pub properties: PropertySet,
    pub errors: Vec<Error>,
}

pub fn parse(input: &str) -> ParseResult {
    let mut properties = PropertySet::new();

    let errors = load(&mut properties, input).err().unwrap_or_default();

    ParseResult { properties, errors }
}

pub fn write(properties: &PropertySet) -> String {
    use fmt::Write as _;

    let mut buf = String::new();

    for (key, value) in properties.iter() {
        // Writing into a String never fails.
        let _ = match value {
            Value::Int(value) => writeln!(buf, "{key}:i:{value}"),
            Value::Str(value) => writeln!(buf, "{key}:s:{value}"),
        };
    }

    buf
}
