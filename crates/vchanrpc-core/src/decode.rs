use core::fmt;

use crate::ReadCursor;

/// A result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// An error raised while reinterpreting payload bytes, wrapping a [`DecodeErrorKind`].
pub type DecodeError = vchanrpc_error::Error<DecodeErrorKind>;

/// Enum representing different kinds of decode errors.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum DecodeErrorKind {
    /// There are not enough bytes to decode the expected shape.
    NotEnoughBytes {
        /// Number of bytes received.
        received: usize,
        /// Number of bytes expected.
        expected: usize,
    },
    /// A field holds a value that cannot be accepted.
    InvalidField {
        /// Name of the invalid field.
        field: &'static str,
        /// Reason for invalidity.
        reason: &'static str,
    },
    /// Generic error for other cases.
    Other {
        /// Description of the error.
        description: &'static str,
    },
}

impl std::error::Error for DecodeErrorKind {}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughBytes { received, expected } => write!(
                f,
                "not enough bytes provided to decode: received {received} bytes, expected {expected} bytes"
            ),
            Self::InvalidField { field, reason } => write!(f, "invalid `{field}`: {reason}"),
            Self::Other { description } => write!(f, "other ({description})"),
        }
    }
}

/// Constructors for the [`DecodeError`] kinds.
pub trait DecodeErrorExt {
    /// Creates a new "not enough bytes" error.
    fn not_enough_bytes(context: &'static str, received: usize, expected: usize) -> Self;

    /// Creates a new "invalid field" error.
    fn invalid_field(context: &'static str, field: &'static str, reason: &'static str) -> Self;

    /// Creates a new catch-all error.
    fn other(context: &'static str, description: &'static str) -> Self;
}

impl DecodeErrorExt for DecodeError {
    fn not_enough_bytes(context: &'static str, received: usize, expected: usize) -> Self {
        Self::new(context, DecodeErrorKind::NotEnoughBytes { received, expected })
    }

    fn invalid_field(context: &'static str, field: &'static str, reason: &'static str) -> Self {
        Self::new(context, DecodeErrorKind::InvalidField { field, reason })
    }

    fn other(context: &'static str, description: &'static str) -> Self {
        Self::new(context, DecodeErrorKind::Other { description })
    }
}

/// Reads a little-endian `u32` from the start of `bytes`.
///
/// Trailing bytes are ignored, older peers pad some integer payloads.
pub fn read_u32(ctx: &'static str, bytes: &[u8]) -> DecodeResult<u32> {
    ReadCursor::new(bytes).try_read_u32(ctx)
}

/// Reads a capability field which may be sent either as a 32-bit or a 64-bit integer.
///
/// A blob of exactly four bytes is the 32-bit form, widened to `u64`. Anything else must hold at
/// least eight bytes.
pub fn read_u32_or_u64(ctx: &'static str, bytes: &[u8]) -> DecodeResult<u64> {
    let mut cursor = ReadCursor::new(bytes);

    if cursor.len() == size_of::<u32>() {
        cursor.try_read_u32(ctx).map(u64::from)
    } else {
        cursor.try_read_u64(ctx)
    }
}

/// Returns the payload as-is, rejecting an empty one.
pub fn non_empty<'a>(ctx: &'static str, field: &'static str, bytes: &'a [u8]) -> DecodeResult<&'a [u8]> {
    if bytes.is_empty() {
        return Err(DecodeError::invalid_field(ctx, field, "must not be empty"));
    }

    Ok(bytes)
}
