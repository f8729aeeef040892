use crate::DecodeResult;

/// A cursor for reading little-endian values out of a byte slice.
#[derive(Clone, Debug)]
pub struct ReadCursor<'a> {
    inner: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    /// Create a new `ReadCursor` from a byte slice.
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { inner: bytes, pos: 0 }
    }

    /// Returns the number of bytes remaining.
    #[inline]
    pub const fn len(&self) -> usize {
        self.inner.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no bytes remaining.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a slice of the remaining bytes.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        let idx = core::cmp::min(self.pos, self.inner.len());
        &self.inner[idx..]
    }

    /// Reads a little-endian `u32`, failing if fewer than four bytes remain.
    pub fn try_read_u32(&mut self, ctx: &'static str) -> DecodeResult<u32> {
        let bytes = self.try_read_array::<4>(ctx)?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads a little-endian `u64`, failing if fewer than eight bytes remain.
    pub fn try_read_u64(&mut self, ctx: &'static str) -> DecodeResult<u64> {
        let bytes = self.try_read_array::<8>(ctx)?;
        Ok(u64::from_le_bytes(bytes))
    }

    fn try_read_array<const N: usize>(&mut self, ctx: &'static str) -> DecodeResult<[u8; N]> {
        let this = self.remaining();
        ensure_size!(ctx: ctx, in: this, size: N);

        let mut out = [0u8; N];
        out.copy_from_slice(&this[..N]);
        self.pos += N;

        Ok(out)
    }
}
