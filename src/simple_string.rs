//! Fixed-capacity ASCII string used as the shell's command buffer.
//!
//! Inspired by `heapless::String`, but tiny and purpose-built: no heap and
//! no `alloc`.

/// Errors that can occur when pushing into a [`FixedString`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedStringError {
    NoCapacity,
    NotAscii,
}

/// `FixedString<N>` stores at most `N` ASCII bytes.
pub struct FixedString<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> FixedString<N> {
    pub const fn new() -> Self {
        Self { buf: [0; N], len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn push_byte(&mut self, byte: u8) -> Result<(), FixedStringError> {
        if !byte.is_ascii() {
            return Err(FixedStringError::NotAscii);
        }
        if self.is_full() {
            return Err(FixedStringError::NoCapacity);
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    pub fn push_str(&mut self, s: &str) -> Result<(), FixedStringError> {
        for byte in s.bytes() {
            self.push_byte(byte)?;
        }
        Ok(())
    }

    /// Remove and return the last byte.
    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.buf[self.len])
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: `push_byte` rejects everything outside ASCII, so the
        // initialized prefix is always valid UTF-8.
        unsafe { core::str::from_utf8_unchecked(&self.buf[..self.len]) }
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self::new()
    }
}
