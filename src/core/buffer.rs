/*!
 * Bounded String Buffers
 *
 * Copy and append into fixed-capacity byte buffers holding NUL-terminated
 * strings. Both operations are all-or-nothing: they either write the whole
 * source plus a terminator, or leave the destination exactly as it was.
 * Nothing is ever silently truncated (see [`copy_truncating`] for that).
 *
 * [`copy_truncating`]: super::platform::copy_truncating
 */

use super::errors::{BufferError, BufferResult};
use super::platform::bounded_len;
use std::fmt;

/// Copy the C string in `src` into `dest`
///
/// `src` ends at its first NUL or at the end of the slice. The copy succeeds
/// only if the string and its terminator fit in `dest.len()` bytes.
///
/// # Returns
/// - `Ok(())` with `dest` holding `src` and a terminator
/// - `Err(BufferError::Overflow)` with `dest` unmodified
pub fn copy_bounded(dest: &mut [u8], src: &[u8]) -> BufferResult<()> {
    let len = bounded_len(src, src.len());
    if len >= dest.len() {
        return Err(BufferError::Overflow {
            needed: len + 1,
            capacity: dest.len(),
        });
    }

    dest[..len].copy_from_slice(&src[..len]);
    dest[len] = 0;
    Ok(())
}

/// Append the C string in `src` to the C string already in `dest`
///
/// Remaining room is `dest.len()` minus the current string length of
/// `dest`. A `dest` with no terminator in range has no room at all.
///
/// # Returns
/// - `Ok(())` with `dest` holding the concatenation and a terminator
/// - `Err(BufferError::Overflow)` with `dest` unmodified
pub fn concat_bounded(dest: &mut [u8], src: &[u8]) -> BufferResult<()> {
    let dest_len = bounded_len(dest, dest.len());
    let remain = dest.len() - dest_len;
    let src_len = bounded_len(src, src.len());
    if remain <= src_len {
        return Err(BufferError::Overflow {
            needed: dest_len + src_len + 1,
            capacity: dest.len(),
        });
    }

    let end = dest_len + src_len;
    dest[dest_len..end].copy_from_slice(&src[..src_len]);
    dest[end] = 0;
    Ok(())
}

/// Fixed-capacity, always-terminated string buffer
///
/// `N` counts the terminator, so the longest string it holds is `N - 1`
/// bytes. Content only ever comes from `&str` input and is copied whole,
/// so it stays valid UTF-8.
#[derive(Clone)]
pub struct BoundedBuf<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> BoundedBuf<N> {
    /// Create an empty buffer
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { data: [0; N] }
    }

    /// Total capacity including the terminator
    #[inline]
    #[must_use]
    pub const fn capacity() -> usize {
        N
    }

    /// Replace the contents with `s`
    pub fn copy_from(&mut self, s: &str) -> BufferResult<()> {
        copy_bounded(&mut self.data, s.as_bytes())
    }

    /// Append `s` to the contents
    pub fn push_str(&mut self, s: &str) -> BufferResult<()> {
        concat_bounded(&mut self.data, s.as_bytes())
    }

    /// Current string length, excluding the terminator
    #[inline]
    pub fn len(&self) -> usize {
        bounded_len(&self.data, N)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content bytes, excluding the terminator
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Content bytes including the terminator
    ///
    /// Empty for a zero-capacity buffer.
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        let end = (self.len() + 1).min(N);
        &self.data[..end]
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Empty the buffer
    #[inline]
    pub fn clear(&mut self) {
        if let Some(first) = self.data.first_mut() {
            *first = 0;
        }
    }
}

impl<const N: usize> Default for BoundedBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TryFrom<&str> for BoundedBuf<N> {
    type Error = BufferError;

    fn try_from(s: &str) -> BufferResult<Self> {
        let mut buf = Self::new();
        buf.copy_from(s)?;
        Ok(buf)
    }
}

// Bytes past the terminator are stale and take no part in equality
impl<const N: usize> PartialEq for BoundedBuf<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for BoundedBuf<N> {}

impl<const N: usize> PartialEq<str> for BoundedBuf<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> AsRef<[u8]> for BoundedBuf<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const N: usize> fmt::Debug for BoundedBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBuf")
            .field("capacity", &N)
            .field("content", &self.as_str())
            .finish()
    }
}

impl<const N: usize> fmt::Display for BoundedBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
