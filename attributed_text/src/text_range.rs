// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::Error;

/// A `(start, length)` pair of character offsets into an attributed text.
///
/// This is the form in which ranges are reported to hosts (for example the
/// range of an activated link). APIs that take ranges accept `Range<usize>`;
/// convert with [`TextRange::as_range`] or `Range::from`.
///
/// ## Important
///
/// A `TextRange` does not track the buffer it was taken from. Any replace that
/// overlaps or precedes it makes it stale, and callers must not reuse it after
/// such an edit.
///
/// ## Example
///
/// ```
/// use attributed_text::TextRange;
///
/// let range = TextRange::new(5, 8);
/// assert_eq!(range.end(), 13);
/// assert_eq!(range.as_range(), 5..13);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    start: usize,
    len: usize,
}

impl TextRange {
    /// Creates a range starting at `start` spanning `len` characters.
    #[must_use]
    #[inline]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Returns a `TextRange` for `range`, checked against a text of `text_len` characters.
    #[inline]
    pub fn checked(range: Range<usize>, text_len: usize) -> Result<Self, Error> {
        validate_range(&range, text_len)?;
        Ok(Self {
            start: range.start,
            len: range.end - range.start,
        })
    }

    /// The start offset.
    #[must_use]
    #[inline]
    pub const fn start(self) -> usize {
        self.start
    }

    /// The number of characters covered.
    #[must_use]
    #[inline]
    pub const fn len(self) -> usize {
        self.len
    }

    /// The end offset (exclusive).
    #[must_use]
    #[inline]
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    /// Returns `true` if the range covers no characters.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `offset` lies inside the range.
    #[must_use]
    #[inline]
    pub const fn contains(self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }

    /// Returns this range as a `Range<usize>`.
    #[must_use]
    #[inline]
    pub fn as_range(self) -> Range<usize> {
        self.start..self.end()
    }
}

impl From<TextRange> for Range<usize> {
    #[inline]
    fn from(value: TextRange) -> Self {
        value.as_range()
    }
}

impl From<Range<usize>> for TextRange {
    /// Converts a `Range<usize>`; inverted ranges become empty at `start`.
    #[inline]
    fn from(value: Range<usize>) -> Self {
        Self {
            start: value.start,
            len: value.end.saturating_sub(value.start),
        }
    }
}

impl core::fmt::Display for TextRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{{{}, {}}}", self.start, self.len)
    }
}

#[inline]
pub(crate) fn validate_range(range: &Range<usize>, text_len: usize) -> Result<(), Error> {
    if range.start > range.end {
        return Err(Error::invalid_range(range.start, range.end, text_len));
    }
    if range.end > text_len {
        return Err(Error::invalid_bounds(range.start, range.end, text_len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{TextRange, validate_range};
    use crate::ErrorKind;

    #[test]
    fn validates_ok_ranges() {
        assert!(validate_range(&(0..0), 6).is_ok());
        assert!(validate_range(&(0..6), 6).is_ok());
        assert_eq!(TextRange::checked(1..3, 6), Ok(TextRange::new(1, 2)));
    }

    #[test]
    #[expect(
        clippy::reversed_empty_ranges,
        reason = "We want an invalid range for testing."
    )]
    fn rejects_start_greater_than_end() {
        let err = TextRange::checked(4..3, 6).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
        assert_eq!(err.start(), 4);
        assert_eq!(err.end(), 3);
        assert_eq!(err.len(), 6);
    }

    #[test]
    fn rejects_out_of_bounds() {
        let err = TextRange::checked(0..7, 6).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBounds);
        assert_eq!(err.end(), 7);
        let msg = alloc::format!("{err}");
        assert!(msg.contains("0..7"));
        assert!(msg.contains("len 6"));
    }

    #[test]
    fn containment_is_half_open() {
        let r = TextRange::new(5, 8);
        assert!(!r.contains(4));
        assert!(r.contains(5));
        assert!(r.contains(12));
        assert!(!r.contains(13));
        assert_eq!(alloc::format!("{r}"), "{5, 8}");
    }
}
