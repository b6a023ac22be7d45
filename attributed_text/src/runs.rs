// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute runs of an [`AttributedText`].
//!
//! The store keeps its attributes as a list of contiguous runs covering the text. This module
//! exposes iteration over those runs and the [`AttributeSnapshot`] used to temporarily override
//! formatting and later put it back exactly.
//!
//! [`AttributedText`]: crate::AttributedText

use alloc::vec::Vec;
use core::ops::Range;

use crate::AttributeSet;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Run<V> {
    pub(crate) len: usize,
    pub(crate) attributes: AttributeSet<V>,
}

/// Iterator over the attribute runs of an [`AttributedText`].
///
/// Each item is a non-empty character range and the full attribute set in effect over it.
/// Consecutive items never carry equal sets.
///
/// [`AttributedText`]: crate::AttributedText
#[derive(Clone, Debug)]
pub struct Runs<'a, V> {
    pub(crate) runs: core::slice::Iter<'a, Run<V>>,
    pub(crate) offset: usize,
}

impl<'a, V> Iterator for Runs<'a, V> {
    type Item = (Range<usize>, &'a AttributeSet<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let run = self.runs.next()?;
        let start = self.offset;
        self.offset += run.len;
        Some((start..self.offset, &run.attributes))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.runs.size_hint()
    }
}

impl<V> ExactSizeIterator for Runs<'_, V> {}

/// A copy of every distinct attribute run inside a range.
///
/// Produced by [`AttributedText::snapshot`] and replayed by [`AttributedText::restore`]. The
/// captured sub-ranges are disjoint, ordered, and cover the snapshotted range exactly once each,
/// so restoring reproduces nested or partial formatting rather than a flattened set.
///
/// # Examples
///
/// ```
/// use attributed_text::{AttributeName, AttributeSet, AttributedText};
///
/// const WEIGHT: AttributeName = AttributeName::from_static("weight");
///
/// let mut text = AttributedText::new("hello");
/// text.add_attribute(WEIGHT, 700, 0..2).unwrap();
/// let snapshot = text.snapshot(0..5).unwrap();
/// assert_eq!(snapshot.len(), 2);
///
/// text.add_attribute(WEIGHT, 400, 0..5).unwrap();
/// text.restore(&snapshot).unwrap();
/// assert_eq!(text.attribute(&WEIGHT, 0, 0..5), Some((&700, 0..2)));
/// assert_eq!(text.attribute(&WEIGHT, 3, 0..5), None);
/// ```
///
/// [`AttributedText::snapshot`]: crate::AttributedText::snapshot
/// [`AttributedText::restore`]: crate::AttributedText::restore
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSnapshot<V> {
    pub(crate) range: Range<usize>,
    pub(crate) entries: Vec<(Range<usize>, AttributeSet<V>)>,
}

impl<V> AttributeSnapshot<V> {
    /// The range that was captured.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The captured sub-runs in text order.
    pub fn entries(&self) -> &[(Range<usize>, AttributeSet<V>)] {
        &self.entries
    }

    /// Number of captured sub-runs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was captured (an empty range).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
