// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::Range;

use crate::runs::Run;
use crate::text_range::validate_range;
use crate::{AttributeName, AttributeSet, AttributeSnapshot, Error, Runs};

/// A block of text with named attributes applied to ranges within the text.
///
/// Attributes live in a run list: a sequence of contiguous, non-empty runs covering the whole
/// text, each carrying a complete [`AttributeSet`]. Adjacent runs never hold equal sets, so two
/// texts with the same content and the same effective formatting compare equal regardless of
/// the order in which that formatting was applied.
///
/// All offsets are character (Unicode scalar value) offsets.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributedText<V> {
    text: String,
    len: usize,
    runs: Vec<Run<V>>,
}

impl<V> Default for AttributedText<V> {
    fn default() -> Self {
        Self {
            text: String::new(),
            len: 0,
            runs: Vec::new(),
        }
    }
}

impl<V: Clone + PartialEq + Debug> AttributedText<V> {
    /// Create an `AttributedText` with no attributes applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_attributes(text, AttributeSet::new())
    }

    /// Create an `AttributedText` with `attributes` applied over the whole text.
    pub fn with_attributes(text: impl Into<String>, attributes: AttributeSet<V>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        let runs = if len == 0 {
            Vec::new()
        } else {
            vec![Run { len, attributes }]
        };
        Self { text, len, runs }
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the length of the text, in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the attribute runs in text order.
    pub fn runs(&self) -> Runs<'_, V> {
        Runs {
            runs: self.runs.iter(),
            offset: 0,
        }
    }

    /// Remove all text and attributes.
    pub fn clear(&mut self) {
        self.text.clear();
        self.len = 0;
        self.runs.clear();
    }

    /// Converts a character offset into a byte offset into [`as_str`](Self::as_str).
    ///
    /// Offsets at or past the end map to the byte length of the text.
    pub fn byte_offset(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    /// Returns the text of `range`.
    pub fn text_in(&self, range: Range<usize>) -> Result<&str, Error> {
        validate_range(&range, self.len)?;
        let start = self.byte_offset(range.start);
        let end = self.byte_offset(range.end);
        Ok(&self.text[start..end])
    }

    /// Copy out `range` together with its attributes.
    pub fn substring(&self, range: Range<usize>) -> Result<Self, Error> {
        validate_range(&range, self.len)?;
        let text = String::from(self.text_in(range.clone())?);
        let runs = self
            .clipped_runs(range.clone())
            .map(|(sub, attributes)| Run {
                len: sub.end - sub.start,
                attributes: attributes.clone(),
            })
            .collect();
        Ok(Self {
            text,
            len: range.end - range.start,
            runs,
        })
    }

    // --- MARK: Content ---

    /// Replace the characters in `range` with plain `text`.
    ///
    /// The new characters take the attributes of the first replaced character. When `range` is
    /// empty they take the attributes of the preceding character, or of the following one at the
    /// start of the text.
    ///
    /// Any range obtained before this call that overlaps or follows `range` is stale afterwards.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), Error> {
        validate_range(&range, self.len)?;
        let inherited = self.inherited_attributes(&range);
        let replacement = Self::with_attributes(text, inherited);
        self.splice(range, replacement);
        Ok(())
    }

    /// Replace the characters in `range` with `replacement`, text and attributes both.
    pub fn replace_attributed(
        &mut self,
        range: Range<usize>,
        replacement: &Self,
    ) -> Result<(), Error> {
        validate_range(&range, self.len)?;
        self.splice(range, replacement.clone());
        Ok(())
    }

    /// Replace the whole content with `text`, dropping all attributes.
    pub fn set_text(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    // --- MARK: Attributes ---

    /// Apply `value` under `name` over `range`, overriding any value already stored there.
    pub fn add_attribute(
        &mut self,
        name: AttributeName,
        value: V,
        range: Range<usize>,
    ) -> Result<(), Error> {
        self.update_runs(range, |attributes| {
            attributes.insert(name.clone(), value.clone());
        })
    }

    /// Apply every entry of `attributes` over `range` (last writer wins per name).
    pub fn add_attributes(
        &mut self,
        attributes: &AttributeSet<V>,
        range: Range<usize>,
    ) -> Result<(), Error> {
        self.update_runs(range, |existing| existing.merge(attributes))
    }

    /// Remove the attribute `name` from `range`.
    pub fn remove_attribute(&mut self, name: &AttributeName, range: Range<usize>) -> Result<(), Error> {
        self.update_runs(range, |attributes| {
            attributes.remove(name);
        })
    }

    /// Replace the complete attribute set over `range` with `attributes`.
    pub fn set_attributes(
        &mut self,
        attributes: &AttributeSet<V>,
        range: Range<usize>,
    ) -> Result<(), Error> {
        self.update_runs(range, |existing| existing.clone_from(attributes))
    }

    /// Returns the value of `name` at `offset` and the longest range, clipped to `bounds`, over
    /// which that exact value holds.
    ///
    /// Returns `None` if the attribute is absent at `offset`, or if `offset` is outside `bounds`
    /// or the text.
    pub fn attribute(
        &self,
        name: &AttributeName,
        offset: usize,
        bounds: Range<usize>,
    ) -> Option<(&V, Range<usize>)> {
        if validate_range(&bounds, self.len).is_err() || !bounds.contains(&offset) {
            return None;
        }
        let starts = self.run_starts();
        let index = run_index_at(&starts, offset);
        let value = self.runs[index].attributes.get(name)?;

        let mut first = index;
        while first > 0
            && starts[first] > bounds.start
            && self.runs[first - 1].attributes.get(name) == Some(value)
        {
            first -= 1;
        }
        let mut last = index;
        while last + 1 < self.runs.len()
            && starts[last + 1] < bounds.end
            && self.runs[last + 1].attributes.get(name) == Some(value)
        {
            last += 1;
        }
        let start = starts[first].max(bounds.start);
        let end = (starts[last] + self.runs[last].len).min(bounds.end);
        Some((value, start..end))
    }

    /// Returns the full attribute set at `offset` and the range of the run holding it.
    pub fn attributes_at(&self, offset: usize) -> Option<(&AttributeSet<V>, Range<usize>)> {
        if offset >= self.len {
            return None;
        }
        let starts = self.run_starts();
        let index = run_index_at(&starts, offset);
        let start = starts[index];
        Some((&self.runs[index].attributes, start..start + self.runs[index].len))
    }

    /// Capture every distinct attribute run inside `range`.
    pub fn snapshot(&self, range: Range<usize>) -> Result<AttributeSnapshot<V>, Error> {
        validate_range(&range, self.len)?;
        let entries = self
            .clipped_runs(range.clone())
            .map(|(sub, attributes)| (sub, attributes.clone()))
            .collect();
        Ok(AttributeSnapshot { range, entries })
    }

    /// Put back the runs captured by [`snapshot`](Self::snapshot).
    ///
    /// Each captured sub-run's set replaces whatever is stored over it now. Fails without
    /// changing anything if the text has become too short for the snapshot.
    pub fn restore(&mut self, snapshot: &AttributeSnapshot<V>) -> Result<(), Error> {
        validate_range(&snapshot.range, self.len)?;
        for (range, attributes) in &snapshot.entries {
            self.set_attributes(attributes, range.clone())?;
        }
        Ok(())
    }

    // --- MARK: Internal helpers ---

    fn run_starts(&self) -> Vec<usize> {
        let mut offset = 0;
        self.runs
            .iter()
            .map(|run| {
                let start = offset;
                offset += run.len;
                start
            })
            .collect()
    }

    fn clipped_runs(
        &self,
        range: Range<usize>,
    ) -> impl Iterator<Item = (Range<usize>, &AttributeSet<V>)> + '_ {
        self.runs().filter_map(move |(run, attributes)| {
            let start = run.start.max(range.start);
            let end = run.end.min(range.end);
            (start < end).then_some((start..end, attributes))
        })
    }

    fn inherited_attributes(&self, range: &Range<usize>) -> AttributeSet<V> {
        let source = if range.start < range.end {
            Some(range.start)
        } else if range.start > 0 {
            Some(range.start - 1)
        } else if self.len > 0 {
            Some(0)
        } else {
            None
        };
        source
            .and_then(|offset| self.attributes_at(offset))
            .map(|(attributes, _)| attributes.clone())
            .unwrap_or_default()
    }

    /// Split the run list so that a run starts at `offset` and return that run's index.
    ///
    /// `offset == len` returns `runs.len()`.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for index in 0..self.runs.len() {
            if start == offset {
                return index;
            }
            let len = self.runs[index].len;
            if offset < start + len {
                let head = offset - start;
                let tail = Run {
                    len: len - head,
                    attributes: self.runs[index].attributes.clone(),
                };
                self.runs[index].len = head;
                self.runs.insert(index + 1, tail);
                return index + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    fn update_runs(
        &mut self,
        range: Range<usize>,
        mut f: impl FnMut(&mut AttributeSet<V>),
    ) -> Result<(), Error> {
        validate_range(&range, self.len)?;
        if range.is_empty() {
            return Ok(());
        }
        let first = self.split_at(range.start);
        let end = self.split_at(range.end);
        for run in &mut self.runs[first..end] {
            f(&mut run.attributes);
        }
        self.normalize();
        Ok(())
    }

    fn splice(&mut self, range: Range<usize>, replacement: Self) {
        let byte_start = self.byte_offset(range.start);
        let byte_end = self.byte_offset(range.end);
        self.text.replace_range(byte_start..byte_end, &replacement.text);

        let first = self.split_at(range.start);
        let end = self.split_at(range.end);
        drop(self.runs.splice(first..end, replacement.runs));
        self.len = self.len - (range.end - range.start) + replacement.len;
        self.normalize();
    }

    /// Drop empty runs and merge neighbours with equal sets.
    fn normalize(&mut self) {
        let mut merged: Vec<Run<V>> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.len == 0 {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.attributes == run.attributes => last.len += run.len,
                _ => merged.push(run),
            }
        }
        self.runs = merged;
        debug_assert_eq!(
            self.runs.iter().map(|run| run.len).sum::<usize>(),
            self.len,
            "runs should cover the text exactly"
        );
    }
}

fn run_index_at(starts: &[usize], offset: usize) -> usize {
    match starts.binary_search(&offset) {
        Ok(index) => index,
        Err(index) => index - 1,
    }
}
