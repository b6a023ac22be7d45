// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use alloc::string::String;

/// The name of an attribute.
///
/// Names are plain strings. Well-known names are usually declared as constants with
/// [`AttributeName::from_static`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeName(Cow<'static, str>);

impl AttributeName {
    /// Create a name from a string literal, usable in `const` items.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a name from an owned or borrowed string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for AttributeName {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for AttributeName {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl core::fmt::Display for AttributeName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mapping from attribute names to values.
///
/// Iteration is ordered by name, so two sets holding the same entries always
/// compare and print identically.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSet<V> {
    entries: BTreeMap<AttributeName, V>,
}

impl<V> Default for AttributeSet<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> AttributeSet<V> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &AttributeName) -> Option<&V> {
        self.entries.get(name)
    }

    /// Returns `true` if a value is stored under `name`.
    pub fn contains(&self, name: &AttributeName) -> bool {
        self.entries.contains_key(name)
    }

    /// Store `value` under `name`, returning the previous value.
    pub fn insert(&mut self, name: AttributeName, value: V) -> Option<V> {
        self.entries.insert(name, value)
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: AttributeName, value: V) -> Self {
        self.entries.insert(name, value);
        self
    }

    /// Remove the value stored under `name`.
    pub fn remove(&mut self, name: &AttributeName) -> Option<V> {
        self.entries.remove(name)
    }

    /// Number of attributes in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over names and values, ordered by name.
    pub fn iter(&self) -> btree_map::Iter<'_, AttributeName, V> {
        self.entries.iter()
    }

    /// Iterate over the names in the set.
    pub fn names(&self) -> btree_map::Keys<'_, AttributeName, V> {
        self.entries.keys()
    }

    /// Keep only the entries for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&AttributeName, &V) -> bool) {
        self.entries.retain(|name, value| f(name, value));
    }
}

impl<V: Clone> AttributeSet<V> {
    /// Copy every entry of `other` into this set; entries in `other` win.
    pub fn merge(&mut self, other: &Self) {
        for (name, value) in &other.entries {
            self.entries.insert(name.clone(), value.clone());
        }
    }
}

impl<V> FromIterator<(AttributeName, V)> for AttributeSet<V> {
    fn from_iter<I: IntoIterator<Item = (AttributeName, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<V> Extend<(AttributeName, V)> for AttributeSet<V> {
    fn extend<I: IntoIterator<Item = (AttributeName, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<'a, V> IntoIterator for &'a AttributeSet<V> {
    type Item = (&'a AttributeName, &'a V);
    type IntoIter = btree_map::Iter<'a, AttributeName, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeName, AttributeSet};

    const COLOR: AttributeName = AttributeName::from_static("color");
    const WEIGHT: AttributeName = AttributeName::from_static("weight");

    #[test]
    fn static_and_owned_names_are_equal() {
        assert_eq!(COLOR, AttributeName::new("color"));
        assert_eq!(COLOR.as_str(), "color");
    }

    #[test]
    fn merge_is_last_writer_wins() {
        let mut base = AttributeSet::new().with(COLOR, 1).with(WEIGHT, 400);
        let over = AttributeSet::new().with(COLOR, 2);
        base.merge(&over);
        assert_eq!(base.get(&COLOR), Some(&2));
        assert_eq!(base.get(&WEIGHT), Some(&400));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn iteration_is_ordered_by_name() {
        let set: AttributeSet<u8> = [(WEIGHT, 1), (COLOR, 2)].into_iter().collect();
        let names: alloc::vec::Vec<_> = set.names().map(AttributeName::as_str).collect();
        assert_eq!(names, ["color", "weight"]);
    }
}
