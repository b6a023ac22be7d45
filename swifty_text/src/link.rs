// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touchable links and the table that owns them.

use alloc::string::String;
use std::time::SystemTime;

use hashbrown::{HashMap, HashSet};
use peniko::Color;
use peniko::color::palette;

use crate::attribute::names;
use crate::{AttributeValue, Attributes, RichText};

/// Corner radius of the highlight mask when the detector does not set one.
pub const DEFAULT_MASK_RADIUS: f64 = 3.0;

/// Color of the highlight mask when the detector does not set one: gray at 30% alpha.
pub fn default_mask_color() -> Color {
    palette::css::GRAY.with_alpha(0.3)
}

/// Identifies a [`TextLink`] in a [`LinkTable`].
///
/// The text refers to links by id, so "the same link over two ranges" is id equality.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub(crate) u64);

/// An interactive record attached to a detected range.
#[derive(Clone, Debug)]
pub struct TextLink {
    /// Attributes the detector applied to the match.
    pub attributes: Option<Attributes>,
    /// Attributes applied over the link while it is pressed.
    pub highlighted_attributes: Option<Attributes>,
    /// Corner radius of the pressed-state mask.
    pub mask_radius: f64,
    /// Fill color of the pressed-state mask.
    pub mask_color: Color,
    /// Target URL, for links found by a URL detector.
    pub url: Option<String>,
    /// Associated date, if the host fills one in.
    pub date: Option<SystemTime>,
    /// Phone number, for links found by a phone number detector.
    pub phone_number: Option<String>,
    /// Free-form host data.
    pub user_info: HashMap<String, AttributeValue>,
}

impl Default for TextLink {
    fn default() -> Self {
        Self {
            attributes: None,
            highlighted_attributes: None,
            mask_radius: DEFAULT_MASK_RADIUS,
            mask_color: default_mask_color(),
            url: None,
            date: None,
            phone_number: None,
            user_info: HashMap::new(),
        }
    }
}

/// Owns every link referenced from a label's text.
#[derive(Clone, Debug, Default)]
pub struct LinkTable {
    links: HashMap<LinkId, TextLink>,
    next_id: u64,
}

impl LinkTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `link` and return its new id. Ids are never reused.
    pub fn insert(&mut self, link: TextLink) -> LinkId {
        let id = LinkId(self.next_id);
        self.next_id += 1;
        self.links.insert(id, link);
        id
    }

    /// Look up a link.
    pub fn get(&self, id: LinkId) -> Option<&TextLink> {
        self.links.get(&id)
    }

    /// Look up a link for modification, e.g. to fill in `user_info`.
    pub fn get_mut(&mut self, id: LinkId) -> Option<&mut TextLink> {
        self.links.get_mut(&id)
    }

    /// Remove a link.
    pub fn remove(&mut self, id: LinkId) -> Option<TextLink> {
        self.links.remove(&id)
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if no links are stored.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterate over all links in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (LinkId, &TextLink)> {
        self.links.iter().map(|(id, link)| (*id, link))
    }

    /// Drop every link.
    pub fn clear(&mut self) {
        self.links.clear();
    }

    /// Drop the links `text` no longer refers to, returning how many were dropped.
    pub fn retain_referenced(&mut self, text: &RichText) -> usize {
        let referenced: HashSet<LinkId> = text
            .runs()
            .filter_map(|(_, attributes)| attributes.get(&names::LINK))
            .filter_map(AttributeValue::as_link)
            .collect();
        let before = self.links.len();
        self.links.retain(|id, _| referenced.contains(id));
        before - self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MASK_RADIUS, LinkTable, TextLink};
    use crate::attribute::names;
    use crate::{AttributeValue, RichText};

    #[test]
    fn ids_are_not_reused() {
        let mut table = LinkTable::new();
        let a = table.insert(TextLink::default());
        table.remove(a);
        let b = table.insert(TextLink::default());
        assert_ne!(a, b);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(b).map(|link| link.mask_radius), Some(DEFAULT_MASK_RADIUS));
    }

    #[test]
    fn unreferenced_links_are_pruned() {
        let mut table = LinkTable::new();
        let kept = table.insert(TextLink::default());
        let dropped = table.insert(TextLink::default());

        let mut text = RichText::new("abc def");
        text.add_attribute(names::LINK, AttributeValue::Link(kept), 0..3)
            .unwrap();
        assert_eq!(table.retain_referenced(&text), 1);
        assert!(table.get(kept).is_some());
        assert!(table.get(dropped).is_none());
    }
}
