// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative rules describing one class of detectable text.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;
use core::sync::atomic::{AtomicU64, Ordering};

use peniko::Color;
use regex::Regex;

use crate::attribute::{names, strip_reserved};
use crate::link::{DEFAULT_MASK_RADIUS, TextLink, default_mask_color};
use crate::{Attributes, RichText};

/// Default pattern of [`TextDetector::url`].
pub const URL_PATTERN: &str =
    r"(?i)\b(?:(?:https?|ftp)://|www\.)[^\s<>{}|\\^`\[\]]*[^\s<>{}|\\^`\[\].,;:!?'\x22)]";

/// Default pattern of [`TextDetector::phone_number`].
pub const PHONE_NUMBER_PATTERN: &str =
    r"(?:\+\d{1,3}[ .-]?)?(?:\(\d{3}\)[ .-]?|\b\d{3}[ .-])?\b\d{3}[ .-]\d{4}\b";

static NEXT_DETECTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a detector; clones of a detector share its id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DetectorId(u64);

impl DetectorId {
    fn next() -> Self {
        Self(NEXT_DETECTOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The payload a touchable detector stores on the links it creates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LinkKind {
    /// No payload.
    #[default]
    Custom,
    /// The matched text as a URL, with `http://` added when it has no scheme.
    Url,
    /// The matched text as a phone number.
    PhoneNumber,
}

/// One pattern match handed to a rewrite function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectorMatch {
    /// Character range of the whole match in the current text.
    pub range: Range<usize>,
    /// The matched text.
    pub text: String,
    /// Capture groups; index 0 is the whole match.
    pub captures: Vec<Option<String>>,
}

/// Error returned by a rewrite function that could not produce a replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteError {
    message: String,
}

impl RewriteError {
    /// Create an error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rewrite failed: {}", self.message)
    }
}

impl core::error::Error for RewriteError {}

/// A rewrite function.
///
/// Receives the match, the matched text with the detector's attributes already applied, and the
/// full text. Returning `Ok(None)` keeps the match as it is.
pub type RewriteFn = dyn Fn(&DetectorMatch, &RichText, &RichText) -> Result<Option<RichText>, RewriteError>
    + Send
    + Sync;

/// A rule that scans text for a pattern and optionally tags, rewrites, or links the matches.
///
/// Detectors are immutable once built. A pattern that fails to compile yields an inert detector
/// which never matches.
///
/// # Examples
///
/// ```
/// use swifty_text::TextDetector;
///
/// let detector = TextDetector::builder(r"\d{3}-\d{4}").touchable(true).build();
/// assert!(!detector.is_inert());
///
/// let broken = TextDetector::builder(r"(\d").build();
/// assert!(broken.is_inert());
/// ```
#[derive(Clone)]
pub struct TextDetector {
    id: DetectorId,
    source: Arc<str>,
    regex: Option<Regex>,
    attributes: Option<Attributes>,
    rewrite: Option<Arc<RewriteFn>>,
    touchable: bool,
    highlighted_attributes: Option<Attributes>,
    mask_radius: Option<f64>,
    mask_color: Option<Color>,
    link_kind: LinkKind,
}

impl fmt::Debug for TextDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextDetector")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("inert", &self.regex.is_none())
            .field("attributes", &self.attributes)
            .field("rewrite", &self.rewrite.is_some())
            .field("touchable", &self.touchable)
            .field("highlighted_attributes", &self.highlighted_attributes)
            .field("mask_radius", &self.mask_radius)
            .field("mask_color", &self.mask_color)
            .field("link_kind", &self.link_kind)
            .finish()
    }
}

impl TextDetector {
    /// Start building a detector for `pattern`.
    pub fn builder(pattern: &str) -> TextDetectorBuilder {
        let regex = match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                log::warn!("detector pattern {pattern:?} is inert: {err}");
                None
            }
        };
        TextDetectorBuilder::new(pattern.into(), regex)
    }

    /// Start building a detector around an already compiled `regex`.
    pub fn builder_from_regex(regex: Regex) -> TextDetectorBuilder {
        TextDetectorBuilder::new(regex.as_str().into(), Some(regex))
    }

    /// A touchable, underlined URL detector using [`URL_PATTERN`].
    pub fn url() -> Self {
        Self::builder(URL_PATTERN)
            .attributes(Attributes::new().with(names::UNDERLINE, crate::AttributeValue::Underline(true)))
            .touchable(true)
            .link_kind(LinkKind::Url)
            .build()
    }

    /// A touchable phone number detector using [`PHONE_NUMBER_PATTERN`].
    pub fn phone_number() -> Self {
        Self::builder(PHONE_NUMBER_PATTERN)
            .touchable(true)
            .link_kind(LinkKind::PhoneNumber)
            .build()
    }

    /// This detector's id.
    pub fn id(&self) -> DetectorId {
        self.id
    }

    /// The pattern source.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// The compiled pattern, or `None` if the detector is inert.
    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }

    /// Returns `true` if the pattern failed to compile.
    pub fn is_inert(&self) -> bool {
        self.regex.is_none()
    }

    /// Attributes applied over each match.
    pub fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    /// The rewrite function, if any.
    pub fn rewrite(&self) -> Option<&RewriteFn> {
        self.rewrite.as_deref()
    }

    /// Whether matches become touchable links.
    pub fn is_touchable(&self) -> bool {
        self.touchable
    }

    /// Attributes applied to links from this detector while pressed.
    pub fn highlighted_attributes(&self) -> Option<&Attributes> {
        self.highlighted_attributes.as_ref()
    }

    /// The payload kind of links from this detector.
    pub fn link_kind(&self) -> LinkKind {
        self.link_kind
    }

    /// Build the link for a match whose original text was `matched`.
    pub(crate) fn make_link(&self, matched: &str) -> TextLink {
        let mut link = TextLink {
            attributes: self.attributes.clone(),
            highlighted_attributes: self.highlighted_attributes.clone(),
            mask_radius: self.mask_radius.unwrap_or(DEFAULT_MASK_RADIUS),
            mask_color: self.mask_color.unwrap_or_else(default_mask_color),
            ..TextLink::default()
        };
        match self.link_kind {
            LinkKind::Custom => {}
            LinkKind::Url => {
                link.url = Some(if matched.contains("://") {
                    matched.to_owned()
                } else {
                    alloc::format!("http://{matched}")
                });
            }
            LinkKind::PhoneNumber => link.phone_number = Some(matched.to_owned()),
        }
        link
    }
}

/// Builder for [`TextDetector`].
#[derive(Clone)]
#[must_use]
pub struct TextDetectorBuilder {
    detector: TextDetector,
}

impl fmt::Debug for TextDetectorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextDetectorBuilder")
            .field(&self.detector)
            .finish()
    }
}

impl TextDetectorBuilder {
    fn new(source: Arc<str>, regex: Option<Regex>) -> Self {
        Self {
            detector: TextDetector {
                id: DetectorId::next(),
                source,
                regex,
                attributes: None,
                rewrite: None,
                touchable: false,
                highlighted_attributes: None,
                mask_radius: None,
                mask_color: None,
                link_kind: LinkKind::Custom,
            },
        }
    }

    /// Attributes applied over each match.
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.detector.attributes = Some(attributes);
        self
    }

    /// Replace each match with the attributed text returned by `rewrite`.
    pub fn rewrite<F>(mut self, rewrite: F) -> Self
    where
        F: Fn(&DetectorMatch, &RichText, &RichText) -> Result<Option<RichText>, RewriteError>
            + Send
            + Sync
            + 'static,
    {
        self.detector.rewrite = Some(Arc::new(rewrite));
        self
    }

    /// Replace each match with plain text that keeps the attributes of the match's first
    /// character.
    pub fn replacement_text<F>(self, replacement: F) -> Self
    where
        F: Fn(&DetectorMatch) -> String + Send + Sync + 'static,
    {
        self.rewrite(move |found, matched, _| {
            let attributes = matched
                .attributes_at(0)
                .map(|(attributes, _)| attributes.clone())
                .unwrap_or_default();
            let mut text = RichText::with_attributes(replacement(found), attributes);
            strip_reserved(&mut text);
            Ok(Some(text))
        })
    }

    /// Whether matches become touchable links.
    pub fn touchable(mut self, touchable: bool) -> Self {
        self.detector.touchable = touchable;
        self
    }

    /// Attributes applied to the link while it is pressed.
    pub fn highlighted_attributes(mut self, attributes: Attributes) -> Self {
        self.detector.highlighted_attributes = Some(attributes);
        self
    }

    /// Corner radius of the pressed-state mask.
    pub fn mask_radius(mut self, radius: f64) -> Self {
        self.detector.mask_radius = Some(radius);
        self
    }

    /// Fill color of the pressed-state mask.
    pub fn mask_color(mut self, color: Color) -> Self {
        self.detector.mask_color = Some(color);
        self
    }

    /// The payload stored on created links.
    pub fn link_kind(mut self, kind: LinkKind) -> Self {
        self.detector.link_kind = kind;
        self
    }

    /// Finish the detector.
    pub fn build(self) -> TextDetector {
        self.detector
    }
}

#[cfg(test)]
mod tests {
    use super::{LinkKind, TextDetector};
    use crate::link::DEFAULT_MASK_RADIUS;

    #[test]
    fn clones_share_an_id() {
        let a = TextDetector::builder("a").build();
        let b = TextDetector::builder("a").build();
        assert_eq!(a.id(), a.clone().id());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn url_links_get_a_scheme() {
        let detector = TextDetector::url();
        assert_eq!(detector.link_kind(), LinkKind::Url);
        let link = detector.make_link("www.example.com");
        assert_eq!(link.url.as_deref(), Some("http://www.example.com"));
        let link = detector.make_link("https://example.com/a");
        assert_eq!(link.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(link.mask_radius, DEFAULT_MASK_RADIUS);
    }

    #[test]
    fn builtin_patterns_match_common_forms() {
        let url = TextDetector::url();
        let regex = url.regex().unwrap();
        let found = regex.find("see https://example.com/x, then").unwrap();
        assert_eq!(found.as_str(), "https://example.com/x");
        assert!(regex.find("nothing here").is_none());

        let phone = TextDetector::phone_number();
        let regex = phone.regex().unwrap();
        assert_eq!(regex.find("Call 555-1234 now").unwrap().as_str(), "555-1234");
        assert_eq!(
            regex.find("or (555) 123-4567 today").unwrap().as_str(),
            "(555) 123-4567"
        );
    }

    #[test]
    fn phone_links_carry_the_number() {
        let link = TextDetector::phone_number().make_link("555-1234");
        assert_eq!(link.phone_number.as_deref(), Some("555-1234"));
        assert!(link.url.is_none());
    }
}
