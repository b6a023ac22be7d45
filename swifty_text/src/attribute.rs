// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute values understood by the label.

use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use attributed_text::{AttributeSet, AttributedText};
use peniko::Color;

use crate::{DetectorId, Font, LinkId, ParagraphStyle};

/// Text with [`AttributeValue`] attributes; the label's range store.
pub type RichText = AttributedText<AttributeValue>;

/// An attribute set of [`AttributeValue`]s.
pub type Attributes = AttributeSet<AttributeValue>;

/// Well-known attribute names.
pub mod names {
    use attributed_text::AttributeName;

    /// [`Font`](crate::Font) of the text.
    pub const FONT: AttributeName = AttributeName::from_static("SwiftyTextFont");
    /// Foreground [`Color`](peniko::Color).
    pub const FOREGROUND_COLOR: AttributeName =
        AttributeName::from_static("SwiftyTextForegroundColor");
    /// Background [`Color`](peniko::Color).
    pub const BACKGROUND_COLOR: AttributeName =
        AttributeName::from_static("SwiftyTextBackgroundColor");
    /// [`ParagraphStyle`](crate::ParagraphStyle) of the text.
    pub const PARAGRAPH_STYLE: AttributeName =
        AttributeName::from_static("SwiftyTextParagraphStyle");
    /// Underline flag.
    pub const UNDERLINE: AttributeName = AttributeName::from_static("SwiftyTextUnderline");
    /// Embedded view attachment.
    pub const ATTACHMENT: AttributeName = AttributeName::from_static("SwiftyTextAttachment");

    /// Reserved: the [`LinkId`](crate::LinkId) of a touchable link.
    pub const LINK: AttributeName = AttributeName::from_static("SwiftyTextLink");
    /// Reserved and internal: marks spans already processed by a detector.
    pub const DETECTOR_RESULT: AttributeName =
        AttributeName::from_static("SwiftyTextDetectorResult");

    /// Returns `true` for names hosts never see in public attribute enumeration.
    pub fn is_reserved(name: &AttributeName) -> bool {
        *name == LINK || *name == DETECTOR_RESULT
    }
}

/// Identifies a view embedded in the text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(pub(crate) u32);

/// An opaque, host-defined attribute payload.
///
/// Two payloads are equal only if they are the same allocation.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    /// Wrap `value`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the payload as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").finish_non_exhaustive()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// The value of one attribute.
#[derive(Clone, Debug)]
pub enum AttributeValue {
    /// A font.
    Font(Font),
    /// A foreground color.
    ForegroundColor(Color),
    /// A background color.
    BackgroundColor(Color),
    /// Paragraph formatting.
    ParagraphStyle(ParagraphStyle),
    /// Underline on or off.
    Underline(bool),
    /// A touchable link in the label's link table.
    Link(LinkId),
    /// The detector that classified a span.
    DetectorResult(DetectorId),
    /// An embedded view.
    Attachment(AttachmentId),
    /// Anything else.
    Opaque(Opaque),
}

impl AttributeValue {
    /// The font, if this is one.
    pub fn as_font(&self) -> Option<&Font> {
        match self {
            Self::Font(font) => Some(font),
            _ => None,
        }
    }

    /// The color, if this is a foreground or background color.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::ForegroundColor(color) | Self::BackgroundColor(color) => Some(*color),
            _ => None,
        }
    }

    /// The paragraph style, if this is one.
    pub fn as_paragraph_style(&self) -> Option<&ParagraphStyle> {
        match self {
            Self::ParagraphStyle(style) => Some(style),
            _ => None,
        }
    }

    /// The link id, if this is one.
    pub fn as_link(&self) -> Option<LinkId> {
        match self {
            Self::Link(id) => Some(*id),
            _ => None,
        }
    }

    /// The detector id, if this is a detector result.
    pub fn as_detector_result(&self) -> Option<DetectorId> {
        match self {
            Self::DetectorResult(id) => Some(*id),
            _ => None,
        }
    }

    /// The attachment id, if this is one.
    pub fn as_attachment(&self) -> Option<AttachmentId> {
        match self {
            Self::Attachment(id) => Some(*id),
            _ => None,
        }
    }

    /// The opaque payload, if this is one.
    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Self::Opaque(payload) => Some(payload),
            _ => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Font(a), Self::Font(b)) => a == b,
            (Self::ForegroundColor(a), Self::ForegroundColor(b))
            | (Self::BackgroundColor(a), Self::BackgroundColor(b)) => {
                a.components == b.components
            }
            (Self::ParagraphStyle(a), Self::ParagraphStyle(b)) => a == b,
            (Self::Underline(a), Self::Underline(b)) => a == b,
            (Self::Link(a), Self::Link(b)) => a == b,
            (Self::DetectorResult(a), Self::DetectorResult(b)) => a == b,
            (Self::Attachment(a), Self::Attachment(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

/// Copy `attributes` without the reserved link and detector entries.
pub fn public_attributes(attributes: &Attributes) -> Attributes {
    let mut public = attributes.clone();
    public.retain(|name, _| !names::is_reserved(name));
    public
}

/// Strip the reserved link and detector entries from the whole of `text`.
pub(crate) fn strip_reserved(text: &mut RichText) {
    let all = 0..text.len();
    for name in [names::LINK, names::DETECTOR_RESULT] {
        // The range covers exactly the text, so this cannot fail.
        let _ = text.remove_attribute(&name, all.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeValue, Attributes, Opaque, names, public_attributes};
    use crate::LinkId;
    use peniko::color::palette;

    #[test]
    fn colors_compare_by_components() {
        let a = AttributeValue::ForegroundColor(palette::css::RED);
        let b = AttributeValue::ForegroundColor(palette::css::RED);
        let c = AttributeValue::BackgroundColor(palette::css::RED);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn opaque_compares_by_identity() {
        let payload = Opaque::new(42_u32);
        let same = AttributeValue::Opaque(payload.clone());
        assert_eq!(same, AttributeValue::Opaque(payload));
        assert_ne!(same, AttributeValue::Opaque(Opaque::new(42_u32)));
        assert_eq!(
            same.as_opaque().and_then(|o| o.downcast_ref::<u32>()),
            Some(&42)
        );
    }

    #[test]
    fn public_attributes_hide_reserved_names() {
        let attributes = Attributes::new()
            .with(names::LINK, AttributeValue::Link(LinkId(3)))
            .with(names::UNDERLINE, AttributeValue::Underline(true));
        let public = public_attributes(&attributes);
        assert_eq!(public.len(), 1);
        assert!(public.contains(&names::UNDERLINE));
        assert!(names::is_reserved(&names::DETECTOR_RESULT));
    }
}
