// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Styling vocabulary and the label's configuration surface.

use alloc::sync::Arc;

use peniko::Color;
use peniko::color::palette;
use peniko::kurbo::Insets;

/// Point size used when no font is configured.
pub const DEFAULT_FONT_SIZE: f32 = 17.0;

/// A font selection: family name plus point size.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name. `"system-ui"` selects the platform UI font.
    pub family: Arc<str>,
    /// Size in points.
    pub size: f32,
}

impl Font {
    /// Create a font of `family` at `size` points.
    pub fn new(family: impl Into<Arc<str>>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// The platform UI font at `size` points.
    pub fn system(size: f32) -> Self {
        Self::new("system-ui", size)
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::system(DEFAULT_FONT_SIZE)
    }
}

/// Horizontal alignment of lines within a paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center lines.
    Center,
    /// Align to the right edge.
    Right,
    /// Stretch lines to fill the width.
    Justify,
    /// Left or right depending on the writing direction.
    Natural,
}

/// How text that does not fit the container is handled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LineBreakMode {
    /// Wrap at word boundaries, falling back to characters for overlong words.
    #[default]
    WordWrap,
    /// Wrap at any character.
    CharWrap,
    /// Do not wrap; cut lines off at the container edge.
    Clip,
    /// Do not wrap; elide the start of overflowing lines.
    TruncateHead,
    /// Do not wrap; elide the end of overflowing lines.
    TruncateTail,
    /// Do not wrap; elide the middle of overflowing lines.
    TruncateMiddle,
}

impl LineBreakMode {
    /// Returns `true` for the modes that wrap text onto further lines.
    pub fn wraps(self) -> bool {
        matches!(self, Self::WordWrap | Self::CharWrap)
    }
}

/// Paragraph-level formatting stored under [`names::PARAGRAPH_STYLE`].
///
/// [`names::PARAGRAPH_STYLE`]: crate::names::PARAGRAPH_STYLE
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphStyle {
    /// Line alignment.
    pub alignment: Alignment,
    /// Extra space between lines, in points.
    pub line_spacing: f32,
    /// Indent of the first line of each paragraph, in points.
    pub first_line_head_indent: f32,
}

/// Configuration of a [`SwiftyLabel`](crate::SwiftyLabel).
///
/// The font, color and paragraph options only apply to plain text set through
/// [`SwiftyLabel::set_text`](crate::SwiftyLabel::set_text); attributed text is shown as given.
#[derive(Clone, Debug)]
pub struct LabelStyle {
    /// Font for plain text; `None` uses [`Font::default`].
    pub font: Option<Font>,
    /// Text color for plain text; `None` uses black.
    pub text_color: Option<Color>,
    /// Paragraph alignment; `None` uses [`Alignment::Left`].
    pub alignment: Option<Alignment>,
    /// Extra line spacing, in points.
    pub line_spacing: Option<f32>,
    /// Indent of the first line, in points.
    pub first_line_head_indent: Option<f32>,
    /// Behavior of lines that do not fit.
    pub line_break_mode: LineBreakMode,
    /// Maximum number of lines; `0` means unlimited.
    pub number_of_lines: usize,
    /// Space between the label bounds and the text container.
    pub content_insets: Insets,
    /// Rasterize on a worker thread instead of inline.
    pub draws_asynchronously: bool,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font: None,
            text_color: None,
            alignment: None,
            line_spacing: None,
            first_line_head_indent: None,
            line_break_mode: LineBreakMode::WordWrap,
            number_of_lines: 0,
            content_insets: Insets::ZERO,
            draws_asynchronously: false,
        }
    }
}

impl LabelStyle {
    /// The font plain text is drawn with.
    pub fn resolved_font(&self) -> Font {
        self.font.clone().unwrap_or_default()
    }

    /// The color plain text is drawn with.
    pub fn resolved_text_color(&self) -> Color {
        self.text_color.unwrap_or(palette::css::BLACK)
    }

    /// Fold the paragraph options into `base`, leaving unset options as they are.
    ///
    /// Alignment is the exception: without an explicit alignment it resets to
    /// [`Alignment::Left`].
    pub fn paragraph_style(&self, base: Option<&ParagraphStyle>) -> ParagraphStyle {
        let mut style = base.cloned().unwrap_or_default();
        style.alignment = self.alignment.unwrap_or_default();
        if let Some(spacing) = self.line_spacing {
            style.line_spacing = spacing;
        }
        if let Some(indent) = self.first_line_head_indent {
            style.first_line_head_indent = indent;
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::{Alignment, LabelStyle, ParagraphStyle};

    #[test]
    fn paragraph_style_keeps_unset_options() {
        let base = ParagraphStyle {
            alignment: Alignment::Center,
            line_spacing: 4.0,
            first_line_head_indent: 2.0,
        };
        let style = LabelStyle {
            first_line_head_indent: Some(8.0),
            ..LabelStyle::default()
        };
        let merged = style.paragraph_style(Some(&base));
        assert_eq!(merged.alignment, Alignment::Left);
        assert_eq!(merged.line_spacing, 4.0);
        assert_eq!(merged.first_line_head_indent, 8.0);
    }
}
