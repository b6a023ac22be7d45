// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary to the text layout engine.
//!
//! The label never lays text out itself. It hands the text and container constraints to a
//! [`TextGeometry`] implementation and asks it for glyph regions and hit-test offsets.
//! [`MonospaceGeometry`] is a small deterministic implementation for hosts without a shaping
//! engine, and for tests.

use alloc::vec::Vec;
use core::ops::Range;

use peniko::kurbo::{Insets, Point, Rect, RoundedRect, Size};
use smallvec::SmallVec;

use crate::{LineBreakMode, RichText};

/// Everything a layout needs besides the text itself.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutConstraints {
    /// Size of the text container (label bounds minus insets).
    pub container: Size,
    /// Behavior of lines that do not fit.
    pub line_break_mode: LineBreakMode,
    /// Maximum number of lines; `0` means unlimited.
    pub max_lines: usize,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            container: Size::new(f64::INFINITY, f64::INFINITY),
            line_break_mode: LineBreakMode::WordWrap,
            max_lines: 0,
        }
    }
}

/// The screen-space rectangles covering a rendered character range.
///
/// A range that wraps produces one rectangle per line. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRegions(SmallVec<[Rect; 4]>);

impl GlyphRegions {
    /// Collect `rects`, returning `None` if there are none.
    pub fn new(rects: impl IntoIterator<Item = Rect>) -> Option<Self> {
        let rects: SmallVec<[Rect; 4]> = rects.into_iter().collect();
        (!rects.is_empty()).then_some(Self(rects))
    }

    /// Returns `true` if `point` lies inside one of the rectangles.
    ///
    /// This is exact: gaps between the rectangles of a wrapped range do not count.
    pub fn contains(&self, point: Point) -> bool {
        self.0.iter().any(|rect| rect.contains(point))
    }

    /// The rectangles.
    pub fn rects(&self) -> &[Rect] {
        &self.0
    }

    /// The smallest rectangle enclosing every region.
    pub fn bounding_box(&self) -> Rect {
        self.0[1..]
            .iter()
            .fold(self.0[0], |acc, rect| acc.union(*rect))
    }

    /// The rectangles with rounded corners, for drawing a highlight mask.
    pub fn rounded(&self, radius: f64) -> Vec<RoundedRect> {
        self.0
            .iter()
            .map(|rect| rect.to_rounded_rect(radius))
            .collect()
    }
}

/// A text layout engine as seen by the label.
///
/// Points and rectangles are in label coordinates; implementations subtract or add the container
/// `insets` themselves.
pub trait TextGeometry {
    /// Lay `text` out under `constraints`. Called by
    /// [`LabelDriver::relayout`](crate::LabelDriver::relayout) whenever the label is dirty.
    fn relayout(&mut self, text: &RichText, constraints: &LayoutConstraints);

    /// The regions covering `range`, or `None` if no glyph of it is visible.
    fn glyph_regions(&self, range: Range<usize>, insets: Insets) -> Option<GlyphRegions>;

    /// The character offset nearest to `point`, or `None` if nothing is laid out.
    fn character_offset(&self, point: Point, insets: Insets) -> Option<usize>;

    /// The size the current text needs inside a container of `constrained` size.
    fn used_size(&self, constrained: Size) -> Size;
}

#[derive(Clone, Debug, PartialEq)]
struct Line {
    /// Characters on the line, including a trailing newline.
    range: Range<usize>,
    /// Characters that are drawn.
    visible: Range<usize>,
}

/// A fixed-pitch layout: every character is `advance` wide and every line is `line_height`
/// tall.
///
/// Lines break at `\n` and, for the wrapping [`LineBreakMode`]s, at the container width (at the
/// last space for [`LineBreakMode::WordWrap`]). Non-wrapping modes clip at the container edge.
#[derive(Clone, Debug)]
pub struct MonospaceGeometry {
    advance: f64,
    line_height: f64,
    chars: Vec<char>,
    constraints: LayoutConstraints,
    lines: Vec<Line>,
}

impl MonospaceGeometry {
    /// Create a layout with the given character advance and line height.
    pub fn new(advance: f64, line_height: f64) -> Self {
        Self {
            advance,
            line_height,
            chars: Vec::new(),
            constraints: LayoutConstraints::default(),
            lines: Vec::new(),
        }
    }

    /// Number of laid out lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The characters of each laid out line, including trailing newlines.
    pub fn line_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.lines.iter().map(|line| line.range.clone())
    }

    /// Characters per line, or `None` for an unbounded container.
    ///
    /// A container too narrow for one character still holds one per line.
    fn columns(&self, width: f64) -> Option<usize> {
        if !width.is_finite() {
            return None;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Column counts are small, and negative widths saturate to zero."
        )]
        let columns = (width / self.advance).floor() as usize;
        Some(columns.max(1))
    }

    fn lay_out(&self, constraints: &LayoutConstraints) -> Vec<Line> {
        let columns = self.columns(constraints.container.width);
        let wraps = constraints.line_break_mode.wraps();
        let mut lines = Vec::new();
        let mut start = 0;
        while start < self.chars.len() {
            if constraints.max_lines != 0 && lines.len() == constraints.max_lines {
                break;
            }
            let paragraph_end = self.chars[start..]
                .iter()
                .position(|&c| c == '\n')
                .map_or(self.chars.len(), |ix| start + ix);
            let content_end = match columns {
                Some(columns) if wraps && paragraph_end - start > columns => {
                    let hard = start + columns;
                    let soft = if constraints.line_break_mode == LineBreakMode::WordWrap {
                        self.chars[start..=hard]
                            .iter()
                            .rposition(|&c| c == ' ')
                            .filter(|&ix| ix > 0)
                            .map(|ix| start + ix + 1)
                    } else {
                        None
                    };
                    soft.unwrap_or(hard)
                }
                _ => paragraph_end,
            };
            let end = if content_end == paragraph_end && paragraph_end < self.chars.len() {
                paragraph_end + 1
            } else {
                content_end
            };
            let drawn_end = match columns {
                Some(columns) => content_end.min(start + columns),
                None => content_end,
            };
            lines.push(Line {
                range: start..end,
                visible: start..drawn_end,
            });
            start = end;
        }
        lines
    }

    fn line_top(&self, index: usize, insets: Insets) -> f64 {
        let index = index as f64;
        insets.y0 + index * self.line_height
    }

    fn column_x(&self, column: usize, insets: Insets) -> f64 {
        let column = column as f64;
        insets.x0 + column * self.advance
    }
}

impl TextGeometry for MonospaceGeometry {
    fn relayout(&mut self, text: &RichText, constraints: &LayoutConstraints) {
        self.chars = text.as_str().chars().collect();
        self.constraints = *constraints;
        self.lines = self.lay_out(constraints);
    }

    fn glyph_regions(&self, range: Range<usize>, insets: Insets) -> Option<GlyphRegions> {
        let rects = self.lines.iter().enumerate().filter_map(|(index, line)| {
            let start = range.start.max(line.visible.start);
            let end = range.end.min(line.visible.end);
            if start >= end {
                return None;
            }
            let top = self.line_top(index, insets);
            Some(Rect::new(
                self.column_x(start - line.range.start, insets),
                top,
                self.column_x(end - line.range.start, insets),
                top + self.line_height,
            ))
        });
        GlyphRegions::new(rects)
    }

    fn character_offset(&self, point: Point, insets: Insets) -> Option<usize> {
        let last = self.lines.len().checked_sub(1)?;
        let y = (point.y - insets.y0) / self.line_height;
        let x = (point.x - insets.x0) / self.advance;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Negative coordinates are clamped to zero first."
        )]
        let (row, column) = (y.max(0.0).floor() as usize, x.max(0.0).floor() as usize);
        let line = &self.lines[row.min(last)];
        if line.visible.is_empty() {
            return Some(line.range.start);
        }
        Some((line.visible.start + column).min(line.visible.end - 1))
    }

    fn used_size(&self, constrained: Size) -> Size {
        let constraints = LayoutConstraints {
            container: constrained,
            ..self.constraints
        };
        let lines = self.lay_out(&constraints);
        let widest = lines
            .iter()
            .map(|line| line.visible.end - line.visible.start)
            .max()
            .unwrap_or(0);
        Size::new(
            self.column_x(widest, Insets::ZERO),
            self.line_top(lines.len(), Insets::ZERO),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{GlyphRegions, LayoutConstraints, MonospaceGeometry, TextGeometry};
    use crate::{LineBreakMode, RichText};
    use peniko::kurbo::{Insets, Point, Rect, Size};

    fn laid_out(text: &str, width: f64, mode: LineBreakMode) -> MonospaceGeometry {
        let mut geometry = MonospaceGeometry::new(10.0, 20.0);
        let constraints = LayoutConstraints {
            container: Size::new(width, f64::INFINITY),
            line_break_mode: mode,
            max_lines: 0,
        };
        geometry.relayout(&RichText::new(text), &constraints);
        geometry
    }

    #[test]
    fn word_wrap_breaks_after_spaces() {
        let geometry = laid_out("aaa bbb ccc", 60.0, LineBreakMode::WordWrap);
        let lines: Vec<_> = geometry.line_ranges().collect();
        assert_eq!(lines, [0..4, 4..8, 8..11]);
    }

    #[test]
    fn char_wrap_and_newlines() {
        let geometry = laid_out("abcdefg\nhi", 30.0, LineBreakMode::CharWrap);
        let lines: Vec<_> = geometry.line_ranges().collect();
        assert_eq!(lines, [0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn regions_follow_wrapped_ranges() {
        let geometry = laid_out("aaa bbb ccc", 60.0, LineBreakMode::WordWrap);
        let regions = geometry.glyph_regions(2..6, Insets::ZERO).unwrap();
        assert_eq!(
            regions.rects(),
            [
                Rect::new(20.0, 0.0, 40.0, 20.0),
                Rect::new(0.0, 20.0, 20.0, 40.0)
            ]
        );
        // Inside the bounding box, but in the gap between the two line fragments.
        let gap = Point::new(5.0, 10.0);
        assert!(regions.bounding_box().contains(gap));
        assert!(!regions.contains(gap));
    }

    #[test]
    fn insets_offset_geometry() {
        let geometry = laid_out("hello", f64::INFINITY, LineBreakMode::WordWrap);
        let insets = Insets::new(5.0, 7.0, 0.0, 0.0);
        let regions = geometry.glyph_regions(1..2, insets).unwrap();
        assert_eq!(regions.rects(), [Rect::new(15.0, 7.0, 25.0, 27.0)]);
        assert_eq!(geometry.character_offset(Point::new(16.0, 8.0), insets), Some(1));
        assert_eq!(geometry.character_offset(Point::new(500.0, 8.0), insets), Some(4));
        assert_eq!(geometry.character_offset(Point::new(-3.0, -3.0), insets), Some(0));
    }

    #[test]
    fn clipped_and_truncated_lines_have_no_regions() {
        let mut geometry = MonospaceGeometry::new(10.0, 20.0);
        let constraints = LayoutConstraints {
            container: Size::new(50.0, f64::INFINITY),
            line_break_mode: LineBreakMode::Clip,
            max_lines: 1,
        };
        geometry.relayout(&RichText::new("abcdefgh\nsecond"), &constraints);
        assert_eq!(geometry.line_count(), 1);
        assert!(geometry.glyph_regions(6..8, Insets::ZERO).is_none());
        assert!(geometry.glyph_regions(9..12, Insets::ZERO).is_none());
        assert!(geometry.glyph_regions(3..7, Insets::ZERO).is_some());
    }

    #[test]
    fn used_size_measures_widest_line() {
        let geometry = laid_out("aaa bbb ccc", 60.0, LineBreakMode::WordWrap);
        assert_eq!(geometry.used_size(Size::new(60.0, 1000.0)), Size::new(40.0, 60.0));
        assert_eq!(
            geometry.used_size(Size::new(f64::INFINITY, 1000.0)),
            Size::new(110.0, 20.0)
        );
        assert!(GlyphRegions::new(Vec::<Rect>::new()).is_none());
    }

    #[test]
    fn zero_width_containers_hold_one_character_per_line() {
        let geometry = laid_out("ab cd", 0.0, LineBreakMode::WordWrap);
        let lines: Vec<_> = geometry.line_ranges().collect();
        // The space hangs off the end of "b".
        assert_eq!(lines, [0..1, 1..3, 3..4, 4..5]);
        assert_eq!(geometry.used_size(Size::ZERO), Size::new(10.0, 80.0));
    }
}
