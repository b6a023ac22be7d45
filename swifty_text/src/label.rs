// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The label: text, detectors, links and press tracking behind one owner.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;
use core::time::Duration;

use attributed_text::{AttributeName, TextRange};
use hashbrown::HashMap;
use peniko::Color;
use peniko::kurbo::{Insets, Point, Rect, Size};

use crate::attribute::{names, public_attributes, strip_reserved};
use crate::detection::{ScanReport, scan};
use crate::gesture::{GestureClassifier, GestureResult, GestureState, GestureTracker};
use crate::render::{AsyncRenderer, Generation, Rasterizer, RenderScene};
use crate::{
    Alignment, AttachmentId, AttributeValue, Attributes, DetectorId, Error, Font, GestureKind,
    LabelStyle, LayoutConstraints, LineBreakMode, LinkActivation, LinkId, LinkTable, MaskOverlay,
    RichText, TextDetector, TextGeometry, TextLink,
};

/// Placeholder character standing in for an embedded view.
pub const ATTACHMENT_CHARACTER: char = '\u{FFFC}';

/// Receives link activations from a [`SwiftyLabel`].
pub trait LabelDelegate {
    /// `link` over `range` was tapped or long-pressed.
    fn link_activated(&mut self, link: &TextLink, range: TextRange, kind: GestureKind);
}

impl<F> LabelDelegate for F
where
    F: FnMut(&TextLink, TextRange, GestureKind),
{
    fn link_activated(&mut self, link: &TextLink, range: TextRange, kind: GestureKind) {
        self(link, range, kind);
    }
}

/// A view embedded in the text.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewAttachment {
    /// Size the view occupies.
    pub size: Size,
}

/// Where an embedded view goes after layout, in label coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AttachmentPlacement {
    /// The attachment.
    pub id: AttachmentId,
    /// Frame of the view.
    pub frame: Rect,
}

/// A text label that detects links in its content and tracks presses on them.
///
/// The label owns its text, links and detectors. Layout and hit testing need a
/// [`TextGeometry`], which is borrowed through a [`LabelDriver`] while it is needed.
///
/// # Examples
///
/// ```
/// use swifty_text::{MonospaceGeometry, SwiftyLabel, TextDetector};
/// use swifty_text::kurbo::Point;
///
/// let mut label = SwiftyLabel::new();
/// label.add_detector(TextDetector::phone_number());
/// label.set_text("Call 555-1234 now");
///
/// let mut geometry = MonospaceGeometry::new(10.0, 20.0);
/// let pressed = label.driver(&mut geometry).pointer_down(Point::new(60.0, 10.0)).unwrap();
/// assert!(pressed);
/// ```
pub struct SwiftyLabel {
    text: RichText,
    links: LinkTable,
    detectors: Vec<TextDetector>,
    style: LabelStyle,
    plain_text: bool,
    bounds: Size,
    attachments: HashMap<AttachmentId, ViewAttachment>,
    next_attachment: u32,
    delegate: Option<Box<dyn LabelDelegate>>,
    gestures: GestureTracker,
    classifier: GestureClassifier,
    layout_dirty: bool,
    generation: Generation,
}

impl fmt::Debug for SwiftyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwiftyLabel")
            .field("text", &self.text)
            .field("links", &self.links)
            .field("detectors", &self.detectors)
            .field("style", &self.style)
            .field("plain_text", &self.plain_text)
            .field("bounds", &self.bounds)
            .field("attachments", &self.attachments)
            .field("next_attachment", &self.next_attachment)
            .field("delegate", &self.delegate.is_some())
            .field("gestures", &self.gestures)
            .field("classifier", &self.classifier)
            .field("layout_dirty", &self.layout_dirty)
            .field("generation", &self.generation)
            .finish()
    }
}

impl Default for SwiftyLabel {
    fn default() -> Self {
        Self::with_style(LabelStyle::default())
    }
}

impl SwiftyLabel {
    /// Create an empty label with the default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty label with `style`.
    pub fn with_style(style: LabelStyle) -> Self {
        Self {
            text: RichText::default(),
            links: LinkTable::new(),
            detectors: Vec::new(),
            style,
            plain_text: true,
            bounds: Size::new(f64::INFINITY, f64::INFINITY),
            attachments: HashMap::new(),
            next_attachment: 0,
            delegate: None,
            gestures: GestureTracker::new(),
            classifier: GestureClassifier::default(),
            layout_dirty: true,
            generation: Generation::default(),
        }
    }

    /// Borrow the label together with a layout engine.
    pub fn driver<'drv, G: TextGeometry + ?Sized>(
        &'drv mut self,
        geometry: &'drv mut G,
    ) -> LabelDriver<'drv, G> {
        LabelDriver {
            label: self,
            geometry,
        }
    }

    // --- MARK: Content ---

    /// The text, including reserved attributes.
    pub fn text(&self) -> &RichText {
        &self.text
    }

    /// Returns `true` if the content was set through [`set_text`](Self::set_text), so the
    /// styling options apply to it.
    pub fn is_plain_text(&self) -> bool {
        self.plain_text
    }

    /// Show plain `text` styled with the label's font, color and paragraph options, and run the
    /// detectors over it.
    pub fn set_text(&mut self, text: &str) {
        self.cancel_gesture();
        let attributes = Attributes::new()
            .with(names::FONT, AttributeValue::Font(self.style.resolved_font()))
            .with(
                names::FOREGROUND_COLOR,
                AttributeValue::ForegroundColor(self.style.resolved_text_color()),
            )
            .with(
                names::PARAGRAPH_STYLE,
                AttributeValue::ParagraphStyle(self.style.paragraph_style(None)),
            );
        self.replace_content(RichText::with_attributes(text, attributes), true);
    }

    /// Show `text` as given, ignoring the styling options, and run the detectors over it.
    ///
    /// Reserved link and detector attributes in `text` are dropped.
    pub fn set_attributed_text(&mut self, mut text: RichText) {
        self.cancel_gesture();
        strip_reserved(&mut text);
        self.replace_content(text, false);
    }

    fn replace_content(&mut self, text: RichText, plain_text: bool) {
        self.text = text;
        self.plain_text = plain_text;
        self.links.clear();
        self.attachments.clear();
        self.scan_all();
        self.touch();
    }

    /// Replace the characters in `range` with `text`, then rescan and drop links that no
    /// longer appear.
    ///
    /// A link the edit splits in two is removed along with its detector's styling, and the
    /// pieces are scanned again.
    pub fn replace_characters(&mut self, range: Range<usize>, text: &str) -> Result<(), Error> {
        TextRange::checked(range.clone(), self.text.len())?;
        self.cancel_gesture();
        self.text.replace(range.clone(), text)?;
        self.clear_inherited_link(range.start..range.start + text.chars().count())?;
        self.after_edit()
    }

    /// Replace the characters in `range` with attributed `text`, then rescan and drop links that
    /// no longer appear. Reserved attributes in `text` are dropped.
    pub fn replace_characters_attributed(
        &mut self,
        range: Range<usize>,
        text: &RichText,
    ) -> Result<(), Error> {
        TextRange::checked(range.clone(), self.text.len())?;
        self.cancel_gesture();
        let mut text = text.clone();
        strip_reserved(&mut text);
        self.text.replace_attributed(range, &text)?;
        self.after_edit()
    }

    fn after_edit(&mut self) -> Result<(), Error> {
        self.unlink_split_links()?;
        self.scan_all();
        let dropped = self.links.retain_referenced(&self.text);
        if dropped > 0 {
            log::debug!("dropped {dropped} links overwritten by an edit");
        }
        let referenced: Vec<AttachmentId> = self
            .text
            .runs()
            .filter_map(|(_, attributes)| attributes.get(&names::ATTACHMENT))
            .filter_map(AttributeValue::as_attachment)
            .collect();
        self.attachments.retain(|id, _| referenced.contains(id));
        self.touch();
        Ok(())
    }

    /// Embed a view at `offset`, as a placeholder character.
    ///
    /// Inserting inside a link splits it, which removes the link.
    pub fn insert_attachment(
        &mut self,
        offset: usize,
        attachment: ViewAttachment,
    ) -> Result<AttachmentId, Error> {
        TextRange::checked(offset..offset, self.text.len())?;
        self.cancel_gesture();
        let id = AttachmentId(self.next_attachment);
        self.next_attachment += 1;

        let mut placeholder = [0; 4];
        self.text
            .replace(offset..offset, ATTACHMENT_CHARACTER.encode_utf8(&mut placeholder))?;
        let range = offset..offset + 1;
        self.clear_inherited_link(range.clone())?;
        self.text
            .add_attribute(names::ATTACHMENT, AttributeValue::Attachment(id), range)?;
        self.attachments.insert(id, attachment);
        self.after_edit()?;
        Ok(id)
    }

    /// New characters inherit their neighbours' attributes, but never their link or the styling
    /// its detector applied.
    fn clear_inherited_link(&mut self, range: Range<usize>) -> Result<(), Error> {
        if range.is_empty() {
            return Ok(());
        }
        let link = self
            .text
            .attribute(&names::LINK, range.start, range.clone())
            .and_then(|(value, _)| value.as_link());
        self.strip_link(link, range)
    }

    /// Drop links that no longer cover one contiguous span.
    fn unlink_split_links(&mut self) -> Result<(), Error> {
        let mut spans: Vec<(LinkId, Range<usize>)> = Vec::new();
        for (range, attributes) in self.text.runs() {
            let Some(id) = attributes.get(&names::LINK).and_then(AttributeValue::as_link) else {
                continue;
            };
            match spans.last_mut() {
                Some((last, span)) if *last == id && span.end == range.start => {
                    span.end = range.end;
                }
                _ => spans.push((id, range)),
            }
        }
        let mut counts: HashMap<LinkId, usize> = HashMap::new();
        for (id, _) in &spans {
            *counts.entry(*id).or_default() += 1;
        }
        for (id, range) in spans {
            if counts.get(&id).is_some_and(|&count| count > 1) {
                log::debug!("unlinking {id:?} over {range:?}: an edit split it");
                self.strip_link(Some(id), range)?;
            }
        }
        Ok(())
    }

    /// Remove link markers from `range`, along with the styling `link`'s detector applied there.
    fn strip_link(&mut self, link: Option<LinkId>, range: Range<usize>) -> Result<(), Error> {
        let styled: Vec<AttributeName> = link
            .and_then(|id| self.links.get(id))
            .and_then(|link| link.attributes.as_ref())
            .into_iter()
            .flat_map(|attributes| attributes.iter())
            .filter(|(name, value)| {
                self.text
                    .attribute(name, range.start, range.clone())
                    .is_some_and(|(current, _)| current == *value)
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in styled.iter().chain(&[names::LINK, names::DETECTOR_RESULT]) {
            self.text.remove_attribute(name, range.clone())?;
        }
        Ok(())
    }

    /// The embedded views.
    pub fn attachments(&self) -> impl Iterator<Item = (AttachmentId, &ViewAttachment)> {
        self.attachments.iter().map(|(id, attachment)| (*id, attachment))
    }

    /// The attributes at `offset` without reserved entries, and the run they cover.
    pub fn public_attributes(&self, offset: usize) -> Option<(Attributes, Range<usize>)> {
        self.text
            .attributes_at(offset)
            .map(|(attributes, range)| (public_attributes(attributes), range))
    }

    /// The link at `offset` and the full range it covers.
    pub fn link_at(&self, offset: usize) -> Option<(LinkId, &TextLink, TextRange)> {
        let (value, range) = self
            .text
            .attribute(&names::LINK, offset, 0..self.text.len())?;
        let id = value.as_link()?;
        Some((id, self.links.get(id)?, range.into()))
    }

    /// The links referenced from the text.
    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Mutable access to the links, e.g. to fill in [`TextLink::user_info`].
    pub fn links_mut(&mut self) -> &mut LinkTable {
        &mut self.links
    }

    // --- MARK: Detectors ---

    /// The registered detectors in priority order.
    pub fn detectors(&self) -> &[TextDetector] {
        &self.detectors
    }

    /// Register `detector` after the existing ones and rescan the whole text.
    pub fn add_detector(&mut self, detector: TextDetector) {
        self.cancel_gesture();
        self.detectors.push(detector);
        self.scan_all();
        self.touch();
    }

    /// Unregister a detector. Spans it already classified keep their attributes and links.
    pub fn remove_detector(&mut self, id: DetectorId) -> Result<TextDetector, Error> {
        let index = self
            .detectors
            .iter()
            .position(|detector| detector.id() == id)
            .ok_or(Error::UnknownDetector(id))?;
        Ok(self.detectors.remove(index))
    }

    /// Run the detectors over `range`.
    pub fn process_detectors(&mut self, range: Range<usize>) -> Result<ScanReport, Error> {
        TextRange::checked(range.clone(), self.text.len())?;
        self.cancel_gesture();
        let report = scan(&mut self.text, &mut self.links, &self.detectors, range)?;
        self.touch();
        Ok(report)
    }

    fn scan_all(&mut self) {
        let all = 0..self.text.len();
        let scanned = scan(&mut self.text, &mut self.links, &self.detectors, all);
        debug_assert!(scanned.is_ok(), "the whole text is always a valid range");
    }

    // --- MARK: Style ---

    /// The current configuration.
    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Set the font of plain text; `None` restores the default.
    pub fn set_font(&mut self, font: Option<Font>) {
        self.style.font = font;
        if self.plain_text {
            let font = self.style.resolved_font();
            self.style_all(names::FONT, AttributeValue::Font(font));
        }
    }

    /// Set the color of plain text; `None` restores black.
    pub fn set_text_color(&mut self, color: Option<Color>) {
        self.style.text_color = color;
        if self.plain_text {
            let color = self.style.resolved_text_color();
            self.style_all(names::FOREGROUND_COLOR, AttributeValue::ForegroundColor(color));
        }
    }

    /// Set the alignment of plain text; `None` restores [`Alignment::Left`].
    pub fn set_alignment(&mut self, alignment: Option<Alignment>) {
        self.style.alignment = alignment;
        self.update_paragraph_style();
    }

    /// Set the extra spacing between lines of plain text.
    pub fn set_line_spacing(&mut self, spacing: Option<f32>) {
        self.style.line_spacing = spacing;
        self.update_paragraph_style();
    }

    /// Set the indent of the first line of plain text.
    pub fn set_first_line_head_indent(&mut self, indent: Option<f32>) {
        self.style.first_line_head_indent = indent;
        self.update_paragraph_style();
    }

    fn update_paragraph_style(&mut self) {
        if !self.plain_text {
            return;
        }
        let current = self
            .text
            .attribute(&names::PARAGRAPH_STYLE, 0, 0..self.text.len())
            .and_then(|(value, _)| value.as_paragraph_style());
        let style = self.style.paragraph_style(current);
        self.style_all(names::PARAGRAPH_STYLE, AttributeValue::ParagraphStyle(style));
    }

    fn style_all(&mut self, name: AttributeName, value: AttributeValue) {
        self.cancel_gesture();
        let all = 0..self.text.len();
        let styled = self.text.add_attribute(name, value, all);
        debug_assert!(styled.is_ok(), "the whole text is always a valid range");
        self.touch();
    }

    /// Set how lines that do not fit are handled.
    pub fn set_line_break_mode(&mut self, mode: LineBreakMode) {
        self.style.line_break_mode = mode;
        self.touch();
    }

    /// Set the maximum number of lines; `0` means unlimited.
    pub fn set_number_of_lines(&mut self, lines: usize) {
        self.style.number_of_lines = lines;
        self.touch();
    }

    /// Set the space between the label bounds and the text container.
    pub fn set_content_insets(&mut self, insets: Insets) {
        self.style.content_insets = insets;
        self.touch();
    }

    /// Choose between inline and worker-thread rasterization in [`draw`](Self::draw).
    pub fn set_draws_asynchronously(&mut self, asynchronous: bool) {
        self.style.draws_asynchronously = asynchronous;
    }

    /// The label's size.
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Resize the label. Unbounded until set.
    pub fn set_bounds(&mut self, bounds: Size) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.touch();
        }
    }

    /// The constraints the text is laid out under.
    pub fn layout_constraints(&self) -> LayoutConstraints {
        LayoutConstraints {
            container: inset_size(self.bounds, self.style.content_insets),
            line_break_mode: self.style.line_break_mode,
            max_lines: self.style.number_of_lines,
        }
    }

    /// Returns `true` if the layout is out of date.
    pub fn needs_layout(&self) -> bool {
        self.layout_dirty
    }

    /// Changes whenever what the label draws changes.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn touch(&mut self) {
        self.layout_dirty = true;
        self.generation.nudge();
    }

    // --- MARK: Presses ---

    /// Receive link activations.
    pub fn set_delegate(&mut self, delegate: impl LabelDelegate + 'static) {
        self.delegate = Some(Box::new(delegate));
    }

    /// Stop receiving link activations.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// The thresholds [`pointer_up`](Self::pointer_up) classifies presses with.
    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Change the press classification thresholds.
    pub fn set_classifier(&mut self, classifier: GestureClassifier) {
        self.classifier = classifier;
    }

    /// State of the current press.
    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    /// The mask to draw over the pressed link.
    pub fn mask_overlay(&self) -> Option<MaskOverlay> {
        self.gestures.mask_overlay()
    }

    /// Follow the pointer of the current press.
    pub fn pointer_move(&mut self, point: Point) -> Result<(), Error> {
        let before = self.gestures.state();
        self.gestures.pointer_move(point, &mut self.text)?;
        if self.gestures.state() != before {
            self.generation.nudge();
        }
        Ok(())
    }

    /// End the current press after it was held for `held`, classifying it with the label's
    /// [`GestureClassifier`].
    pub fn pointer_up(&mut self, held: Duration) -> Result<Option<LinkActivation>, Error> {
        let result = self.classifier.classify(held, self.gestures.travel());
        self.finish_gesture(result)
    }

    /// End the current press with an outcome decided by the host, notifying the delegate of
    /// taps and long presses.
    pub fn finish_gesture(&mut self, result: GestureResult) -> Result<Option<LinkActivation>, Error> {
        if !self.gestures.is_active() {
            return Ok(None);
        }
        let activation = self.gestures.pointer_up(result, &mut self.text)?;
        self.generation.nudge();
        if let Some(activation) = activation {
            if let (Some(delegate), Some(link)) =
                (self.delegate.as_mut(), self.links.get(activation.link))
            {
                delegate.link_activated(link, activation.range, activation.kind);
            }
        }
        Ok(activation)
    }

    /// Abandon the current press without notifying the delegate.
    pub fn pointer_cancel(&mut self) -> Result<(), Error> {
        if self.gestures.is_active() {
            self.gestures.pointer_cancel(&mut self.text)?;
            self.generation.nudge();
        }
        Ok(())
    }

    fn cancel_gesture(&mut self) {
        if self.gestures.is_active() {
            log::debug!("cancelling press before the text changes");
            let cancelled = self.gestures.pointer_cancel(&mut self.text);
            debug_assert!(cancelled.is_ok(), "the text is unchanged during a press");
        }
    }

    // --- MARK: Drawing ---

    /// Capture what the label currently draws.
    pub fn render_scene(&self) -> RenderScene {
        RenderScene {
            generation: self.generation,
            text: Arc::from(self.text.as_str()),
            runs: self
                .text
                .runs()
                .map(|(range, attributes)| (range, public_attributes(attributes)))
                .collect(),
            size: self.bounds,
            insets: self.style.content_insets,
            mask: self.gestures.mask_overlay(),
        }
    }

    /// Hand the current scene to `renderer`, inline or on a worker thread as
    /// [`LabelStyle::draws_asynchronously`] says.
    ///
    /// Returns the generation of the requested frame.
    pub fn draw<R: Rasterizer>(&self, renderer: &mut AsyncRenderer<R>) -> Generation {
        renderer.set_asynchronous(self.style.draws_asynchronously);
        renderer.request(self.render_scene());
        self.generation
    }
}

fn inset_size(size: Size, insets: Insets) -> Size {
    Size::new(
        (size.width - insets.x_value()).max(0.0),
        (size.height - insets.y_value()).max(0.0),
    )
}

/// A short-lived borrow of a [`SwiftyLabel`] and the layout engine it is drawn with.
///
/// Every geometry query first brings the layout up to date, so setters never lay out
/// themselves.
#[derive(Debug)]
pub struct LabelDriver<'a, G: ?Sized> {
    /// The label.
    pub label: &'a mut SwiftyLabel,
    /// The layout engine.
    pub geometry: &'a mut G,
}

impl<G: TextGeometry + ?Sized> LabelDriver<'_, G> {
    /// Lay the text out if anything changed since the last layout.
    pub fn refresh_layout(&mut self) -> Result<(), Error> {
        if self.label.layout_dirty {
            self.relayout()?;
        }
        Ok(())
    }

    /// Lay the text out unconditionally.
    ///
    /// A press whose link is no longer visible afterwards is cancelled.
    pub fn relayout(&mut self) -> Result<(), Error> {
        let constraints = self.label.layout_constraints();
        self.geometry.relayout(&self.label.text, &constraints);
        self.label.layout_dirty = false;
        let was_active = self.label.gestures.is_active();
        self.label.gestures.refresh_regions(
            &*self.geometry,
            self.label.style.content_insets,
            &mut self.label.text,
        )?;
        if was_active && !self.label.gestures.is_active() {
            self.label.generation.nudge();
        }
        Ok(())
    }

    /// Where each embedded view goes, offset by the content insets.
    ///
    /// Attachments whose placeholder is not visible are left out.
    pub fn layout_completed(&mut self) -> Result<Vec<AttachmentPlacement>, Error> {
        self.refresh_layout()?;
        let insets = self.label.style.content_insets;
        let mut placements = Vec::new();
        for (range, attributes) in self.label.text.runs() {
            let Some(id) = attributes
                .get(&names::ATTACHMENT)
                .and_then(AttributeValue::as_attachment)
            else {
                continue;
            };
            let Some(attachment) = self.label.attachments.get(&id) else {
                continue;
            };
            let Some(regions) = self
                .geometry
                .glyph_regions(range.start..range.start + 1, insets)
            else {
                continue;
            };
            placements.push(AttachmentPlacement {
                id,
                frame: Rect::from_origin_size(regions.rects()[0].origin(), attachment.size),
            });
        }
        Ok(placements)
    }

    /// The size the label needs within `constrained`, including the content insets.
    pub fn proposed_size(&mut self, constrained: Size) -> Result<Size, Error> {
        self.refresh_layout()?;
        let insets = self.label.style.content_insets;
        let used = self.geometry.used_size(inset_size(constrained, insets));
        Ok(used + insets.size())
    }

    /// Start a press at `point`, returning `true` if it landed on a link.
    pub fn pointer_down(&mut self, point: Point) -> Result<bool, Error> {
        self.refresh_layout()?;
        let label = &mut *self.label;
        let claimed = label.gestures.pointer_down(
            point,
            &mut label.text,
            &label.links,
            &*self.geometry,
            label.style.content_insets,
        )?;
        if claimed {
            label.generation.nudge();
        }
        Ok(claimed)
    }
}
