// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press tracking over links.
//!
//! A press that lands exactly on a link's glyphs starts a session. The link is highlighted
//! while the pointer stays over its glyphs and restored when it leaves, and the original
//! formatting always comes back when the press ends.

use alloc::vec::Vec;
use core::ops::Range;
use core::time::Duration;

use attributed_text::{AttributeSnapshot, TextRange};
use peniko::Color;
use peniko::kurbo::{Insets, Point, RoundedRect};

use crate::attribute::names;
use crate::{AttributeValue, Attributes, Error, GlyphRegions, LinkId, LinkTable, RichText, TextGeometry};

/// How a completed press is reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// A short press.
    Tap,
    /// A press held past the long-press threshold.
    LongPress,
}

/// The outcome of a press, as decided by the host's gesture recognition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GestureResult {
    /// Report a tap.
    Tap,
    /// Report a long press.
    LongPress,
    /// End the press without reporting anything.
    Cancelled,
}

impl GestureResult {
    /// The kind to report, or `None` for a cancelled press.
    pub fn kind(self) -> Option<GestureKind> {
        match self {
            Self::Tap => Some(GestureKind::Tap),
            Self::LongPress => Some(GestureKind::LongPress),
            Self::Cancelled => None,
        }
    }
}

/// State of the [`GestureTracker`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GestureState {
    /// No press is being tracked.
    #[default]
    Idle,
    /// A link is pressed and the pointer is over its glyphs.
    Highlighted,
    /// A link is pressed but the pointer has left its glyphs.
    Suppressed,
}

/// Classifies a finished press by how long it was held and how far it travelled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureClassifier {
    /// Presses held at least this long are long presses.
    pub long_press_duration: Duration,
    /// Presses that travel further than this, in points, are cancelled.
    pub allowable_movement: f64,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self {
            long_press_duration: Duration::from_millis(500),
            allowable_movement: 10.0,
        }
    }
}

impl GestureClassifier {
    /// Classify a press held for `held` whose pointer moved at most `travel` points away.
    pub fn classify(&self, held: Duration, travel: f64) -> GestureResult {
        if travel > self.allowable_movement {
            GestureResult::Cancelled
        } else if held >= self.long_press_duration {
            GestureResult::LongPress
        } else {
            GestureResult::Tap
        }
    }
}

/// The translucent shape drawn over a pressed link.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskOverlay {
    /// One rounded rectangle per glyph region.
    pub regions: Vec<RoundedRect>,
    /// Fill color.
    pub color: Color,
}

/// A press that ended on a link.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinkActivation {
    /// The pressed link.
    pub link: LinkId,
    /// Its range in the text.
    pub range: TextRange,
    /// How it was pressed.
    pub kind: GestureKind,
}

#[derive(Debug)]
struct Session {
    link: LinkId,
    range: Range<usize>,
    regions: GlyphRegions,
    snapshot: AttributeSnapshot<AttributeValue>,
    highlighted_attributes: Option<Attributes>,
    mask_radius: f64,
    mask_color: Color,
    state: GestureState,
    origin: Point,
    travel: f64,
}

impl Session {
    fn highlight(&mut self, text: &mut RichText) -> Result<(), Error> {
        if let Some(attributes) = &self.highlighted_attributes {
            text.add_attributes(attributes, self.range.clone())?;
        }
        self.state = GestureState::Highlighted;
        Ok(())
    }

    fn suppress(&mut self, text: &mut RichText) -> Result<(), Error> {
        text.restore(&self.snapshot)?;
        self.state = GestureState::Suppressed;
        Ok(())
    }
}

/// Tracks at most one press at a time.
///
/// The tracker borrows the text only for the duration of each event. The text must not be
/// mutated between events of one press; [`SwiftyLabel`](crate::SwiftyLabel) cancels the press
/// before any mutation.
#[derive(Debug, Default)]
pub struct GestureTracker {
    session: Option<Session>,
}

impl GestureTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    pub fn state(&self) -> GestureState {
        self.session
            .as_ref()
            .map_or(GestureState::Idle, |session| session.state)
    }

    /// Returns `true` while a press is being tracked.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The pressed link and its range.
    pub fn active_link(&self) -> Option<(LinkId, TextRange)> {
        self.session
            .as_ref()
            .map(|session| (session.link, session.range.clone().into()))
    }

    /// The furthest distance the pointer has moved from where it went down.
    pub fn travel(&self) -> f64 {
        self.session.as_ref().map_or(0.0, |session| session.travel)
    }

    /// The glyph regions captured when the press started.
    pub fn regions(&self) -> Option<&GlyphRegions> {
        self.session.as_ref().map(|session| &session.regions)
    }

    /// The mask to draw, present only while highlighted.
    pub fn mask_overlay(&self) -> Option<MaskOverlay> {
        let session = self.session.as_ref()?;
        (session.state == GestureState::Highlighted).then(|| MaskOverlay {
            regions: session.regions.rounded(session.mask_radius),
            color: session.mask_color,
        })
    }

    /// Start a press at `point`.
    ///
    /// Returns `true` if the press landed on the glyphs of a link and is now tracked. Ignored
    /// while another press is tracked.
    pub fn pointer_down<G: TextGeometry + ?Sized>(
        &mut self,
        point: Point,
        text: &mut RichText,
        links: &LinkTable,
        geometry: &G,
        insets: Insets,
    ) -> Result<bool, Error> {
        if self.session.is_some() {
            log::debug!("ignoring pointer down at {point:?}: a press is already tracked");
            return Ok(false);
        }
        let Some(offset) = geometry.character_offset(point, insets) else {
            return Ok(false);
        };
        let Some((id, range)) = text
            .attribute(&names::LINK, offset, 0..text.len())
            .and_then(|(value, range)| Some((value.as_link()?, range)))
        else {
            return Ok(false);
        };
        let Some(link) = links.get(id) else {
            log::warn!("text refers to missing link {id:?} at {range:?}");
            return Ok(false);
        };
        let Some(regions) = geometry.glyph_regions(range.clone(), insets) else {
            return Ok(false);
        };
        if !regions.contains(point) {
            log::trace!("pointer down at {point:?} is near {range:?} but not on its glyphs");
            return Ok(false);
        }

        let mut session = Session {
            link: id,
            snapshot: text.snapshot(range.clone())?,
            range,
            regions,
            highlighted_attributes: link.highlighted_attributes.clone(),
            mask_radius: link.mask_radius,
            mask_color: link.mask_color,
            state: GestureState::Idle,
            origin: point,
            travel: 0.0,
        };
        session.highlight(text)?;
        log::debug!("pressed link {id:?} over {:?}", session.range);
        self.session = Some(session);
        Ok(true)
    }

    /// Follow the pointer, toggling the highlight as it leaves and re-enters the link.
    pub fn pointer_move(&mut self, point: Point, text: &mut RichText) -> Result<(), Error> {
        let Some(session) = &mut self.session else {
            return Ok(());
        };
        session.travel = session.travel.max(session.origin.distance(point));
        let inside = session.regions.contains(point);
        match session.state {
            GestureState::Highlighted if !inside => {
                session.suppress(text)?;
                log::debug!("press on {:?} left the link", session.link);
            }
            GestureState::Suppressed if inside => {
                session.highlight(text)?;
                log::debug!("press on {:?} re-entered the link", session.link);
            }
            _ => {}
        }
        Ok(())
    }

    /// End the press, restoring the link's formatting.
    ///
    /// Returns the activation to report, unless `result` is [`GestureResult::Cancelled`] or no
    /// press was tracked.
    pub fn pointer_up(
        &mut self,
        result: GestureResult,
        text: &mut RichText,
    ) -> Result<Option<LinkActivation>, Error> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        text.restore(&session.snapshot)?;
        log::debug!("press on {:?} ended: {result:?}", session.link);
        Ok(result.kind().map(|kind| LinkActivation {
            link: session.link,
            range: session.range.into(),
            kind,
        }))
    }

    /// Abandon the press, restoring the link's formatting without reporting anything.
    pub fn pointer_cancel(&mut self, text: &mut RichText) -> Result<(), Error> {
        self.pointer_up(GestureResult::Cancelled, text).map(drop)
    }

    /// Recompute the pressed link's regions after a relayout.
    ///
    /// Cancels the press if none of the link's glyphs are visible any more.
    pub fn refresh_regions<G: TextGeometry + ?Sized>(
        &mut self,
        geometry: &G,
        insets: Insets,
        text: &mut RichText,
    ) -> Result<(), Error> {
        let Some(session) = &mut self.session else {
            return Ok(());
        };
        match geometry.glyph_regions(session.range.clone(), insets) {
            Some(regions) => session.regions = regions,
            None => {
                log::debug!("pressed link {:?} is no longer visible", session.link);
                self.pointer_cancel(text)?;
            }
        }
        Ok(())
    }
}
