// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swifty Text is a rich text label that finds links in its content and tracks presses on them.
//!
//! Text lives in a [`RichText`] store. [`TextDetector`]s are rules that scan it for a pattern and
//! tag, rewrite, or turn matches into touchable [`TextLink`]s. A [`SwiftyLabel`] owns the store,
//! the detectors and the links, and runs a small press state machine that highlights a link while
//! it is held and reports taps and long presses to a [`LabelDelegate`].
//!
//! Layout is delegated: the label talks to a [`TextGeometry`] through a [`LabelDriver`], and
//! pixels come from a [`Rasterizer`], optionally on a worker thread through [`AsyncRenderer`].
//!
//! ## Example
//!
//! ```
//! use swifty_text::kurbo::Point;
//! use swifty_text::{GestureKind, MonospaceGeometry, SwiftyLabel, TextDetector, TextLink, TextRange};
//! use std::time::Duration;
//!
//! let mut label = SwiftyLabel::new();
//! label.add_detector(TextDetector::phone_number());
//! label.set_text("Call 555-1234 now");
//! label.set_delegate(|link: &TextLink, range: TextRange, kind: GestureKind| {
//!     assert_eq!(link.phone_number.as_deref(), Some("555-1234"));
//!     assert_eq!(range, TextRange::new(5, 8));
//!     assert_eq!(kind, GestureKind::Tap);
//! });
//!
//! // Ten points per character: "555-1234" spans x = 50..130.
//! let mut geometry = MonospaceGeometry::new(10.0, 20.0);
//! assert!(label.driver(&mut geometry).pointer_down(Point::new(70.0, 10.0)).unwrap());
//! let activation = label.pointer_up(Duration::from_millis(80)).unwrap();
//! assert!(activation.is_some());
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub use attributed_text;
pub use peniko;
pub use peniko::kurbo;

mod attribute;
mod detection;
mod detector;
mod error;
mod geometry;
mod gesture;
mod label;
mod link;
mod render;
mod style;

pub use attributed_text::{AttributeName, AttributeSnapshot, TextRange};

pub use crate::attribute::{
    AttachmentId, AttributeValue, Attributes, Opaque, RichText, names, public_attributes,
};
pub use crate::detection::{ScanReport, scan};
pub use crate::detector::{
    DetectorId, DetectorMatch, LinkKind, PHONE_NUMBER_PATTERN, RewriteError, RewriteFn,
    TextDetector, TextDetectorBuilder, URL_PATTERN,
};
pub use crate::error::Error;
pub use crate::geometry::{GlyphRegions, LayoutConstraints, MonospaceGeometry, TextGeometry};
pub use crate::gesture::{
    GestureClassifier, GestureKind, GestureResult, GestureState, GestureTracker, LinkActivation,
    MaskOverlay,
};
pub use crate::label::{
    ATTACHMENT_CHARACTER, AttachmentPlacement, LabelDelegate, LabelDriver, SwiftyLabel,
    ViewAttachment,
};
pub use crate::link::{DEFAULT_MASK_RADIUS, LinkId, LinkTable, TextLink, default_mask_color};
pub use crate::render::{
    AsyncRenderer, Generation, Image, Rasterizer, RenderScene, RenderedFrame,
};
pub use crate::style::{
    Alignment, DEFAULT_FONT_SIZE, Font, LabelStyle, LineBreakMode, ParagraphStyle,
};
