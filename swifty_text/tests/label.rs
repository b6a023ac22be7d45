// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of a label driven through a monospace layout.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use swifty_text::kurbo::{Point, Size};
use swifty_text::peniko::color::palette;
use swifty_text::{
    AsyncRenderer, AttributeValue, Attributes, GestureKind, GestureResult, GestureState, Image,
    LinkKind, MonospaceGeometry, PHONE_NUMBER_PATTERN, Rasterizer, RenderScene, SwiftyLabel,
    TextDetector, TextLink, TextRange, URL_PATTERN, names,
};

type Activations = Rc<RefCell<Vec<(Option<String>, TextRange, GestureKind)>>>;

fn recording_label() -> (SwiftyLabel, Activations) {
    let mut label = SwiftyLabel::new();
    let activations = Activations::default();
    let sink = Rc::clone(&activations);
    label.set_delegate(move |link: &TextLink, range: TextRange, kind: GestureKind| {
        sink.borrow_mut()
            .push((link.phone_number.clone().or(link.url.clone()), range, kind));
    });
    (label, activations)
}

fn highlighting_phone_detector() -> TextDetector {
    TextDetector::builder(PHONE_NUMBER_PATTERN)
        .touchable(true)
        .link_kind(LinkKind::PhoneNumber)
        .highlighted_attributes(Attributes::new().with(
            names::BACKGROUND_COLOR,
            AttributeValue::BackgroundColor(palette::css::YELLOW),
        ))
        .build()
}

fn geometry() -> MonospaceGeometry {
    MonospaceGeometry::new(10.0, 20.0)
}

#[test]
fn tapping_a_phone_number() {
    let (mut label, activations) = recording_label();
    label.add_detector(highlighting_phone_detector());
    label.set_text("Call 555-1234 now");

    let (_, link, range) = label.link_at(7).unwrap();
    assert_eq!(range, TextRange::new(5, 8));
    assert_eq!(link.phone_number.as_deref(), Some("555-1234"));
    assert!(label.link_at(2).is_none());
    let before = label.text().clone();

    let mut geometry = geometry();
    assert!(
        label
            .driver(&mut geometry)
            .pointer_down(Point::new(60.0, 10.0))
            .unwrap()
    );
    assert_eq!(label.gesture_state(), GestureState::Highlighted);
    let (value, highlighted) = label
        .text()
        .attribute(&names::BACKGROUND_COLOR, 5, 0..17)
        .unwrap();
    assert_eq!(value, &AttributeValue::BackgroundColor(palette::css::YELLOW));
    assert_eq!(highlighted, 5..13);
    assert!(label.mask_overlay().is_some());

    let activation = label.pointer_up(Duration::from_millis(120)).unwrap().unwrap();
    assert_eq!(activation.kind, GestureKind::Tap);
    assert_eq!(label.text(), &before);
    assert_eq!(label.gesture_state(), GestureState::Idle);
    assert_eq!(
        *activations.borrow(),
        [(Some("555-1234".to_owned()), TextRange::new(5, 8), GestureKind::Tap)]
    );
}

#[test]
fn long_presses_are_reported_as_such() {
    let (mut label, activations) = recording_label();
    label.add_detector(highlighting_phone_detector());
    label.set_text("Call 555-1234 now");
    let mut geometry = geometry();
    label
        .driver(&mut geometry)
        .pointer_down(Point::new(100.0, 10.0))
        .unwrap();
    label.pointer_move(Point::new(104.0, 12.0)).unwrap();
    label.pointer_up(Duration::from_millis(800)).unwrap();
    assert_eq!(activations.borrow()[0].2, GestureKind::LongPress);
}

#[test]
fn dragging_away_cancels_without_notifying() {
    let (mut label, activations) = recording_label();
    label.add_detector(highlighting_phone_detector());
    label.set_text("Call 555-1234 now");
    let before = label.text().clone();
    let mut geometry = geometry();
    label
        .driver(&mut geometry)
        .pointer_down(Point::new(60.0, 10.0))
        .unwrap();

    label.pointer_move(Point::new(160.0, 10.0)).unwrap();
    assert_eq!(label.gesture_state(), GestureState::Suppressed);
    assert!(label.mask_overlay().is_none());
    assert_eq!(label.text(), &before);

    assert!(label.pointer_up(Duration::from_millis(100)).unwrap().is_none());
    assert!(activations.borrow().is_empty());
    assert_eq!(label.text(), &before);
}

#[test]
fn url_rewritten_to_a_symbol() {
    let mut label = SwiftyLabel::new();
    label.add_detector(
        TextDetector::builder(URL_PATTERN)
            .replacement_text(|_| "🔗".to_owned())
            .touchable(true)
            .link_kind(LinkKind::Url)
            .build(),
    );
    label.set_text("http://x");

    assert_eq!(label.text().as_str(), "🔗");
    let (_, link, range) = label.link_at(0).unwrap();
    assert_eq!(range, TextRange::new(0, 1));
    assert_eq!(link.url.as_deref(), Some("http://x"));
    // The symbol keeps the styling of the text it replaced.
    let (attributes, _) = label.public_attributes(0).unwrap();
    assert!(attributes.contains(&names::FONT));
}

#[test]
fn rescanning_is_idempotent() {
    let mut label = SwiftyLabel::new();
    label.add_detector(TextDetector::url());
    label.add_detector(TextDetector::phone_number());
    label.set_text("see www.example.com or 555-1234");
    let text = label.text().clone();
    let links = label.links().len();
    assert_eq!(links, 2);

    let report = label.process_detectors(0..text.len()).unwrap();
    assert_eq!(report.tagged(), 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(label.text(), &text);
    assert_eq!(label.links().len(), links);
}

#[test]
fn only_one_press_at_a_time() {
    let mut label = SwiftyLabel::new();
    label.add_detector(TextDetector::phone_number());
    label.set_text("555-1234 and 555-9876");
    let mut geometry = geometry();
    let mut driver = label.driver(&mut geometry);
    assert!(driver.pointer_down(Point::new(15.0, 10.0)).unwrap());
    assert!(!driver.pointer_down(Point::new(155.0, 10.0)).unwrap());

    let activation = label
        .finish_gesture(GestureResult::Tap)
        .unwrap()
        .unwrap();
    assert_eq!(activation.range, TextRange::new(0, 8));

    assert!(
        label
            .driver(&mut geometry)
            .pointer_down(Point::new(155.0, 10.0))
            .unwrap()
    );
}

#[test]
fn editing_during_a_press_cancels_it() {
    let (mut label, activations) = recording_label();
    label.add_detector(highlighting_phone_detector());
    label.set_text("Call 555-1234 now");
    let mut geometry = geometry();
    label
        .driver(&mut geometry)
        .pointer_down(Point::new(60.0, 10.0))
        .unwrap();

    label.replace_characters(0..4, "Dial").unwrap();
    assert_eq!(label.gesture_state(), GestureState::Idle);
    assert!(
        label
            .text()
            .attribute(&names::BACKGROUND_COLOR, 5, 0..17)
            .is_none()
    );
    assert!(label.pointer_up(Duration::ZERO).unwrap().is_none());
    assert!(activations.borrow().is_empty());
    assert!(label.link_at(5).is_some());
}

#[test]
fn relayout_hiding_the_link_cancels_the_press() {
    let mut label = SwiftyLabel::new();
    label.add_detector(highlighting_phone_detector());
    label.set_text("line one\nCall 555-1234");
    let before = label.text().clone();
    let mut geometry = geometry();
    assert!(
        label
            .driver(&mut geometry)
            .pointer_down(Point::new(55.0, 30.0))
            .unwrap()
    );

    label.set_number_of_lines(1);
    assert_eq!(label.gesture_state(), GestureState::Highlighted);
    label.driver(&mut geometry).relayout().unwrap();
    assert_eq!(label.gesture_state(), GestureState::Idle);
    assert_eq!(label.text(), &before);
}

#[test]
fn presses_outside_links_are_rejected() {
    let mut label = SwiftyLabel::new();
    label.add_detector(TextDetector::phone_number());
    label.set_text("Call 555-1234 now");
    label.set_bounds(Size::new(300.0, 40.0));
    let mut geometry = geometry();
    let mut driver = label.driver(&mut geometry);
    assert!(!driver.pointer_down(Point::new(15.0, 10.0)).unwrap());
    assert!(!driver.pointer_down(Point::new(60.0, 35.0)).unwrap());
    assert_eq!(label.gesture_state(), GestureState::Idle);
}

struct TextLength;

impl Rasterizer for TextLength {
    fn rasterize(&self, scene: &RenderScene) -> Image {
        let len = u8::try_from(scene.text.chars().count()).unwrap_or(u8::MAX);
        Image {
            width: 1,
            height: 1,
            data: vec![len, 0, 0, 255],
        }
    }
}

#[test]
fn scenes_render_on_a_worker() {
    let mut label = SwiftyLabel::new();
    label.set_draws_asynchronously(true);
    label.set_text("hello");
    let mut renderer = AsyncRenderer::new(TextLength, false);

    let scene = label.render_scene();
    assert!(scene.runs.iter().all(|(_, attributes)| !attributes.contains(&names::LINK)));
    let generation = label.draw(&mut renderer);
    assert_eq!(generation, scene.generation);
    assert!(renderer.is_asynchronous());
    assert!(renderer.wait_for(generation, Duration::from_secs(5)));
    assert_eq!(renderer.displayed().unwrap().image.data[0], 5);

    label.set_text("hi");
    assert!(label.generation() > generation);
}
