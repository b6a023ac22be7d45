// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterizing label snapshots, optionally off the owner thread.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::Range;
use core::time::Duration;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use peniko::kurbo::{Insets, Size};

use crate::{Attributes, MaskOverlay};

/// Opaque representation of a generation.
///
/// Every change to what a label would draw bumps its generation; newer frames compare greater.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Make it newer than it currently is.
    pub(crate) fn nudge(&mut self) {
        self.0 += 1;
    }
}

/// An immutable copy of everything needed to draw a label.
#[derive(Clone, Debug)]
pub struct RenderScene {
    /// Generation of the label when the scene was captured.
    pub generation: Generation,
    /// The text.
    pub text: Arc<str>,
    /// Public attribute runs over character ranges of `text`.
    pub runs: Vec<(Range<usize>, Attributes)>,
    /// Size of the drawing surface.
    pub size: Size,
    /// Space between the surface edges and the text container.
    pub insets: Insets,
    /// Highlight mask over a pressed link.
    pub mask: Option<MaskOverlay>,
}

/// Premultiplied RGBA8 pixels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes, row by row.
    pub data: Vec<u8>,
}

/// A rasterized scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Generation of the scene this was drawn from.
    pub generation: Generation,
    /// The pixels.
    pub image: Image,
}

/// Turns scenes into pixels. Implementations may be called from a worker thread.
pub trait Rasterizer: Send + Sync + 'static {
    /// Draw `scene`.
    fn rasterize(&self, scene: &RenderScene) -> Image;
}

/// Rasterizes scenes inline or on worker threads and keeps the newest finished frame.
///
/// Worker results arrive over a channel and are only picked up by [`poll`](Self::poll) on the
/// owner thread. A frame older than the one displayed is dropped, so a slow render can never
/// replace a newer one. The displayed frame can be read from other threads through
/// [`display_handle`](Self::display_handle).
#[derive(Debug)]
pub struct AsyncRenderer<R> {
    rasterizer: Arc<R>,
    asynchronous: bool,
    sender: Sender<RenderedFrame>,
    receiver: Receiver<RenderedFrame>,
    displayed: Arc<ArcSwapOption<RenderedFrame>>,
}

impl<R: Rasterizer> AsyncRenderer<R> {
    /// Create a renderer. With `asynchronous` off every request rasterizes inline.
    pub fn new(rasterizer: R, asynchronous: bool) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            rasterizer: Arc::new(rasterizer),
            asynchronous,
            sender,
            receiver,
            displayed: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Returns `true` if requests are rasterized on worker threads.
    pub fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }

    /// Switch between inline and worker-thread rasterization.
    pub fn set_asynchronous(&mut self, asynchronous: bool) {
        self.asynchronous = asynchronous;
    }

    /// Rasterize `scene`.
    ///
    /// Inline requests are displayed before this returns. Asynchronous ones are displayed by
    /// a later [`poll`](Self::poll).
    pub fn request(&self, scene: RenderScene) {
        if !self.asynchronous {
            let image = self.rasterizer.rasterize(&scene);
            self.present(RenderedFrame {
                generation: scene.generation,
                image,
            });
            return;
        }
        let rasterizer = Arc::clone(&self.rasterizer);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("swifty-text-render".into())
            .spawn(move || {
                let image = rasterizer.rasterize(&scene);
                // The renderer may be gone by now; the frame is simply unwanted then.
                let _ = sender.send(RenderedFrame {
                    generation: scene.generation,
                    image,
                });
            });
        if let Err(err) = spawned {
            log::warn!("could not start render thread: {err}");
        }
    }

    /// Display the newest finished frame, returning `true` if the displayed frame changed.
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while let Ok(frame) = self.receiver.try_recv() {
            changed |= self.present(frame);
        }
        changed
    }

    /// Block until a frame of at least `generation` is displayed, or `timeout` passes.
    ///
    /// Returns `true` if such a frame is displayed.
    pub fn wait_for(&self, generation: Generation, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.displayed_generation() >= Some(generation) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(frame) => {
                    self.present(frame);
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    /// The frame currently displayed.
    pub fn displayed(&self) -> Option<Arc<RenderedFrame>> {
        self.displayed.load_full()
    }

    /// A shared handle to the displayed frame, for readers on other threads.
    pub fn display_handle(&self) -> Arc<ArcSwapOption<RenderedFrame>> {
        Arc::clone(&self.displayed)
    }

    fn displayed_generation(&self) -> Option<Generation> {
        (*self.displayed.load())
            .as_ref()
            .map(|frame| frame.generation)
    }

    fn present(&self, frame: RenderedFrame) -> bool {
        if self.displayed_generation() >= Some(frame.generation) {
            log::trace!("dropping stale frame {:?}", frame.generation);
            return false;
        }
        log::trace!("displaying frame {:?}", frame.generation);
        self.displayed.store(Some(Arc::new(frame)));
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use peniko::kurbo::{Insets, Size};

    use super::{AsyncRenderer, Generation, Image, Rasterizer, RenderScene};

    /// Draws a 1x1 image filled with the text length.
    #[derive(Default)]
    struct Recording {
        drawn: Mutex<Vec<Generation>>,
    }

    impl Rasterizer for Recording {
        fn rasterize(&self, scene: &RenderScene) -> Image {
            self.drawn.lock().unwrap().push(scene.generation);
            let len = u8::try_from(scene.text.len()).unwrap_or(u8::MAX);
            Image {
                width: 1,
                height: 1,
                data: vec![len; 4],
            }
        }
    }

    fn scene(generation: u64, text: &str) -> RenderScene {
        RenderScene {
            generation: Generation(generation),
            text: Arc::from(text),
            runs: Vec::new(),
            size: Size::new(10.0, 10.0),
            insets: Insets::ZERO,
            mask: None,
        }
    }

    #[test]
    fn inline_requests_display_immediately() {
        let renderer = AsyncRenderer::new(Recording::default(), false);
        renderer.request(scene(1, "abc"));
        let frame = renderer.displayed().unwrap();
        assert_eq!(frame.generation, Generation(1));
        assert_eq!(frame.image.data, [3; 4]);
        assert!(!renderer.poll());
    }

    #[test]
    fn stale_frames_never_replace_newer_ones() {
        let renderer = AsyncRenderer::new(Recording::default(), false);
        renderer.request(scene(2, "new"));
        renderer.request(scene(1, "stale"));
        assert_eq!(renderer.displayed().unwrap().generation, Generation(2));
    }

    #[test]
    fn worker_frames_arrive_through_poll() {
        let renderer = AsyncRenderer::new(Recording::default(), true);
        renderer.request(scene(1, "hello"));
        assert!(renderer.wait_for(Generation(1), Duration::from_secs(5)));
        let frame = renderer.displayed().unwrap();
        assert_eq!(frame.image.data, [5; 4]);
        let handle = renderer.display_handle();
        let seen = std::thread::spawn(move || handle.load_full().map(|frame| frame.generation));
        assert_eq!(seen.join().unwrap(), Some(Generation(1)));
        assert_eq!(renderer.rasterizer.drawn.lock().unwrap().len(), 1);
    }

    #[test]
    fn generations_order() {
        let mut generation = Generation::default();
        let before = generation;
        generation.nudge();
        assert!(generation > before);
    }
}
