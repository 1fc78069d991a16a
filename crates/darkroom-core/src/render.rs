//! Render driver: debounced recompute and before/after composition.
//!
//! Changes are not rendered immediately. Each change files a request in a
//! single-slot [`RenderScheduler`]; a newer request replaces the pending one
//! and pushes its deadline back, so a burst of slider moves produces one
//! frame showing the last state. Time comes from a [`Clock`] so hosts feed
//! their own timestamps and tests step a [`ManualClock`].

use std::cell::Cell;
use std::time::Duration;

use log::{debug, trace};

use crate::config::EditorConfig;
use crate::decode::{PixelBuffer, BYTES_PER_PIXEL};
use crate::session::{ComparisonMode, EditorSession};

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRender {
    revision: u64,
    due: Duration,
}

/// Latest-request-wins render queue with one slot.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    delay: Duration,
    pending: Option<PendingRender>,
}

impl RenderScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(Duration::from_millis(config.render_debounce_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `revision` for `now + delay`, discarding any pending request.
    pub fn request(&mut self, revision: u64, now: Duration) {
        if let Some(old) = self.pending {
            trace!("render of revision {} superseded by {revision}", old.revision);
        }
        self.pending = Some(PendingRender {
            revision,
            due: now + self.delay,
        });
    }

    /// Take the pending revision if its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<u64> {
        match self.pending {
            Some(pending) if pending.due <= now => {
                self.pending = None;
                Some(pending.revision)
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending request becomes due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.map(|p| p.due)
    }
}

/// Caption drawn over one pane of a comparison frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Label {
    pub text: &'static str,
    /// Left edge of the pane the label belongs to
    pub x: u32,
}

/// Everything a surface needs to paint one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub pixels: PixelBuffer,
    /// Column where a divider line goes, if any
    pub divider_x: Option<u32>,
    pub labels: Vec<Label>,
}

/// Display target for rendered frames.
pub trait Surface {
    fn draw(&mut self, frame: &Frame);
}

/// Build the frame for the given display mode.
///
/// `processed` must have the same dimensions as `original`.
pub fn compose_frame(
    original: &PixelBuffer,
    processed: &PixelBuffer,
    comparison: bool,
    mode: ComparisonMode,
) -> Frame {
    const BEFORE: &str = "Before";
    const AFTER: &str = "After";

    if !comparison {
        return Frame {
            pixels: processed.clone(),
            divider_x: None,
            labels: Vec::new(),
        };
    }

    let width = original.width;
    let height = original.height;

    match mode {
        ComparisonMode::Toggle => Frame {
            pixels: original.clone(),
            divider_x: None,
            labels: vec![Label { text: BEFORE, x: 0 }],
        },
        ComparisonMode::Split => {
            let split = width / 2;
            let cut = split as usize * BYTES_PER_PIXEL;
            let mut pixels = Vec::with_capacity(original.pixels.len());
            for y in 0..height {
                pixels.extend_from_slice(&original.row(y)[..cut]);
                pixels.extend_from_slice(&processed.row(y)[cut..]);
            }
            Frame {
                pixels: PixelBuffer::new(width, height, pixels),
                divider_x: Some(split),
                labels: vec![Label { text: BEFORE, x: 0 }, Label { text: AFTER, x: split }],
            }
        }
        ComparisonMode::SideBySide => {
            let mut pixels = Vec::with_capacity(original.pixels.len() * 2);
            for y in 0..height {
                pixels.extend_from_slice(original.row(y));
                pixels.extend_from_slice(processed.row(y));
            }
            Frame {
                pixels: PixelBuffer::new(width * 2, height, pixels),
                divider_x: Some(width),
                labels: vec![Label { text: BEFORE, x: 0 }, Label { text: AFTER, x: width }],
            }
        }
    }
}

/// Frame for the session's current state.
pub fn session_frame(session: &mut EditorSession) -> Frame {
    let comparison = session.comparison();
    let mode = session.comparison_mode();
    let (original, processed) = session.original_and_processed();
    compose_frame(original, processed, comparison, mode)
}

/// Connects a session to a surface through the debounce scheduler.
#[derive(Debug)]
pub struct RenderDriver<C: Clock> {
    clock: C,
    scheduler: RenderScheduler,
    last_drawn: Option<u64>,
}

impl<C: Clock> RenderDriver<C> {
    pub fn new(clock: C, delay: Duration) -> Self {
        Self {
            clock,
            scheduler: RenderScheduler::new(delay),
            last_drawn: None,
        }
    }

    pub fn from_config(clock: C, config: &EditorConfig) -> Self {
        Self {
            clock,
            scheduler: RenderScheduler::from_config(config),
            last_drawn: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    /// Revision of the most recent frame drawn.
    pub fn last_drawn(&self) -> Option<u64> {
        self.last_drawn
    }

    /// The session changed; schedule a frame.
    pub fn notify(&mut self, session: &mut EditorSession) {
        self.scheduler.request(session.revision(), self.clock.now());
        session.set_processing(true);
    }

    /// Draw if the pending request is due. Returns the revision drawn.
    pub fn tick<S: Surface>(&mut self, session: &mut EditorSession, surface: &mut S) -> Option<u64> {
        let requested = self.scheduler.poll(self.clock.now())?;
        if requested != session.revision() {
            debug!(
                "render requested for revision {requested}, drawing {}",
                session.revision()
            );
        }
        Some(self.draw(session, surface))
    }

    /// Draw now, dropping any pending request.
    pub fn flush<S: Surface>(&mut self, session: &mut EditorSession, surface: &mut S) -> u64 {
        self.scheduler.cancel();
        self.draw(session, surface)
    }

    fn draw<S: Surface>(&mut self, session: &mut EditorSession, surface: &mut S) -> u64 {
        let frame = session_frame(session);
        surface.draw(&frame);

        let revision = session.revision();
        debug!(
            "drew revision {revision} ({}x{})",
            frame.pixels.width, frame.pixels.height
        );
        session.set_processing(false);
        self.last_drawn = Some(revision);
        revision
    }
}
