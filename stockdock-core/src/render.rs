//! Interfaces to the presentation layer.
//!
//! The core never draws: it tells a [`CardRenderer`] *when* and *with what values* to repaint,
//! and reads the [`Viewport`] the shell reports.

use crate::catalog::CardSlot;
use crate::nav::NavigationMode;
use crate::quote::Quote;
use std::time::Duration;

/// The two visual instances the same quote may be drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// One page of the 3×2 deck at a time
    Paged,
    /// Continuous horizontal strip of every page side by side
    Strip,
}

/// A single card on a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardRef {
    pub surface: Surface,
    pub slot: CardSlot,
}

impl CardRef {
    pub fn new(surface: Surface, slot: CardSlot) -> Self {
        Self { surface, slot }
    }
}

/// Repaint instructions consumed by the presentation layer.
pub trait CardRenderer {
    /// Redraw one card with the quote's latest value.
    fn render_quote(&mut self, card: CardRef, quote: &Quote);

    /// Position the scroll strip at horizontal offset `offset` (px, `<= 0` once settled).
    fn set_strip_offset(&mut self, offset: f64);

    /// Show `page` as the current paged surface and update the page indicator.
    fn set_page_visible(&mut self, page: usize);

    /// Start animating a page slide; the renderer samples [`SlideTransition::offsets_at`].
    fn begin_slide(&mut self, transition: &SlideTransition);

    /// Make the surface of `mode` the visible one.
    fn show_mode(&mut self, mode: NavigationMode);
}

/// Size of the visible navigation surface in virtual pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Direction a page slide travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Towards a higher page; content moves left
    Forward,
    /// Towards a lower page; content moves right
    Backward,
}

impl SlideDirection {
    pub fn between(from: usize, to: usize) -> Option<Self> {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Some(Self::Forward),
            std::cmp::Ordering::Less => Some(Self::Backward),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn sign(&self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Fixed-duration slide from one page to another.
///
/// The incoming page starts one viewport away on the side of travel and eases to `0`; the
/// outgoing page eases from `0` to one viewport away on the opposite side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideTransition {
    pub from: usize,
    pub to: usize,
    pub direction: SlideDirection,
    pub width: f64,
    pub duration: Duration,
}

impl SlideTransition {
    /// `None` when `from == to`.
    pub fn new(from: usize, to: usize, width: f64, duration: Duration) -> Option<Self> {
        SlideDirection::between(from, to).map(|direction| Self {
            from,
            to,
            direction,
            width,
            duration,
        })
    }

    /// Eased completion in `[0, 1]` after `elapsed`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let linear = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        ease_out_expo(linear)
    }

    /// `(outgoing_x, incoming_x)` after `elapsed`.
    pub fn offsets_at(&self, elapsed: Duration) -> (f64, f64) {
        let eased = self.progress(elapsed);
        let travel = self.direction.sign() * self.width;
        (-travel * eased, travel * (1.0 - eased))
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// Exponential ease-out: fast start, settles exactly on `1.0` at `t = 1`.
pub fn ease_out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t.max(0.0))
    }
}

/// A single instruction captured by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Quote { card: CardRef, quote: Quote },
    StripOffset(f64),
    PageVisible(usize),
    Slide(SlideTransition),
    Mode(NavigationMode),
}

/// [`CardRenderer`] that records every instruction, for driving the core without a display.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn quote_calls(&self) -> impl Iterator<Item = (CardRef, &Quote)> {
        self.calls.iter().filter_map(|call| match call {
            RenderCall::Quote { card, quote } => Some((*card, quote)),
            _ => None,
        })
    }

    pub fn strip_offsets(&self) -> impl Iterator<Item = f64> + '_ {
        self.calls.iter().filter_map(|call| match call {
            RenderCall::StripOffset(offset) => Some(*offset),
            _ => None,
        })
    }

    pub fn last_strip_offset(&self) -> Option<f64> {
        self.strip_offsets().last()
    }

    pub fn visible_pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.calls.iter().filter_map(|call| match call {
            RenderCall::PageVisible(page) => Some(*page),
            _ => None,
        })
    }

    pub fn slides(&self) -> impl Iterator<Item = &SlideTransition> {
        self.calls.iter().filter_map(|call| match call {
            RenderCall::Slide(transition) => Some(transition),
            _ => None,
        })
    }
}

impl CardRenderer for RecordingRenderer {
    fn render_quote(&mut self, card: CardRef, quote: &Quote) {
        self.calls.push(RenderCall::Quote {
            card,
            quote: quote.clone(),
        });
    }

    fn set_strip_offset(&mut self, offset: f64) {
        self.calls.push(RenderCall::StripOffset(offset));
    }

    fn set_page_visible(&mut self, page: usize) {
        self.calls.push(RenderCall::PageVisible(page));
    }

    fn begin_slide(&mut self, transition: &SlideTransition) {
        self.calls.push(RenderCall::Slide(*transition));
    }

    fn show_mode(&mut self, mode: NavigationMode) {
        self.calls.push(RenderCall::Mode(mode));
    }
}
