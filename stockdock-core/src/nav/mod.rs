//! Navigation over the card deck: discrete paging or free inertial scrolling of one long strip.
//!
//! The two modes are mutually exclusive per display. [`Navigator`] owns both controllers, routes
//! pointer gestures to the active one and resets the inactive one on every mode switch, so no
//! stale timer can fire into a hidden surface.

use crate::config::{PagingConfig, ScrollPhysics};
use crate::error::ConfigError;
use crate::quote::QuoteRegistry;
use crate::render::{CardRenderer, Surface, Viewport};
use crate::timer::{Scheduler, TimerKey};
use derive_more::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub mod paged;
pub mod scroll;
pub mod velocity;

pub use paged::{PagedNavigator, PagedState};
pub use scroll::InertialScroll;
pub use velocity::VelocityEstimator;

/// Which navigation surface is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NavigationMode {
    #[display("paged")]
    Paged,
    #[display("scroll")]
    Scroll,
}

impl NavigationMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Paged => Self::Scroll,
            Self::Scroll => Self::Paged,
        }
    }
}

impl FromStr for NavigationMode {
    type Err = ConfigError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "paged" | "slide" => Ok(Self::Paged),
            "scroll" => Ok(Self::Scroll),
            _ => Err(ConfigError::UnknownMode(mode.to_string())),
        }
    }
}

/// Snapshot of the navigator for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub mode: NavigationMode,
    pub current_page: usize,
    /// A slide, drag or glide is running; new page requests are rejected
    pub in_progress: bool,
}

/// Owns the navigation mode and both controllers.
#[derive(Debug, Clone)]
pub struct Navigator {
    mode: NavigationMode,
    paged: PagedNavigator,
    scroll: InertialScroll,
    viewport: Viewport,
    // Pointer x at drag start while paging, for swipe interpretation on release
    swipe_origin: Option<f64>,
}

impl Navigator {
    pub fn new(
        page_count: usize,
        viewport: Viewport,
        physics: ScrollPhysics,
        paging: PagingConfig,
    ) -> Self {
        let mut scroll = InertialScroll::new(physics);
        scroll.resize(Self::strip_width(page_count, viewport), viewport.width);

        Self {
            mode: NavigationMode::Paged,
            paged: PagedNavigator::new(paging, page_count, viewport.width),
            scroll,
            viewport,
            swipe_origin: None,
        }
    }

    /// Materialize the paged deck, show the first page and enter `mode`.
    pub fn present<S, R>(
        &mut self,
        mode: NavigationMode,
        quotes: &mut QuoteRegistry,
        timers: &mut S,
        renderer: &mut R,
    ) where
        S: Scheduler,
        R: CardRenderer,
    {
        quotes.materialize(Surface::Paged, renderer);
        renderer.set_page_visible(self.paged.current_page());
        renderer.show_mode(NavigationMode::Paged);

        if mode == NavigationMode::Scroll {
            self.switch_to_scroll_mode(quotes, timers, renderer);
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn paged(&self) -> &PagedNavigator {
        &self.paged
    }

    pub fn scroll(&self) -> &InertialScroll {
        &self.scroll
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> NavigationState {
        let in_progress = match self.mode {
            NavigationMode::Paged => self.paged.is_transitioning(),
            NavigationMode::Scroll => self.scroll.is_dragging() || self.scroll.is_animating(),
        };

        NavigationState {
            mode: self.mode,
            current_page: self.paged.current_page(),
            in_progress,
        }
    }

    /// Returns whether the mode changed.
    pub fn switch_to_paged_mode<S, R>(&mut self, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        if self.mode == NavigationMode::Paged {
            return false;
        }

        self.scroll.reset(timers);
        self.swipe_origin = None;
        self.mode = NavigationMode::Paged;
        renderer.show_mode(self.mode);
        renderer.set_page_visible(self.paged.current_page());
        info!(mode = %self.mode, "navigation mode switched");
        true
    }

    /// Returns whether the mode changed. The strip's cards are created on first use.
    pub fn switch_to_scroll_mode<S, R>(
        &mut self,
        quotes: &mut QuoteRegistry,
        timers: &mut S,
        renderer: &mut R,
    ) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        if self.mode == NavigationMode::Scroll {
            return false;
        }

        self.paged.finish_now(timers, renderer);
        self.swipe_origin = None;
        quotes.materialize(Surface::Strip, renderer);
        self.mode = NavigationMode::Scroll;
        renderer.show_mode(self.mode);
        renderer.set_strip_offset(self.scroll.offset());
        info!(mode = %self.mode, "navigation mode switched");
        true
    }

    /// Switch to the other mode, returning the new one.
    pub fn toggle_mode<S, R>(
        &mut self,
        quotes: &mut QuoteRegistry,
        timers: &mut S,
        renderer: &mut R,
    ) -> NavigationMode
    where
        S: Scheduler,
        R: CardRenderer,
    {
        match self.mode {
            NavigationMode::Paged => self.switch_to_scroll_mode(quotes, timers, renderer),
            NavigationMode::Scroll => self.switch_to_paged_mode(timers, renderer),
        };
        self.mode
    }

    pub fn drag_start<S>(&mut self, x: f64, at: Duration, timers: &mut S)
    where
        S: Scheduler,
    {
        match self.mode {
            NavigationMode::Paged => {
                if self.paged.is_transitioning() {
                    debug!("ignoring drag during page transition");
                    return;
                }
                self.swipe_origin = Some(x);
            }
            NavigationMode::Scroll => self.scroll.drag_start(x, at, timers),
        }
    }

    pub fn drag_move<R>(&mut self, x: f64, at: Duration, renderer: &mut R)
    where
        R: CardRenderer,
    {
        if self.mode == NavigationMode::Scroll {
            self.scroll.drag_move(x, at, renderer);
        }
    }

    /// Release the pointer at `x`. Returns whether a page slide or glide started.
    pub fn drag_end<S, R>(&mut self, x: f64, at: Duration, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        match self.mode {
            NavigationMode::Paged => match self.swipe_origin.take() {
                Some(origin) => self.paged.request_gesture(x - origin, timers, renderer),
                None => false,
            },
            NavigationMode::Scroll => self.scroll.drag_end(at, timers, renderer),
        }
    }

    /// Completed swipe reported directly by the shell. Ignored outside paged mode.
    pub fn swipe_end<S, R>(&mut self, delta_x: f64, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        self.mode == NavigationMode::Paged
            && self.paged.request_gesture(delta_x, timers, renderer)
    }

    /// Dot navigation. Ignored outside paged mode.
    pub fn go_to<S, R>(&mut self, page: usize, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        self.mode == NavigationMode::Paged && self.paged.go_to(page, timers, renderer)
    }

    pub fn next<S, R>(&mut self, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        self.mode == NavigationMode::Paged && self.paged.next(timers, renderer)
    }

    pub fn previous<S, R>(&mut self, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        self.mode == NavigationMode::Paged && self.paged.previous(timers, renderer)
    }

    /// Handle a fired timer, returning `false` for keys the navigator does not own.
    pub fn on_timer<S, R>(&mut self, key: TimerKey, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        match key {
            TimerKey::InertialTick => {
                self.scroll.on_tick(timers, renderer);
                true
            }
            TimerKey::PageTransition => {
                self.paged.on_transition_complete(renderer);
                true
            }
            TimerKey::Startup | TimerKey::Reconnect | TimerKey::Refresh => false,
        }
    }

    /// Apply a new viewport size: slide distance and strip bounds follow it.
    pub fn set_viewport<R>(&mut self, viewport: Viewport, renderer: &mut R)
    where
        R: CardRenderer,
    {
        self.viewport = viewport;
        self.paged.set_width(viewport.width);
        self.scroll.set_bounds(
            Self::strip_width(self.paged.page_count(), viewport),
            viewport.width,
            renderer,
        );
    }

    /// The strip lays every page side by side at viewport width.
    fn strip_width(page_count: usize, viewport: Viewport) -> f64 {
        page_count as f64 * viewport.width
    }
}
