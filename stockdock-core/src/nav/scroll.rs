use super::velocity::VelocityEstimator;
use crate::config::ScrollPhysics;
use crate::render::CardRenderer;
use crate::timer::{Scheduler, TimerKey};
use std::time::Duration;
use tracing::debug;

/// Drag / flick scrolling of the card strip with edge resistance and friction-decayed inertia.
///
/// The offset is `<= 0` (strip moved left) and `>= min`, where `min = -(content - viewport)`.
/// While the pointer is down the offset may overshoot a bound by a resisted amount; it is pulled
/// back on release or by the next inertial tick.
#[derive(Debug, Clone)]
pub struct InertialScroll {
    physics: ScrollPhysics,
    estimator: VelocityEstimator,

    // Scroll state
    offset: f64,
    velocity: f64,
    min: f64,

    // Gesture state
    dragging: bool,
    animating: bool,
    last_x: f64,
    last_at: Duration,
    // Offset the pointer would have reached without edge resistance
    unresisted: f64,
}

impl InertialScroll {
    pub fn new(physics: ScrollPhysics) -> Self {
        Self {
            estimator: VelocityEstimator::new(&physics),
            physics,
            offset: 0.0,
            velocity: 0.0,
            min: 0.0,
            dragging: false,
            animating: false,
            last_x: 0.0,
            last_at: Duration::ZERO,
            unresisted: 0.0,
        }
    }

    pub fn physics(&self) -> &ScrollPhysics {
        &self.physics
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// `(min, max)` offset; `max` is always `0`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, 0.0)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn in_bounds(&self) -> bool {
        self.min <= self.offset && self.offset <= 0.0
    }

    /// Resize the scrollable range and redraw if the offset had to be pulled back into it.
    pub fn set_bounds<R>(&mut self, content_width: f64, viewport_width: f64, renderer: &mut R)
    where
        R: CardRenderer,
    {
        if self.resize(content_width, viewport_width) {
            renderer.set_strip_offset(self.offset);
        }
    }

    /// Resize the scrollable range without drawing, returning whether the offset was clamped.
    ///
    /// Content narrower than the viewport cannot scroll. A running gesture keeps its offset and
    /// is settled when it ends.
    pub fn resize(&mut self, content_width: f64, viewport_width: f64) -> bool {
        self.min = (viewport_width - content_width).min(0.0);
        if self.dragging || self.animating || self.in_bounds() {
            return false;
        }
        self.offset = self.offset.clamp(self.min, 0.0);
        true
    }

    pub fn drag_start<S>(&mut self, x: f64, at: Duration, timers: &mut S)
    where
        S: Scheduler,
    {
        if self.animating {
            debug!(velocity = self.velocity, "drag interrupted inertial scroll");
        }
        self.stop_inertia(timers);
        self.estimator.reset();
        self.last_x = x;
        self.last_at = at;
        self.unresisted = self.offset;
        self.dragging = true;
    }

    pub fn drag_move<R>(&mut self, x: f64, at: Duration, renderer: &mut R)
    where
        R: CardRenderer,
    {
        if !self.dragging {
            return;
        }

        let pointer_delta = x - self.last_x;
        if pointer_delta.abs() < self.physics.jitter_px {
            return;
        }

        let delta = pointer_delta * self.physics.drag_gain;
        let elapsed = at.saturating_sub(self.last_at);
        self.estimator.observe_pointer(pointer_delta, at);
        self.estimator.record(delta, elapsed);
        self.velocity = self.estimator.velocity();

        self.unresisted += delta;
        self.offset = self.resist(self.unresisted);
        renderer.set_strip_offset(self.offset);

        self.last_x = x;
        self.last_at = at;
    }

    /// Release the pointer, returning whether an inertial glide started.
    pub fn drag_end<S, R>(&mut self, at: Duration, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        if !self.dragging {
            return false;
        }
        self.dragging = false;

        let velocity = self.estimator.velocity();
        let slow_release = self.physics.slow_move_px.is_some()
            && self
                .estimator
                .moved_slowly_within(at, self.physics.slow_release_window);
        // Pointer held still before release
        let held = at.saturating_sub(self.last_at) >= self.physics.slow_release_window;

        if slow_release || held || velocity.abs() <= self.physics.release_threshold {
            debug!(velocity, slow_release, held, "drag released without inertia");
            self.estimator.reset();
            self.velocity = 0.0;
            self.settle(renderer);
            return false;
        }

        let cap = self.physics.max_release_velocity;
        self.velocity = velocity.clamp(-cap, cap);
        self.animating = true;
        timers.arm_repeating(TimerKey::InertialTick, self.physics.tick_interval);
        debug!(velocity = self.velocity, "inertial scroll started");
        true
    }

    /// Advance the inertial glide by one tick.
    pub fn on_tick<S, R>(&mut self, timers: &mut S, renderer: &mut R)
    where
        S: Scheduler,
        R: CardRenderer,
    {
        if !self.animating {
            timers.cancel(TimerKey::InertialTick);
            return;
        }

        self.velocity *= self.physics.friction;
        let step = self.velocity * self.physics.tick_interval.as_secs_f64();

        if self.velocity.abs() < self.physics.stop_velocity || step.abs() < self.physics.min_step_px
        {
            self.stop_inertia(timers);
            self.settle(renderer);
            return;
        }

        let target = self.offset + step;
        let clamped = target.clamp(self.min, 0.0);
        self.offset = clamped;
        renderer.set_strip_offset(self.offset);

        if clamped != target {
            debug!(offset = self.offset, "inertial scroll hit edge");
            self.stop_inertia(timers);
        }
    }

    /// Drop every transient gesture and animation, leaving the offset settled in bounds.
    pub fn reset<S>(&mut self, timers: &mut S)
    where
        S: Scheduler,
    {
        self.stop_inertia(timers);
        self.estimator.reset();
        self.dragging = false;
        self.offset = self.offset.clamp(self.min, 0.0);
    }

    fn stop_inertia<S>(&mut self, timers: &mut S)
    where
        S: Scheduler,
    {
        timers.cancel(TimerKey::InertialTick);
        self.animating = false;
        self.velocity = 0.0;
    }

    /// Rubber-band a candidate offset: only a share of any overshoot past a bound is applied.
    fn resist(&self, candidate: f64) -> f64 {
        let resistance = self.physics.edge_resistance;
        if candidate > 0.0 {
            candidate * resistance
        } else if candidate < self.min {
            self.min + (candidate - self.min) * resistance
        } else {
            candidate
        }
    }

    /// Clamp an overshooting offset back into bounds.
    fn settle<R>(&mut self, renderer: &mut R)
    where
        R: CardRenderer,
    {
        let clamped = self.offset.clamp(self.min, 0.0);
        if clamped != self.offset {
            self.offset = clamped;
            renderer.set_strip_offset(self.offset);
        }
    }
}
