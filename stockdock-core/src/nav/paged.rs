use crate::config::PagingConfig;
use crate::render::{CardRenderer, SlideDirection, SlideTransition};
use crate::timer::{Scheduler, TimerKey};
use tracing::debug;

/// Paged navigator state machine: `Idle -> Transitioning -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PagedState {
    Idle,
    Transitioning(SlideTransition),
}

/// Discrete page deck with at most one animated slide in flight.
///
/// Requests arriving mid-slide are rejected, never queued. The current page only changes when
/// the slide completes.
#[derive(Debug, Clone)]
pub struct PagedNavigator {
    config: PagingConfig,
    page_count: usize,
    current: usize,
    width: f64,
    state: PagedState,
}

impl PagedNavigator {
    pub fn new(config: PagingConfig, page_count: usize, width: f64) -> Self {
        Self {
            config,
            page_count,
            current: 0,
            width,
            state: PagedState::Idle,
        }
    }

    pub fn state(&self) -> &PagedState {
        &self.state
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, PagedState::Transitioning(_))
    }

    /// Slide distance for transitions started from now on.
    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Interpret a completed horizontal drag. Dragging left (negative) advances.
    ///
    /// Returns `false` below the swipe threshold, at the first / last page, or mid-slide.
    pub fn request_gesture<S, R>(&mut self, delta_x: f64, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        if delta_x.abs() <= self.config.swipe_threshold_px {
            return false;
        }

        if delta_x < 0.0 {
            self.next(timers, renderer)
        } else {
            self.previous(timers, renderer)
        }
    }

    pub fn next<S, R>(&mut self, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        self.go_to(self.current + 1, timers, renderer)
    }

    pub fn previous<S, R>(&mut self, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        match self.current.checked_sub(1) {
            Some(target) => self.go_to(target, timers, renderer),
            None => false,
        }
    }

    /// Start a slide to `target`, returning whether it was accepted.
    pub fn go_to<S, R>(&mut self, target: usize, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        if let PagedState::Transitioning(active) = &self.state {
            debug!(target, in_flight = active.to, "rejecting page change during transition");
            return false;
        }
        if target >= self.page_count {
            return false;
        }

        let Some(transition) =
            SlideTransition::new(self.current, target, self.width, self.config.transition)
        else {
            return false;
        };

        debug!(
            from = transition.from,
            to = transition.to,
            forward = transition.direction == SlideDirection::Forward,
            "page transition started"
        );
        renderer.begin_slide(&transition);
        timers.arm(TimerKey::PageTransition, transition.duration);
        self.state = PagedState::Transitioning(transition);
        true
    }

    /// Land the in-flight slide, returning whether one was active.
    pub fn on_transition_complete<R>(&mut self, renderer: &mut R) -> bool
    where
        R: CardRenderer,
    {
        let PagedState::Transitioning(transition) = self.state else {
            return false;
        };

        self.current = transition.to;
        self.state = PagedState::Idle;
        renderer.set_page_visible(self.current);
        true
    }

    /// Complete any in-flight slide immediately.
    pub fn finish_now<S, R>(&mut self, timers: &mut S, renderer: &mut R) -> bool
    where
        S: Scheduler,
        R: CardRenderer,
    {
        timers.cancel(TimerKey::PageTransition);
        self.on_transition_complete(renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingRenderer, RenderCall};
    use crate::timer::TimerQueue;
    use std::time::Duration;

    fn setup() -> (PagedNavigator, TimerQueue, RecordingRenderer) {
        (
            PagedNavigator::new(PagingConfig::default(), 9, 1000.0),
            TimerQueue::new(),
            RecordingRenderer::default(),
        )
    }

    fn complete(pager: &mut PagedNavigator, timers: &mut TimerQueue, renderer: &mut RecordingRenderer) {
        for key in timers.advance_by(Duration::from_millis(300)) {
            assert_eq!(key, TimerKey::PageTransition);
            pager.on_transition_complete(renderer);
        }
    }

    #[test]
    fn test_gesture_interpretation() {
        struct TestCase {
            start: usize,
            delta_x: f64,
            expected: Option<usize>,
        }

        let tests = vec![
            TestCase {
                // TC0: swipe left advances
                start: 0,
                delta_x: -120.0,
                expected: Some(1),
            },
            TestCase {
                // TC1: swipe right goes back
                start: 4,
                delta_x: 80.0,
                expected: Some(3),
            },
            TestCase {
                // TC2: exactly the threshold is not a swipe
                start: 4,
                delta_x: -50.0,
                expected: None,
            },
            TestCase {
                // TC3: no wraparound before the first page
                start: 0,
                delta_x: 200.0,
                expected: None,
            },
            TestCase {
                // TC4: no wraparound past the last page
                start: 8,
                delta_x: -200.0,
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let (mut pager, mut timers, mut renderer) = setup();
            pager.current = test.start;

            let accepted = pager.request_gesture(test.delta_x, &mut timers, &mut renderer);
            complete(&mut pager, &mut timers, &mut renderer);

            let actual = accepted.then_some(pager.current_page());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_go_to_rejected_while_transitioning() {
        let (mut pager, mut timers, mut renderer) = setup();

        assert!(pager.go_to(2, &mut timers, &mut renderer));
        timers.advance_by(Duration::from_millis(100));
        assert!(!pager.go_to(2, &mut timers, &mut renderer));
        assert!(!pager.next(&mut timers, &mut renderer));

        // Current page only moves once the slide lands
        assert_eq!(pager.current_page(), 0);
        assert_eq!(renderer.slides().count(), 1);

        timers.advance_by(Duration::from_millis(199));
        assert!(pager.is_transitioning());

        for key in timers.advance_by(Duration::from_millis(1)) {
            assert_eq!(key, TimerKey::PageTransition);
            pager.on_transition_complete(&mut renderer);
        }
        assert_eq!(pager.current_page(), 2);
        assert_eq!(pager.state(), &PagedState::Idle);
        assert_eq!(renderer.visible_pages().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_go_to_invalid_targets() {
        let (mut pager, mut timers, mut renderer) = setup();

        assert!(!pager.go_to(0, &mut timers, &mut renderer));
        assert!(!pager.go_to(9, &mut timers, &mut renderer));
        assert!(!pager.previous(&mut timers, &mut renderer));
        assert!(renderer.calls.is_empty());
        assert!(!timers.is_armed(TimerKey::PageTransition));
    }

    #[test]
    fn test_dot_jump_slides_once_with_fixed_duration() {
        let (mut pager, mut timers, mut renderer) = setup();
        pager.current = 7;

        assert!(pager.go_to(1, &mut timers, &mut renderer));

        assert_eq!(
            renderer.calls,
            vec![RenderCall::Slide(SlideTransition {
                from: 7,
                to: 1,
                direction: SlideDirection::Backward,
                width: 1000.0,
                duration: Duration::from_millis(300),
            })]
        );
        assert_eq!(timers.next_deadline(), Some(Duration::from_millis(300)));
    }

    #[test]
    fn test_finish_now_lands_immediately() {
        let (mut pager, mut timers, mut renderer) = setup();
        pager.next(&mut timers, &mut renderer);

        assert!(pager.finish_now(&mut timers, &mut renderer));

        assert_eq!(pager.current_page(), 1);
        assert!(!timers.is_armed(TimerKey::PageTransition));
        assert!(!pager.finish_now(&mut timers, &mut renderer));
    }

    #[test]
    fn test_width_applies_to_next_slide() {
        let (mut pager, mut timers, mut renderer) = setup();
        pager.set_width(640.0);
        pager.next(&mut timers, &mut renderer);

        assert_eq!(renderer.slides().next().map(|slide| slide.width), Some(640.0));
    }
}
