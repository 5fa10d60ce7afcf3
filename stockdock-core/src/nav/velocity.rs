use crate::config::ScrollPhysics;
use std::collections::VecDeque;
use std::time::Duration;

/// Smoothed pointer velocity (px/s) over a bounded window of clamped samples.
///
/// Also remembers when the pointer last moved "slowly", so a deliberate slow stop right before
/// release can be told apart from a flick.
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    window: usize,
    max_sample: f64,
    slow_move_px: Option<f64>,
    samples: VecDeque<f64>,
    last_slow_move: Option<Duration>,
}

impl VelocityEstimator {
    pub fn new(physics: &ScrollPhysics) -> Self {
        let window = physics.velocity_window.max(1);
        Self {
            window,
            max_sample: physics.max_sample_velocity,
            slow_move_px: physics.slow_move_px,
            samples: VecDeque::with_capacity(window),
            last_slow_move: None,
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.last_slow_move = None;
    }

    /// Note a raw pointer move of `pointer_delta` px observed at `at` for slow-move tracking.
    pub fn observe_pointer(&mut self, pointer_delta: f64, at: Duration) {
        if let Some(slow) = self.slow_move_px {
            if pointer_delta.abs() < slow {
                self.last_slow_move = Some(at);
            }
        }
    }

    /// Record a strip move of `delta` px that took `elapsed`. Moves with no elapsed time yield
    /// no sample.
    pub fn record(&mut self, delta: f64, elapsed: Duration) {
        let seconds = elapsed.as_secs_f64();
        if seconds <= 0.0 {
            return;
        }

        let sample = (delta / seconds).clamp(-self.max_sample, self.max_sample);
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Mean of the retained samples, `0.0` before the first sample.
    pub fn velocity(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Determine if a slow move happened less than `window` before `at`.
    pub fn moved_slowly_within(&self, at: Duration, window: Duration) -> bool {
        self.last_slow_move
            .is_some_and(|slow| at.saturating_sub(slow) < window)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_velocity_window_mean_and_clamp() {
        struct TestCase {
            physics: ScrollPhysics,
            moves: Vec<(f64, u64)>,
            expected: f64,
        }

        let tests = vec![
            TestCase {
                // TC0: no samples
                physics: ScrollPhysics::standard(),
                moves: vec![],
                expected: 0.0,
            },
            TestCase {
                // TC1: window of one keeps only the latest sample
                physics: ScrollPhysics::standard(),
                moves: vec![(10.0, 10), (6.0, 10)],
                expected: 600.0,
            },
            TestCase {
                // TC2: samples clamped to the cap
                physics: ScrollPhysics::standard(),
                moves: vec![(100.0, 10)],
                expected: 3000.0,
            },
            TestCase {
                // TC3: negative samples clamped symmetrically
                physics: ScrollPhysics::standard(),
                moves: vec![(-100.0, 10)],
                expected: -3000.0,
            },
            TestCase {
                // TC4: window of five averages the latest five
                physics: ScrollPhysics::touch(),
                moves: vec![
                    (100.0, 10),
                    (1.0, 10),
                    (2.0, 10),
                    (3.0, 10),
                    (4.0, 10),
                    (5.0, 10),
                ],
                expected: 300.0,
            },
            TestCase {
                // TC5: zero elapsed time yields no sample
                physics: ScrollPhysics::standard(),
                moves: vec![(5.0, 10), (40.0, 0)],
                expected: 500.0,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut estimator = VelocityEstimator::new(&test.physics);
            for (delta, elapsed) in test.moves {
                estimator.record(delta, ms(elapsed));
            }
            let actual = estimator.velocity();
            assert!(
                (actual - test.expected).abs() < 1e-9,
                "TC{} failed: {} != {}",
                index,
                actual,
                test.expected
            );
        }
    }

    #[test]
    fn test_slow_move_tracking() {
        let mut estimator = VelocityEstimator::new(&ScrollPhysics::touch());

        estimator.observe_pointer(40.0, ms(100));
        assert!(!estimator.moved_slowly_within(ms(120), ms(200)));

        estimator.observe_pointer(2.0, ms(116));
        assert!(estimator.moved_slowly_within(ms(300), ms(200)));
        assert!(!estimator.moved_slowly_within(ms(316), ms(200)));

        estimator.record(40.0, ms(16));
        estimator.reset();
        assert!(!estimator.moved_slowly_within(ms(120), ms(200)));
        assert_eq!(estimator.sample_count(), 0);
    }

    #[test]
    fn test_slow_move_tracking_disabled() {
        let mut estimator = VelocityEstimator::new(&ScrollPhysics::standard());
        estimator.observe_pointer(0.5, ms(16));
        assert!(!estimator.moved_slowly_within(ms(20), ms(200)));
    }
}
