//! Rolling 5xx error-rate evaluation.

use crate::alerting::Alert;
use crate::detection::window::SlidingWindow;

/// Below this many samples the window produces no verdict.
pub const MIN_SAMPLES: usize = 50;

/// Compares the window's 5xx percentage to a threshold.
#[derive(Debug, Clone, Copy)]
pub struct ErrorRateEvaluator {
    threshold: f64,
}

impl ErrorRateEvaluator {
    /// `threshold` is a percentage (2.0 means 2%).
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Percentage of 5xx statuses, or `None` with too few samples.
    pub fn error_rate(window: &SlidingWindow) -> Option<f64> {
        let total = window.len();
        if total < MIN_SAMPLES {
            return None;
        }
        Some(100.0 * window.error_count() as f64 / total as f64)
    }

    /// Emit an alert when the rate is strictly above the threshold.
    pub fn evaluate(&self, window: &SlidingWindow) -> Option<Alert> {
        let rate = Self::error_rate(window)?;
        if rate > self.threshold {
            Some(Alert::ErrorRate {
                rate,
                errors: window.error_count(),
                total: window.len(),
            })
        } else {
            None
        }
    }
}

impl Default for ErrorRateEvaluator {
    fn default() -> Self {
        Self::new(2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with(total: usize, errors: usize) -> SlidingWindow {
        let mut window = SlidingWindow::new(200);
        for i in 0..total {
            window.push(if i < errors { 503 } else { 200 });
        }
        window
    }

    #[test]
    fn test_no_verdict_below_minimum_sample() {
        let evaluator = ErrorRateEvaluator::new(2.0);
        let window = window_with(49, 49);
        assert_eq!(ErrorRateEvaluator::error_rate(&window), None);
        assert_eq!(evaluator.evaluate(&window), None);
    }

    #[test]
    fn test_two_errors_in_sixty_fires() {
        let evaluator = ErrorRateEvaluator::new(2.0);
        match evaluator.evaluate(&window_with(60, 2)) {
            Some(Alert::ErrorRate { rate, errors, total }) => {
                assert!((rate - 3.333).abs() < 0.01);
                assert_eq!(errors, 2);
                assert_eq!(total, 60);
            }
            other => panic!("expected error rate alert, got {:?}", other),
        }
    }

    #[test]
    fn test_one_error_in_sixty_is_quiet() {
        let evaluator = ErrorRateEvaluator::new(2.0);
        assert_eq!(evaluator.evaluate(&window_with(60, 1)), None);
    }

    #[test]
    fn test_rate_equal_to_threshold_does_not_fire() {
        // 1 of 50 is exactly 2%
        let evaluator = ErrorRateEvaluator::new(2.0);
        let window = window_with(50, 1);
        assert_eq!(ErrorRateEvaluator::error_rate(&window), Some(2.0));
        assert_eq!(evaluator.evaluate(&window), None);

        let window = window_with(50, 2);
        assert!(evaluator.evaluate(&window).is_some());
    }

    #[test]
    fn test_unknown_and_client_errors_are_not_counted() {
        let mut window = SlidingWindow::new(200);
        for _ in 0..30 {
            window.push(0);
        }
        for _ in 0..30 {
            window.push(404);
        }
        assert_eq!(ErrorRateEvaluator::error_rate(&window), Some(0.0));
    }

    #[test]
    fn test_zero_threshold_fires_on_any_error() {
        let evaluator = ErrorRateEvaluator::new(0.0);
        assert_eq!(evaluator.evaluate(&window_with(50, 0)), None);
        assert!(evaluator.evaluate(&window_with(50, 1)).is_some());
    }
}
