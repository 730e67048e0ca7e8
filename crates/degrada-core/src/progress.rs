//! Simulated processing progress.
//!
//! The backend reports no progress, so the compound page plays a fixed
//! schedule after the request completes: four short ticks per composite
//! stage, one long tick for the optional stage. Each stage is worth an
//! equal share of the bar. Swapping this for real progress only means
//! feeding the progress bar from somewhere else; the composer never sees
//! it.

use crate::stage::StageSlot;

/// Ticks played per composite stage.
pub const COMPOSITE_TICKS: u32 = 4;
/// Delay before each composite tick.
pub const COMPOSITE_TICK_MS: u32 = 300;
/// Delay before the optional stage's single tick.
pub const OPTIONAL_TICK_MS: u32 = 1000;

/// One frame of the schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressStep {
    /// Stage being shown as in progress.
    pub stage: StageSlot,
    /// Wait before applying this step.
    pub delay_ms: u32,
    /// Cumulative progress after this step, `0.0..=100.0`.
    pub percent: f64,
}

/// A precomputed progress schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedProgress {
    steps: Vec<ProgressStep>,
}

impl SimulatedProgress {
    /// The schedule for a pipeline with or without the optional stage.
    ///
    /// The last step lands on exactly 100.
    #[must_use]
    pub fn plan(with_optional: bool) -> Self {
        let stages = if with_optional { 3 } else { 2 };
        let total = f64::from(stages * COMPOSITE_TICKS);
        let mut done = 0;
        let mut steps = Vec::new();
        for slot in StageSlot::COMPOSITE {
            for _ in 0..COMPOSITE_TICKS {
                done += 1;
                steps.push(ProgressStep {
                    stage: slot,
                    delay_ms: COMPOSITE_TICK_MS,
                    percent: f64::from(done) * 100.0 / total,
                });
            }
        }
        if with_optional {
            done += COMPOSITE_TICKS;
            steps.push(ProgressStep {
                stage: StageSlot::Third,
                delay_ms: OPTIONAL_TICK_MS,
                percent: f64::from(done) * 100.0 / total,
            });
        }
        Self { steps }
    }

    /// Steps in playback order.
    #[must_use]
    pub fn steps(&self) -> &[ProgressStep] {
        &self.steps
    }

    /// Total playback time.
    #[must_use]
    pub fn total_ms(&self) -> u32 {
        self.steps.iter().map(|s| s.delay_ms).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn two_stage_plan() {
        let plan = SimulatedProgress::plan(false);
        assert_eq!(plan.steps().len(), 8);
        assert_eq!(plan.total_ms(), 2400);
        assert!((plan.steps()[3].percent - 50.0).abs() < 1e-9);
        assert!((plan.steps().last().unwrap().percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn three_stage_plan_ends_with_long_tick() {
        let plan = SimulatedProgress::plan(true);
        assert_eq!(plan.steps().len(), 9);
        assert_eq!(plan.total_ms(), 3400);
        let last = plan.steps().last().unwrap();
        assert_eq!(last.stage, StageSlot::Third);
        assert_eq!(last.delay_ms, OPTIONAL_TICK_MS);
        assert!((last.percent - 100.0).abs() < f64::EPSILON);
        assert!((plan.steps()[7].percent - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn percent_never_decreases() {
        let plan = SimulatedProgress::plan(true);
        assert!(plan.steps().windows(2).all(|w| w[0].percent <= w[1].percent));
    }
}
