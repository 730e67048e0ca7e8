//! Plays a [`SimulatedProgress`] schedule on browser timers.

use degrada_core::{ProgressStep, SimulatedProgress};
use gloo_timers::future::TimeoutFuture;

/// Wait out each step of `plan` and report it through `on_step`.
///
/// The caller decides what a step means for the UI; the composer never
/// sees progress.
#[allow(clippy::future_not_send)] // WASM is single-threaded; timers are !Send
pub async fn play(plan: &SimulatedProgress, mut on_step: impl FnMut(&ProgressStep)) {
    for step in plan.steps() {
        TimeoutFuture::new(step.delay_ms).await;
        on_step(step);
    }
}
