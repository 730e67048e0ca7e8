//! Progress bar for the simulated processing schedule.

use dioxus::prelude::*;

/// Props for the [`ProgressBar`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ProgressBarProps {
    /// `0.0..=100.0`; out-of-range values are clamped.
    percent: f64,
    /// Stage currently shown as in progress.
    label: String,
}

#[component]
pub fn ProgressBar(props: ProgressBarProps) -> Element {
    let percent = props.percent.clamp(0.0, 100.0);
    let shown = format!("{percent:.0}");

    rsx! {
        div { class: "space-y-1",
            div { class: "flex justify-between text-sm text-[var(--text-secondary)]",
                span { "{props.label}" }
                span { class: "tabular-nums", "{shown}%" }
            }
            div { class: "h-2 w-full rounded bg-[var(--surface-active)] overflow-hidden",
                div {
                    class: "h-full bg-[var(--btn-primary)] transition-all",
                    style: "width: {percent}%",
                }
            }
        }
    }
}
