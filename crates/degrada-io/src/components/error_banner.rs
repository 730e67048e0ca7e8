//! Error banner.

use dioxus::prelude::*;

/// Props for the [`ErrorBanner`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ErrorBannerProps {
    message: String,
    /// Dismiss handler; blocking banners (a broken catalog) have none.
    on_dismiss: Option<EventHandler<()>>,
}

/// A red banner with an optional close button.
#[component]
pub fn ErrorBanner(props: ErrorBannerProps) -> Element {
    rsx! {
        div {
            class: "flex items-start justify-between gap-4 p-3 rounded border border-[var(--border-error)]
                    bg-[var(--surface-error)] text-[var(--text-error)] text-sm",
            role: "alert",
            p { "{props.message}" }
            if let Some(on_dismiss) = props.on_dismiss {
                button {
                    class: "font-medium cursor-pointer",
                    onclick: move |_| on_dismiss.call(()),
                    "关闭"
                }
            }
        }
    }
}
