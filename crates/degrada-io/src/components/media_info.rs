//! Metadata card for an original or processed file.

use degrada_core::{InfoState, MediaKind};
use dioxus::prelude::*;

/// Props for the [`MediaInfoCard`] component.
#[derive(Props, Clone, PartialEq)]
pub struct MediaInfoCardProps {
    title: String,
    kind: MediaKind,
    /// Lookup state of the metadata.
    info: InfoState,
}

/// Label/value table built from [`MediaInfo::rows`], or a loading or
/// unavailable note.
///
/// [`MediaInfo::rows`]: degrada_core::payload::MediaInfo::rows
#[component]
pub fn MediaInfoCard(props: MediaInfoCardProps) -> Element {
    let kind = props.kind;

    rsx! {
        div { class: "p-4 rounded-lg border border-[var(--border)] bg-[var(--surface)]",
            h4 { class: "mb-2 text-sm font-semibold text-[var(--text-heading)]", "{props.title}" }
            match &props.info {
                InfoState::Ready(info) => rsx! {
                    dl { class: "grid grid-cols-2 gap-x-4 gap-y-1 text-sm",
                        for (label, value) in info.rows(kind) {
                            dt { class: "text-[var(--text-secondary)]", "{label}" }
                            dd { class: "text-[var(--text)] tabular-nums", "{value}" }
                        }
                    }
                },
                InfoState::Loading => rsx! {
                    p { class: "text-sm text-[var(--text-secondary)]", "获取媒体信息中…" }
                },
                InfoState::Unavailable(_) => rsx! {
                    p { class: "text-sm text-[var(--text-error)]", "媒体信息不可用" }
                },
            }
        }
    }
}
