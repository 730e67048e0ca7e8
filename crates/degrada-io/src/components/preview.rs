//! Image or video preview.

use degrada_core::MediaKind;
use dioxus::prelude::*;

/// Props for the [`MediaPreview`] component.
#[derive(Props, Clone, PartialEq)]
pub struct MediaPreviewProps {
    title: String,
    kind: MediaKind,
    /// Object URL or backend file URL.
    src: String,
}

/// Shows `src` as an `<img>` or a `<video controls>` depending on kind.
#[component]
pub fn MediaPreview(props: MediaPreviewProps) -> Element {
    let src = props.src;

    rsx! {
        figure { class: "flex flex-col gap-2",
            figcaption { class: "text-sm font-semibold text-[var(--text-heading)]", "{props.title}" }
            div { class: "flex items-center justify-center rounded-lg overflow-hidden bg-[var(--preview-bg)] min-h-48",
                match props.kind {
                    MediaKind::Image => rsx! {
                        img { class: "max-w-full max-h-96 object-contain", src: "{src}", alt: "{props.title}" }
                    },
                    MediaKind::Video => rsx! {
                        video { class: "max-w-full max-h-96", src: "{src}", controls: true }
                    },
                }
            }
        }
    }
}
