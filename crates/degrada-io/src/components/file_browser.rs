//! Modal listing media files stored on the backend.

use degrada_core::payload::{FileListData, RemoteFile};
use degrada_core::MediaKind;
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdChevronUp, LdFolderOpen, LdImage, LdVideo, LdX};

/// Props for the [`FileBrowser`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileBrowserProps {
    /// The latest listing, `None` before the first response.
    listing: Option<FileListData>,
    /// Whether a listing request is in flight.
    loading: bool,
    /// Fired with the picked file.
    on_pick: EventHandler<RemoteFile>,
    /// Fired with the directory to list next.
    on_navigate: EventHandler<String>,
    /// Fired when the browser is dismissed without a pick.
    on_close: EventHandler<()>,
}

/// A file grid with parent-directory navigation.
#[component]
pub fn FileBrowser(props: FileBrowserProps) -> Element {
    let on_pick = props.on_pick;
    let on_navigate = props.on_navigate;
    let on_close = props.on_close;
    let listing = props.listing.unwrap_or_default();
    let current = if listing.current_dir.is_empty() {
        "/".to_owned()
    } else {
        listing.current_dir.clone()
    };
    let parent = listing.has_parent().then(|| listing.parent_dir.clone());

    rsx! {
        div { class: "fixed inset-0 z-50 flex items-center justify-center p-4 bg-black/50",
            div { class: "w-full max-w-4xl max-h-[80vh] flex flex-col rounded-xl bg-[var(--surface)] shadow-2xl",
                div { class: "p-4 border-b border-[var(--border)] flex justify-between items-center",
                    h3 { class: "flex items-center gap-2 text-lg font-semibold text-[var(--text-heading)]",
                        Icon { width: 20, height: 20, icon: LdFolderOpen }
                        "服务器文件浏览"
                    }
                    button {
                        class: "text-[var(--text-secondary)] hover:text-[var(--text-heading)] cursor-pointer",
                        title: "关闭",
                        onclick: move |_| on_close.call(()),
                        Icon { width: 20, height: 20, icon: LdX }
                    }
                }

                div { class: "px-4 py-2 border-b border-[var(--border)] flex items-center gap-3 text-sm",
                    if let Some(parent) = parent {
                        button {
                            class: "flex items-center gap-1 text-[var(--btn-primary)] cursor-pointer",
                            onclick: move |_| on_navigate.call(parent.clone()),
                            Icon { width: 16, height: 16, icon: LdChevronUp }
                            "上级目录"
                        }
                    }
                    span { class: "text-[var(--text-secondary)]", "当前目录: {current}" }
                }

                div { class: "flex-1 overflow-y-auto p-4",
                    if props.loading {
                        p { class: "py-12 text-center text-[var(--text-secondary)]", "加载中…" }
                    } else if listing.files.is_empty() {
                        p { class: "py-12 text-center text-[var(--text-secondary)]",
                            "当前目录没有可用的媒体文件"
                        }
                    } else {
                        div { class: "grid grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-3",
                            for file in listing.files.iter().cloned() {
                                {render_file(file, move |file| on_pick.call(file))}
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_file(file: RemoteFile, on_pick: impl Fn(RemoteFile) + 'static) -> Element {
    let name = file.name.clone();
    let size = file.size_human.clone().unwrap_or_default();
    let kind = file.media_kind();
    let path = file.path.clone();

    rsx! {
        div {
            key: "{path}",
            class: "p-3 rounded-lg border border-[var(--border)] hover:border-[var(--border-accent)]
                    hover:bg-[var(--surface-active)] cursor-pointer transition-colors",
            onclick: move |_| on_pick(file.clone()),
            div { class: "flex justify-center mb-2 text-[var(--text-secondary)]",
                match kind {
                    MediaKind::Image => rsx! { Icon { width: 40, height: 40, icon: LdImage } },
                    MediaKind::Video => rsx! { Icon { width: 40, height: 40, icon: LdVideo } },
                }
            }
            h4 { class: "text-sm font-medium truncate", title: "{name}", "{name}" }
            p { class: "text-xs text-[var(--text-secondary)] mt-1", "{size}" }
        }
    }
}
