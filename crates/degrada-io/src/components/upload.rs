//! File upload component with drag-and-drop and file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;

/// Extensions the backend can process.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "webp", "tif", "tiff", "mp4", "mov", "avi", "mkv", "webm",
];

/// Check whether a filename has an allowed image or video extension.
#[must_use]
pub fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(ext))
    })
}

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Called with the raw file bytes and filename once the file is read.
    on_upload: EventHandler<(Vec<u8>, String)>,
    /// Disables the zone, e.g. while an upload is in flight.
    #[props(default)]
    disabled: bool,
}

/// A drag-and-drop zone with a file picker button.
///
/// Accepts common image and video formats. When a file is selected (via
/// the picker or drag-and-drop), reads the bytes and fires `on_upload`
/// with `(bytes, filename)`. Sending them to the backend is up to the
/// caller.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let disabled = props.disabled;

    let process_files = move |files: Vec<FileData>| async move {
        if disabled {
            return;
        }
        if let Some(file) = files.first() {
            let name = file.name();
            if !has_allowed_extension(&name) {
                error.set(Some(format!("不支持的文件类型: {name}")));
                return;
            }
            match file.read_bytes().await {
                Ok(bytes) => {
                    error.set(None);
                    props.on_upload.call((bytes.to_vec(), name));
                }
                Err(e) => {
                    error.set(Some(format!("读取文件失败: {e}")));
                }
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let border_class = if dragging() {
        "border-[var(--border-accent)] bg-[var(--surface-active)]"
    } else {
        "border-[var(--border-muted)] bg-[var(--surface)]"
    };
    let accept = ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");

    rsx! {
        div {
            class: "border-2 border-dashed rounded-lg p-6 text-center transition-colors {border_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref err) = error() {
                p { class: "text-[var(--text-error)] mb-2",
                    "{err}"
                }
            }

            p { class: "text-[var(--text-secondary)] mb-3",
                "拖放图像或视频到此处，或"
            }

            label {
                class: "inline-block px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded cursor-pointer text-white font-medium transition-colors",
                input {
                    r#type: "file",
                    accept: "{accept}",
                    class: "hidden",
                    disabled,
                    onchange: handle_files,
                }
                "选择文件"
            }

            p { class: "text-[var(--muted)] text-sm mt-2",
                "PNG, JPEG, BMP, WebP, TIFF, MP4, MOV, AVI, MKV, WebM"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_and_videos_are_accepted() {
        assert!(has_allowed_extension("scan.TIFF"));
        assert!(has_allowed_extension("clip.mp4"));
        assert!(has_allowed_extension("archive.tar.webm"));
    }

    #[test]
    fn other_files_are_rejected() {
        assert!(!has_allowed_extension("notes.txt"));
        assert!(!has_allowed_extension("mp4"));
    }
}
