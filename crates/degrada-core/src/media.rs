//! Media kind of an uploaded or browsed file.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::payload::{MediaInfo, RemoteFile, UploadData};

/// Whether a file is a still image or a video.
///
/// Decides which catalog section the optional third stage draws from and
/// is sent to the backend as `media_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image (`image/*`).
    Image,
    /// Video (anything that is not `image/*`).
    Video,
}

impl MediaKind {
    /// Classify a MIME content type. Everything outside `image/*` is
    /// treated as video, matching what the backend accepts.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.trim().to_ascii_lowercase().starts_with("image/") {
            Self::Image
        } else {
            Self::Video
        }
    }

    /// Wire name (`"image"` / `"video"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Display label for the UI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "图像",
            Self::Video => "视频",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media file stored on the backend and referenced by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Backend-relative path, as sent in requests.
    pub file_path: String,
    /// Display name.
    pub name: String,
    /// Image or video.
    pub kind: MediaKind,
    /// Size as formatted by the backend, when known.
    pub size_human: Option<String>,
}

impl MediaFile {
    /// A file that was just uploaded under `name`.
    #[must_use]
    pub fn from_upload(name: &str, upload: &UploadData) -> Self {
        Self {
            file_path: upload.file_path.clone(),
            name: name.to_owned(),
            kind: MediaKind::from_content_type(&upload.content_type),
            size_human: None,
        }
    }

    /// A file picked from a server listing.
    #[must_use]
    pub fn from_remote(file: &RemoteFile) -> Self {
        Self {
            file_path: file.path.clone(),
            name: file.name.clone(),
            kind: file.media_kind(),
            size_human: file.size_human.clone(),
        }
    }

    /// Last segment of the backend path.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file_path)
    }
}

/// Prefix of the message shown when metadata cannot be fetched.
pub const INFO_FAILURE: &str = "获取媒体信息失败";

/// Outcome of a metadata lookup for one file.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InfoState {
    /// Requested, no answer yet.
    #[default]
    Loading,
    /// The backend's metadata.
    Ready(MediaInfo),
    /// The lookup failed; holds the message to show.
    Unavailable(String),
}

impl InfoState {
    /// State after a lookup finished with `result`.
    #[must_use]
    pub fn from_lookup<E: fmt::Display>(result: Result<MediaInfo, E>) -> Self {
        match result {
            Ok(info) => Self::Ready(info),
            Err(e) => {
                tracing::warn!("media info unavailable: {e}");
                Self::Unavailable(format!("{INFO_FAILURE}: {e}"))
            }
        }
    }

    /// The metadata, once it arrived.
    #[must_use]
    pub const fn info(&self) -> Option<&MediaInfo> {
        match self {
            Self::Ready(info) => Some(info),
            Self::Loading | Self::Unavailable(_) => None,
        }
    }

    /// The message to report when the lookup failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Unavailable(message) => Some(message.as_str()),
            Self::Loading | Self::Ready(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn image_content_types_are_images() {
        assert_eq!(MediaKind::from_content_type("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("IMAGE/JPEG"), MediaKind::Image);
    }

    #[test]
    fn everything_else_is_video() {
        assert_eq!(MediaKind::from_content_type("video/mp4"), MediaKind::Video);
        assert_eq!(
            MediaKind::from_content_type("application/octet-stream"),
            MediaKind::Video
        );
        assert_eq!(MediaKind::from_content_type(""), MediaKind::Video);
    }

    #[test]
    fn upload_kind_comes_from_content_type() {
        let upload = UploadData {
            file_path: "uploads/2024/clip.mov".into(),
            content_type: "video/quicktime".into(),
        };
        let media = MediaFile::from_upload("clip.mov", &upload);
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.file_name(), "clip.mov");
    }

    #[test]
    fn failed_lookup_is_reportable() {
        let state = InfoState::from_lookup::<&str>(Err("无法连接到后端服务"));
        assert_eq!(state.info(), None);
        assert_eq!(state.failure(), Some("获取媒体信息失败: 无法连接到后端服务"));
        assert_ne!(state, InfoState::Loading);
    }

    #[test]
    fn successful_lookup_holds_the_info() {
        let info = MediaInfo {
            width: Some(640),
            ..MediaInfo::default()
        };
        let state = InfoState::from_lookup::<&str>(Ok(info.clone()));
        assert_eq!(state.info(), Some(&info));
        assert_eq!(state.failure(), None);
        assert_eq!(InfoState::default().info(), None);
        assert_eq!(InfoState::default().failure(), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaKind::Image).unwrap(), "\"image\"");
        let kind: MediaKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, MediaKind::Video);
    }
}
