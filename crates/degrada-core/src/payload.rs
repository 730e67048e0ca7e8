//! Request and response bodies exchanged with the processing backend.
//!
//! Field names follow the backend exactly; these types are the wire
//! contract and nothing else.

use serde::{Deserialize, Serialize};

use crate::media::MediaKind;
use crate::param::ParamMap;
use crate::pipeline::{CompositeStage, StagesRecord};

/// Generic error text when a failed response carries no usable body.
pub const GENERIC_FAILURE: &str = "请求失败";

/// Envelope `status` of a successful call.
pub const SUCCESS_STATUS: &str = "success";

/// `{ "status": ..., "data": ... }` wrapper used by most endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// `"success"` on success; absent on some endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Endpoint-specific payload.
    pub data: T,
}

/// `POST /upload` response data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadData {
    /// Backend-relative path of the stored file.
    pub file_path: String,
    /// MIME type as detected by the backend.
    pub content_type: String,
}

/// `POST /media-info` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfoRequest {
    /// Backend-relative path.
    pub file_path: String,
}

/// `POST /media-info` response. The backend omits whatever it could not
/// probe, so every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaInfo {
    /// Width in pixels.
    pub width: Option<u32>,
    /// Height in pixels.
    pub height: Option<u32>,
    /// Container or image format name, e.g. `"mp4"` or `"PNG"`.
    pub format: Option<String>,
    /// Seconds.
    pub duration: Option<f64>,
    /// Frames per second.
    pub fps: Option<f64>,
    /// Video stream codec name.
    pub video_codec: Option<String>,
    /// Audio stream codec name; absent for silent clips.
    pub audio_codec: Option<String>,
    /// Bits per second.
    pub bitrate: Option<f64>,
    /// Size in bytes.
    pub file_size: Option<u64>,
    /// Size as preformatted by the backend, e.g. `"3.2 MB"`.
    pub file_size_human: Option<String>,
    /// Name the backend stored the file under.
    pub file_name: Option<String>,
    /// Image color space, e.g. `"RGB"`.
    pub color_space: Option<String>,
    /// Bits per channel.
    pub bit_depth: Option<u32>,
}

impl MediaInfo {
    /// `WxH`, or the unknown placeholder.
    #[must_use]
    pub fn resolution(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{w} × {h}"),
            _ => crate::format::UNKNOWN.to_owned(),
        }
    }

    /// Label/value rows for an info card, specific to the media kind.
    #[must_use]
    pub fn rows(&self, kind: MediaKind) -> Vec<(&'static str, String)> {
        let text = |v: &Option<String>, fallback: &str| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_owned()
        };
        let mut rows = vec![
            ("分辨率", self.resolution()),
            ("格式", text(&self.format, crate::format::UNKNOWN)),
        ];
        match kind {
            MediaKind::Video => rows.extend([
                ("时长", crate::format::duration(self.duration)),
                ("帧率", crate::format::fps(self.fps)),
                ("视频编码", text(&self.video_codec, crate::format::UNKNOWN)),
                ("音频编码", text(&self.audio_codec, "无")),
                ("比特率", crate::format::bitrate(self.bitrate)),
            ]),
            MediaKind::Image => rows.extend([
                ("色彩模式", text(&self.color_space, crate::format::UNKNOWN)),
                (
                    "位深度",
                    self.bit_depth
                        .map_or_else(|| crate::format::UNKNOWN.to_owned(), |b| format!("{b} bit")),
                ),
            ]),
        }
        rows.push((
            "文件大小",
            self.file_size.map_or_else(
                || text(&self.file_size_human, crate::format::UNKNOWN),
                crate::format::bytes,
            ),
        ));
        rows
    }
}

/// `POST /single-degradation` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleDegradationRequest {
    /// Backend-relative path of the input.
    pub media_path: String,
    /// Kind of the input.
    pub media_type: MediaKind,
    /// Id of the degradation type to apply.
    pub degradation_type: String,
    /// Values for every parameter of that type.
    pub params: ParamMap,
}

/// Response data of both processing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedData {
    /// Backend-relative path of the result.
    pub processed_path: String,
}

/// `POST /file-list` request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileListRequest {
    /// Directory relative to the backend's media root; empty for the root.
    pub subdir: String,
}

/// `POST /file-list` response data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileListData {
    /// Media files in the directory.
    #[serde(default)]
    pub files: Vec<RemoteFile>,
    /// The listed directory; empty for the root.
    #[serde(default)]
    pub current_dir: String,
    /// Its parent; equal to `current_dir` at the root.
    #[serde(default)]
    pub parent_dir: String,
}

impl FileListData {
    /// Whether navigating up is possible.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent_dir != self.current_dir
    }
}

/// One entry of a server directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// File name without directories.
    pub name: String,
    /// Backend-relative path.
    pub path: String,
    /// `"image"` or `"video"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Preformatted size, when the backend reports one.
    #[serde(default)]
    pub size_human: Option<String>,
}

impl RemoteFile {
    /// Media kind of the entry.
    #[must_use]
    pub fn media_kind(&self) -> MediaKind {
        if self.kind == MediaKind::Image.as_str() {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }
}

/// `POST /files/delete` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Backend-relative path of the file to remove.
    pub file_path: String,
}

/// One stage of a composite request: `{ "name": ..., "params": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePayload<P> {
    /// `"composite"` for required stages, the type id for the optional one.
    pub name: String,
    /// Per-type entries for a composite stage, plain values otherwise.
    pub params: P,
}

/// `POST /composite-degradation` request.
///
/// An unused optional stage is sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRequest {
    /// Backend-relative path of the input.
    pub media_path: String,
    /// Kind of the input.
    pub media_type: MediaKind,
    /// First required stage.
    pub first_degradation_config: StagePayload<CompositeStage>,
    /// Second required stage.
    pub second_degradation_config: StagePayload<CompositeStage>,
    /// Optional stage, applied last.
    pub third_degradation_config: Option<StagePayload<ParamMap>>,
}

/// Before/after metadata stored with a saved configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileInfoRecord {
    /// Metadata of the uploaded file.
    pub original: Option<MediaInfo>,
    /// Metadata of the result.
    pub processed: Option<MediaInfo>,
}

/// The configuration file downloaded next to a processed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    /// Every stage's settings.
    pub stages: StagesRecord,
    /// Before/after metadata.
    pub file_info: FileInfoRecord,
    /// ISO-8601, supplied by the caller.
    pub timestamp: String,
    /// Human-readable description of each applied stage.
    pub processing_steps: Vec<String>,
}

/// Human-readable message for a failed response.
///
/// Prefers the body's `detail` field (a string, or any other JSON
/// rendered compactly), then the raw body text, then a generic message
/// with the status code.
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        match map.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => {
                return detail.clone();
            }
            Some(serde_json::Value::Null | serde_json::Value::String(_)) | None => {}
            Some(other) => return other.to_string(),
        }
    }
    if body.is_empty() {
        format!("{GENERIC_FAILURE} (HTTP {status})")
    } else {
        body.to_owned()
    }
}

/// Message for an envelope whose `status` reports a failure although
/// the HTTP status was a success.
///
/// Returns `None` when `status` is absent or `"success"`, or when the body
/// is not a JSON object at all (that is a decode problem, not a refusal).
#[must_use]
pub fn envelope_failure(body: &str) -> Option<String> {
    let serde_json::Value::Object(map) = serde_json::from_str(body).ok()? else {
        return None;
    };
    let status = match map.get("status")? {
        serde_json::Value::String(s) if s == SUCCESS_STATUS => return None,
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => return None,
        other => other.to_string(),
    };
    let reason = ["detail", "message"]
        .iter()
        .find_map(|key| match map.get(*key) {
            Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text.clone()),
            _ => None,
        });
    Some(reason.unwrap_or_else(|| format!("{GENERIC_FAILURE} (status: {status})")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_wins() {
        assert_eq!(
            error_message(400, r#"{"detail":"不支持的文件格式"}"#),
            "不支持的文件格式"
        );
    }

    #[test]
    fn structured_detail_is_rendered() {
        let msg = error_message(422, r#"{"detail":[{"loc":["body","media_path"],"msg":"field required"}]}"#);
        assert!(msg.contains("field required"), "{msg}");
    }

    #[test]
    fn falls_back_to_body_then_status() {
        assert_eq!(error_message(500, "Internal Server Error"), "Internal Server Error");
        assert_eq!(error_message(502, "  "), "请求失败 (HTTP 502)");
        assert_eq!(error_message(500, r#"{"message":"x"}"#), r#"{"message":"x"}"#);
    }

    #[test]
    fn non_success_envelope_is_a_failure() {
        assert_eq!(
            envelope_failure(r#"{"status":"error","message":"视频解码失败"}"#),
            Some("视频解码失败".to_owned())
        );
        assert_eq!(
            envelope_failure(r#"{"status":"failed","data":null}"#),
            Some("请求失败 (status: failed)".to_owned())
        );
    }

    #[test]
    fn success_or_missing_status_is_not_a_failure() {
        assert_eq!(
            envelope_failure(r#"{"status":"success","data":{"processed_path":"p.mp4"}}"#),
            None
        );
        assert_eq!(envelope_failure(r#"{"data":{"processed_path":"p.mp4"}}"#), None);
        assert_eq!(envelope_failure("not json"), None);
    }

    #[test]
    fn media_info_tolerates_missing_fields() {
        let info: MediaInfo = serde_json::from_str(r#"{"width":1920,"height":1080}"#).unwrap();
        assert_eq!(info.resolution(), "1920 × 1080");
        assert_eq!(info.fps, None);
        let rows = info.rows(MediaKind::Video);
        assert!(rows.contains(&("帧率", "未知".to_owned())));
        assert!(rows.contains(&("音频编码", "无".to_owned())));
    }

    #[test]
    fn file_list_parses_backend_shape() {
        let json = r#"{
            "status": "success",
            "data": {
                "files": [{"name": "a.mp4", "path": "videos/a.mp4", "type": "video", "size_human": "3.2 MB"}],
                "current_dir": "videos",
                "parent_dir": ""
            }
        }"#;
        let envelope: ApiEnvelope<FileListData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status.as_deref(), Some("success"));
        let listing = envelope.data;
        assert!(listing.has_parent());
        assert_eq!(listing.files[0].media_kind(), MediaKind::Video);
    }

    #[test]
    fn single_request_uses_backend_keys() {
        let mut params = ParamMap::new();
        params.insert("kernel_size".into(), crate::ParamValue::Int(15));
        let request = SingleDegradationRequest {
            media_path: "uploads/a.png".into(),
            media_type: MediaKind::Image,
            degradation_type: "blur".into(),
            params,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["media_type"], "image");
        assert_eq!(json["degradation_type"], "blur");
        assert_eq!(json["params"]["kernel_size"], 15);
    }
}
