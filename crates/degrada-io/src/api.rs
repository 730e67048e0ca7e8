//! HTTP client for the processing backend.
//!
//! Every endpoint except `/media-info` and `/file` wraps its payload in a
//! `{status, data}` envelope; a `status` other than `"success"` is a
//! failure even under HTTP 200. Failures are turned into a message fit for
//! the error banner: the backend's `detail` when it sent one, a generic
//! connectivity message when the request never got an answer.

use degrada_core::payload::{
    self, ApiEnvelope, CompositeRequest, DeleteRequest, FileListData, FileListRequest, MediaInfo,
    MediaInfoRequest, ProcessedData, SingleDegradationRequest, UploadData,
};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;

/// Shown when the backend could not be reached at all.
pub const CONNECTIVITY_FAILURE: &str = "无法连接到后端服务，请检查服务器是否启动";

/// Errors from a backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request failed before a response arrived.
    #[error("无法连接到后端服务，请检查服务器是否启动")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The backend answered but its envelope reported a failure.
    #[error("{0}")]
    Rejected(String),

    /// The response body did not have the expected shape.
    #[error("后端响应格式无法识别: {0}")]
    Decode(String),

    /// A file path could not be turned into a URL.
    #[error("无效的文件地址: {0}")]
    InvalidUrl(String),

    /// A local file could not be packed into an upload form.
    #[error("无法上传文件: {0}")]
    InvalidUpload(String),
}

/// Raw bytes of a backend file plus the type the server reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBytes {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileBytes {
    /// The reported content type, or one guessed from `file_name`.
    #[must_use]
    pub fn mime<'a>(&'a self, file_name: &str) -> &'a str {
        self.content_type
            .as_deref()
            .unwrap_or_else(|| mime_for(file_name))
    }
}

/// Guess a MIME type from a file extension. Unknown extensions map to
/// `application/octet-stream`.
#[must_use]
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Parse a JSON body into `T`.
///
/// # Errors
///
/// [`ApiError::Decode`] when the body does not match.
pub fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Parse an enveloped JSON body and return its `data`.
///
/// # Errors
///
/// [`ApiError::Rejected`] when `status` is present and not `"success"`,
/// [`ApiError::Decode`] when the body does not match.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    if let Some(message) = payload::envelope_failure(body) {
        tracing::warn!(%message, "backend reported failure");
        return Err(ApiError::Rejected(message));
    }
    parse::<ApiEnvelope<T>>(body).map(|envelope| envelope.data)
}

/// The multipart part carrying an uploaded file.
fn file_part(file_name: &str, bytes: Vec<u8>, mime: &str) -> Result<Part, ApiError> {
    Part::bytes(bytes)
        .file_name(file_name.to_owned())
        .mime_str(mime)
        .map_err(|e| ApiError::InvalidUpload(e.to_string()))
}

/// Client for the processing backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

#[allow(clippy::future_not_send)] // reqwest futures are !Send on wasm
impl ApiClient {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`] if the underlying client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        let http = builder.build().map_err(ApiError::Network)?;
        Ok(Self { http, config })
    }

    /// The settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// URL that serves the raw bytes of a backend file.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] when the base URL is malformed.
    pub fn file_url(&self, path: &str) -> Result<String, ApiError> {
        reqwest::Url::parse_with_params(&self.config.endpoint("/file"), &[("path", path)])
            .map(String::from)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    /// Upload a local file; the backend stores it and reports its path.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadData, ApiError> {
        let part = file_part(file_name, bytes, mime_for(file_name))?;
        let url = self.config.endpoint("/upload");
        tracing::info!(%url, file_name, "uploading");
        let response = self
            .http
            .post(&url)
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(ApiError::Network)?;
        let body = Self::checked_body(response).await?;
        parse_envelope(&body)
    }

    /// Metadata of a backend file. This endpoint is not enveloped.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn media_info(&self, file_path: &str) -> Result<MediaInfo, ApiError> {
        let request = MediaInfoRequest {
            file_path: file_path.to_owned(),
        };
        let body = self.post_json("/media-info", &request).await?;
        parse(&body)
    }

    /// Download the bytes of a backend file.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn fetch_file(&self, path: &str) -> Result<FileBytes, ApiError> {
        let url = self.file_url(path)?;
        tracing::debug!(%url, "fetching file");
        let response = self.http.get(&url).send().await.map_err(ApiError::Network)?;
        let response = Self::check(response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        Ok(FileBytes {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    /// Run a single degradation type on a file.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn single_degradation(
        &self,
        request: &SingleDegradationRequest,
    ) -> Result<ProcessedData, ApiError> {
        tracing::info!(
            media = %request.media_path,
            degradation = %request.degradation_type,
            "submitting single degradation"
        );
        let body = self.post_json("/single-degradation", request).await?;
        let data: ProcessedData = parse_envelope(&body)?;
        tracing::info!(processed = %data.processed_path, "single degradation finished");
        Ok(data)
    }

    /// Run the three-stage pipeline on a file.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn composite_degradation(
        &self,
        request: &CompositeRequest,
    ) -> Result<ProcessedData, ApiError> {
        tracing::info!(
            media = %request.media_path,
            third = request.third_degradation_config.is_some(),
            "submitting composite degradation"
        );
        let body = self.post_json("/composite-degradation", request).await?;
        let data: ProcessedData = parse_envelope(&body)?;
        tracing::info!(processed = %data.processed_path, "composite degradation finished");
        Ok(data)
    }

    /// List a directory on the server. An empty `subdir` is the root.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn file_list(&self, subdir: &str) -> Result<FileListData, ApiError> {
        let request = FileListRequest {
            subdir: subdir.to_owned(),
        };
        let body = self.post_json("/file-list", &request).await?;
        parse_envelope(&body)
    }

    /// Delete a file from the server.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn delete_file(&self, file_path: &str) -> Result<(), ApiError> {
        let request = DeleteRequest {
            file_path: file_path.to_owned(),
        };
        let body = self.post_json("/files/delete", &request).await?;
        if let Some(message) = payload::envelope_failure(&body) {
            return Err(ApiError::Rejected(message));
        }
        tracing::info!(file_path, "deleted from server");
        Ok(())
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, ApiError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "post");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Network)?;
        Self::checked_body(response).await
    }

    async fn checked_body(response: reqwest::Response) -> Result<String, ApiError> {
        Self::check(response)
            .await?
            .text()
            .await
            .map_err(ApiError::Network)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // An unreadable error body still gets the generic status message.
        let body = response.text().await.unwrap_or_default();
        let message = payload::error_message(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), %message, "backend rejected request");
        Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}
