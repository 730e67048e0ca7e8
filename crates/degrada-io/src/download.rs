//! File download via Blob URLs and anchors.
//!
//! Dioxus has no built-in file download API.  Downloads are triggered by
//! programmatically clicking a temporary `<a download>` element whose
//! `href` is either a fresh object URL or a backend file URL.
//!
//! The browser-facing functions require a browser environment
//! (`wasm32-unknown-unknown` target); the file name helpers do not.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

use degrada_core::payload::MediaInfo;

/// Errors that can occur when triggering a file download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Name of a downloaded single-type result:
/// `processed_<type>_<last path segment>`.
#[must_use]
pub fn processed_file_name(type_key: &str, file_path: &str) -> String {
    let name = file_path.rsplit(['/', '\\']).next().unwrap_or(file_path);
    format!("processed_{type_key}_{name}")
}

/// Name of a downloaded pipeline result: the name the backend reports
/// for it, else `processed_<original name>`.
#[must_use]
pub fn pipeline_result_name(info: Option<&MediaInfo>, original_name: &str) -> String {
    info.and_then(|i| i.file_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("processed_{original_name}"))
}

/// Name of a downloaded pipeline configuration record.
#[must_use]
pub fn config_file_name(millis: u64) -> String {
    format!("degradation_config_{millis}.json")
}

/// Download a text document such as a JSON configuration.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails
/// (e.g., `Blob` creation, `URL.createObjectURL`, element creation).
pub fn trigger_download(data: &str, filename: &str, mime_type: &str) -> Result<(), DownloadError> {
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(data));

    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);

    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &opts)?;
    download_blob(&blob, filename)
}

/// Download whatever `href` points at (an existing object URL or a
/// backend file URL) under `filename`.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails.
pub fn download_url(href: &str, filename: &str) -> Result<(), DownloadError> {
    click_anchor(href, filename)
}

fn download_blob(blob: &web_sys::Blob, filename: &str) -> Result<(), DownloadError> {
    let url = web_sys::Url::create_object_url_with_blob(blob)?;
    let result = click_anchor(&url, filename);

    // Best-effort cleanup; the download is already initiated.
    let _ = web_sys::Url::revoke_object_url(&url);
    result
}

/// Create a temporary `<a>` element, click it and remove it again.
fn click_anchor(href: &str, filename: &str) -> Result<(), DownloadError> {
    let window =
        web_sys::window().ok_or_else(|| DownloadError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DownloadError::JsError("no document".into()))?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(href);
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| DownloadError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();
    let _ = body.remove_child(&anchor);

    tracing::info!(filename, "download triggered");
    Ok(())
}
