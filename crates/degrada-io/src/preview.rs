//! Object URLs for previewing fetched media.
//!
//! An [`ObjectUrl`] owns its `blob:` URL and revokes it when dropped, so
//! a preview is released as soon as the signal holding it is overwritten
//! or its page unmounts. Requires a browser environment.

use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur when creating a preview.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for PreviewError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// A `blob:` URL revoked on drop.
#[derive(Debug, PartialEq, Eq)]
pub struct ObjectUrl {
    url: String,
}

impl ObjectUrl {
    /// Wrap `bytes` in a `Blob` of type `mime` and create a URL for it.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::JsError`] if `Blob` creation or
    /// `URL.createObjectURL` fails.
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Result<Self, PreviewError> {
        let blob = blob_from_bytes(bytes, mime)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;
        tracing::debug!(%url, size = bytes.len(), mime, "preview created");
        Ok(Self { url })
    }

    /// The URL, for `src` and `href` attributes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        // Best effort; a failed revoke only leaks until the page closes.
        let _ = web_sys::Url::revoke_object_url(&self.url);
        tracing::debug!(url = %self.url, "preview released");
    }
}

/// Build a `Blob` holding a copy of `bytes`.
fn blob_from_bytes(bytes: &[u8], mime: &str) -> Result<web_sys::Blob, JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));

    let opts = BlobPropertyBag::new();
    opts.set_type(mime);

    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
}
