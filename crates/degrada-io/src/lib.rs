//! degrada-io: backend client, browser I/O and Dioxus component library.
//!
//! Talks to the processing backend over HTTP, manages preview object
//! URLs and Blob downloads, plays the simulated progress schedule, and
//! provides the reusable UI components of the degrada web application.

pub mod api;
pub mod components;
pub mod config;
pub mod download;
pub mod preview;
pub mod progress;

pub use api::{ApiClient, ApiError, FileBytes};
pub use components::{
    CompositeStagePanel, ErrorBanner, FileBrowser, FileUpload, MediaInfoCard, MediaPreview,
    OptionalStagePanel, ParamControls, ProgressBar,
};
pub use config::ApiConfig;
pub use preview::{ObjectUrl, PreviewError};
