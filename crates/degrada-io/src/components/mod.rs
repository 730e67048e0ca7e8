//! Dioxus UI components for degrada.
//!
//! Provides schema-driven parameter controls, the composite and optional
//! stage panels, the server file browser, the upload zone, and the
//! banner, preview, metadata and progress widgets.

mod composite_stage;
mod error_banner;
mod file_browser;
mod media_info;
mod optional_stage;
mod param_controls;
mod preview;
mod progress_bar;
mod upload;

pub use composite_stage::CompositeStagePanel;
pub use error_banner::ErrorBanner;
pub use file_browser::FileBrowser;
pub use media_info::MediaInfoCard;
pub use optional_stage::OptionalStagePanel;
pub use param_controls::ParamControls;
pub use preview::MediaPreview;
pub use progress_bar::ProgressBar;
pub use upload::{FileUpload, has_allowed_extension};
