//! State machine of the single-type simulator.
//!
//! ```text
//! Idle ──select──▶ FileSelected ──process──▶ Processing ──complete──▶ Complete
//!   ▲                ▲    ▲                      │                       │
//!   │                │    └──────── fail ────────┘                       │
//!   │                └──────────────── discard result ────────────────────┤
//!   └───────────────────────────────── change file ──────────────────────┘
//! ```
//!
//! Requests are issued by the I/O layer. Each [`begin_processing`] hands
//! out a [`ProcessTicket`] carrying a generation number; results arriving
//! for an older generation are dropped, so a request that outlives a file
//! change never overwrites newer state.
//!
//! [`begin_processing`]: SimulationFlow::begin_processing

use crate::catalog::Catalog;
use crate::error::FlowError;
use crate::media::MediaFile;
use crate::param::ParamMap;
use crate::payload::SingleDegradationRequest;

/// Coarse state of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// No file chosen.
    Idle,
    /// A file is chosen; processing may start.
    FileSelected,
    /// A request is in flight.
    Processing,
    /// A processed result is available.
    Complete,
}

impl FlowState {
    /// Lower-case name for messages and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected => "file selected",
            Self::Processing => "processing",
            Self::Complete => "complete",
        }
    }
}

/// Proof that a processing request was started.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessTicket {
    /// Generation the result must match.
    pub generation: u64,
    /// The request to send.
    pub request: SingleDegradationRequest,
}

/// The single-type simulator's file, result and error state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationFlow {
    media: Option<MediaFile>,
    processing: bool,
    processed_path: Option<String>,
    error: Option<String>,
    generation: u64,
}

impl SimulationFlow {
    /// A flow with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> FlowState {
        match (&self.media, self.processing, &self.processed_path) {
            (None, _, _) => FlowState::Idle,
            (Some(_), true, _) => FlowState::Processing,
            (Some(_), false, Some(_)) => FlowState::Complete,
            (Some(_), false, None) => FlowState::FileSelected,
        }
    }

    /// The selected file.
    #[must_use]
    pub const fn media(&self) -> Option<&MediaFile> {
        self.media.as_ref()
    }

    /// Backend path of the latest result.
    #[must_use]
    pub fn processed_path(&self) -> Option<&str> {
        self.processed_path.as_deref()
    }

    /// Message of the latest failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the process action should be enabled.
    #[must_use]
    pub const fn can_process(&self) -> bool {
        matches!(self.state(), FlowState::FileSelected | FlowState::Complete)
    }

    /// Generation of the current selection.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Pick a file. Any previous result is dropped.
    ///
    /// # Errors
    ///
    /// [`FlowError::Busy`] while a request is in flight.
    pub fn select_file(&mut self, media: MediaFile) -> Result<(), FlowError> {
        if self.processing {
            return Err(FlowError::Busy);
        }
        tracing::info!(path = %media.file_path, kind = %media.kind, "file selected");
        self.media = Some(media);
        self.processed_path = None;
        self.error = None;
        self.generation += 1;
        Ok(())
    }

    /// Start processing the selected file with `type_key`.
    ///
    /// # Errors
    ///
    /// [`FlowError::NoFile`] in `Idle`, [`FlowError::Busy`] in
    /// `Processing`, [`FlowError::Configuration`] when the type has no
    /// schema.
    pub fn begin_processing(
        &mut self,
        catalog: &Catalog,
        type_key: &str,
        params: &ParamMap,
    ) -> Result<ProcessTicket, FlowError> {
        if self.processing {
            return Err(FlowError::Busy);
        }
        let media = self.media.as_ref().ok_or(FlowError::NoFile)?;
        let schema = catalog.require(type_key)?;
        let request = SingleDegradationRequest {
            media_path: media.file_path.clone(),
            media_type: media.kind,
            degradation_type: schema.id.clone(),
            params: params.clone(),
        };
        self.processing = true;
        self.processed_path = None;
        self.error = None;
        self.generation += 1;
        tracing::info!(type_key, generation = self.generation, "processing started");
        Ok(ProcessTicket {
            generation: self.generation,
            request,
        })
    }

    /// Record a successful result. Returns `false` for a stale ticket.
    pub fn complete(&mut self, generation: u64, processed_path: String) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(generation, "discarding stale result");
            return false;
        }
        tracing::info!(path = %processed_path, "processing complete");
        self.processing = false;
        self.processed_path = Some(processed_path);
        true
    }

    /// Record a failure. The file and parameters stay so the user can
    /// retry right away. Returns `false` for a stale ticket.
    pub fn fail(&mut self, generation: u64, message: String) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(generation, "discarding stale failure");
            return false;
        }
        tracing::warn!(%message, "processing failed");
        self.processing = false;
        self.error = Some(message);
        true
    }

    const fn is_current(&self, generation: u64) -> bool {
        self.processing && generation == self.generation
    }

    /// Forget the result but keep the file, e.g. after deleting it from
    /// the server.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidTransition`] unless `Complete`.
    pub fn discard_result(&mut self) -> Result<(), FlowError> {
        if self.state() != FlowState::Complete {
            return Err(FlowError::InvalidTransition {
                action: "discard the result",
                state: self.state().name(),
            });
        }
        self.processed_path = None;
        Ok(())
    }

    /// Drop the file and any result, back to `Idle`.
    ///
    /// # Errors
    ///
    /// [`FlowError::Busy`] while a request is in flight.
    pub fn change_file(&mut self) -> Result<(), FlowError> {
        if self.processing {
            return Err(FlowError::Busy);
        }
        self.media = None;
        self.processed_path = None;
        self.error = None;
        self.generation += 1;
        Ok(())
    }

    /// Show a side-effect failure (preview, metadata, delete) without
    /// changing state.
    pub fn report(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Hide the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::media::MediaKind;

    fn clip() -> MediaFile {
        MediaFile {
            file_path: "videos/clip.mp4".into(),
            name: "clip.mp4".into(),
            kind: MediaKind::Video,
            size_human: Some("3.2 MB".into()),
        }
    }

    fn blur_params(catalog: &Catalog) -> ParamMap {
        catalog.find("blur").unwrap().defaults()
    }

    #[test]
    fn happy_path() {
        let catalog = Catalog::builtin().unwrap();
        let mut flow = SimulationFlow::new();
        assert_eq!(flow.state(), FlowState::Idle);

        flow.select_file(clip()).unwrap();
        assert_eq!(flow.state(), FlowState::FileSelected);

        let ticket = flow
            .begin_processing(&catalog, "blur", &blur_params(&catalog))
            .unwrap();
        assert_eq!(flow.state(), FlowState::Processing);
        assert_eq!(ticket.request.media_path, "videos/clip.mp4");
        assert_eq!(ticket.request.media_type, MediaKind::Video);

        assert!(flow.complete(ticket.generation, "processed/clip.mp4".into()));
        assert_eq!(flow.state(), FlowState::Complete);
        assert_eq!(flow.processed_path(), Some("processed/clip.mp4"));
    }

    #[test]
    fn second_request_while_processing_is_busy() {
        let catalog = Catalog::builtin().unwrap();
        let mut flow = SimulationFlow::new();
        flow.select_file(clip()).unwrap();
        flow.begin_processing(&catalog, "blur", &blur_params(&catalog))
            .unwrap();
        assert_eq!(
            flow.begin_processing(&catalog, "blur", &blur_params(&catalog)),
            Err(FlowError::Busy)
        );
        assert_eq!(flow.select_file(clip()), Err(FlowError::Busy));
    }

    #[test]
    fn failure_keeps_file_and_allows_retry() {
        let catalog = Catalog::builtin().unwrap();
        let mut flow = SimulationFlow::new();
        flow.select_file(clip()).unwrap();
        let params = blur_params(&catalog);
        let ticket = flow.begin_processing(&catalog, "blur", &params).unwrap();

        assert!(flow.fail(ticket.generation, "无法连接到后端服务".into()));
        assert_eq!(flow.state(), FlowState::FileSelected);
        assert_eq!(flow.media(), Some(&clip()));
        assert_eq!(flow.error(), Some("无法连接到后端服务"));

        let retry = flow.begin_processing(&catalog, "blur", &params).unwrap();
        assert_eq!(retry.request, ticket.request);
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn processing_needs_a_file_and_a_schema() {
        let catalog = Catalog::builtin().unwrap();
        let mut flow = SimulationFlow::new();
        assert_eq!(
            flow.begin_processing(&catalog, "blur", &ParamMap::new()),
            Err(FlowError::NoFile)
        );
        flow.select_file(clip()).unwrap();
        assert!(matches!(
            flow.begin_processing(&catalog, "sepia", &ParamMap::new()),
            Err(FlowError::Configuration(_))
        ));
        assert_eq!(flow.state(), FlowState::FileSelected);
    }

    #[test]
    fn stale_results_are_ignored() {
        let catalog = Catalog::builtin().unwrap();
        let mut flow = SimulationFlow::new();
        flow.select_file(clip()).unwrap();
        let ticket = flow
            .begin_processing(&catalog, "blur", &blur_params(&catalog))
            .unwrap();
        assert!(!flow.complete(ticket.generation + 1, "x".into()));
        assert_eq!(flow.state(), FlowState::Processing);
        assert!(flow.complete(ticket.generation, "y".into()));
        assert!(!flow.fail(ticket.generation, "late".into()));
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn leaving_complete() {
        let catalog = Catalog::builtin().unwrap();
        let mut flow = SimulationFlow::new();
        flow.select_file(clip()).unwrap();
        assert!(matches!(
            flow.discard_result(),
            Err(FlowError::InvalidTransition { .. })
        ));
        let ticket = flow
            .begin_processing(&catalog, "blur", &blur_params(&catalog))
            .unwrap();
        flow.complete(ticket.generation, "out.mp4".into());

        flow.discard_result().unwrap();
        assert_eq!(flow.state(), FlowState::FileSelected);

        let ticket = flow
            .begin_processing(&catalog, "blur", &blur_params(&catalog))
            .unwrap();
        flow.complete(ticket.generation, "out.mp4".into());
        flow.change_file().unwrap();
        assert_eq!(flow.state(), FlowState::Idle);
        assert_eq!(flow.processed_path(), None);
    }
}
