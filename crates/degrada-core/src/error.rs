//! Error types for the degrada core.
//!
//! Each concern gets its own enum so callers can match on exactly the
//! failures a given operation can produce:
//!
//! - [`ParamError`]: a single-field update was rejected (no-op).
//! - [`ConfigurationError`]: the schema catalog is broken or lacks an
//!   entry. A build/config defect, never retried.
//! - [`ValidationError`]: the user's pipeline cannot be submitted yet.
//! - [`SubmitError`]: what [`crate::PipelineConfig::validate`] returns.
//! - [`FlowError`]: an illegal transition of the simulation flow.

use crate::media::MediaKind;
use crate::stage::StageSlot;

/// A single-field update that was rejected without touching any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// The stage does not exist in the state being edited.
    #[error("{0} is not configured")]
    NoStage(StageSlot),

    /// The degradation type is not part of the stage being edited.
    #[error("unknown degradation type: {0}")]
    UnknownType(String),

    /// The parameter key is not declared by the type's schema.
    #[error("unknown parameter {param_key} for {type_key}")]
    UnknownParam {
        /// Degradation type id.
        type_key: String,
        /// Offending parameter key.
        param_key: String,
    },

    /// Raw input for a numeric parameter did not parse as a finite number.
    #[error("{param_key} expects a number, got {raw:?}")]
    NotANumber {
        /// Parameter key.
        param_key: String,
        /// The raw input as received from the control.
        raw: String,
    },

    /// The value is not one of the select's options.
    #[error("{value:?} is not an option of {param_key}")]
    NotAnOption {
        /// Parameter key.
        param_key: String,
        /// The rejected value.
        value: String,
    },
}

/// A defect in the schema catalog.
///
/// Surfaced as a blocking banner. Processing stays disabled until the
/// catalog is fixed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A referenced degradation type has no schema.
    #[error("no schema for degradation type {0:?}")]
    UnknownType(String),

    /// The catalog lacked composite entries when pipeline defaults were
    /// initialized.
    #[error("catalog is missing composite entries: {}", .0.join(", "))]
    MissingCatalogEntries(Vec<String>),

    /// The catalog could not be parsed.
    #[error("catalog is not valid JSON: {0}")]
    Parse(String),

    /// One or more schemas violate their invariants.
    #[error("catalog is invalid: {}", .0.join("; "))]
    InvalidCatalog(Vec<String>),
}

/// A pipeline the user cannot submit until they correct it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A sub-type of a required composite stage is disabled.
    #[error("{stage}: {type_name} is disabled but required")]
    RequiredStageDisabled {
        /// The composite stage.
        stage: StageSlot,
        /// Display name of the disabled degradation type.
        type_name: String,
    },

    /// The optional stage's type is not offered for the media kind.
    #[error("{type_key} is not available for {kind} media")]
    OptionalTypeUnavailable {
        /// Selected type id.
        type_key: String,
        /// Media kind of the uploaded file.
        kind: MediaKind,
    },

    /// Nothing has been uploaded yet.
    #[error("no media file has been uploaded")]
    NoMedia,
}

/// Why a pipeline could not be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Catalog defect; resubmitting will not help.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// User-correctable problem.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// An illegal transition of the single-type simulation flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// A request for this flow is already in flight.
    #[error("a processing request is already in progress")]
    Busy,

    /// No file has been selected.
    #[error("select a file first")]
    NoFile,

    /// The transition does not apply to the current state.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// What was attempted.
        action: &'static str,
        /// Current state name.
        state: &'static str,
    },

    /// The selected degradation type has no schema.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_lists_every_type() {
        let err = ConfigurationError::MissingCatalogEntries(vec!["noise".into(), "blur".into()]);
        assert_eq!(
            err.to_string(),
            "catalog is missing composite entries: noise, blur"
        );
    }

    #[test]
    fn submit_error_is_transparent() {
        let err: SubmitError = ValidationError::NoMedia.into();
        assert_eq!(err.to_string(), "no media file has been uploaded");
    }

    #[test]
    fn disabled_stage_message_names_stage_and_type() {
        let err = ValidationError::RequiredStageDisabled {
            stage: StageSlot::Second,
            type_name: "噪声".into(),
        };
        assert_eq!(err.to_string(), "第二阶段: 噪声 is disabled but required");
    }
}
