//! degrada-core: parameter schemas and pipeline composition (sans-IO).
//!
//! Everything the degradation simulator decides on its own lives here:
//! the schema catalog, the mapping from schemas to controls, stage and
//! pipeline state with its validation, the backend wire types, the
//! single-type simulation state machine and the simulated progress
//! schedule.
//!
//! This crate has **no I/O dependencies**. HTTP, timers, object URLs and
//! rendering live in `degrada-io`.

pub mod catalog;
pub mod control;
pub mod error;
pub mod flow;
pub mod format;
pub mod media;
pub mod noise;
pub mod param;
pub mod payload;
pub mod pipeline;
pub mod progress;
pub mod schema;
pub mod stage;

pub use catalog::{COMPOSITE_TYPES, Catalog, Section};
pub use control::{Control, SelectControl, SliderControl, Widget};
pub use error::{ConfigurationError, FlowError, ParamError, SubmitError, ValidationError};
pub use flow::{FlowState, ProcessTicket, SimulationFlow};
pub use media::{InfoState, MediaFile, MediaKind};
pub use noise::NoiseKind;
pub use param::{NumericSpec, ParamMap, ParamSpec, ParamValue, SelectOption, SelectSpec};
pub use pipeline::{CompositeStage, OptionalStage, PipelineConfig};
pub use progress::{ProgressStep, SimulatedProgress};
pub use schema::DegradationSchema;
pub use stage::{ParamUpdate, StageConfig, StageSlot};
