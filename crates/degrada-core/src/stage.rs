//! Stage slots, per-type parameter state and the single-field update.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::noise::{self, INTENSITY_KEY, NOISE_KIND_KEY, NOISE_TYPE_ID, NoiseKind};
use crate::param::{ParamMap, ParamSpec, ParamValue};
use crate::schema::DegradationSchema;

/// Where a [`StageConfig`] lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageSlot {
    /// The single-type simulator's only stage.
    Single,
    /// First required composite stage.
    First,
    /// Second required composite stage.
    Second,
    /// Optional single-type stage.
    Third,
}

impl StageSlot {
    /// The slots of the compound pipeline, in application order.
    pub const PIPELINE: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// The two required composite slots.
    pub const COMPOSITE: [Self; 2] = [Self::First, Self::Second];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "退化模拟",
            Self::First => "第一阶段",
            Self::Second => "第二阶段",
            Self::Third => "第三阶段",
        }
    }

    /// Short id used for DOM ids and CLI paths.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::First => "stage1",
            Self::Second => "stage2",
            Self::Third => "stage3",
        }
    }

    /// Parse a CLI-style stage id (`stage1`, `1`, ...).
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "single" => Some(Self::Single),
            "stage1" | "1" => Some(Self::First),
            "stage2" | "2" => Some(Self::Second),
            "stage3" | "3" => Some(Self::Third),
            _ => None,
        }
    }
}

impl fmt::Display for StageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One accepted control interaction.
///
/// The renderer emits exactly one per accepted change; the page owning
/// the state applies it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamUpdate {
    /// Stage being edited.
    pub stage: StageSlot,
    /// Degradation type within the stage.
    pub type_key: String,
    /// Parameter key.
    pub param_key: String,
    /// Coerced and clamped value.
    pub value: ParamValue,
}

/// Enablement and current parameter values of one degradation type.
///
/// Serializes to the backend's `{ "enabled": ..., "params": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Whether the type is applied.
    pub enabled: bool,
    /// Values keyed by parameter key.
    pub params: ParamMap,
}

impl StageConfig {
    /// Enabled, with every parameter at its schema default.
    #[must_use]
    pub fn defaults(schema: &DegradationSchema) -> Self {
        Self {
            enabled: true,
            params: schema.defaults(),
        }
    }

    /// Restore every parameter to its default, keeping enablement.
    pub fn reset(&mut self, schema: &DegradationSchema) {
        self.params = schema.defaults();
    }

    /// The spec that currently governs `key`.
    ///
    /// For the noise type the intensity bound depends on the selected
    /// noise kind; every other spec is the schema's own.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownParam`] if the schema lacks `key`.
    pub fn effective_spec(
        &self,
        schema: &DegradationSchema,
        key: &str,
    ) -> Result<ParamSpec, ParamError> {
        let spec = schema.param(key).ok_or_else(|| ParamError::UnknownParam {
            type_key: schema.id.clone(),
            param_key: key.to_owned(),
        })?;
        if schema.id == NOISE_TYPE_ID {
            Ok(noise::overlay(NoiseKind::active(&self.params), spec))
        } else {
            Ok(spec.clone())
        }
    }

    /// Parse raw control input for `key` without storing it.
    ///
    /// # Errors
    ///
    /// See [`ParamSpec::coerce`]; also [`ParamError::UnknownParam`].
    pub fn coerce(
        &self,
        schema: &DegradationSchema,
        key: &str,
        raw: &str,
    ) -> Result<ParamValue, ParamError> {
        self.effective_spec(schema, key)?.coerce(raw)
    }

    /// Write one field.
    ///
    /// The value is brought into the effective range first. Switching the
    /// noise kind re-clamps the stored intensity into the new kind's range;
    /// nothing else is recomputed. A rejected value leaves the state
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`ParamError::UnknownParam`], [`ParamError::NotAnOption`] for a
    /// select value that is not listed, [`ParamError::NotANumber`] for
    /// text given to a numeric parameter.
    pub fn set(
        &mut self,
        schema: &DegradationSchema,
        key: &str,
        value: &ParamValue,
    ) -> Result<ParamValue, ParamError> {
        let spec = self.effective_spec(schema, key)?;
        let stored = spec.reclamp(value).ok_or_else(|| match &spec {
            ParamSpec::Select(_) => ParamError::NotAnOption {
                param_key: key.to_owned(),
                value: value.to_string(),
            },
            ParamSpec::Int(_) | ParamSpec::Float(_) => ParamError::NotANumber {
                param_key: key.to_owned(),
                raw: value.to_string(),
            },
        })?;
        self.params.insert(key.to_owned(), stored.clone());

        if schema.id == NOISE_TYPE_ID && key == NOISE_KIND_KEY {
            self.reclamp_intensity(schema);
        }
        tracing::debug!(type_key = %schema.id, param_key = key, value = %stored, "parameter updated");
        Ok(stored)
    }

    fn reclamp_intensity(&mut self, schema: &DegradationSchema) {
        let Ok(spec) = self.effective_spec(schema, INTENSITY_KEY) else {
            return;
        };
        let clamped = self
            .params
            .get(INTENSITY_KEY)
            .and_then(|current| spec.reclamp(current))
            .unwrap_or_else(|| spec.default_value());
        self.params.insert(INTENSITY_KEY.to_owned(), clamped);
    }

    /// Whether the params hold exactly the schema's keys with values the
    /// effective specs accept.
    #[cfg(test)]
    pub(crate) fn conforms(&self, schema: &DegradationSchema) -> bool {
        self.params.len() == schema.params.len()
            && schema.params.iter().all(|spec| {
                let Ok(effective) = self.effective_spec(schema, spec.key()) else {
                    return false;
                };
                self.params
                    .get(spec.key())
                    .is_some_and(|v| effective.accepts(v))
            })
    }
}
