//! The three-stage compound pipeline.
//!
//! Stages 1 and 2 are composite: each applies blur, resample, noise and
//! compression in that order, every sub-type carrying its own
//! [`StageConfig`]. Stage 3 is optional and holds a single type chosen
//! from the catalog section for the uploaded media kind.
//!
//! The pipeline owns no I/O. The page that creates it applies
//! [`ParamUpdate`]s, calls [`PipelineConfig::to_request`] and hands the
//! result to the HTTP client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{COMPOSITE_TYPES, Catalog};
use crate::error::{ConfigurationError, ParamError, SubmitError, ValidationError};
use crate::media::{MediaFile, MediaKind};
use crate::param::{ParamMap, ParamValue};
use crate::payload::{CompositeRequest, FileInfoRecord, SavedConfiguration, StagePayload};
use crate::schema::DegradationSchema;
use crate::stage::{ParamUpdate, StageConfig, StageSlot};

/// `name` of a composite stage on the wire.
pub const COMPOSITE_NAME: &str = "composite";

/// Ordered sub-type configurations of one composite stage.
///
/// Serializes as a JSON object keyed by type id, in application order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeStage {
    entries: Vec<(String, StageConfig)>,
}

impl CompositeStage {
    /// One enabled entry per composite type the catalog provides. Types the
    /// catalog lacks are skipped.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            entries: COMPOSITE_TYPES
                .iter()
                .filter_map(|id| catalog.composite(id))
                .map(|schema| (schema.id.clone(), StageConfig::defaults(schema)))
                .collect(),
        }
    }

    /// Configuration of one sub-type.
    #[must_use]
    pub fn get(&self, type_key: &str) -> Option<&StageConfig> {
        self.entries
            .iter()
            .find(|(k, _)| k == type_key)
            .map(|(_, c)| c)
    }

    fn get_mut(&mut self, type_key: &str) -> Option<&mut StageConfig> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == type_key)
            .map(|(_, c)| c)
    }

    /// Sub-types in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StageConfig)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Number of sub-types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stage has no sub-types at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CompositeStage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, c)| (k, c)))
    }
}

impl<'de> Deserialize<'de> for CompositeStage {
    /// JSON objects carry no order, so known composite types are put back
    /// in application order and anything else follows alphabetically.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut proxy = BTreeMap::<String, StageConfig>::deserialize(deserializer)?;
        let mut entries: Vec<(String, StageConfig)> = COMPOSITE_TYPES
            .iter()
            .filter_map(|id| proxy.remove_entry(*id))
            .collect();
        entries.extend(proxy);
        Ok(Self { entries })
    }
}

/// The optional third stage when a type is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalStage {
    /// Selected type id.
    #[serde(rename = "type")]
    pub type_key: String,
    /// Parameter values of the selected type.
    pub params: ParamMap,
}

/// Third stage as written into a saved configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionalRecord {
    /// Selected type id, `null` when the stage is unused.
    #[serde(rename = "type")]
    pub type_key: Option<String>,
    /// Its values; empty when unused.
    pub params: ParamMap,
}

/// All stages as written into a saved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagesRecord {
    /// First required stage.
    pub stage1: CompositeStage,
    /// Second required stage.
    pub stage2: CompositeStage,
    /// Optional stage.
    pub stage3: OptionalRecord,
}

/// State of the compound pipeline page.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    first: CompositeStage,
    second: CompositeStage,
    third: Option<OptionalStage>,
    missing: Vec<String>,
}

impl PipelineConfig {
    /// Both composite stages at their defaults, no optional stage.
    ///
    /// Composite types the catalog lacks are recorded once as a standing
    /// configuration error that blocks submission; they are not
    /// re-checked later.
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        let missing = catalog.missing_composite_entries();
        if !missing.is_empty() {
            tracing::warn!(?missing, "catalog lacks composite entries");
        }
        Self {
            first: CompositeStage::from_catalog(catalog),
            second: CompositeStage::from_catalog(catalog),
            third: None,
            missing,
        }
    }

    /// Re-initialize everything from the catalog.
    pub fn reset(&mut self, catalog: &Catalog) {
        *self = Self::new(catalog);
    }

    /// Standing configuration error, if the catalog was incomplete.
    #[must_use]
    pub fn configuration_error(&self) -> Option<ConfigurationError> {
        (!self.missing.is_empty())
            .then(|| ConfigurationError::MissingCatalogEntries(self.missing.clone()))
    }

    /// One of the composite stages; `None` for the other slots.
    #[must_use]
    pub const fn composite(&self, slot: StageSlot) -> Option<&CompositeStage> {
        match slot {
            StageSlot::First => Some(&self.first),
            StageSlot::Second => Some(&self.second),
            StageSlot::Single | StageSlot::Third => None,
        }
    }

    const fn composite_mut(&mut self, slot: StageSlot) -> Option<&mut CompositeStage> {
        match slot {
            StageSlot::First => Some(&mut self.first),
            StageSlot::Second => Some(&mut self.second),
            StageSlot::Single | StageSlot::Third => None,
        }
    }

    /// The optional stage, if a type is selected.
    #[must_use]
    pub const fn optional(&self) -> Option<&OptionalStage> {
        self.third.as_ref()
    }

    /// The configuration an update would write to, plus its schema.
    fn target<'a>(
        &'a mut self,
        catalog: &'a Catalog,
        slot: StageSlot,
        type_key: &str,
    ) -> Result<(&'a DegradationSchema, StageTarget<'a>), ParamError> {
        let unknown = || ParamError::UnknownType(type_key.to_owned());
        if slot == StageSlot::Third {
            let third = self.third.as_mut().ok_or(ParamError::NoStage(slot))?;
            if third.type_key != type_key {
                return Err(unknown());
            }
            let schema = catalog.find(type_key).ok_or_else(unknown)?;
            return Ok((schema, StageTarget::Optional(&mut third.params)));
        }
        let stage = self
            .composite_mut(slot)
            .ok_or(ParamError::NoStage(slot))?;
        let config = stage.get_mut(type_key).ok_or_else(unknown)?;
        let schema = catalog.composite(type_key).ok_or_else(unknown)?;
        Ok((schema, StageTarget::Composite(config)))
    }

    /// Apply one control interaction.
    ///
    /// Only the addressed field changes (plus the noise intensity when the
    /// noise kind switches). A rejected update changes nothing.
    ///
    /// # Errors
    ///
    /// [`ParamError::NoStage`] when the slot is not part of the pipeline or
    /// the optional stage is empty, [`ParamError::UnknownType`] when the
    /// type is not in the stage, and any error from [`StageConfig::set`].
    pub fn apply(&mut self, catalog: &Catalog, update: &ParamUpdate) -> Result<ParamValue, ParamError> {
        let (schema, target) = self.target(catalog, update.stage, &update.type_key)?;
        match target {
            StageTarget::Composite(config) => config.set(schema, &update.param_key, &update.value),
            StageTarget::Optional(params) => {
                let mut config = StageConfig {
                    enabled: true,
                    params: std::mem::take(params),
                };
                let result = config.set(schema, &update.param_key, &update.value);
                *params = config.params;
                result
            }
        }
    }

    /// Toggle one composite sub-type.
    ///
    /// # Errors
    ///
    /// [`ParamError::NoStage`] or [`ParamError::UnknownType`].
    pub fn set_enabled(
        &mut self,
        slot: StageSlot,
        type_key: &str,
        enabled: bool,
    ) -> Result<(), ParamError> {
        let config = self
            .composite_mut(slot)
            .ok_or(ParamError::NoStage(slot))?
            .get_mut(type_key)
            .ok_or_else(|| ParamError::UnknownType(type_key.to_owned()))?;
        config.enabled = enabled;
        tracing::debug!(stage = %slot, type_key, enabled, "composite entry toggled");
        Ok(())
    }

    /// Restore one composite sub-type's parameters to their defaults.
    ///
    /// # Errors
    ///
    /// [`ParamError::NoStage`] or [`ParamError::UnknownType`].
    pub fn reset_entry(
        &mut self,
        catalog: &Catalog,
        slot: StageSlot,
        type_key: &str,
    ) -> Result<(), ParamError> {
        let (schema, target) = self.target(catalog, slot, type_key)?;
        match target {
            StageTarget::Composite(config) => config.reset(schema),
            StageTarget::Optional(params) => *params = schema.defaults(),
        }
        Ok(())
    }

    /// Choose the optional stage's type, or clear it with `None`.
    ///
    /// A new selection always starts from exactly that type's defaults.
    ///
    /// # Errors
    ///
    /// [`ValidationError::OptionalTypeUnavailable`] when the type is not
    /// offered for `kind`; the previous selection is kept.
    pub fn select_optional(
        &mut self,
        catalog: &Catalog,
        kind: MediaKind,
        type_key: Option<&str>,
    ) -> Result<(), ValidationError> {
        let Some(type_key) = type_key else {
            self.third = None;
            return Ok(());
        };
        let schema = catalog.optional(kind, type_key).ok_or_else(|| {
            ValidationError::OptionalTypeUnavailable {
                type_key: type_key.to_owned(),
                kind,
            }
        })?;
        self.third = Some(OptionalStage {
            type_key: schema.id.clone(),
            params: schema.defaults(),
        });
        tracing::debug!(type_key, "optional stage selected");
        Ok(())
    }

    /// Check whether the pipeline may be submitted for `media`.
    ///
    /// # Errors
    ///
    /// In order of precedence: the standing
    /// [`ConfigurationError::MissingCatalogEntries`],
    /// [`ValidationError::NoMedia`],
    /// [`ValidationError::RequiredStageDisabled`] for the first disabled
    /// composite entry, and [`ValidationError::OptionalTypeUnavailable`].
    pub fn validate(&self, catalog: &Catalog, media: Option<MediaKind>) -> Result<(), SubmitError> {
        if let Some(err) = self.configuration_error() {
            return Err(err.into());
        }
        let kind = media.ok_or(ValidationError::NoMedia)?;
        for slot in StageSlot::COMPOSITE {
            let Some(stage) = self.composite(slot) else {
                continue;
            };
            if let Some((type_key, _)) = stage.iter().find(|(_, c)| !c.enabled) {
                let type_name = catalog
                    .composite(type_key)
                    .map_or_else(|| type_key.to_owned(), |s| s.name.clone());
                return Err(ValidationError::RequiredStageDisabled {
                    stage: slot,
                    type_name,
                }
                .into());
            }
        }
        if let Some(third) = &self.third
            && catalog.optional(kind, &third.type_key).is_none()
        {
            return Err(ValidationError::OptionalTypeUnavailable {
                type_key: third.type_key.clone(),
                kind,
            }
            .into());
        }
        Ok(())
    }

    /// Validate and build the `/composite-degradation` request.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate). No request exists unless
    /// validation passes.
    pub fn to_request(
        &self,
        catalog: &Catalog,
        media: Option<&MediaFile>,
    ) -> Result<CompositeRequest, SubmitError> {
        self.validate(catalog, media.map(|m| m.kind))?;
        let media = media.ok_or(ValidationError::NoMedia)?;
        Ok(CompositeRequest {
            media_path: media.file_path.clone(),
            media_type: media.kind,
            first_degradation_config: StagePayload {
                name: COMPOSITE_NAME.to_owned(),
                params: self.first.clone(),
            },
            second_degradation_config: StagePayload {
                name: COMPOSITE_NAME.to_owned(),
                params: self.second.clone(),
            },
            third_degradation_config: self.third.as_ref().map(|t| StagePayload {
                name: t.type_key.clone(),
                params: t.params.clone(),
            }),
        })
    }

    /// Snapshot of every stage for a saved configuration.
    #[must_use]
    pub fn record(&self) -> StagesRecord {
        StagesRecord {
            stage1: self.first.clone(),
            stage2: self.second.clone(),
            stage3: self.third.as_ref().map_or_else(OptionalRecord::default, |t| OptionalRecord {
                type_key: Some(t.type_key.clone()),
                params: t.params.clone(),
            }),
        }
    }

    /// One line per stage describing what gets applied.
    #[must_use]
    pub fn processing_steps(&self, catalog: &Catalog) -> Vec<String> {
        let name_of = |id: &str| catalog.find(id).map_or_else(|| id.to_owned(), |s| s.name.clone());
        let mut steps: Vec<String> = StageSlot::COMPOSITE
            .iter()
            .filter_map(|slot| self.composite(*slot).map(|stage| (slot, stage)))
            .map(|(slot, stage)| {
                let chain: Vec<String> = stage.iter().map(|(id, _)| name_of(id)).collect();
                format!("{slot}：{}", chain.join(" → "))
            })
            .collect();
        steps.push(self.third.as_ref().map_or_else(
            || "未使用第三阶段".to_owned(),
            |t| format!("{}：{}", StageSlot::Third, name_of(&t.type_key)),
        ));
        steps
    }

    /// The JSON record downloaded alongside a processed result.
    #[must_use]
    pub fn saved_configuration(
        &self,
        catalog: &Catalog,
        file_info: FileInfoRecord,
        timestamp: String,
    ) -> SavedConfiguration {
        SavedConfiguration {
            stages: self.record(),
            file_info,
            timestamp,
            processing_steps: self.processing_steps(catalog),
        }
    }
}

enum StageTarget<'a> {
    Composite(&'a mut StageConfig),
    Optional(&'a mut ParamMap),
}
