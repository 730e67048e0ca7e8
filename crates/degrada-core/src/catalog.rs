//! The schema catalog.
//!
//! One immutable catalog is loaded at startup and handed to the renderer
//! and the composer explicitly. It has three sections:
//!
//! - **common**: the composite sub-types every required stage applies
//!   (blur, resample, noise, compression);
//! - **image** / **video**: the types the optional third stage may pick
//!   from, depending on the media kind.
//!
//! Type ids are unique across the whole catalog, so a type can also be
//! looked up without knowing its section (the single-type simulator does
//! this).

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::media::MediaKind;
use crate::schema::DegradationSchema;

/// Composite sub-types in application order.
pub const COMPOSITE_TYPES: [&str; 4] = ["blur", "resample", "noise", "compression"];

/// The catalog shipped with the application.
const BUILTIN_JSON: &str = include_str!("../data/catalog.json");

/// Section of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Composite sub-types.
    Common,
    /// Optional-stage types for images.
    Image,
    /// Optional-stage types for videos.
    Video,
}

impl Section {
    /// All sections in catalog order.
    pub const ALL: [Self; 3] = [Self::Common, Self::Image, Self::Video];

    /// The optional-stage section for a media kind.
    #[must_use]
    pub const fn for_media(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => Self::Image,
            MediaKind::Video => Self::Video,
        }
    }

    /// Section name as used in catalog JSON.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// All degradation schemas known to the application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Composite sub-types.
    #[serde(default)]
    pub common: Vec<DegradationSchema>,
    /// Optional-stage types for images.
    #[serde(default)]
    pub image: Vec<DegradationSchema>,
    /// Optional-stage types for videos.
    #[serde(default)]
    pub video: Vec<DegradationSchema>,
}

impl Catalog {
    /// Parse and validate the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the embedded catalog is broken.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_json(BUILTIN_JSON)
    }

    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] for malformed JSON and
    /// [`ConfigurationError::InvalidCatalog`] listing every invariant
    /// violation otherwise.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let catalog: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        catalog.validate()?;
        tracing::debug!(types = catalog.iter().count(), "catalog loaded");
        Ok(catalog)
    }

    /// Check every schema's invariants and the uniqueness of type ids.
    ///
    /// Missing composite entries are *not* an error here: the composer
    /// records them as standing errors (see
    /// [`missing_composite_entries`](Self::missing_composite_entries)).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidCatalog`] with all problems.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut problems = Vec::new();
        let all: Vec<&DegradationSchema> = self.iter().collect();
        for (i, schema) in all.iter().enumerate() {
            if all[..i].iter().any(|s| s.id == schema.id) {
                problems.push(format!("duplicate type id {}", schema.id));
            }
            schema.check(&mut problems);
        }
        if problems.is_empty() {
            Ok(())
        } else {
            tracing::warn!(count = problems.len(), "catalog failed validation");
            Err(ConfigurationError::InvalidCatalog(problems))
        }
    }

    /// Schemas of one section.
    #[must_use]
    pub fn section(&self, section: Section) -> &[DegradationSchema] {
        match section {
            Section::Common => &self.common,
            Section::Image => &self.image,
            Section::Video => &self.video,
        }
    }

    /// Types the optional stage may pick for a media kind.
    #[must_use]
    pub fn optional_types(&self, kind: MediaKind) -> &[DegradationSchema] {
        self.section(Section::for_media(kind))
    }

    /// Composite sub-type by id.
    #[must_use]
    pub fn composite(&self, id: &str) -> Option<&DegradationSchema> {
        self.common.iter().find(|s| s.id == id)
    }

    /// Optional-stage type by id, restricted to the media kind's section.
    #[must_use]
    pub fn optional(&self, kind: MediaKind, id: &str) -> Option<&DegradationSchema> {
        self.optional_types(kind).iter().find(|s| s.id == id)
    }

    /// Any type by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&DegradationSchema> {
        self.iter().find(|s| s.id == id)
    }

    /// Like [`find`](Self::find) but reports a missing type as a
    /// configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownType`].
    pub fn require(&self, id: &str) -> Result<&DegradationSchema, ConfigurationError> {
        self.find(id)
            .ok_or_else(|| ConfigurationError::UnknownType(id.to_owned()))
    }

    /// Every schema, section by section.
    pub fn iter(&self) -> impl Iterator<Item = &DegradationSchema> {
        self.common.iter().chain(&self.image).chain(&self.video)
    }

    /// Composite sub-types from [`COMPOSITE_TYPES`] that have no schema.
    #[must_use]
    pub fn missing_composite_entries(&self) -> Vec<String> {
        COMPOSITE_TYPES
            .iter()
            .filter(|id| self.composite(id).is_none())
            .map(|id| (*id).to_owned())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::param::{ParamSpec, ParamValue};

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.missing_composite_entries().is_empty());
        assert_eq!(catalog.common.len(), 4);
        assert_eq!(catalog.image.len(), 5);
        assert_eq!(catalog.video.len(), 3);
    }

    #[test]
    fn composite_types_are_in_application_order() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<&str> = catalog.common.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, COMPOSITE_TYPES);
    }

    #[test]
    fn blur_kernel_size_matches_documented_range() {
        let catalog = Catalog::builtin().unwrap();
        let Some(ParamSpec::Int(kernel)) = catalog.composite("blur").unwrap().param("kernel_size")
        else {
            panic!("kernel_size should be an int parameter");
        };
        assert!((kernel.min - 1.0).abs() < f64::EPSILON);
        assert!((kernel.max - 51.0).abs() < f64::EPSILON);
        assert!((kernel.step - 2.0).abs() < f64::EPSILON);
        assert!((kernel.default - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn optional_lookup_respects_media_kind() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.optional(MediaKind::Image, "scratch").is_some());
        assert!(catalog.optional(MediaKind::Video, "scratch").is_none());
        assert!(catalog.optional(MediaKind::Video, "flicker").is_some());
        assert!(catalog.find("flicker").is_some());
    }

    #[test]
    fn require_reports_unknown_types() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.require("sepia"),
            Err(ConfigurationError::UnknownType("sepia".into()))
        );
    }

    #[test]
    fn missing_composite_entries_are_listed() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.common.retain(|s| s.id != "noise" && s.id != "blur");
        assert_eq!(catalog.missing_composite_entries(), vec!["blur", "noise"]);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Catalog::from_json("{ not json"),
            Err(ConfigurationError::Parse(_))
        ));
    }

    #[test]
    fn invariant_violations_are_collected() {
        let json = r#"{
            "common": [
                { "id": "blur", "name": "模糊", "params": [
                    { "type": "int", "key": "kernel_size", "min": 1, "max": 51, "step": 2, "default": 99 }
                ]},
                { "id": "blur", "name": "again", "params": [] }
            ]
        }"#;
        let Err(ConfigurationError::InvalidCatalog(problems)) = Catalog::from_json(json) else {
            panic!("expected an invalid catalog");
        };
        assert_eq!(problems.len(), 2, "{problems:?}");
        assert!(problems.iter().any(|p| p.contains("duplicate type id blur")));
        assert!(problems.iter().any(|p| p.contains("default 99")));
    }

    #[test]
    fn every_builtin_default_is_accepted() {
        let catalog = Catalog::builtin().unwrap();
        for schema in catalog.iter() {
            for spec in &schema.params {
                let value: ParamValue = spec.default_value();
                assert!(spec.accepts(&value), "{}.{}", schema.id, spec.key());
            }
        }
    }
}
