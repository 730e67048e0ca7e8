//! Noise kinds and the intensity table they select.
//!
//! The `noise` schema declares a generic `intensity` range. What that
//! number means, and how far it may go, depends on the selected noise
//! kind. The catalog cannot express this, so the table lives here as an
//! exhaustive match and is overlaid onto the schema when controls are
//! rendered and values coerced.

use std::fmt;

use crate::param::{NumericSpec, ParamMap, ParamSpec};

/// Id of the noise degradation type.
pub const NOISE_TYPE_ID: &str = "noise";
/// Key of the select choosing the noise kind.
pub const NOISE_KIND_KEY: &str = "noise_type";
/// Key of the kind-dependent strength parameter.
pub const INTENSITY_KEY: &str = "intensity";
/// Parameters that only apply to salt-and-pepper noise.
pub const AUXILIARY_KEYS: [&str; 2] = ["density", "salt_ratio"];

/// Statistical model of the injected noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoiseKind {
    /// Additive zero-mean Gaussian noise.
    #[default]
    Gaussian,
    /// Signal-dependent shot noise.
    Poisson,
    /// Random saturated white and black pixels.
    SaltPepper,
}

/// How the `intensity` parameter reads for one noise kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityProfile {
    /// Control label.
    pub label: &'static str,
    /// Upper bound replacing the schema's `max`.
    pub max: f64,
    /// Display unit; empty for none.
    pub unit: &'static str,
}

impl NoiseKind {
    /// Every kind, in catalog option order.
    pub const ALL: [Self; 3] = [Self::Gaussian, Self::SaltPepper, Self::Poisson];

    /// Parse the stored select value.
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "gaussian" => Some(Self::Gaussian),
            "poisson" => Some(Self::Poisson),
            "salt_pepper" => Some(Self::SaltPepper),
            _ => None,
        }
    }

    /// Stored select value.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Poisson => "poisson",
            Self::SaltPepper => "salt_pepper",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gaussian => "高斯噪声",
            Self::Poisson => "泊松噪声",
            Self::SaltPepper => "椒盐噪声",
        }
    }

    /// The intensity label, bound and unit for this kind.
    #[must_use]
    pub const fn intensity(self) -> IntensityProfile {
        match self {
            Self::Gaussian => IntensityProfile {
                label: "标准差（σ）",
                max: 30.0,
                unit: "",
            },
            Self::Poisson => IntensityProfile {
                label: "缩放因子",
                max: 30.0,
                unit: "",
            },
            Self::SaltPepper => IntensityProfile {
                label: "噪声占比",
                max: 20.0,
                unit: "%",
            },
        }
    }

    /// Whether the salt-and-pepper auxiliary parameters apply.
    #[must_use]
    pub const fn uses_auxiliary(self) -> bool {
        matches!(self, Self::SaltPepper)
    }

    /// The kind selected in a noise stage's params.
    ///
    /// Falls back to the default kind when the select is missing or holds
    /// an unknown value.
    #[must_use]
    pub fn active(params: &ParamMap) -> Self {
        params
            .get(NOISE_KIND_KEY)
            .and_then(|v| v.as_str())
            .and_then(Self::from_value)
            .unwrap_or_default()
    }
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether `key` is a noise parameter hidden for `kind`.
#[must_use]
pub fn is_hidden(kind: NoiseKind, key: &str) -> bool {
    !kind.uses_auxiliary() && AUXILIARY_KEYS.contains(&key)
}

/// The schema's `intensity` spec with the kind's bound, label and unit
/// applied. Other specs are returned unchanged.
#[must_use]
pub fn overlay(kind: NoiseKind, spec: &ParamSpec) -> ParamSpec {
    match spec {
        ParamSpec::Float(n) if n.key == INTENSITY_KEY => ParamSpec::Float(overlay_numeric(kind, n)),
        ParamSpec::Int(n) if n.key == INTENSITY_KEY => ParamSpec::Int(overlay_numeric(kind, n)),
        other => other.clone(),
    }
}

fn overlay_numeric(kind: NoiseKind, spec: &NumericSpec) -> NumericSpec {
    let profile = kind.intensity();
    let max = profile.max.max(spec.min);
    NumericSpec {
        max,
        default: spec.default.min(max),
        unit: (!profile.unit.is_empty()).then(|| profile.unit.to_owned()),
        description: profile.label.to_owned(),
        ..spec.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::param::ParamValue;

    fn intensity() -> ParamSpec {
        ParamSpec::Float(NumericSpec {
            key: INTENSITY_KEY.into(),
            min: 0.01,
            max: 30.0,
            step: 0.1,
            default: 5.0,
            unit: None,
            description: "噪声强度".into(),
        })
    }

    #[test]
    fn values_round_trip() {
        for kind in NoiseKind::ALL {
            assert_eq!(NoiseKind::from_value(kind.value()), Some(kind));
        }
        assert_eq!(NoiseKind::from_value("speckle"), None);
    }

    #[test]
    fn salt_pepper_has_percent_scale() {
        let profile = NoiseKind::SaltPepper.intensity();
        assert!((profile.max - 20.0).abs() < f64::EPSILON);
        assert_eq!(profile.unit, "%");
        assert_eq!(NoiseKind::Gaussian.intensity().label, "标准差（σ）");
    }

    #[test]
    fn auxiliary_params_hidden_unless_salt_pepper() {
        assert!(is_hidden(NoiseKind::Gaussian, "density"));
        assert!(is_hidden(NoiseKind::Poisson, "salt_ratio"));
        assert!(!is_hidden(NoiseKind::SaltPepper, "density"));
        assert!(!is_hidden(NoiseKind::Gaussian, "intensity"));
    }

    #[test]
    fn active_kind_defaults_to_gaussian() {
        let mut params = ParamMap::new();
        assert_eq!(NoiseKind::active(&params), NoiseKind::Gaussian);
        params.insert(NOISE_KIND_KEY.into(), ParamValue::Text("salt_pepper".into()));
        assert_eq!(NoiseKind::active(&params), NoiseKind::SaltPepper);
        params.insert(NOISE_KIND_KEY.into(), ParamValue::Text("bogus".into()));
        assert_eq!(NoiseKind::active(&params), NoiseKind::Gaussian);
    }

    #[test]
    fn overlay_narrows_intensity() {
        let spec = overlay(NoiseKind::SaltPepper, &intensity());
        let n = spec.numeric().unwrap();
        assert!((n.max - 20.0).abs() < f64::EPSILON);
        assert_eq!(n.unit.as_deref(), Some("%"));
        assert_eq!(n.description, "噪声占比");
        assert_eq!(
            spec.coerce("25").unwrap(),
            ParamValue::Float(20.0)
        );
    }

    #[test]
    fn overlay_leaves_other_params_alone() {
        let density = ParamSpec::Float(NumericSpec {
            key: "density".into(),
            min: 0.01,
            max: 0.5,
            step: 0.01,
            default: 0.05,
            unit: None,
            description: String::new(),
        });
        assert_eq!(overlay(NoiseKind::SaltPepper, &density), density);
    }
}
