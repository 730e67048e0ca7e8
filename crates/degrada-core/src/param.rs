//! Declarative parameter specifications and the values they admit.
//!
//! A [`ParamSpec`] is either numeric (`int` / `float`, a bounded range
//! with a step) or enumerated (`select`, an ordered option list). The
//! serialized form is tagged by `type`, which is also how catalog JSON
//! files declare parameters:
//!
//! ```json
//! { "type": "int", "key": "kernel_size", "min": 1, "max": 51, "step": 2, "default": 15 }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Current parameter values of one degradation type, keyed by parameter key.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// One tunable value of a degradation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamSpec {
    /// Integral range; every bound, the step and the default are whole.
    Int(NumericSpec),
    /// Real-valued range.
    Float(NumericSpec),
    /// Single choice from an ordered option list.
    Select(SelectSpec),
}

/// Bounds, granularity and default of a numeric parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSpec {
    /// Parameter key, unique within its schema.
    pub key: String,
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
    /// Control granularity.
    pub step: f64,
    /// Initial value.
    pub default: f64,
    /// Display unit appended to formatted values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Label shown next to the control.
    #[serde(default)]
    pub description: String,
}

/// Options and default of an enumerated parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectSpec {
    /// Parameter key, unique within its schema.
    pub key: String,
    /// Options in display order.
    pub options: Vec<SelectOption>,
    /// Value of the initially selected option.
    pub default: String,
    /// Label shown next to the control.
    #[serde(default)]
    pub description: String,
}

/// One entry of a [`SelectSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Stored (and submitted) value.
    pub value: String,
    /// Displayed text.
    pub label: String,
}

/// A parameter value as stored in a stage and sent to the backend.
///
/// Serialized untagged: integers as JSON integers, floats as JSON
/// numbers, select values as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Value of an `int` parameter.
    Int(i64),
    /// Value of a `float` parameter.
    Float(f64),
    /// Value of a `select` parameter.
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value, `None` for text.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Text view of the value, `None` for numbers.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Int(_) | Self::Float(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl NumericSpec {
    /// Clamp `value` into `[min, max]`.
    ///
    /// Written with `max`/`min` rather than `f64::clamp` so a malformed
    /// range degrades instead of panicking.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    fn check(&self, integral: bool, problems: &mut Vec<String>) {
        let key = &self.key;
        let fields = [self.min, self.max, self.step, self.default];
        if fields.iter().any(|v| !v.is_finite()) {
            problems.push(format!("{key}: bounds, step and default must be finite"));
            return;
        }
        if self.min > self.max {
            problems.push(format!("{key}: min {} exceeds max {}", self.min, self.max));
        }
        if self.default < self.min || self.default > self.max {
            problems.push(format!(
                "{key}: default {} outside [{}, {}]",
                self.default, self.min, self.max
            ));
        }
        if self.step <= 0.0 {
            problems.push(format!("{key}: step must be positive"));
        }
        if integral && fields.iter().any(|v| v.fract() != 0.0) {
            problems.push(format!("{key}: int parameter has fractional bounds, step or default"));
        }
    }
}

impl SelectSpec {
    /// Whether `value` is one of the options.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    fn check(&self, problems: &mut Vec<String>) {
        let key = &self.key;
        if self.options.is_empty() {
            problems.push(format!("{key}: select has no options"));
            return;
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|o| o.value == option.value) {
                problems.push(format!("{key}: duplicate option {:?}", option.value));
            }
        }
        if !self.contains(&self.default) {
            problems.push(format!("{key}: default {:?} is not an option", self.default));
        }
    }
}

impl ParamSpec {
    /// Parameter key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Int(n) | Self::Float(n) => &n.key,
            Self::Select(s) => &s.key,
        }
    }

    /// Label shown next to the control.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Int(n) | Self::Float(n) => &n.description,
            Self::Select(s) => &s.description,
        }
    }

    /// The numeric part of the spec, `None` for selects.
    #[must_use]
    pub const fn numeric(&self) -> Option<&NumericSpec> {
        match self {
            Self::Int(n) | Self::Float(n) => Some(n),
            Self::Select(_) => None,
        }
    }

    /// The value a freshly initialized stage holds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn default_value(&self) -> ParamValue {
        match self {
            Self::Int(n) => ParamValue::Int(n.default.round() as i64),
            Self::Float(n) => ParamValue::Float(n.default),
            Self::Select(s) => ParamValue::Text(s.default.clone()),
        }
    }

    /// Turn raw control input into a stored value.
    ///
    /// Numbers are parsed, truncated toward zero for `int`, and clamped
    /// into `[min, max]`; out-of-range input is never rejected. Input
    /// that is not a finite number, or a value that is not a listed
    /// option, is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::NotANumber`] or [`ParamError::NotAnOption`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn coerce(&self, raw: &str) -> Result<ParamValue, ParamError> {
        match self {
            Self::Int(n) => {
                let v = parse_number(&n.key, raw)?;
                Ok(ParamValue::Int(n.clamp(v.trunc()) as i64))
            }
            Self::Float(n) => {
                let v = parse_number(&n.key, raw)?;
                Ok(ParamValue::Float(n.clamp(v)))
            }
            Self::Select(s) => {
                if s.contains(raw) {
                    Ok(ParamValue::Text(raw.to_owned()))
                } else {
                    Err(ParamError::NotAnOption {
                        param_key: s.key.clone(),
                        value: raw.to_owned(),
                    })
                }
            }
        }
    }

    /// Bring an already stored value back into this spec's range.
    ///
    /// Used when the effective range of a parameter changes underneath
    /// its value. Fractions are truncated for `int`, the same as
    /// [`coerce`](Self::coerce). Returns `None` when the value has the
    /// wrong shape.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn reclamp(&self, value: &ParamValue) -> Option<ParamValue> {
        match (self, value) {
            (Self::Int(n), v) => v.as_f64().map(|x| ParamValue::Int(n.clamp(x.trunc()) as i64)),
            (Self::Float(n), v) => v.as_f64().map(|x| ParamValue::Float(n.clamp(x))),
            (Self::Select(s), ParamValue::Text(t)) if s.contains(t) => Some(value.clone()),
            (Self::Select(_), _) => None,
        }
    }

    /// Whether `value` satisfies the range or membership constraint.
    #[cfg(test)]
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn accepts(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Self::Int(n), ParamValue::Int(v)) => (n.min..=n.max).contains(&(*v as f64)),
            (Self::Float(n), ParamValue::Float(v)) => (n.min..=n.max).contains(v),
            (Self::Float(n), ParamValue::Int(v)) => (n.min..=n.max).contains(&(*v as f64)),
            (Self::Select(s), ParamValue::Text(t)) => s.contains(t),
            _ => false,
        }
    }

    /// Append every invariant violation of this spec to `problems`.
    pub(crate) fn check(&self, problems: &mut Vec<String>) {
        match self {
            Self::Int(n) => n.check(true, problems),
            Self::Float(n) => n.check(false, problems),
            Self::Select(s) => s.check(problems),
        }
    }
}

fn parse_number(key: &str, raw: &str) -> Result<f64, ParamError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParamError::NotANumber {
            param_key: key.to_owned(),
            raw: raw.to_owned(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn kernel_size() -> ParamSpec {
        ParamSpec::Int(NumericSpec {
            key: "kernel_size".into(),
            min: 1.0,
            max: 51.0,
            step: 2.0,
            default: 15.0,
            unit: Some("px".into()),
            description: "模糊核大小".into(),
        })
    }

    fn sigma() -> ParamSpec {
        ParamSpec::Float(NumericSpec {
            key: "sigma".into(),
            min: 0.1,
            max: 10.0,
            step: 0.1,
            default: 2.0,
            unit: None,
            description: "标准差".into(),
        })
    }

    fn interpolation() -> ParamSpec {
        ParamSpec::Select(SelectSpec {
            key: "interpolation".into(),
            options: vec![
                SelectOption {
                    value: "nearest".into(),
                    label: "最近邻插值".into(),
                },
                SelectOption {
                    value: "bilinear".into(),
                    label: "双线性插值".into(),
                },
            ],
            default: "bilinear".into(),
            description: "插值方法".into(),
        })
    }

    #[test]
    fn int_clamps_above_and_below() {
        let spec = kernel_size();
        assert_eq!(spec.coerce("52").unwrap(), ParamValue::Int(51));
        assert_eq!(spec.coerce("0").unwrap(), ParamValue::Int(1));
        assert_eq!(spec.coerce("-400").unwrap(), ParamValue::Int(1));
    }

    #[test]
    fn int_truncates_fractional_input() {
        assert_eq!(kernel_size().coerce("15.9").unwrap(), ParamValue::Int(15));
        assert_eq!(kernel_size().coerce(" 21 ").unwrap(), ParamValue::Int(21));
    }

    #[test]
    fn float_clamps() {
        let spec = sigma();
        assert_eq!(spec.coerce("99").unwrap(), ParamValue::Float(10.0));
        assert_eq!(spec.coerce("0").unwrap(), ParamValue::Float(0.1));
        assert_eq!(spec.coerce("3.3").unwrap(), ParamValue::Float(3.3));
    }

    #[test]
    fn non_numbers_are_rejected() {
        for raw in ["", "abc", "NaN", "inf"] {
            assert!(
                matches!(sigma().coerce(raw), Err(ParamError::NotANumber { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn select_accepts_only_listed_values() {
        let spec = interpolation();
        assert_eq!(
            spec.coerce("nearest").unwrap(),
            ParamValue::Text("nearest".into())
        );
        assert!(matches!(
            spec.coerce("bicubic"),
            Err(ParamError::NotAnOption { .. })
        ));
    }

    #[test]
    fn defaults_follow_the_spec_type() {
        assert_eq!(kernel_size().default_value(), ParamValue::Int(15));
        assert_eq!(sigma().default_value(), ParamValue::Float(2.0));
        assert_eq!(
            interpolation().default_value(),
            ParamValue::Text("bilinear".into())
        );
    }

    #[test]
    fn accepts_checks_shape_and_range() {
        assert!(kernel_size().accepts(&ParamValue::Int(51)));
        assert!(!kernel_size().accepts(&ParamValue::Int(52)));
        assert!(!kernel_size().accepts(&ParamValue::Float(3.0)));
        assert!(sigma().accepts(&ParamValue::Float(0.1)));
        assert!(!interpolation().accepts(&ParamValue::Text("lanczos".into())));
    }

    #[test]
    fn reclamp_pulls_values_into_a_narrower_range() {
        let mut spec = sigma();
        if let ParamSpec::Float(n) = &mut spec {
            n.max = 5.0;
        }
        assert_eq!(
            spec.reclamp(&ParamValue::Float(7.5)),
            Some(ParamValue::Float(5.0))
        );
        assert_eq!(spec.reclamp(&ParamValue::Text("x".into())), None);
    }

    #[test]
    fn int_reclamp_truncates_like_coerce() {
        let spec = kernel_size();
        for raw in ["15.9", "-0.5", "50.99"] {
            let typed: f64 = raw.parse().unwrap();
            assert_eq!(
                spec.reclamp(&ParamValue::Float(typed)),
                Some(spec.coerce(raw).unwrap()),
                "{raw}"
            );
        }
        assert_eq!(
            spec.reclamp(&ParamValue::Float(15.9)),
            Some(ParamValue::Int(15))
        );
    }

    #[test]
    fn check_reports_violated_invariants() {
        let spec = ParamSpec::Int(NumericSpec {
            key: "k".into(),
            min: 5.0,
            max: 1.0,
            step: 0.0,
            default: 2.5,
            unit: None,
            description: String::new(),
        });
        let mut problems = Vec::new();
        spec.check(&mut problems);
        assert_eq!(problems.len(), 4, "{problems:?}");
    }

    #[test]
    fn check_rejects_duplicate_options_and_foreign_default() {
        let spec = ParamSpec::Select(SelectSpec {
            key: "codec".into(),
            options: vec![
                SelectOption {
                    value: "jpeg".into(),
                    label: "JPEG".into(),
                },
                SelectOption {
                    value: "jpeg".into(),
                    label: "JPEG again".into(),
                },
            ],
            default: "h264".into(),
            description: String::new(),
        });
        let mut problems = Vec::new();
        spec.check(&mut problems);
        assert_eq!(problems.len(), 2, "{problems:?}");
    }

    #[test]
    fn spec_json_is_tagged_by_type() {
        let json = r#"{"type":"float","key":"sigma","min":0.1,"max":10,"step":0.1,"default":2}"#;
        let spec: ParamSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.key(), "sigma");
        assert!(matches!(spec, ParamSpec::Float(_)));
        let back = serde_json::to_value(&spec).unwrap();
        assert_eq!(back["type"], "float");
    }

    #[test]
    fn values_serialize_untagged() {
        let mut map = ParamMap::new();
        map.insert("kernel_size".into(), ParamValue::Int(15));
        map.insert("sigma".into(), ParamValue::Float(2.5));
        map.insert("interpolation".into(), ParamValue::Text("bicubic".into()));
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"{"interpolation":"bicubic","kernel_size":15,"sigma":2.5}"#
        );
        let back: ParamMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
