//! Per-degradation-type schemas.

use serde::{Deserialize, Serialize};

use crate::param::{ParamMap, ParamSpec};

/// The declarative description of one degradation type.
///
/// Read-only once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationSchema {
    /// Unique key, e.g. `"blur"`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Human-readable description of the technique. Informational only.
    #[serde(default)]
    pub method: String,
    /// Parameters in display order.
    pub params: Vec<ParamSpec>,
}

impl DegradationSchema {
    /// Look up a parameter by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.key() == key)
    }

    /// Every parameter at its default value.
    #[must_use]
    pub fn defaults(&self) -> ParamMap {
        self.params
            .iter()
            .map(|p| (p.key().to_owned(), p.default_value()))
            .collect()
    }

    /// Append every invariant violation to `problems`, prefixed with the
    /// schema id.
    pub(crate) fn check(&self, problems: &mut Vec<String>) {
        if self.id.is_empty() {
            problems.push(format!("schema {:?} has an empty id", self.name));
        }
        let mut own = Vec::new();
        for (i, spec) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|p| p.key() == spec.key()) {
                own.push(format!("duplicate parameter {}", spec.key()));
            }
            spec.check(&mut own);
        }
        problems.extend(own.into_iter().map(|p| format!("{}: {p}", self.id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{NumericSpec, ParamValue};

    fn blur() -> DegradationSchema {
        DegradationSchema {
            id: "blur".into(),
            name: "模糊".into(),
            method: "高斯模糊".into(),
            params: vec![
                ParamSpec::Int(NumericSpec {
                    key: "kernel_size".into(),
                    min: 1.0,
                    max: 51.0,
                    step: 2.0,
                    default: 15.0,
                    unit: Some("px".into()),
                    description: String::new(),
                }),
                ParamSpec::Float(NumericSpec {
                    key: "sigma".into(),
                    min: 0.1,
                    max: 10.0,
                    step: 0.1,
                    default: 2.0,
                    unit: None,
                    description: String::new(),
                }),
            ],
        }
    }

    #[test]
    fn defaults_cover_every_param() {
        let defaults = blur().defaults();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults["kernel_size"], ParamValue::Int(15));
        assert_eq!(defaults["sigma"], ParamValue::Float(2.0));
    }

    #[test]
    fn check_flags_duplicate_keys() {
        let mut schema = blur();
        schema.params.push(schema.params[0].clone());
        let mut problems = Vec::new();
        schema.check(&mut problems);
        assert_eq!(problems, vec!["blur: duplicate parameter kernel_size"]);
    }
}
