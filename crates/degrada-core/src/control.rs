//! Schema-to-control rendering model.
//!
//! Turns a [`DegradationSchema`] plus the current values of a
//! [`StageConfig`] into a flat list of [`Control`]s that a UI layer can
//! draw without knowing anything about the catalog. Numeric specs become
//! sliders, select specs become drop-downs. The noise type's kind-specific
//! intensity bound and the salt-and-pepper-only parameters are already
//! applied.
//!
//! The reverse direction, raw input back into state, goes through
//! [`change`], which yields at most one [`ParamUpdate`].

use crate::catalog::Catalog;
use crate::error::{ConfigurationError, ParamError};
use crate::noise::{self, NOISE_TYPE_ID, NoiseKind};
use crate::param::{NumericSpec, ParamSpec, SelectOption};
use crate::schema::DegradationSchema;
use crate::stage::{ParamUpdate, StageConfig, StageSlot};

/// One drawable control.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    /// Parameter key.
    pub key: String,
    /// Label text.
    pub label: String,
    /// Widget and its current state.
    pub widget: Widget,
}

/// The widget a control is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Range slider for `int` / `float` parameters.
    Slider(SliderControl),
    /// Single-choice drop-down for `select` parameters.
    Select(SelectControl),
}

/// State of a range slider.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderControl {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Granularity.
    pub step: f64,
    /// Current value.
    pub value: f64,
    /// Formatted current value, unit included.
    pub display: String,
    /// Formatted lower bound, unit included.
    pub min_label: String,
    /// Formatted upper bound, unit included.
    pub max_label: String,
}

/// State of a drop-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectControl {
    /// Options in schema order.
    pub options: Vec<SelectOption>,
    /// Value of the selected option.
    pub selected: String,
}

/// Format a numeric value for display.
///
/// Whole steps display as integers (truncated), fractional steps with two
/// decimals. The unit is appended directly.
#[must_use]
pub fn format_value(value: f64, step: f64, unit: Option<&str>) -> String {
    let number = if step.fract() == 0.0 {
        format!("{}", value.trunc())
    } else {
        format!("{value:.2}")
    };
    format!("{number}{}", unit.unwrap_or_default())
}

/// Controls for every visible parameter of `schema`, in schema order.
#[must_use]
pub fn render(schema: &DegradationSchema, stage: &StageConfig) -> Vec<Control> {
    let kind = (schema.id == NOISE_TYPE_ID).then(|| NoiseKind::active(&stage.params));
    schema
        .params
        .iter()
        .filter(|spec| kind.is_none_or(|k| !noise::is_hidden(k, spec.key())))
        .map(|spec| {
            let effective = kind.map_or_else(|| spec.clone(), |k| noise::overlay(k, spec));
            control(&effective, stage)
        })
        .collect()
}

/// Like [`render`] but looks the schema up by id first.
///
/// # Errors
///
/// Returns [`ConfigurationError::UnknownType`] so the UI can show a
/// visible configuration error instead of an empty panel.
pub fn render_by_id(
    catalog: &Catalog,
    type_key: &str,
    stage: &StageConfig,
) -> Result<Vec<Control>, ConfigurationError> {
    Ok(render(catalog.require(type_key)?, stage))
}

fn control(spec: &ParamSpec, stage: &StageConfig) -> Control {
    let current = stage.params.get(spec.key());
    let widget = match spec {
        ParamSpec::Int(n) | ParamSpec::Float(n) => {
            let value = current
                .and_then(crate::ParamValue::as_f64)
                .map_or(n.default, |v| n.clamp(v));
            Widget::Slider(slider(n, value))
        }
        ParamSpec::Select(s) => Widget::Select(SelectControl {
            options: s.options.clone(),
            selected: current
                .and_then(|v| v.as_str())
                .filter(|v| s.contains(v))
                .unwrap_or(&s.default)
                .to_owned(),
        }),
    };
    Control {
        key: spec.key().to_owned(),
        label: spec.description().to_owned(),
        widget,
    }
}

fn slider(spec: &NumericSpec, value: f64) -> SliderControl {
    let unit = spec.unit.as_deref();
    SliderControl {
        min: spec.min,
        max: spec.max,
        step: spec.step,
        value,
        display: format_value(value, spec.step, unit),
        min_label: format_value(spec.min, spec.step, unit),
        max_label: format_value(spec.max, spec.step, unit),
    }
}

/// Translate one raw control interaction into an update.
///
/// The raw input is parsed and clamped against the effective spec. The
/// state itself is not touched; the owner applies the returned update.
///
/// # Errors
///
/// Any [`ParamError`] from coercion; the interaction is then a no-op.
pub fn change(
    slot: StageSlot,
    schema: &DegradationSchema,
    stage: &StageConfig,
    key: &str,
    raw: &str,
) -> Result<ParamUpdate, ParamError> {
    let value = stage.coerce(schema, key, raw).inspect_err(|e| {
        tracing::warn!(stage = %slot, type_key = %schema.id, "rejected input: {e}");
    })?;
    Ok(ParamUpdate {
        stage: slot,
        type_key: schema.id.clone(),
        param_key: key.to_owned(),
        value,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::param::ParamValue;

    fn slider_of<'a>(controls: &'a [Control], key: &str) -> &'a SliderControl {
        match &controls.iter().find(|c| c.key == key).unwrap().widget {
            Widget::Slider(s) => s,
            Widget::Select(_) => panic!("{key} is not a slider"),
        }
    }

    #[test]
    fn formats_by_step() {
        assert_eq!(format_value(15.0, 2.0, Some("px")), "15px");
        assert_eq!(format_value(15.9, 1.0, None), "15");
        assert_eq!(format_value(2.0, 0.1, None), "2.00");
        assert_eq!(format_value(0.05, 0.01, Some("%")), "0.05%");
    }

    #[test]
    fn blur_renders_sliders_with_units() {
        let catalog = Catalog::builtin().unwrap();
        let blur = catalog.composite("blur").unwrap();
        let controls = render(blur, &StageConfig::defaults(blur));
        assert_eq!(controls.len(), 2);
        let kernel = slider_of(&controls, "kernel_size");
        assert_eq!(kernel.display, "15px");
        assert_eq!(kernel.min_label, "1px");
        assert_eq!(kernel.max_label, "51px");
    }

    #[test]
    fn select_lists_options_in_order() {
        let catalog = Catalog::builtin().unwrap();
        let resample = catalog.composite("resample").unwrap();
        let controls = render(resample, &StageConfig::defaults(resample));
        let Widget::Select(select) = &controls[1].widget else {
            panic!("interpolation should be a select");
        };
        let values: Vec<&str> = select.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["nearest", "bilinear", "bicubic"]);
        assert_eq!(select.selected, "bilinear");
    }

    #[test]
    fn noise_controls_follow_kind() {
        let catalog = Catalog::builtin().unwrap();
        let schema = catalog.composite("noise").unwrap();
        let mut stage = StageConfig::defaults(schema);

        let gaussian = render(schema, &stage);
        assert!(gaussian.iter().all(|c| c.key != "density"));
        assert_eq!(slider_of(&gaussian, "intensity").max_label, "30.00");

        stage
            .set(schema, "noise_type", &ParamValue::Text("salt_pepper".into()))
            .unwrap();
        let salt = render(schema, &stage);
        assert!(salt.iter().any(|c| c.key == "density"));
        assert!(salt.iter().any(|c| c.key == "salt_ratio"));
        let intensity = slider_of(&salt, "intensity");
        assert!((intensity.max - 20.0).abs() < f64::EPSILON);
        assert_eq!(intensity.max_label, "20.00%");
        assert_eq!(
            salt.iter().find(|c| c.key == "intensity").unwrap().label,
            "噪声占比"
        );
    }

    #[test]
    fn unknown_type_is_a_configuration_error() {
        let catalog = Catalog::builtin().unwrap();
        let stage = StageConfig {
            enabled: true,
            params: crate::ParamMap::new(),
        };
        assert_eq!(
            render_by_id(&catalog, "sepia", &stage),
            Err(ConfigurationError::UnknownType("sepia".into()))
        );
    }

    #[test]
    fn lookup_by_id_renders_the_catalog_schema() {
        let catalog = Catalog::builtin().unwrap();
        let blur = catalog.composite("blur").unwrap();
        let stage = StageConfig::defaults(blur);
        assert_eq!(
            render_by_id(&catalog, "blur", &stage).unwrap(),
            render(blur, &stage)
        );
    }

    #[test]
    fn change_yields_one_clamped_update() {
        let catalog = Catalog::builtin().unwrap();
        let blur = catalog.composite("blur").unwrap();
        let stage = StageConfig::defaults(blur);
        let update = change(StageSlot::First, blur, &stage, "kernel_size", "0").unwrap();
        assert_eq!(
            update,
            ParamUpdate {
                stage: StageSlot::First,
                type_key: "blur".into(),
                param_key: "kernel_size".into(),
                value: ParamValue::Int(1),
            }
        );
    }

    #[test]
    fn change_rejects_garbage() {
        let catalog = Catalog::builtin().unwrap();
        let blur = catalog.composite("blur").unwrap();
        let stage = StageConfig::defaults(blur);
        assert!(change(StageSlot::First, blur, &stage, "sigma", "lots").is_err());
    }
}
