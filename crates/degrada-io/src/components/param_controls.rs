//! Schema-driven controls for one degradation type.
//!
//! The control models come from [`degrada_core::control::render_by_id`]; this
//! module only draws them and turns raw input back into a
//! [`ParamUpdate`] through [`degrada_core::control::change`]. Rejected
//! input (non-numeric text, unlisted options) is logged and dropped.

use std::rc::Rc;

use degrada_core::control::{self, Control, SelectControl, SliderControl, Widget};
use degrada_core::{Catalog, ParamUpdate, StageConfig, StageSlot};
use dioxus::prelude::*;

/// Props for the [`ParamControls`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ParamControlsProps {
    /// Stage the parameters belong to.
    slot: StageSlot,
    /// Degradation type id, looked up in the catalog from context.
    type_key: String,
    /// Current values.
    stage: StageConfig,
    /// Fired once per accepted interaction.
    on_update: EventHandler<ParamUpdate>,
}

/// One control per parameter of `type_key`, in schema order.
///
/// An id missing from the catalog renders a configuration error instead
/// of an empty panel.
#[component]
pub fn ParamControls(props: ParamControlsProps) -> Element {
    let catalog = use_context::<Rc<Catalog>>();
    let controls = match control::render_by_id(&catalog, &props.type_key, &props.stage) {
        Ok(controls) => controls,
        Err(e) => {
            return rsx! {
                p { class: "text-sm text-[var(--text-error)]", "配置错误：{e}" }
            };
        }
    };
    let type_key = Rc::new(props.type_key);
    let stage = Rc::new(props.stage);
    let slot = props.slot;
    let on_update = props.on_update;

    rsx! {
        div { class: "flex flex-col gap-3",
            for item in controls {
                {
                    let id = format!("{}-{}-{}", slot.id(), type_key, item.key);
                    let catalog = Rc::clone(&catalog);
                    let type_key = Rc::clone(&type_key);
                    let stage = Rc::clone(&stage);
                    let key = item.key.clone();
                    render_control(&id, item, move |raw: String| {
                        let Some(schema) = catalog.find(&type_key) else {
                            return;
                        };
                        if let Ok(update) = control::change(slot, schema, &stage, &key, &raw) {
                            on_update.call(update);
                        }
                    })
                }
            }
        }
    }
}

fn render_control(id: &str, item: Control, on_change: impl Fn(String) + 'static) -> Element {
    match &item.widget {
        Widget::Slider(slider) => render_slider(id, &item.label, slider, on_change),
        Widget::Select(choice) => render_select(id, &item.label, choice, on_change),
    }
}

/// Render a labeled range slider with its formatted value and bounds.
fn render_slider(
    id: &str,
    label: &str,
    slider: &SliderControl,
    on_input: impl Fn(String) + 'static,
) -> Element {
    let id = id.to_string();
    let label = label.to_string();
    let SliderControl {
        min,
        max,
        step,
        value,
        ..
    } = *slider;
    let display = slider.display.clone();
    let min_label = slider.min_label.clone();
    let max_label = slider.max_label.clone();

    rsx! {
        div { class: "flex flex-col gap-1",
            div { class: "flex justify-between text-sm",
                label { r#for: "{id}",
                    class: "text-[var(--text-heading)] font-medium",
                    "{label}"
                }
                span { class: "text-[var(--text-secondary)] tabular-nums",
                    "{display}"
                }
            }
            input {
                r#type: "range",
                id: "{id}",
                min: "{min}",
                max: "{max}",
                step: "{step}",
                value: "{value}",
                class: "w-full accent-[var(--btn-primary)]",
                oninput: move |e| on_input(e.value()),
            }
            div { class: "flex justify-between text-xs text-[var(--text-secondary)] tabular-nums",
                span { "{min_label}" }
                span { "{max_label}" }
            }
        }
    }
}

/// Render a labeled dropdown; option labels are shown, values are sent.
fn render_select(
    id: &str,
    label: &str,
    choice: &SelectControl,
    on_change: impl Fn(String) + 'static,
) -> Element {
    let id = id.to_string();
    let label = label.to_string();
    let options = choice.options.clone();
    let selected = choice.selected.clone();

    rsx! {
        div { class: "flex flex-col gap-1",
            label { r#for: "{id}",
                class: "text-sm text-[var(--text-heading)] font-medium",
                "{label}"
            }
            select {
                id: "{id}",
                class: "px-2 py-1 rounded border border-[var(--border)] bg-[var(--surface)]
                        text-[var(--text)] text-sm",
                value: "{selected}",
                onchange: move |e| on_change(e.value()),

                for opt in options.iter() {
                    option {
                        value: "{opt.value}",
                        selected: opt.value == selected,
                        "{opt.label}"
                    }
                }
            }
        }
    }
}

/// Name of a schema for headings, falling back to its id.
pub(crate) fn display_name(catalog: &Catalog, type_key: &str) -> String {
    catalog
        .find(type_key)
        .map_or_else(|| type_key.to_owned(), |s| s.name.clone())
}
