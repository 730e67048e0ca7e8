//! Panel for one required composite stage.

use std::rc::Rc;

use degrada_core::{Catalog, CompositeStage, ParamUpdate, StageSlot};
use dioxus::prelude::*;

use super::param_controls::{ParamControls, display_name};

/// Props for the [`CompositeStagePanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct CompositeStagePanelProps {
    /// Which composite stage this is.
    slot: StageSlot,
    /// Read-only copy of the stage; the page owns the real one.
    stage: CompositeStage,
    /// Parameter change of one entry.
    on_update: EventHandler<ParamUpdate>,
    /// `(type_key, enabled)` when an entry is toggled.
    on_toggle: EventHandler<(String, bool)>,
    /// `type_key` of an entry to restore to its defaults.
    on_reset: EventHandler<String>,
}

/// The four composite sub-types of a stage, in application order, each
/// with an enable switch, a reset button and its parameters.
///
/// Disabled entries stay visible but dimmed; submission refuses them.
#[component]
pub fn CompositeStagePanel(props: CompositeStagePanelProps) -> Element {
    let catalog = use_context::<Rc<Catalog>>();
    let slot = props.slot;
    let on_update = props.on_update;
    let on_toggle = props.on_toggle;
    let on_reset = props.on_reset;
    let entries: Vec<_> = props
        .stage
        .iter()
        .map(|(key, config)| (key.to_owned(), display_name(&catalog, key), config.clone()))
        .collect();

    rsx! {
        section { class: "space-y-4 p-4 rounded-lg border border-[var(--border)] bg-[var(--surface)]",
            h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "{slot}" }

            for (key, name, config) in entries {
                div {
                    key: "{key}",
                    class: if config.enabled { "space-y-2" } else { "space-y-2 opacity-50" },
                    {
                        let toggle_key = key.clone();
                        let reset_key = key.clone();
                        render_entry_header(
                            &format!("{}-{key}-enabled", slot.id()),
                            &name,
                            config.enabled,
                            move |enabled| on_toggle.call((toggle_key.clone(), enabled)),
                            move || on_reset.call(reset_key.clone()),
                        )
                    }
                    ParamControls {
                        slot,
                        type_key: key.clone(),
                        stage: config.clone(),
                        on_update: move |update| on_update.call(update),
                    }
                }
            }
        }
    }
}

/// Entry name with an enable checkbox and a reset button.
fn render_entry_header(
    id: &str,
    name: &str,
    enabled: bool,
    on_toggle: impl Fn(bool) + 'static,
    on_reset: impl Fn() + 'static,
) -> Element {
    let id = id.to_string();
    let name = name.to_string();

    rsx! {
        div { class: "flex items-center justify-between",
            label { r#for: "{id}",
                class: "flex items-center gap-2 text-sm text-[var(--text-heading)] font-medium",
                input {
                    r#type: "checkbox",
                    id: "{id}",
                    checked: enabled,
                    class: "w-4 h-4 accent-[var(--btn-primary)]",
                    onchange: move |e| on_toggle(e.checked()),
                }
                "{name}"
            }
            button {
                class: "text-xs text-[var(--text-secondary)] hover:text-[var(--text-heading)] cursor-pointer",
                onclick: move |_| on_reset(),
                "重置"
            }
        }
    }
}
