//! Panel for the optional third stage.

use std::rc::Rc;

use degrada_core::pipeline::OptionalStage;
use degrada_core::{Catalog, MediaKind, ParamUpdate, StageConfig, StageSlot};
use dioxus::prelude::*;

use super::param_controls::ParamControls;

/// Select value meaning "no third stage".
const NONE_VALUE: &str = "";

/// Props for the [`OptionalStagePanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct OptionalStagePanelProps {
    /// Kind of the uploaded file; `None` before an upload.
    kind: Option<MediaKind>,
    /// Current selection and its parameters.
    stage: Option<OptionalStage>,
    /// Type chosen in the selector, `None` for "not used".
    on_select: EventHandler<Option<String>>,
    /// Parameter change of the selected type.
    on_update: EventHandler<ParamUpdate>,
}

/// Type selector for the optional stage plus the chosen type's controls.
///
/// The offered types depend on the media kind, so the selector stays
/// disabled until a file is uploaded.
#[component]
pub fn OptionalStagePanel(props: OptionalStagePanelProps) -> Element {
    let catalog = use_context::<Rc<Catalog>>();
    let on_select = props.on_select;
    let on_update = props.on_update;
    let options: Vec<(String, String)> = props
        .kind
        .map(|kind| {
            catalog
                .optional_types(kind)
                .iter()
                .map(|s| (s.id.clone(), s.name.clone()))
                .collect()
        })
        .unwrap_or_default();
    let selected = props
        .stage
        .as_ref()
        .map_or_else(|| NONE_VALUE.to_owned(), |s| s.type_key.clone());
    let hint = props
        .kind
        .map_or("上传文件后可选择", |kind| kind.label());

    rsx! {
        section { class: "space-y-4 p-4 rounded-lg border border-[var(--border)] bg-[var(--surface)]",
            div { class: "flex items-center justify-between",
                h3 { class: "text-lg font-semibold text-[var(--text-heading)]",
                    "{StageSlot::Third}（可选）"
                }
                span { class: "text-xs text-[var(--text-secondary)]", "{hint}" }
            }

            select {
                id: "stage3-type",
                class: "w-full px-2 py-1 rounded border border-[var(--border)] bg-[var(--surface)]
                        text-[var(--text)] text-sm",
                disabled: props.kind.is_none(),
                value: "{selected}",
                onchange: move |e| {
                    let value = e.value();
                    on_select.call((value != NONE_VALUE).then_some(value));
                },
                option { value: NONE_VALUE, selected: selected == NONE_VALUE, "不使用" }
                for (id, name) in options.iter() {
                    option { value: "{id}", selected: *id == selected, "{name}" }
                }
            }

            if let Some(stage) = props.stage.clone() {
                ParamControls {
                    slot: StageSlot::Third,
                    type_key: stage.type_key,
                    stage: StageConfig { enabled: true, params: stage.params },
                    on_update: move |update| on_update.call(update),
                }
            }
        }
    }
}
