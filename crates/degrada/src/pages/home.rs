//! Catalog overview: one card per degradation type.

use std::rc::Rc;

use degrada_core::{Catalog, Section};
use dioxus::prelude::*;

/// Heading shown above each catalog section.
const fn section_title(section: Section) -> &'static str {
    match section {
        Section::Common => "通用退化",
        Section::Image => "图像专属退化",
        Section::Video => "视频专属退化",
    }
}

/// Props for the [`HomePage`] component.
#[derive(Props, Clone, PartialEq)]
pub struct HomePageProps {
    /// Open the simulator for a type id.
    on_open: EventHandler<String>,
    /// Open the compound configurator.
    on_compound: EventHandler<()>,
}

#[component]
pub fn HomePage(props: HomePageProps) -> Element {
    let catalog = use_context::<Rc<Catalog>>();
    let on_open = props.on_open;
    let on_compound = props.on_compound;
    let sections: Vec<_> = Section::ALL
        .into_iter()
        .map(|section| {
            (
                section.name(),
                section_title(section),
                catalog.section(section).to_vec(),
            )
        })
        .collect();

    rsx! {
        div { class: "space-y-8",
            div { class: "p-4 rounded-lg border border-[var(--border-accent)] bg-[var(--surface)] flex items-center justify-between",
                div {
                    h2 { class: "text-lg font-semibold text-[var(--text-heading)]", "复合退化流水线" }
                    p { class: "text-sm text-[var(--text-secondary)]",
                        "两个复合阶段（模糊 → 下采样 → 噪声 → 编码压缩）加一个可选阶段"
                    }
                }
                button {
                    class: "px-4 py-2 rounded bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] text-white font-medium cursor-pointer",
                    onclick: move |_| on_compound.call(()),
                    "开始配置"
                }
            }

            for (name, title, schemas) in sections {
                section { key: "{name}", class: "space-y-3",
                    h2 { class: "text-lg font-semibold text-[var(--text-heading)]", "{title}" }
                    div { class: "grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-4",
                        for schema in schemas {
                            div {
                                key: "{schema.id}",
                                class: "p-4 rounded-lg border border-[var(--border)] bg-[var(--surface)]
                                        hover:border-[var(--border-accent)] cursor-pointer transition-colors",
                                onclick: {
                                    let id = schema.id.clone();
                                    move |_| on_open.call(id.clone())
                                },
                                h3 { class: "font-semibold text-[var(--text-heading)]", "{schema.name}" }
                                p { class: "mt-1 text-sm text-[var(--text-secondary)]", "{schema.method}" }
                                p { class: "mt-2 text-xs text-[var(--muted)]",
                                    {format!("{} 个参数", schema.params.len())}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
