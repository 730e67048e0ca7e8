use std::rc::Rc;

use degrada_core::Catalog;
use degrada_io::{ApiClient, ApiConfig, ErrorBanner};
use dioxus::prelude::*;

mod pages;

use pages::{CompoundPage, HomePage, SimulationPage};

/// Tailwind runtime that generates the utility classes used in `rsx!`.
const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

fn main() {
    console_error_panic_hook::set_once();
    dioxus::launch(app);
}

/// Which page is shown. There is no router; the shell swaps pages.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Page {
    Home,
    /// Single-type simulator for a degradation type id.
    Simulation(String),
    Compound,
}

/// Root application component.
///
/// Loads the built-in catalog and builds the backend client once. Either
/// failing is a blocking error; nothing else renders.
fn app() -> Element {
    let catalog = use_hook(|| Catalog::builtin().map(Rc::new));
    let client = use_hook(|| {
        ApiClient::new(ApiConfig::default())
            .map(Rc::new)
            .map_err(|e| e.to_string())
    });

    rsx! {
        script { src: TAILWIND_CDN }
        // Theme variables (light and dark).
        style { dangerous_inner_html: include_str!("../assets/main.css") }

        match (catalog, client) {
            (Ok(catalog), Ok(client)) => rsx! { Shell { catalog, client } },
            (Err(e), _) => rsx! {
                div { class: "p-6",
                    ErrorBanner { message: format!("参数目录加载失败：{e}") }
                }
            },
            (_, Err(e)) => rsx! {
                div { class: "p-6",
                    ErrorBanner { message: format!("无法初始化后端客户端：{e}") }
                }
            },
        }
    }
}

/// Props for the [`Shell`] component.
#[derive(Props, Clone)]
struct ShellProps {
    catalog: Rc<Catalog>,
    client: Rc<ApiClient>,
}

impl PartialEq for ShellProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.catalog, &other.catalog) && Rc::ptr_eq(&self.client, &other.client)
    }
}

/// Header, navigation and the current page.
///
/// Provides the catalog and the client to every page through context.
#[component]
fn Shell(props: ShellProps) -> Element {
    use_context_provider(|| Rc::clone(&props.catalog));
    use_context_provider(|| Rc::clone(&props.client));
    let mut page = use_signal(|| Page::Home);

    let nav_class = |active: bool| {
        if active {
            "px-3 py-1 rounded bg-[var(--btn-primary)] text-white text-sm cursor-pointer"
        } else {
            "px-3 py-1 rounded text-[var(--text-secondary)] hover:text-[var(--text-heading)] text-sm cursor-pointer"
        }
    };

    rsx! {
        div { class: "min-h-screen bg-[var(--bg)] text-[var(--text)] flex flex-col",
            header { class: "px-6 py-4 border-b border-[var(--border)] flex items-center justify-between",
                div {
                    h1 { class: "text-2xl font-semibold text-[var(--text-heading)]", "degrada" }
                    p { class: "text-sm text-[var(--muted)]", "图像与视频退化模拟" }
                }
                nav { class: "flex gap-2",
                    button {
                        class: nav_class(page() == Page::Home),
                        onclick: move |_| page.set(Page::Home),
                        "退化类型"
                    }
                    button {
                        class: nav_class(page() == Page::Compound),
                        onclick: move |_| page.set(Page::Compound),
                        "复合退化"
                    }
                }
            }

            main { class: "flex-1 p-6",
                match page() {
                    Page::Home => rsx! {
                        HomePage {
                            on_open: move |type_key| page.set(Page::Simulation(type_key)),
                            on_compound: move |()| page.set(Page::Compound),
                        }
                    },
                    Page::Simulation(type_key) => rsx! {
                        SimulationPage {
                            key: "{type_key}",
                            type_key: type_key.clone(),
                            on_back: move |()| page.set(Page::Home),
                        }
                    },
                    Page::Compound => rsx! { CompoundPage {} },
                }
            }
        }
    }
}
