//! Single-type simulator: pick a server file, tune one degradation
//! type, process, compare, download or delete the result.

use std::rc::Rc;

use degrada_core::payload::{FileListData, RemoteFile};
use degrada_core::{
    Catalog, DegradationSchema, FlowState, InfoState, MediaFile, ParamUpdate, SimulationFlow,
    StageConfig, StageSlot,
};
use degrada_io::download;
use degrada_io::{
    ApiClient, ErrorBanner, FileBrowser, MediaInfoCard, MediaPreview, ObjectUrl, ParamControls,
};
use dioxus::prelude::*;

/// Props for the [`SimulationPage`] component.
#[derive(Props, Clone, PartialEq)]
pub struct SimulationPageProps {
    /// Degradation type id being simulated.
    type_key: String,
    on_back: EventHandler<()>,
}

/// Fetch a backend file into a preview URL.
#[allow(clippy::future_not_send)] // WASM is single-threaded
async fn load_preview(client: &ApiClient, path: &str, name: &str) -> Result<ObjectUrl, String> {
    let file = client
        .fetch_file(path)
        .await
        .map_err(|e| format!("文件预览失败: {e}"))?;
    ObjectUrl::from_bytes(&file.bytes, file.mime(name)).map_err(|e| format!("文件预览失败: {e}"))
}

/// Fetch the metadata of a backend file.
#[allow(clippy::future_not_send)] // WASM is single-threaded
async fn load_info(client: &ApiClient, path: &str) -> InfoState {
    InfoState::from_lookup(client.media_info(path).await)
}

/// Looks the type up in the catalog; an unknown id renders a
/// configuration error instead of the simulator.
#[component]
pub fn SimulationPage(props: SimulationPageProps) -> Element {
    let catalog = use_context::<Rc<Catalog>>();
    match catalog.require(&props.type_key) {
        Ok(schema) => rsx! {
            Simulator { schema: schema.clone(), on_back: props.on_back }
        },
        Err(e) => rsx! {
            ErrorBanner { message: format!("配置错误：{e}") }
        },
    }
}

/// Props for the [`Simulator`] component.
#[derive(Props, Clone, PartialEq)]
struct SimulatorProps {
    schema: DegradationSchema,
    on_back: EventHandler<()>,
}

#[component]
#[allow(clippy::too_many_lines)]
fn Simulator(props: SimulatorProps) -> Element {
    let catalog = use_context::<Rc<Catalog>>();
    let client = use_context::<Rc<ApiClient>>();
    let schema = Rc::new(props.schema);
    let type_key = schema.id.clone();

    // --- Page state ---
    let mut flow = use_signal(SimulationFlow::new);
    let mut params = use_signal({
        let schema = Rc::clone(&schema);
        move || StageConfig::defaults(&schema)
    });
    let mut original_preview = use_signal(|| Option::<Rc<ObjectUrl>>::None);
    let mut processed_preview = use_signal(|| Option::<Rc<ObjectUrl>>::None);
    let mut original_info = use_signal(InfoState::default);
    let mut processed_info = use_signal(InfoState::default);
    let mut browser_open = use_signal(|| false);
    let mut listing = use_signal(|| Option::<FileListData>::None);
    let mut listing_loading = use_signal(|| false);

    // --- Server file browser ---
    let mut load_listing = {
        let client = Rc::clone(&client);
        move |subdir: String| {
            let client = Rc::clone(&client);
            listing_loading.set(true);
            spawn(async move {
                match client.file_list(&subdir).await {
                    Ok(data) => listing.set(Some(data)),
                    Err(e) => flow.write().report(format!("获取文件列表失败: {e}")),
                }
                listing_loading.set(false);
            });
        }
    };

    let open_browser = {
        let mut load_listing = load_listing.clone();
        move |_| {
            browser_open.set(true);
            load_listing(String::new());
        }
    };

    let pick_file = {
        let client = Rc::clone(&client);
        move |file: RemoteFile| {
            browser_open.set(false);
            let media = MediaFile::from_remote(&file);
            let selected = flow.write().select_file(media.clone());
            if let Err(e) = selected {
                flow.write().report(e.to_string());
                return;
            }
            original_preview.set(None);
            processed_preview.set(None);
            original_info.set(InfoState::Loading);
            processed_info.set(InfoState::Loading);

            let generation = flow.peek().generation();
            let client = Rc::clone(&client);
            spawn(async move {
                let preview = load_preview(&client, &media.file_path, &media.name).await;
                if flow.peek().generation() != generation {
                    return;
                }
                match preview {
                    Ok(url) => original_preview.set(Some(Rc::new(url))),
                    Err(message) => flow.write().report(message),
                }
                let info = load_info(&client, &media.file_path).await;
                if flow.peek().generation() == generation {
                    if let Some(message) = info.failure() {
                        flow.write().report(message.to_owned());
                    }
                    original_info.set(info);
                }
            });
        }
    };

    // --- Parameters ---
    let on_update = {
        let schema = Rc::clone(&schema);
        move |update: ParamUpdate| {
            if let Err(e) = params.write().set(&schema, &update.param_key, &update.value) {
                tracing::warn!("update rejected: {e}");
            }
        }
    };

    let reset_params = {
        let schema = Rc::clone(&schema);
        move |_| params.write().reset(&schema)
    };

    // --- Processing ---
    let process = {
        let client = Rc::clone(&client);
        let catalog = Rc::clone(&catalog);
        let type_key = type_key.clone();
        move |_| {
            let current = params.peek().params.clone();
            let started = flow.write().begin_processing(&catalog, &type_key, &current);
            let ticket = match started {
                Ok(ticket) => ticket,
                Err(e) => {
                    flow.write().report(e.to_string());
                    return;
                }
            };
            processed_preview.set(None);
            processed_info.set(InfoState::Loading);

            let client = Rc::clone(&client);
            spawn(async move {
                let generation = ticket.generation;
                let processed = match client.single_degradation(&ticket.request).await {
                    Ok(data) => data.processed_path,
                    Err(e) => {
                        flow.write().fail(generation, format!("处理失败: {e}"));
                        return;
                    }
                };
                if !flow.write().complete(generation, processed.clone()) {
                    return;
                }
                let name = processed.rsplit('/').next().unwrap_or(&processed).to_owned();
                match load_preview(&client, &processed, &name).await {
                    Ok(url) if flow.peek().generation() == generation => {
                        processed_preview.set(Some(Rc::new(url)));
                    }
                    Ok(_) => return,
                    Err(message) => flow.write().report(message),
                }
                let info = load_info(&client, &processed).await;
                if flow.peek().generation() == generation {
                    if let Some(message) = info.failure() {
                        flow.write().report(message.to_owned());
                    }
                    processed_info.set(info);
                }
            });
        }
    };

    // --- Result actions ---
    let download_result = {
        let type_key = type_key.clone();
        move |_| {
            let Some(url) = processed_preview() else {
                return;
            };
            let Some(media) = flow.peek().media().cloned() else {
                return;
            };
            let filename = download::processed_file_name(&type_key, &media.file_path);
            if let Err(e) = download::download_url(url.as_str(), &filename) {
                flow.write().report(format!("下载失败: {e}"));
            }
        }
    };

    let delete_result = {
        let client = Rc::clone(&client);
        move |_| {
            let Some(path) = flow.peek().processed_path().map(str::to_owned) else {
                return;
            };
            let client = Rc::clone(&client);
            spawn(async move {
                match client.delete_file(&path).await {
                    Ok(()) => {
                        if let Err(e) = flow.write().discard_result() {
                            tracing::debug!("result already gone: {e}");
                        }
                        processed_preview.set(None);
                        processed_info.set(InfoState::Loading);
                    }
                    Err(e) => flow.write().report(format!("删除失败: {e}")),
                }
            });
        }
    };

    let change_file = move |_| {
        let changed = flow.write().change_file();
        if let Err(e) = changed {
            flow.write().report(e.to_string());
            return;
        }
        original_preview.set(None);
        processed_preview.set(None);
        original_info.set(InfoState::Loading);
        processed_info.set(InfoState::Loading);
    };

    // --- Layout ---
    let state = flow.read().state();
    let media = flow.read().media().cloned();
    let error = flow.read().error().map(str::to_owned);
    let can_process = flow.read().can_process();
    let schema_name = schema.name.clone();
    let schema_method = schema.method.clone();
    let on_back = props.on_back;
    let button = "px-4 py-2 rounded font-medium transition-colors cursor-pointer";
    let primary = "bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] text-white";
    let secondary = "border border-[var(--border)] text-[var(--text)] hover:bg-[var(--surface-active)]";
    let disabled = "bg-[var(--btn-disabled)] text-[var(--text-disabled)] cursor-not-allowed";
    let busy = state == FlowState::Processing;
    let change_class = format!("{button} {}", if busy { disabled } else { secondary });
    let process_class = format!("w-full {button} {}", if can_process { primary } else { disabled });

    rsx! {
        div { class: "space-y-6",
            div { class: "flex items-start justify-between gap-4",
                div {
                    h2 { class: "text-xl font-semibold text-[var(--text-heading)]", "{schema_name}" }
                    p { class: "text-sm text-[var(--text-secondary)]", "{schema_method}" }
                }
                button {
                    class: "{button} {secondary}",
                    onclick: move |_| on_back.call(()),
                    "返回"
                }
            }

            if let Some(message) = error {
                ErrorBanner {
                    message,
                    on_dismiss: move |()| flow.write().dismiss_error(),
                }
            }

            div { class: "grid grid-cols-1 lg:grid-cols-3 gap-6",
                // Files and previews
                div { class: "lg:col-span-2 space-y-4",
                    match media.clone() {
                        None => rsx! {
                            div { class: "p-8 rounded-lg border-2 border-dashed border-[var(--border-muted)] text-center space-y-3",
                                p { class: "text-[var(--text-secondary)]", "从服务器选择一个图像或视频文件" }
                                button { class: "{button} {primary}", onclick: open_browser, "浏览服务器文件" }
                            }
                        },
                        Some(media) => rsx! {
                            div { class: "flex items-center justify-between text-sm",
                                span { class: "text-[var(--text)]",
                                    "{media.name}"
                                    if let Some(size) = media.size_human.clone() {
                                        span { class: "ml-2 text-[var(--text-secondary)]", "({size})" }
                                    }
                                }
                                button {
                                    class: "{change_class}",
                                    disabled: busy,
                                    onclick: change_file,
                                    "更换文件"
                                }
                            }
                            div { class: "grid grid-cols-1 md:grid-cols-2 gap-4",
                                div { class: "space-y-2",
                                    if let Some(url) = original_preview() {
                                        MediaPreview { title: "原始文件", kind: media.kind, src: url.as_str().to_owned() }
                                    } else {
                                        p { class: "text-sm text-[var(--text-secondary)]", "加载预览中…" }
                                    }
                                    MediaInfoCard { title: "原始文件信息", kind: media.kind, info: original_info() }
                                }
                                div { class: "space-y-2",
                                    match state {
                                        FlowState::Processing => rsx! {
                                            p { class: "text-[var(--text-secondary)] animate-pulse", "处理中…" }
                                        },
                                        FlowState::Complete => rsx! {
                                            if let Some(url) = processed_preview() {
                                                MediaPreview { title: "处理结果", kind: media.kind, src: url.as_str().to_owned() }
                                            }
                                            MediaInfoCard { title: "处理后文件信息", kind: media.kind, info: processed_info() }
                                            div { class: "flex gap-2",
                                                button { class: "{button} {primary}", onclick: download_result, "下载结果" }
                                                button { class: "{button} {secondary}", onclick: delete_result, "从服务器删除" }
                                            }
                                        },
                                        FlowState::Idle | FlowState::FileSelected => rsx! {
                                            p { class: "text-sm text-[var(--text-secondary)]", "调整参数后点击“开始处理”" }
                                        },
                                    }
                                }
                            }
                        },
                    }
                }

                // Parameters
                aside { class: "space-y-4 p-4 rounded-lg border border-[var(--border)] bg-[var(--surface)]",
                    div { class: "flex items-center justify-between",
                        h3 { class: "font-semibold text-[var(--text-heading)]", "参数设置" }
                        button {
                            class: "text-xs text-[var(--text-secondary)] hover:text-[var(--text-heading)] cursor-pointer",
                            onclick: reset_params,
                            "恢复默认"
                        }
                    }
                    ParamControls {
                        slot: StageSlot::Single,
                        type_key: type_key.clone(),
                        stage: params(),
                        on_update,
                    }
                    button {
                        class: "{process_class}",
                        disabled: !can_process,
                        onclick: process,
                        if busy { "处理中…" } else { "开始处理" }
                    }
                }
            }

            if browser_open() {
                FileBrowser {
                    listing: listing(),
                    loading: listing_loading(),
                    on_pick: pick_file,
                    on_navigate: move |dir| load_listing(dir),
                    on_close: move |()| browser_open.set(false),
                }
            }
        }
    }
}
