//! Compound pipeline configurator: upload a file, configure two
//! composite stages and an optional third, submit, watch the simulated
//! progress, then save the result and its configuration.

use std::rc::Rc;

use degrada_core::payload::FileInfoRecord;
use degrada_core::{
    Catalog, InfoState, MediaFile, ParamUpdate, PipelineConfig, SimulatedProgress, StageSlot,
};
use degrada_io::{
    ApiClient, CompositeStagePanel, ErrorBanner, FileUpload, MediaInfoCard, MediaPreview,
    OptionalStagePanel, ProgressBar, download, progress,
};
use dioxus::prelude::*;

/// Milliseconds since the epoch, for download names.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

/// ISO 8601 timestamp for saved configurations.
fn now_iso() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

#[component]
#[allow(clippy::too_many_lines)]
pub fn CompoundPage() -> Element {
    let catalog = use_context::<Rc<Catalog>>();
    let client = use_context::<Rc<ApiClient>>();

    // --- Page state ---
    let mut pipeline = use_signal({
        let catalog = Rc::clone(&catalog);
        move || PipelineConfig::new(&catalog)
    });
    let mut media = use_signal(|| Option::<MediaFile>::None);
    let mut uploading = use_signal(|| false);
    let mut original_info = use_signal(InfoState::default);
    let mut processed_info = use_signal(InfoState::default);
    let mut processed_path = use_signal(|| Option::<String>::None);
    let mut processing = use_signal(|| false);
    let mut progress_state = use_signal(|| Option::<(f64, StageSlot)>::None);
    let mut error = use_signal(|| Option::<String>::None);
    let mut generation = use_signal(|| 0u64);

    // --- Upload ---
    let on_upload = {
        let client = Rc::clone(&client);
        let catalog = Rc::clone(&catalog);
        move |(bytes, name): (Vec<u8>, String)| {
            let client = Rc::clone(&client);
            let catalog = Rc::clone(&catalog);
            generation += 1;
            let my_generation = *generation.peek();
            uploading.set(true);
            error.set(None);
            spawn(async move {
                let uploaded = client.upload(&name, bytes).await;
                if *generation.peek() != my_generation {
                    return;
                }
                uploading.set(false);
                let file = match uploaded {
                    Ok(data) => MediaFile::from_upload(&name, &data),
                    Err(e) => {
                        error.set(Some(format!("上传失败: {e}")));
                        return;
                    }
                };
                tracing::info!(path = %file.file_path, kind = %file.kind, "uploaded");

                // The optional stage's choices depend on the media kind.
                let kind_changed = media.peek().as_ref().is_none_or(|m| m.kind != file.kind);
                if kind_changed {
                    if let Err(e) = pipeline.write().select_optional(&catalog, file.kind, None) {
                        error.set(Some(e.to_string()));
                    }
                }
                let path = file.file_path.clone();
                media.set(Some(file));
                processed_path.set(None);
                processed_info.set(InfoState::Loading);
                original_info.set(InfoState::Loading);

                let info = InfoState::from_lookup(client.media_info(&path).await);
                if *generation.peek() == my_generation {
                    if let Some(message) = info.failure() {
                        error.set(Some(message.to_owned()));
                    }
                    original_info.set(info);
                }
            });
        }
    };

    // --- Stage editing ---
    let on_update = {
        let catalog = Rc::clone(&catalog);
        move |update: ParamUpdate| {
            if let Err(e) = pipeline.write().apply(&catalog, &update) {
                tracing::warn!("update rejected: {e}");
            }
        }
    };

    let mut on_toggle = move |slot: StageSlot, type_key: String, enabled: bool| {
        if let Err(e) = pipeline.write().set_enabled(slot, &type_key, enabled) {
            error.set(Some(e.to_string()));
        }
    };

    let on_reset = {
        let catalog = Rc::clone(&catalog);
        move |slot: StageSlot, type_key: String| {
            if let Err(e) = pipeline.write().reset_entry(&catalog, slot, &type_key) {
                error.set(Some(e.to_string()));
            }
        }
    };

    let on_select = {
        let catalog = Rc::clone(&catalog);
        move |type_key: Option<String>| {
            let Some(kind) = media.peek().as_ref().map(|m| m.kind) else {
                return;
            };
            if let Err(e) = pipeline
                .write()
                .select_optional(&catalog, kind, type_key.as_deref())
            {
                error.set(Some(e.to_string()));
            }
        }
    };

    let reset_all = {
        let catalog = Rc::clone(&catalog);
        move |_| {
            pipeline.write().reset(&catalog);
            error.set(None);
        }
    };

    // --- Submission ---
    let submit = {
        let client = Rc::clone(&client);
        let catalog = Rc::clone(&catalog);
        move |_| {
            let request = match pipeline.peek().to_request(&catalog, media.peek().as_ref()) {
                Ok(request) => request,
                Err(e) => {
                    error.set(Some(e.to_string()));
                    return;
                }
            };
            generation += 1;
            let my_generation = *generation.peek();
            processing.set(true);
            processed_path.set(None);
            processed_info.set(InfoState::Loading);
            progress_state.set(Some((0.0, StageSlot::First)));
            error.set(None);

            let client = Rc::clone(&client);
            spawn(async move {
                let outcome = client.composite_degradation(&request).await;
                if *generation.peek() != my_generation {
                    return;
                }
                match outcome {
                    Ok(data) => {
                        let info =
                            InfoState::from_lookup(client.media_info(&data.processed_path).await);
                        if let Some(message) = info.failure() {
                            error.set(Some(message.to_owned()));
                        }
                        processed_info.set(info);
                        processed_path.set(Some(data.processed_path));

                        let plan = SimulatedProgress::plan(request.third_degradation_config.is_some());
                        progress::play(&plan, |step| {
                            if *generation.peek() == my_generation {
                                progress_state.set(Some((step.percent, step.stage)));
                            }
                        })
                        .await;
                    }
                    Err(e) => error.set(Some(format!("处理失败: {e}"))),
                }
                if *generation.peek() == my_generation {
                    processing.set(false);
                    progress_state.set(None);
                }
            });
        }
    };

    // --- Save ---
    let save = {
        let client = Rc::clone(&client);
        let catalog = Rc::clone(&catalog);
        move |_| {
            let (Some(path), Some(original)) = (processed_path(), media()) else {
                error.set(Some("请先完成退化处理".to_owned()));
                return;
            };
            let file_url = match client.file_url(&path) {
                Ok(url) => url,
                Err(e) => {
                    error.set(Some(e.to_string()));
                    return;
                }
            };
            let name = download::pipeline_result_name(processed_info.peek().info(), &original.name);
            if let Err(e) = download::download_url(&file_url, &name) {
                error.set(Some(format!("下载失败: {e}")));
                return;
            }

            let record = pipeline.peek().saved_configuration(
                &catalog,
                FileInfoRecord {
                    original: original_info.peek().info().cloned(),
                    processed: processed_info.peek().info().cloned(),
                },
                now_iso(),
            );
            let saved = serde_json::to_string_pretty(&record)
                .map_err(|e| e.to_string())
                .and_then(|json| {
                    download::trigger_download(
                        &json,
                        &download::config_file_name(now_millis()),
                        "application/json",
                    )
                    .map_err(|e| e.to_string())
                });
            if let Err(e) = saved {
                error.set(Some(format!("保存配置失败: {e}")));
            }
        }
    };

    // --- Layout ---
    let config = pipeline.read().clone();
    let configuration_error = config.configuration_error();
    let file = media();
    let kind = file.as_ref().map(|f| f.kind);
    let busy = processing() || uploading();
    let can_submit = file.is_some() && !busy && configuration_error.is_none();
    let button = "px-4 py-2 rounded font-medium transition-colors cursor-pointer";
    let primary = "bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] text-white";
    let secondary = "border border-[var(--border)] text-[var(--text)] hover:bg-[var(--surface-active)]";
    let disabled = "bg-[var(--btn-disabled)] text-[var(--text-disabled)] cursor-not-allowed";
    let submit_class = format!("{button} {}", if can_submit { primary } else { disabled });
    let processed_url = processed_path()
        .filter(|_| !processing())
        .and_then(|p| client.file_url(&p).ok());
    let original_url = file.as_ref().and_then(|f| client.file_url(&f.file_path).ok());

    rsx! {
        div { class: "space-y-6",
            h2 { class: "text-xl font-semibold text-[var(--text-heading)]", "复合退化配置" }

            if let Some(e) = configuration_error {
                ErrorBanner { message: format!("配置错误：{e}") }
            }
            if let Some(message) = error() {
                ErrorBanner {
                    message,
                    on_dismiss: move |()| error.set(None),
                }
            }

            FileUpload { on_upload, disabled: busy }
            if uploading() {
                p { class: "text-sm text-[var(--text-secondary)] animate-pulse", "上传中…" }
            }

            if let Some(file) = file.clone() {
                div { class: "grid grid-cols-1 md:grid-cols-2 gap-4",
                    div { class: "space-y-2",
                        if let Some(src) = original_url {
                            MediaPreview { title: "原始文件：{file.name}", kind: file.kind, src }
                        }
                        MediaInfoCard { title: "原始文件信息", kind: file.kind, info: original_info() }
                    }
                    div { class: "space-y-2",
                        if let Some(src) = processed_url {
                            MediaPreview { title: "处理结果", kind: file.kind, src }
                            MediaInfoCard { title: "处理后文件信息", kind: file.kind, info: processed_info() }
                        }
                    }
                }
            }

            div { class: "grid grid-cols-1 xl:grid-cols-3 gap-4",
                for slot in StageSlot::COMPOSITE {
                    if let Some(stage) = config.composite(slot).cloned() {
                        CompositeStagePanel {
                            key: "{slot.id()}",
                            slot,
                            stage,
                            on_update: on_update.clone(),
                            on_toggle: move |(type_key, enabled)| on_toggle(slot, type_key, enabled),
                            on_reset: {
                                let mut on_reset = on_reset.clone();
                                move |type_key| on_reset(slot, type_key)
                            },
                        }
                    }
                }
                OptionalStagePanel {
                    kind,
                    stage: config.optional().cloned(),
                    on_select,
                    on_update: on_update.clone(),
                }
            }

            if let Some((percent, stage)) = progress_state() {
                ProgressBar { percent, label: format!("{stage}处理中") }
            }

            div { class: "flex flex-wrap gap-2",
                button {
                    class: "{submit_class}",
                    disabled: !can_submit,
                    onclick: submit,
                    if processing() { "处理中…" } else { "开始处理" }
                }
                button { class: "{button} {secondary}", onclick: reset_all, "重置全部参数" }
                if processed_path().is_some() && !processing() {
                    button { class: "{button} {secondary}", onclick: save, "保存结果与配置" }
                }
            }
        }
    }
}
