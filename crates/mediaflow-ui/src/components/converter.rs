//! Conversion panel: drop zone, file info, format picker.

use leptos::ev::{DragEvent, KeyboardEvent};
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use mediaflow_core::{
    ConversionController, ConversionFormat, DeliveryBackend, FormatCategory, HttpMediaApi,
    MediaApi, Timer,
};
use web_sys::{File, HtmlInputElement};

use crate::browser::{BrowserDelivery, GlooTimer, first_file, read_file};
use crate::components::{BusyLabel, StatusLine};

/// The converter card.
#[component]
pub fn Converter(
    /// Conversion flow state.
    controller: RwSignal<ConversionController>,
    /// Media service client.
    api: StoredValue<HttpMediaApi, LocalStorage>,
) -> impl IntoView {
    let file_input = NodeRef::<Input>::new();
    let (drag_over, set_drag_over) = signal(false);

    let open_browser = move || {
        if let Some(input) = file_input.get() {
            input.click();
        }
    };

    let accept_file = move |file: Option<File>| {
        let Some(file) = file else {
            return;
        };
        spawn_local(async move {
            match read_file(&file).await {
                Ok(file) => {
                    if let Some(Err(e)) = controller.try_update(|c| c.select_file(file)) {
                        leptos::logging::warn!("File not accepted: {}", e);
                    }
                }
                Err(e) => leptos::logging::error!("{}", e),
            }
        });
    };

    let remove_file = move |_| {
        if let Some(Err(e)) = controller.try_update(ConversionController::remove_file) {
            leptos::logging::warn!("{}", e);
            return;
        }
        if let Some(input) = file_input.get() {
            input.set_value("");
        }
    };

    let convert = move |_| {
        let job = match controller.try_update(ConversionController::begin_conversion) {
            Some(Ok(job)) => job,
            Some(Err(e)) => {
                leptos::logging::warn!("Conversion not started: {}", e);
                return;
            }
            None => return,
        };
        let api = api.get_value();

        spawn_local(async move {
            let result = api.convert(&job).await;
            let delivery = BrowserDelivery;
            let saved = controller.try_update(|c| c.complete_conversion(&job, result, &delivery));
            match saved {
                Some(Ok(saved)) => {
                    let delay =
                        controller.with_untracked(|c| c.config().object_url_revoke_delay());
                    GlooTimer.sleep(delay).await;
                    delivery.release_object_url(saved.object_url);
                }
                Some(Err(e)) => leptos::logging::error!("Conversion failed: {}", e),
                None => {}
            }
        });
    };

    let has_file = move || controller.with(|c| c.file().is_some());
    let file_text = move |f: fn(&mediaflow_core::ConversionFile) -> String| {
        move || controller.with(|c| c.file().map(f).unwrap_or_default())
    };

    let format_group = move |category: FormatCategory, title: &'static str| {
        let buttons = ConversionFormat::ALL
            .into_iter()
            .filter(|format| format.category() == category)
            .map(|format| {
                view! {
                    <button
                        class="format-btn"
                        data-format=format.as_str()
                        class:selected=move || controller.with(|c| c.format() == Some(format))
                        on:click=move |_| controller.update(|c| c.select_format(format))
                    >
                        {format!(".{}", format.as_str().to_uppercase())}
                    </button>
                }
            })
            .collect_view();
        view! {
            <div class="format-group">
                <span class="format-group-title">{title}</span>
                <div class="format-grid">{buttons}</div>
            </div>
        }
    };

    view! {
        <section class="card" id="converter">
            <h2 class="card-title">"Convert"</h2>

            <input
                id="cv-file-input"
                type="file"
                class="hidden"
                node_ref=file_input
                on:change=move |ev| {
                    let input: HtmlInputElement = event_target(&ev);
                    accept_file(first_file(input.files()));
                }
            />

            <div
                id="cv-dropzone"
                class="dropzone"
                tabindex="0"
                class:hidden=has_file
                class:drag-over=move || drag_over.get()
                on:click=move |_| open_browser()
                on:keydown=move |ev: KeyboardEvent| {
                    if ev.key() == "Enter" || ev.key() == " " {
                        open_browser();
                    }
                }
                on:dragover=move |ev: DragEvent| {
                    ev.prevent_default();
                    set_drag_over.set(true);
                }
                on:dragleave=move |_| set_drag_over.set(false)
                on:drop=move |ev: DragEvent| {
                    ev.prevent_default();
                    set_drag_over.set(false);
                    accept_file(first_file(ev.data_transfer().and_then(|dt| dt.files())));
                }
            >
                <p>"Drop a file here, or"</p>
                <button
                    id="cv-browse-btn"
                    class="btn btn-secondary"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        open_browser();
                    }
                >
                    "Browse"
                </button>
            </div>

            <div id="cv-file-info" class="file-info" class:hidden=move || !has_file()>
                <span id="cv-file-name">{file_text(|f| f.name.clone())}</span>
                <span id="cv-file-size">
                    {file_text(mediaflow_core::ConversionFile::display_size)}
                </span>
                <button
                    id="cv-remove-file"
                    class="btn-icon"
                    title="Remove file"
                    disabled=move || controller.with(ConversionController::is_converting)
                    on:click=remove_file
                >
                    "✕"
                </button>
            </div>

            <div id="cv-format-picker" class="format-picker" class:hidden=move || !has_file()>
                {format_group(FormatCategory::Video, "Video")}
                {format_group(FormatCategory::Audio, "Audio")}
            </div>

            <button
                id="cv-convert-btn"
                class="btn btn-primary"
                disabled=move || !controller.with(ConversionController::can_convert)
                on:click=convert
            >
                <BusyLabel
                    label="Convert"
                    busy=Signal::derive(move || controller.with(ConversionController::is_converting))
                />
            </button>
            <StatusLine status=Signal::derive(move || controller.with(|c| c.status().cloned()))/>
        </section>
    }
}
