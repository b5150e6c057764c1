//! Download panel: URL input, preview card, media type toggle and
//! resolution picker.

use leptos::ev::KeyboardEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use mediaflow_core::{
    DeliveryBackend, DownloadController, HttpMediaApi, MediaApi, MediaType, Timer, VideoInfo,
};

use crate::browser::{BrowserDelivery, GlooTimer};
use crate::components::{BusyLabel, StatusLine};
use crate::theme::{PREVIEW_ID, apply_theme};

/// The downloader card.
#[component]
pub fn Downloader(
    /// Download flow state.
    controller: RwSignal<DownloadController>,
    /// Media service client.
    api: StoredValue<HttpMediaApi, LocalStorage>,
) -> impl IntoView {
    let fetch_info = move || {
        let ticket = match controller.try_update(DownloadController::begin_fetch) {
            Some(Ok(ticket)) => ticket,
            Some(Err(e)) => {
                leptos::logging::warn!("Fetch not started: {}", e);
                return;
            }
            None => return,
        };
        let api = api.get_value();

        spawn_local(async move {
            let result = api.fetch_info(ticket.url()).await;
            match controller.try_update(move |c| c.complete_fetch(ticket, result)) {
                Some(Ok(Some(theme))) => apply_theme(&theme),
                Some(Err(e)) => leptos::logging::error!("Fetch failed: {}", e),
                _ => {}
            }
        });
    };

    let download = move |_| {
        let delivery = BrowserDelivery;
        let pending = match controller.try_update(|c| c.dispatch_download(&delivery)) {
            Some(Ok(pending)) => pending,
            Some(Err(e)) => {
                leptos::logging::warn!("Download not started: {}", e);
                return;
            }
            None => return,
        };

        spawn_local(async move {
            GlooTimer.sleep(pending.cleanup_delay).await;
            delivery.discard_submission(pending.handle);
            GlooTimer.sleep(pending.settle_delay).await;
            controller.update(DownloadController::finish_download);
        });
    };

    let set_url = move |value: String| {
        if let Some(Some(theme)) = controller.try_update(|c| c.set_url(value)) {
            apply_theme(&theme);
        }
    };

    let on_url_keydown = move |ev: KeyboardEvent| {
        if ev.key() == "Enter" {
            fetch_info();
        }
    };

    let select_resolution = move |value: String| {
        let Ok(index) = value.parse::<usize>() else {
            return;
        };
        if let Some(Err(e)) = controller.try_update(|c| c.select_resolution(index)) {
            leptos::logging::warn!("{}", e);
        }
    };

    let media_type = move || controller.with(|c| c.selection().media_type);
    let has_preview = move || controller.with(|c| c.info().is_some());
    let info_text = move |f: fn(&VideoInfo) -> String| {
        move || controller.with(|c| c.info().map(f).unwrap_or_default())
    };

    view! {
        <section class="card" id="downloader">
            <h2 class="card-title">"Download"</h2>

            <div class="url-row">
                <input
                    id="dl-url"
                    type="url"
                    placeholder="Paste a video link…"
                    autocomplete="off"
                    prop:value=move || controller.with(|c| c.url().to_string())
                    on:input=move |ev| set_url(event_target_value(&ev))
                    on:keydown=on_url_keydown
                />
                <button
                    id="dl-fetch-btn"
                    class="btn btn-primary"
                    disabled=move || controller.with(DownloadController::is_fetching)
                    on:click=move |_| fetch_info()
                >
                    <BusyLabel
                        label="Fetch"
                        busy=Signal::derive(move || controller.with(DownloadController::is_fetching))
                    />
                </button>
            </div>
            <p
                id="dl-url-error"
                class="field-error"
                class:hidden=move || controller.with(|c| c.url_error().is_none())
            >
                {move || controller.with(|c| c.url_error().unwrap_or_default().to_string())}
            </p>

            <div id=PREVIEW_ID class="preview" class:hidden=move || !has_preview()>
                <img
                    id="dl-thumb"
                    alt=""
                    src=move || {
                        controller
                            .with(|c| c.info().and_then(|i| i.thumbnail_url.clone()))
                            .unwrap_or_default()
                    }
                />
                <div class="preview-meta">
                    <h3 id="dl-title">{info_text(|i| i.display_title().to_string())}</h3>
                    <span id="dl-uploader">{info_text(VideoInfo::uploader_line)}</span>
                    <span id="dl-platform">{info_text(VideoInfo::platform_line)}</span>
                    <span id="dl-duration">{info_text(VideoInfo::duration_line)}</span>
                </div>
            </div>

            <div id="dl-options" class="options" class:hidden=move || !has_preview()>
                <div class="type-toggle">
                    <button
                        id="type-video"
                        class="toggle-btn"
                        class:active=move || media_type() == MediaType::Video
                        on:click=move |_| controller.update(|c| c.select_media_type(MediaType::Video))
                    >
                        "🎬 Video"
                    </button>
                    <button
                        id="type-audio"
                        class="toggle-btn"
                        class:active=move || media_type() == MediaType::Audio
                        on:click=move |_| controller.update(|c| c.select_media_type(MediaType::Audio))
                    >
                        "🎵 Audio"
                    </button>
                </div>

                <div
                    id="resolution-block"
                    style:opacity=move || if media_type() == MediaType::Audio { "0.4" } else { "1" }
                    style:pointer-events=move || {
                        if media_type() == MediaType::Audio { "none" } else { "auto" }
                    }
                >
                    <label for="dl-resolution">"Resolution"</label>
                    <select
                        id="dl-resolution"
                        disabled=move || !controller.with(DownloadController::resolution_enabled)
                        on:change=move |ev| select_resolution(event_target_value(&ev))
                    >
                        {move || {
                            controller.with(|c| {
                                let selected = c.selection().resolution_index;
                                c.options()
                                    .iter()
                                    .enumerate()
                                    .map(|(i, option)| {
                                        view! {
                                            <option value=i.to_string() selected=i == selected>
                                                {option.display_label()}
                                            </option>
                                        }
                                    })
                                    .collect_view()
                            })
                        }}
                    </select>
                </div>

                <button
                    id="dl-download-btn"
                    class="btn btn-download"
                    disabled=move || controller.with(DownloadController::is_downloading)
                    on:click=download
                >
                    <BusyLabel
                        label="⬇ Download"
                        busy=Signal::derive(move || controller.with(DownloadController::is_downloading))
                    />
                </button>
                <StatusLine status=Signal::derive(move || controller.with(|c| c.status().cloned()))/>
            </div>
        </section>
    }
}
