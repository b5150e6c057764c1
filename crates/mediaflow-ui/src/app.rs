//! Main application component.

use leptos::prelude::*;
use mediaflow_core::{ClientConfig, ConversionController, DownloadController, HttpMediaApi};

use crate::components::{Converter, Downloader, Header};

/// `<meta name="mediaflow-config" content="{...}">` overrides the defaults.
const CONFIG_META_SELECTOR: &str = "meta[name=\"mediaflow-config\"]";

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    let config = load_config();

    let content = match HttpMediaApi::new(config.clone()) {
        Ok(api) => {
            let api = StoredValue::new_local(api);
            let downloads = RwSignal::new(DownloadController::new(config.clone()));
            let conversions = RwSignal::new(ConversionController::new(config));
            view! {
                <main class="app-main">
                    <Downloader controller=downloads api=api />
                    <Converter controller=conversions api=api />
                </main>
            }
            .into_any()
        }
        Err(e) => {
            leptos::logging::error!("Invalid client configuration: {}", e);
            view! {
                <main class="app-main">
                    <p class="status-msg is-error">{format!("❌ {}", e.user_message())}</p>
                </main>
            }
            .into_any()
        }
    };

    view! {
        <style>{include_str!("../styles/main.css")}</style>
        <Header />
        {content}
    }
}

/// Client configuration for this page.
///
/// An empty `api_base` resolves to the page origin, since the HTTP client
/// needs absolute URLs.
fn load_config() -> ClientConfig {
    let window = web_sys::window();

    let mut config = window
        .as_ref()
        .and_then(web_sys::Window::document)
        .and_then(|d| d.query_selector(CONFIG_META_SELECTOR).ok().flatten())
        .and_then(|meta| meta.get_attribute("content"))
        .and_then(|json| match ClientConfig::from_json_str(&json) {
            Ok(config) => Some(config),
            Err(e) => {
                leptos::logging::warn!("Ignoring page configuration: {}", e);
                None
            }
        })
        .unwrap_or_default();

    if config.api_base.trim().is_empty()
        && let Some(origin) = window.and_then(|w| w.location().origin().ok())
    {
        config.api_base = origin;
    }
    leptos::logging::log!("Media service at {}", config.api_base);
    config
}
