//! Page theming.
//!
//! The base palette lives in `styles/main.css`; platform accents are layered
//! on top by [`apply_theme`], the only place the page's accent colors are
//! written.

use mediaflow_core::ThemeTokens;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// Element id of the download preview card.
pub const PREVIEW_ID: &str = "dl-preview";

/// Write `tokens` to the document: CSS custom properties on the root,
/// orb backgrounds, and the preview border tint.
pub fn apply_theme(tokens: &ThemeTokens) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if let Some(root) = document
        .document_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        let style = root.style();
        for (name, value) in tokens.css_variables() {
            if let Err(e) = style.set_property(name, value) {
                leptos::logging::warn!("Failed to set {}: {:?}", name, e);
            }
        }
    }

    let set_style = |selector: &str, property: &str, value: &str| {
        if let Some(el) = document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            if let Err(e) = el.style().set_property(property, value) {
                leptos::logging::warn!("Failed to set {} on {}: {:?}", property, selector, e);
            }
        }
    };

    set_style(".orb-1", "background", &tokens.orb_1_background());
    set_style(".orb-2", "background", &tokens.orb_2_background());
    set_style(
        &format!("#{PREVIEW_ID}"),
        "border-color",
        &tokens.preview_border_color(),
    );
}
