//! Header component.

use leptos::prelude::*;

/// Application header with the decorative background orbs.
#[component]
pub fn Header() -> impl IntoView {
    view! {
        <div class="orb orb-1" aria-hidden="true"></div>
        <div class="orb orb-2" aria-hidden="true"></div>
        <header class="app-header">
            <div class="logo">
                <span class="logo-text">"MediaFlow"</span>
            </div>
            <p class="tagline">"Download from anywhere. Convert to anything."</p>
        </header>
    }
}
