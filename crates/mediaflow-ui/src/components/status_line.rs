//! Status line and busy-button content shared by both panels.

use leptos::prelude::*;
use mediaflow_core::StatusMessage;

/// Renders a status message, or nothing when there is none.
#[component]
pub fn StatusLine(
    /// Message to show.
    #[prop(into)]
    status: Signal<Option<StatusMessage>>,
) -> impl IntoView {
    move || {
        status.get().map(|message| {
            let class = message.css_class();
            view! { <p class=class>{message.text}</p> }
        })
    }
}

/// Button label with a spinner shown while busy.
#[component]
pub fn BusyLabel(
    /// Label text.
    label: &'static str,
    /// Whether the owning action is in flight.
    #[prop(into)]
    busy: Signal<bool>,
) -> impl IntoView {
    view! {
        <span class="btn-text" style:opacity=move || if busy.get() { "0.5" } else { "1" }>
            {label}
        </span>
        <span class="btn-spinner" class:hidden=move || !busy.get()></span>
    }
}
