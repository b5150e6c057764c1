//! Browser implementations of the core delivery seams.
//!
//! Hidden form submission, blob saves through object URLs, timers and file
//! reading, all on `web-sys`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use mediaflow_core::{
    ConversionFile, DeliveryBackend, Error, NativeSubmission, ObjectUrl, Result,
    SubmissionHandle, Timer,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, Document, File, FileList, HtmlAnchorElement, HtmlFormElement,
    HtmlInputElement, Url,
};

thread_local! {
    static PENDING_FORMS: RefCell<HashMap<u64, HtmlFormElement>> = RefCell::new(HashMap::new());
    static NEXT_FORM_ID: RefCell<u64> = const { RefCell::new(0) };
}

fn js_error(context: &str, value: &JsValue) -> Error {
    Error::delivery(format!("{context}: {value:?}"))
}

fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::delivery("No document available"))
}

/// [`DeliveryBackend`] that drives the live page.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDelivery;

impl BrowserDelivery {
    fn build_form(document: &Document, submission: &NativeSubmission) -> Result<HtmlFormElement> {
        let form: HtmlFormElement = document
            .create_element("form")
            .map_err(|e| js_error("Failed to create form", &e))?
            .dyn_into()
            .map_err(|_| Error::delivery("Created element is not a form"))?;
        form.set_method(submission.method);
        form.set_action(&submission.action);
        form.style()
            .set_property("display", "none")
            .map_err(|e| js_error("Failed to hide form", &e))?;

        for (name, value) in &submission.fields {
            let input: HtmlInputElement = document
                .create_element("input")
                .map_err(|e| js_error("Failed to create input", &e))?
                .dyn_into()
                .map_err(|_| Error::delivery("Created element is not an input"))?;
            input.set_type("hidden");
            input.set_name(name);
            input.set_value(value);
            form.append_child(&input)
                .map_err(|e| js_error("Failed to attach input", &e))?;
        }
        Ok(form)
    }
}

impl DeliveryBackend for BrowserDelivery {
    fn submit_native(&self, submission: &NativeSubmission) -> Result<SubmissionHandle> {
        let document = document()?;
        let body = document
            .body()
            .ok_or_else(|| Error::delivery("Document has no body"))?;
        let form = Self::build_form(&document, submission)?;

        body.append_child(&form)
            .map_err(|e| js_error("Failed to attach form", &e))?;
        if let Err(e) = form.submit() {
            form.remove();
            return Err(js_error("Form submission failed", &e));
        }

        let id = NEXT_FORM_ID.with(|next| {
            let mut next = next.borrow_mut();
            *next += 1;
            *next
        });
        PENDING_FORMS.with(|forms| forms.borrow_mut().insert(id, form));
        leptos::logging::log!("Submitted download form #{} to {}", id, submission.action);
        Ok(SubmissionHandle(id))
    }

    fn discard_submission(&self, handle: SubmissionHandle) {
        if let Some(form) = PENDING_FORMS.with(|forms| forms.borrow_mut().remove(&handle.0)) {
            form.remove();
        }
    }

    fn save_blob(&self, bytes: &[u8], content_type: &str, filename: &str) -> Result<ObjectUrl> {
        let document = document()?;
        let body = document
            .body()
            .ok_or_else(|| Error::delivery("Document has no body"))?;

        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(content_type);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| js_error("Failed to create blob", &e))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|e| js_error("Failed to create object URL", &e))?;

        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|e| js_error("Failed to create link", &e))?
            .dyn_into()
            .map_err(|_| Error::delivery("Created element is not a link"))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        body.append_child(&anchor)
            .map_err(|e| js_error("Failed to attach link", &e))?;
        anchor.click();
        anchor.remove();

        Ok(ObjectUrl(url))
    }

    fn release_object_url(&self, url: ObjectUrl) {
        if let Err(e) = Url::revoke_object_url(url.as_str()) {
            leptos::logging::warn!("Failed to revoke {}: {:?}", url.as_str(), e);
        }
    }
}

/// [`Timer`] on `gloo-timers`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::future::TimeoutFuture::new(millis).await;
    }
}

/// Read a browser `File` into memory.
pub async fn read_file(file: &File) -> Result<ConversionFile> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| js_error("Failed to read file", &e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    let converted = ConversionFile::new(file.name(), bytes);
    let mime_type = file.type_();
    Ok(if mime_type.is_empty() {
        converted
    } else {
        converted.with_mime_type(mime_type)
    })
}

/// The first file of a browse or drop offer.
#[must_use]
pub fn first_file(files: Option<FileList>) -> Option<File> {
    files.and_then(|list| list.get(0))
}
