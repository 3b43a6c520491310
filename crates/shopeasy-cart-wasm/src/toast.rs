use std::time::Duration;

use shopeasy_cart::ToastTimeline;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

use crate::dom::log_js_error;

pub const CONTAINER_ID: &str = "toast-container";

/// Milliseconds for `setTimeout`, saturating at `i32::MAX`.
pub fn timeout_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

/// Run `f` once after `delay`. Not cancellable.
pub fn set_timeout(window: &Window, delay: Duration, f: impl FnOnce() + 'static) {
    let callback = Closure::once_into_js(f);
    if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        timeout_ms(delay),
    ) {
        warn!(?err, "setTimeout failed");
    }
}

fn container(document: &Document) -> Result<Element, JsValue> {
    if let Some(existing) = document.get_element_by_id(CONTAINER_ID) {
        return Ok(existing);
    }
    let div = document.create_element("div")?;
    div.set_id(CONTAINER_ID);
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&div)?;
    Ok(div)
}

/// Append a toast and walk it through `timeline`.
pub fn show(
    window: &Window,
    document: &Document,
    message: &str,
    timeline: ToastTimeline,
) -> Result<(), JsValue> {
    let toast = document.create_element("div")?;
    toast.set_class_name("toast");
    toast.set_text_content(Some(message));
    container(document)?.append_child(&toast)?;

    let shown = toast.clone();
    let on_frame = Closure::once_into_js(move || {
        log_js_error("toast show", shown.class_list().add_1("show"));
    });
    window.request_animation_frame(on_frame.unchecked_ref())?;

    let later = window.clone();
    set_timeout(window, timeline.display, move || {
        log_js_error("toast hide", toast.class_list().remove_1("show"));
        set_timeout(&later, timeline.transition, move || toast.remove());
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_saturates() {
        assert_eq!(timeout_ms(Duration::from_millis(700)), 700);
        assert_eq!(timeout_ms(Duration::from_secs(u64::MAX)), i32::MAX);
    }
}
