use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlIFrameElement};

pub const EXPORT_FILE_NAME: &str = "canvas-drawing.pdf";
const PRINT_FRAME_ID: &str = "inkroom-print-frame";

/// Single-page print document: landscape, sized to the canvas in pixels,
/// with the snapshot stretched over the whole page. The title becomes the
/// suggested file name when the browser saves the print as PDF.
pub fn build_print_html(image: &str, width: u32, height: u32) -> String {
    let long = width.max(height).max(1);
    let short = width.min(height).max(1);
    let image = escape_attribute(image);
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\" /><title>{EXPORT_FILE_NAME}</title><style>@page{{size:{long}px {short}px;margin:0;}}html,body{{margin:0;padding:0;}}img{{display:block;width:{long}px;height:{short}px;}}</style></head><body><img src=\"{image}\" alt=\"\" /></body></html>"
    )
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Prints `html` from a hidden iframe. The frame removes itself after the
/// print dialog closes, and any frame left over from an earlier export is
/// removed first.
pub fn open_print_window(document: &Document, html: &str) -> Result<(), JsValue> {
    if let Some(previous) = document.get_element_by_id(PRINT_FRAME_ID) {
        previous.remove();
    }
    let iframe: HtmlIFrameElement = document.create_element("iframe")?.dyn_into()?;
    iframe.set_id(PRINT_FRAME_ID);
    iframe.set_attribute(
        "style",
        "position:fixed;right:0;bottom:0;width:0;height:0;border:0;",
    )?;
    iframe.set_srcdoc(html);
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("Missing body"))?;
    body.append_child(&iframe)?;

    let iframe_for_load = iframe.clone();
    let onload = Closure::once_into_js(move |_: Event| {
        let Some(window) = iframe_for_load.content_window() else {
            iframe_for_load.remove();
            return;
        };
        let frame = iframe_for_load.clone();
        let afterprint = Closure::once_into_js(move |_: Event| frame.remove());
        if let Err(err) =
            window.add_event_listener_with_callback("afterprint", afterprint.unchecked_ref())
        {
            log::error!("Failed to watch print dialog: {err:?}");
        }
        let _ = window.focus();
        if let Err(err) = window.print() {
            log::error!("Print dialog failed: {err:?}");
            iframe_for_load.remove();
        }
    });
    iframe.set_onload(Some(onload.unchecked_ref()));
    Ok(())
}
