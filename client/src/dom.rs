use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, PointerEvent, Window};

use inkroom_shared::Point;

use crate::render::CanvasSurface;

const TOAST_MS: i32 = 3500;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn set_status(status_el: &Element, state: &str, text: &str) {
    let _ = status_el.set_attribute("data-state", state);
    status_el.set_text_content(Some(text));
}

pub fn resize_canvas(window: &Window, surface: &mut CanvasSurface) {
    let rect = surface.canvas().get_bounding_client_rect();
    surface.resize(rect.width(), rect.height(), window.device_pixel_ratio());
}

pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let point = Point::new(
        event.client_x() as f64 - rect.left(),
        event.client_y() as f64 - rect.top(),
    );
    point.is_finite().then_some(point)
}

/// Shows a transient notification that removes itself.
pub fn show_toast(window: &Window, document: &Document, container: &Element, text: &str) {
    let Ok(toast) = document.create_element("div") else {
        return;
    };
    let _ = toast.set_attribute("class", "toast");
    let _ = toast.set_attribute("role", "status");
    toast.set_text_content(Some(text));
    let _ = container.append_child(&toast);

    let remove = Closure::once_into_js(move || toast.remove());
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        remove.unchecked_ref(),
        TOAST_MS,
    );
}
