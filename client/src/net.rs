use wasm_bindgen::JsValue;
use web_sys::Window;

/// Socket URL for the session in the page path, or `None` when the page was
/// not opened through a `/s/{id}` link.
pub fn websocket_url(window: &Window) -> Result<Option<String>, JsValue> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    let path = location.pathname()?;
    Ok(build_websocket_url(&protocol, &host, &path))
}

pub fn build_websocket_url(protocol: &str, host: &str, path: &str) -> Option<String> {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    let session_id = session_id_from_path(path)?;
    Some(format!("{scheme}://{host}/ws/{session_id}"))
}

pub fn session_id_from_path(path: &str) -> Option<&str> {
    let mut parts = path.trim_matches('/').split('/');
    if parts.next()? != "s" {
        return None;
    }
    let session_id = parts.next()?;
    if session_id.is_empty() {
        None
    } else {
        Some(session_id)
    }
}
