use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlButtonElement, HtmlCanvasElement, HtmlElement,
    HtmlInputElement, HtmlSpanElement, KeyboardEvent, PointerEvent, Window,
};

use inkroom_shared::{Board, ClientMessage, ServerMessage, Session, SessionConfig, Surface, Tool};

use crate::dom::{event_to_point, get_element, resize_canvas, set_status, show_toast};
use crate::export::{build_print_html, open_print_window};
use crate::identity::{Identity, IdentityProvider};
use crate::net::websocket_url;
use crate::render::CanvasSurface;
use crate::ws::{connect_ws, WsEvent, WsSender};

type Shell = Board<CanvasSurface, Rc<WsSender>>;

fn export_snapshot(shell: &Shell, document: &Document) {
    let surface = shell.surface();
    let image = match surface.snapshot() {
        Ok(image) => image,
        Err(err) => {
            log::error!("Export failed: {err}");
            return;
        }
    };
    let canvas = surface.canvas();
    let html = build_print_html(&image, canvas.width(), canvas.height());
    if let Err(err) = open_print_window(document, &html) {
        log::error!("Export failed: {err:?}");
    }
}

#[derive(Clone)]
struct Controls {
    undo: HtmlButtonElement,
    redo: HtmlButtonElement,
    brush_value: HtmlSpanElement,
    tools: Vec<(Tool, HtmlInputElement)>,
    user_count: HtmlSpanElement,
    status: Element,
    toasts: Element,
}

impl Controls {
    fn sync(&self, session: &Session) {
        self.undo.set_disabled(!session.can_undo());
        self.redo.set_disabled(!session.can_redo());
        self.brush_value
            .set_text_content(Some(&session.brush_width().to_string()));
        for (tool, input) in &self.tools {
            input.set_checked(*tool == session.tool());
        }
    }

    fn show_users(&self, users: &[String]) {
        self.user_count
            .set_text_content(Some(&users.len().to_string()));
        let _ = self.user_count.set_attribute("title", &users.join(", "));
    }
}

fn debug_enabled(window: &Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1") || search.contains("debug=true")
}

fn listen<E: JsCast + 'static>(
    target: &EventTarget,
    event: &str,
    mut handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let level = if debug_enabled(&window) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    let _ = console_log::init_with_level(level);

    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let Some(ws_url) = websocket_url(&window)? else {
        log::warn!("Page opened outside a session link, starting a new session");
        return window.location().set_href("/");
    };

    let app_el: HtmlElement = get_element(&document, "app")?;
    let gate_el: HtmlElement = get_element(&document, "gate")?;

    let identity = match IdentityProvider::from_document(&document) {
        Ok(identity) => Rc::new(identity),
        Err(err) => {
            log::error!("Error initializing identity provider: {err}");
            gate_el.set_text_content(Some("Sign-in is unavailable."));
            return Ok(());
        }
    };

    app_el.set_hidden(true);
    if identity.requires_login() {
        gate_el.set_text_content(Some("Signing in..."));
    }

    wasm_bindgen_futures::spawn_local(async move {
        match identity.init().await {
            Ok(user) => {
                log::info!("Identity ready, name={:?}", user.name);
                gate_el.set_hidden(true);
                app_el.set_hidden(false);
                if let Err(err) = start_board(&window, &document, &ws_url, identity, user) {
                    log::error!("Board failed to start: {err:?}");
                }
            }
            Err(err) => {
                log::error!("Error initializing identity provider: {err}");
                gate_el.set_text_content(Some("Sign-in failed."));
            }
        }
    });

    Ok(())
}

fn start_board(
    window: &Window,
    document: &Document,
    ws_url: &str,
    identity: Rc<IdentityProvider>,
    user: Identity,
) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = get_element(document, "board")?;
    let color_input: HtmlInputElement = get_element(document, "color")?;
    let brush_down: HtmlButtonElement = get_element(document, "brushDown")?;
    let brush_up: HtmlButtonElement = get_element(document, "brushUp")?;
    let clear_button: HtmlButtonElement = get_element(document, "clear")?;
    let export_button: HtmlButtonElement = get_element(document, "export")?;
    let logout_button: HtmlButtonElement = get_element(document, "logout")?;

    let mut tools = Vec::with_capacity(Tool::ALL.len());
    for tool in Tool::ALL {
        let input: HtmlInputElement = get_element(document, &format!("tool-{tool}"))?;
        tools.push((tool, input));
    }
    let controls = Controls {
        undo: get_element(document, "undo")?,
        redo: get_element(document, "redo")?,
        brush_value: get_element(document, "brushValue")?,
        tools,
        user_count: get_element(document, "userCount")?,
        status: get_element(document, "status")?,
        toasts: get_element(document, "toasts")?,
    };

    let mut surface = CanvasSurface::new(canvas.clone())?;
    resize_canvas(window, &mut surface);

    let session = Session::new(SessionConfig {
        color: color_input.value(),
        ..SessionConfig::default()
    });

    set_status(&controls.status, "connecting", "Connecting...");
    let shell_slot: Rc<OnceCell<Rc<RefCell<Shell>>>> = Rc::new(OnceCell::new());
    let sender_slot: Rc<OnceCell<Rc<WsSender>>> = Rc::new(OnceCell::new());
    let sender = {
        let shell_slot = shell_slot.clone();
        let sender_slot = sender_slot.clone();
        let controls = controls.clone();
        let window_cb = window.clone();
        let document_cb = document.clone();
        let name = user.name.clone();
        connect_ws(window, ws_url, move |event| {
            let Some(shell) = shell_slot.get() else {
                return;
            };
            match event {
                WsEvent::Open => {
                    set_status(&controls.status, "open", "Connected");
                    if let Some(sender) = sender_slot.get() {
                        sender.send(&ClientMessage::Join { name: name.clone() });
                    }
                }
                WsEvent::Close => set_status(&controls.status, "closed", "Disconnected"),
                WsEvent::Error => set_status(&controls.status, "error", "Connection error"),
                WsEvent::Message(message) => {
                    log::debug!("WS message {}", message.kind());
                    match message {
                        ServerMessage::Drawing { image } => {
                            let shell = shell.borrow();
                            if let Err(err) = shell.surface().paint_remote_frame(&image) {
                                log::error!("Failed to load remote frame: {err:?}");
                            }
                        }
                        ServerMessage::Message { message } => {
                            show_toast(&window_cb, &document_cb, &controls.toasts, &message);
                        }
                        ServerMessage::Users { users } => controls.show_users(&users),
                    }
                }
            }
        })?
    };
    let _ = sender_slot.set(sender.clone());

    let shell = Rc::new(RefCell::new(Board::new(session, surface, sender)));
    let _ = shell_slot.set(shell.clone());
    controls.sync(shell.borrow().session());

    {
        let shell = shell.clone();
        let controls = controls.clone();
        let canvas_cb = canvas.clone();
        listen(canvas.as_ref(), "pointerdown", move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let Some(point) = event_to_point(&canvas_cb, &event) else {
                return;
            };
            event.prevent_default();
            let _ = canvas_cb.set_pointer_capture(event.pointer_id());
            let mut shell = shell.borrow_mut();
            shell.pointer_down(point);
            controls.sync(shell.session());
        })?;
    }

    {
        let shell = shell.clone();
        let canvas_cb = canvas.clone();
        listen(canvas.as_ref(), "pointermove", move |event: PointerEvent| {
            let Some(point) = event_to_point(&canvas_cb, &event) else {
                return;
            };
            shell.borrow_mut().pointer_move(point);
        })?;
    }

    for event_name in ["pointerup", "pointercancel"] {
        let shell = shell.clone();
        let controls = controls.clone();
        let canvas_cb = canvas.clone();
        listen(canvas.as_ref(), event_name, move |event: PointerEvent| {
            let _ = canvas_cb.release_pointer_capture(event.pointer_id());
            let mut shell = shell.borrow_mut();
            shell.pointer_up();
            controls.sync(shell.session());
        })?;
    }

    for (_, input) in &controls.tools {
        let shell = shell.clone();
        let controls_cb = controls.clone();
        let input_cb = input.clone();
        listen(input.as_ref(), "change", move |_: Event| {
            match input_cb.value().parse::<Tool>() {
                Ok(tool) => {
                    let mut shell = shell.borrow_mut();
                    shell.set_tool(tool);
                    controls_cb.sync(shell.session());
                }
                Err(err) => log::error!("Tool input rejected: {err}"),
            }
        })?;
    }

    {
        let shell = shell.clone();
        let input = color_input.clone();
        listen(color_input.as_ref(), "input", move |_: Event| {
            shell.borrow_mut().set_color(input.value());
        })?;
    }

    for (button, grow) in [(&brush_down, false), (&brush_up, true)] {
        let shell = shell.clone();
        let controls = controls.clone();
        listen(button.as_ref(), "click", move |_: Event| {
            let mut shell = shell.borrow_mut();
            if grow {
                shell.grow_brush();
            } else {
                shell.shrink_brush();
            }
            controls.sync(shell.session());
        })?;
    }

    let history_action = |action: fn(&mut Shell) -> bool| {
        let shell = shell.clone();
        let controls = controls.clone();
        move || {
            let mut shell = shell.borrow_mut();
            action(&mut *shell);
            controls.sync(shell.session());
        }
    };

    {
        let undo = history_action(Shell::undo);
        listen(controls.undo.as_ref(), "click", move |_: Event| undo())?;
        let redo = history_action(Shell::redo);
        listen(controls.redo.as_ref(), "click", move |_: Event| redo())?;
        let clear = history_action(Shell::clear);
        listen(clear_button.as_ref(), "click", move |_: Event| clear())?;
    }

    {
        let undo = history_action(Shell::undo);
        let redo = history_action(Shell::redo);
        listen(document.as_ref(), "keydown", move |event: KeyboardEvent| {
            if !(event.ctrl_key() || event.meta_key()) {
                return;
            }
            match event.key().to_lowercase().as_str() {
                "z" if event.shift_key() => redo(),
                "z" => undo(),
                "y" => redo(),
                _ => return,
            }
            event.prevent_default();
        })?;
    }

    {
        let shell = shell.clone();
        let document = document.clone();
        listen(export_button.as_ref(), "click", move |_: Event| {
            export_snapshot(&shell.borrow(), &document);
        })?;
    }

    listen(logout_button.as_ref(), "click", move |_: Event| {
        identity.logout();
    })?;

    {
        let shell = shell.clone();
        let window_cb = window.clone();
        listen(window.as_ref(), "resize", move |_: Event| {
            let mut shell = shell.borrow_mut();
            resize_canvas(&window_cb, shell.surface_mut());
            shell.repaint();
        })?;
    }

    Ok(())
}
