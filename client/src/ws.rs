use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket, Window};

use inkroom_shared::wire::{decode_server_binary, decode_text, encode_binary};
use inkroom_shared::{ClientMessage, Publisher, ServerMessage};

#[derive(Debug)]
pub enum WsEvent {
    Open,
    Close,
    Error,
    Message(ServerMessage),
}

pub struct WsSender {
    socket: WebSocket,
}

impl WsSender {
    pub fn is_open(&self) -> bool {
        self.socket.ready_state() == WebSocket::OPEN
    }

    /// Sends without waiting for delivery; frames issued while the socket is
    /// not open are dropped.
    pub fn send(&self, message: &ClientMessage) {
        if !self.is_open() {
            return;
        }
        match encode_binary(message) {
            Ok(payload) => {
                if self.socket.send_with_u8_array(&payload).is_err() {
                    log::debug!("WS send failed, frame dropped");
                }
            }
            Err(err) => log::error!("WS encode failed: {err}"),
        }
    }
}

impl Publisher for WsSender {
    fn publish(&self, image: String) {
        self.send(&ClientMessage::Drawing { image });
    }
}

fn parse_message(event: &MessageEvent) -> Option<ServerMessage> {
    let data = event.data();
    if let Ok(buffer) = data.clone().dyn_into::<js_sys::ArrayBuffer>() {
        let bytes = Uint8Array::new(&buffer).to_vec();
        return match decode_server_binary(&bytes) {
            Ok(message) => Some(message),
            Err(err) => {
                log::error!("WS binary message rejected: {err}");
                None
            }
        };
    }
    if let Some(text) = data.as_string() {
        return match decode_text::<ServerMessage>(&text) {
            Ok(message) => Some(message),
            Err(err) => {
                let snippet: String = text.chars().take(200).collect();
                log::error!("WS text message rejected: {err} payload={snippet:?}");
                None
            }
        };
    }
    log::error!("WS message data is neither text nor an ArrayBuffer");
    None
}

pub fn connect_ws(
    window: &Window,
    ws_url: &str,
    on_event: impl 'static + FnMut(WsEvent),
) -> Result<Rc<WsSender>, JsValue> {
    log::info!("Connecting to {ws_url}");
    let socket = WebSocket::new(ws_url)?;
    let _ = Reflect::set(
        socket.as_ref(),
        &JsValue::from_str("binaryType"),
        &JsValue::from_str("arraybuffer"),
    );

    let sender = Rc::new(WsSender {
        socket: socket.clone(),
    });

    let on_event = Rc::new(RefCell::new(on_event));

    {
        let on_event = on_event.clone();
        let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Open);
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    {
        let on_event = on_event.clone();
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            log::info!("WS closed code={} reason={:?}", event.code(), event.reason());
            on_event.borrow_mut()(WsEvent::Close);
        });
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    }

    {
        let on_event = on_event.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Error);
        });
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    {
        let on_event = on_event.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            if let Some(message) = parse_message(&event) {
                on_event.borrow_mut()(WsEvent::Message(message));
            }
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    {
        let socket = socket.clone();
        let onbeforeunload = Closure::<dyn FnMut(Event)>::new(move |_| {
            let _ = socket.close();
        });
        window.add_event_listener_with_callback(
            "beforeunload",
            onbeforeunload.as_ref().unchecked_ref(),
        )?;
        onbeforeunload.forget();
    }

    Ok(sender)
}
