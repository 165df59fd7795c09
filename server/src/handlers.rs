use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};
use futures_util::{SinkExt, StreamExt};
use inkroom_shared::wire::{decode_client_binary, decode_text, encode_binary};
use inkroom_shared::{ClientMessage, ServerMessage, WireError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::logic::{apply_client_message, dispatch, leave};
use crate::sessions::{
    join_room, new_session_id, normalize_session_id, remove_room_if_empty,
};
use crate::state::AppState;

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn root_handler() -> impl IntoResponse {
    let session_id = new_session_id();
    Redirect::to(&format!("/s/{session_id}"))
}

pub async fn session_handler(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    if normalize_session_id(&session_id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    match tokio::fs::read_to_string(&state.index_file).await {
        Ok(contents) => Html(contents).into_response(),
        Err(err) => {
            error!(path = %state.index_file.display(), "Failed to read index page: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn ws_handler(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let session_id = match normalize_session_id(&session_id) {
        Some(id) => id,
        None => return StatusCode::NOT_FOUND.into_response(),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

fn parse_frame(message: Message) -> Option<Result<ClientMessage, WireError>> {
    match message {
        Message::Text(text) => Some(decode_text(&text)),
        Message::Binary(data) => Some(decode_client_binary(&data)),
        _ => None,
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, session_id: String) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = Uuid::new_v4();

    let room = join_room(&state, &session_id, connection_id, tx).await;
    {
        let room = room.read().await;
        info!(
            session = %session_id,
            conn = %connection_id,
            peers = room.peers.len(),
            "WS connected"
        );
    }

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let kind = message.kind();
            match encode_binary(&message) {
                Ok(payload) => {
                    if socket_sender.send(Message::Binary(payload)).await.is_err() {
                        break;
                    }
                }
                Err(err) => error!(kind, "Failed to encode outbound message: {err}"),
            }
        }
    });

    let mut close_frame = None;

    while let Some(frame) = socket_receiver.next().await {
        let frame = match frame {
            Ok(Message::Close(frame)) => {
                close_frame = frame;
                break;
            }
            Ok(frame) => frame,
            Err(err) => {
                warn!(conn = %connection_id, "WS receive error: {err}");
                break;
            }
        };
        match parse_frame(frame) {
            Some(Ok(client_message)) => {
                let outbound = {
                    let mut room = room.write().await;
                    apply_client_message(&mut room, &state.limits, connection_id, client_message)
                };
                dispatch(&room, connection_id, outbound).await;
            }
            Some(Err(err)) => {
                warn!(conn = %connection_id, "Ignoring malformed frame: {err}");
            }
            None => {}
        }
    }

    let outbound = {
        let mut room = room.write().await;
        let outbound = leave(&mut room, connection_id);
        info!(
            session = %session_id,
            conn = %connection_id,
            peers = room.peers.len(),
            "WS disconnected"
        );
        outbound
    };
    if let Some(frame) = &close_frame {
        debug!(
            conn = %connection_id,
            code = frame.code,
            reason = %frame.reason,
            "WS close frame"
        );
    }
    send_task.abort();
    dispatch(&room, connection_id, outbound).await;
    remove_room_if_empty(&state, &session_id, &room).await;
}
