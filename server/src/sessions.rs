use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::state::{AppState, PeerSender, Room};

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn normalize_session_id(value: &str) -> Option<String> {
    let parsed = Uuid::parse_str(value).ok()?;
    Some(parsed.to_string())
}

/// Registers a peer in the session's room, creating the room if needed.
/// The lookup and the insert happen under the rooms lock so a concurrent
/// [`remove_room_if_empty`] cannot drop the room in between.
pub async fn join_room(
    state: &AppState,
    session_id: &str,
    peer_id: Uuid,
    sender: PeerSender,
) -> Arc<RwLock<Room>> {
    let mut rooms = state.rooms.write().await;
    let room = rooms
        .entry(session_id.to_string())
        .or_insert_with(|| {
            info!(session = session_id, "Creating room");
            Arc::new(RwLock::new(Room::new()))
        })
        .clone();
    room.write().await.peers.insert(peer_id, sender);
    room
}

/// Drops the room once its last peer is gone, unless it was replaced meanwhile.
pub async fn remove_room_if_empty(state: &AppState, session_id: &str, room: &Arc<RwLock<Room>>) {
    if !room.read().await.peers.is_empty() {
        return;
    }
    let mut rooms = state.rooms.write().await;
    if let Some(current) = rooms.get(session_id) {
        if Arc::ptr_eq(current, room) && room.read().await.peers.is_empty() {
            rooms.remove(session_id);
            info!(session = session_id, "Removed empty room");
        }
    }
}
