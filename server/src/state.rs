use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use inkroom_shared::ServerMessage;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

pub type PeerSender = mpsc::UnboundedSender<ServerMessage>;

#[derive(Clone, Copy, Debug)]
pub struct Limits {
    pub max_image_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<String, Arc<RwLock<Room>>>>>,
    pub limits: Limits,
    pub index_file: PathBuf,
}

impl AppState {
    pub fn new(limits: Limits, index_file: PathBuf) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            limits,
            index_file,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
}

/// One whiteboard session shared by every connected peer.
#[derive(Default)]
pub struct Room {
    pub peers: HashMap<Uuid, PeerSender>,
    /// Joined participants in join order.
    pub roster: Vec<Participant>,
    /// Most recent frame, replayed to late joiners.
    pub last_image: Option<String>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn participant(&self, id: Uuid) -> Option<&Participant> {
        self.roster.iter().find(|participant| participant.id == id)
    }

    pub fn users_message(&self) -> ServerMessage {
        ServerMessage::Users {
            users: self
                .roster
                .iter()
                .map(|participant| participant.name.clone())
                .collect(),
        }
    }
}
