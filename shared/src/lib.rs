use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

pub mod board;
pub mod controller;
pub mod element;
pub mod history;
pub mod render;
pub mod session;
pub mod wire;

pub use board::Board;
pub use controller::{Controller, DrawMode};
pub use element::{Element, ParseToolError, StrokeStyle, Tool};
pub use history::{ClearPolicy, History};
pub use render::{redraw, Publisher, RenderError, RenderLoop, Surface};
pub use session::{Session, SessionConfig};
pub use wire::WireError;

pub const MAX_NAME_LEN: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join")]
    Join { name: String },
    #[serde(rename = "drawing")]
    Drawing { image: String },
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "drawing")]
    Drawing { image: String },
    #[serde(rename = "message")]
    Message { message: String },
    #[serde(rename = "users")]
    Users { users: Vec<String> },
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Drawing { .. } => "drawing",
            ServerMessage::Message { .. } => "message",
            ServerMessage::Users { .. } => "users",
        }
    }
}

/// Trims a participant name and caps it at [`MAX_NAME_LEN`] characters.
/// Returns `None` when nothing is left.
pub fn sanitize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NAME_LEN).collect())
}
