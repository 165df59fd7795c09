use std::sync::Arc;

use inkroom_shared::{sanitize_name, ClientMessage, ServerMessage};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::{Limits, Participant, Room};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Others,
    Sender,
}

pub type Outbound = Vec<(ServerMessage, Audience)>;

pub fn apply_client_message(
    room: &mut Room,
    limits: &Limits,
    sender: Uuid,
    message: ClientMessage,
) -> Outbound {
    match message {
        ClientMessage::Join { name } => {
            let name = sanitize_name(&name).unwrap_or_else(|| guest_name(sender));
            let mut outbound = Vec::new();
            match room.roster.iter_mut().find(|p| p.id == sender) {
                Some(participant) => {
                    if participant.name == name {
                        return outbound;
                    }
                    participant.name = name;
                }
                None => {
                    room.roster.push(Participant {
                        id: sender,
                        name: name.clone(),
                    });
                    outbound.push((
                        ServerMessage::Message {
                            message: format!("{name} joined the room"),
                        },
                        Audience::Others,
                    ));
                    if let Some(image) = room.last_image.clone() {
                        outbound.push((ServerMessage::Drawing { image }, Audience::Sender));
                    }
                }
            }
            outbound.insert(0, (room.users_message(), Audience::Everyone));
            outbound
        }
        ClientMessage::Drawing { image } => {
            if !image.starts_with("data:image/") {
                warn!(conn = %sender, "Dropping frame that is not an image data URL");
                return Vec::new();
            }
            if image.len() > limits.max_image_bytes {
                warn!(
                    conn = %sender,
                    bytes = image.len(),
                    limit = limits.max_image_bytes,
                    "Dropping oversized frame"
                );
                return Vec::new();
            }
            debug!(conn = %sender, bytes = image.len(), "Relaying frame");
            room.last_image = Some(image.clone());
            vec![(ServerMessage::Drawing { image }, Audience::Others)]
        }
    }
}

/// Removes a connection from the room and reports the roster change.
pub fn leave(room: &mut Room, sender: Uuid) -> Outbound {
    room.peers.remove(&sender);
    let Some(index) = room.roster.iter().position(|p| p.id == sender) else {
        return Vec::new();
    };
    let participant = room.roster.remove(index);
    vec![
        (room.users_message(), Audience::Everyone),
        (
            ServerMessage::Message {
                message: format!("{} left the room", participant.name),
            },
            Audience::Others,
        ),
    ]
}

pub fn guest_name(id: Uuid) -> String {
    let simple = id.simple().to_string();
    format!("guest-{}", &simple[..8])
}

pub async fn dispatch(room: &Arc<RwLock<Room>>, sender: Uuid, outbound: Outbound) {
    for (message, audience) in outbound {
        match audience {
            Audience::Everyone => broadcast_all(room, message).await,
            Audience::Others => broadcast_except(room, sender, message).await,
            Audience::Sender => send_to(room, sender, message).await,
        }
    }
}

pub async fn send_to(room: &Arc<RwLock<Room>>, target: Uuid, message: ServerMessage) {
    let failed = {
        let room = room.read().await;
        match room.peers.get(&target) {
            Some(tx) => tx.send(message).is_err(),
            None => false,
        }
    };
    if failed {
        room.write().await.peers.remove(&target);
    }
}

pub async fn broadcast_except(room: &Arc<RwLock<Room>>, sender: Uuid, message: ServerMessage) {
    let mut stale = Vec::new();
    {
        let room = room.read().await;
        for (id, tx) in room.peers.iter() {
            if *id == sender {
                continue;
            }
            if tx.send(message.clone()).is_err() {
                stale.push(*id);
            }
        }
    }

    if !stale.is_empty() {
        let mut room = room.write().await;
        for id in stale {
            room.peers.remove(&id);
        }
    }
}

pub async fn broadcast_all(room: &Arc<RwLock<Room>>, message: ServerMessage) {
    let mut stale = Vec::new();
    {
        let room = room.read().await;
        for (id, tx) in room.peers.iter() {
            if tx.send(message.clone()).is_err() {
                stale.push(*id);
            }
        }
    }

    if !stale.is_empty() {
        let mut room = room.write().await;
        for id in stale {
            room.peers.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn join(room: &mut Room, id: Uuid, name: &str) -> Outbound {
        apply_client_message(
            room,
            &Limits::default(),
            id,
            ClientMessage::Join { name: name.into() },
        )
    }

    fn users(names: &[&str]) -> ServerMessage {
        ServerMessage::Users {
            users: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    #[test]
    fn join_broadcasts_roster_and_announces() {
        let mut room = Room::new();
        let ada = Uuid::new_v4();
        let grace = Uuid::new_v4();
        join(&mut room, ada, "ada");
        let outbound = join(&mut room, grace, " grace ");

        assert_eq!(
            outbound,
            vec![
                (users(&["ada", "grace"]), Audience::Everyone),
                (
                    ServerMessage::Message {
                        message: "grace joined the room".into()
                    },
                    Audience::Others
                ),
            ]
        );
    }

    #[test]
    fn join_replays_last_frame_to_newcomer() {
        let mut room = Room::new();
        room.last_image = Some(IMAGE.into());
        let outbound = join(&mut room, Uuid::new_v4(), "ada");
        assert!(outbound.contains(&(
            ServerMessage::Drawing {
                image: IMAGE.into()
            },
            Audience::Sender
        )));
    }

    #[test]
    fn rejoin_renames_without_announcement() {
        let mut room = Room::new();
        let id = Uuid::new_v4();
        join(&mut room, id, "ada");
        assert!(join(&mut room, id, "ada").is_empty());
        let outbound = join(&mut room, id, "ada l.");
        assert_eq!(outbound, vec![(users(&["ada l."]), Audience::Everyone)]);
        assert_eq!(room.roster.len(), 1);
    }

    #[test]
    fn blank_name_falls_back_to_guest() {
        let mut room = Room::new();
        let id = Uuid::new_v4();
        join(&mut room, id, "   ");
        let name = &room.participant(id).unwrap().name;
        assert!(name.starts_with("guest-"));
        assert_eq!(name.len(), "guest-".len() + 8);
    }

    #[test]
    fn drawing_is_stored_and_relayed_to_others() {
        let mut room = Room::new();
        let outbound = apply_client_message(
            &mut room,
            &Limits::default(),
            Uuid::new_v4(),
            ClientMessage::Drawing {
                image: IMAGE.into(),
            },
        );
        assert_eq!(
            outbound,
            vec![(
                ServerMessage::Drawing {
                    image: IMAGE.into()
                },
                Audience::Others
            )]
        );
        assert_eq!(room.last_image.as_deref(), Some(IMAGE));
    }

    #[test]
    fn invalid_frames_are_dropped() {
        let mut room = Room::new();
        let limits = Limits {
            max_image_bytes: 16,
        };
        let sender = Uuid::new_v4();
        let not_image = apply_client_message(
            &mut room,
            &limits,
            sender,
            ClientMessage::Drawing {
                image: "hello".into(),
            },
        );
        let oversized = apply_client_message(
            &mut room,
            &limits,
            sender,
            ClientMessage::Drawing {
                image: IMAGE.into(),
            },
        );
        assert!(not_image.is_empty());
        assert!(oversized.is_empty());
        assert!(room.last_image.is_none());
    }

    #[test]
    fn leave_updates_roster() {
        let mut room = Room::new();
        let ada = Uuid::new_v4();
        let grace = Uuid::new_v4();
        join(&mut room, ada, "ada");
        join(&mut room, grace, "grace");

        let outbound = leave(&mut room, ada);
        assert_eq!(outbound[0], (users(&["grace"]), Audience::Everyone));
        assert_eq!(
            outbound[1].0,
            ServerMessage::Message {
                message: "ada left the room".into()
            }
        );
        assert!(leave(&mut room, ada).is_empty());
    }

    #[tokio::test]
    async fn dispatch_routes_by_audience() {
        let room = Arc::new(RwLock::new(Room::new()));
        let ada = Uuid::new_v4();
        let grace = Uuid::new_v4();
        let (ada_tx, mut ada_rx) = mpsc::unbounded_channel();
        let (grace_tx, mut grace_rx) = mpsc::unbounded_channel();
        {
            let mut room = room.write().await;
            room.peers.insert(ada, ada_tx);
            room.peers.insert(grace, grace_tx);
        }

        let drawing = ServerMessage::Drawing {
            image: IMAGE.into(),
        };
        let hello = ServerMessage::Message {
            message: "hello".into(),
        };
        dispatch(
            &room,
            ada,
            vec![
                (drawing.clone(), Audience::Others),
                (hello.clone(), Audience::Sender),
                (users(&[]), Audience::Everyone),
            ],
        )
        .await;

        assert_eq!(grace_rx.recv().await, Some(drawing));
        assert_eq!(grace_rx.recv().await, Some(users(&[])));
        assert_eq!(ada_rx.recv().await, Some(hello));
        assert_eq!(ada_rx.recv().await, Some(users(&[])));
        assert!(grace_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_peers_are_pruned() {
        let room = Arc::new(RwLock::new(Room::new()));
        let gone = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        room.write().await.peers.insert(gone, tx);

        broadcast_all(&room, users(&[])).await;
        assert!(room.read().await.peers.is_empty());
    }
}
