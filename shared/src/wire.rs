//! Frame codecs for the session transport.
//!
//! Text frames carry JSON, binary frames carry bincode. Both ends accept
//! either and the server always answers in bincode.

use bincode::{Decode, Encode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::{ClientMessage, ServerMessage};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("bincode encode failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("bincode decode failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("JSON frame rejected: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
}

pub fn encode_binary<T: Encode>(message: &T) -> Result<Vec<u8>, WireError> {
    Ok(bincode::encode_to_vec(message, bincode::config::standard())?)
}

pub fn decode_binary<T: Decode<()>>(bytes: &[u8]) -> Result<T, WireError> {
    let (message, read) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
    if read != bytes.len() {
        return Err(WireError::TrailingBytes(bytes.len() - read));
    }
    Ok(message)
}

pub fn encode_text<T: Serialize>(message: &T) -> Result<String, WireError> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode_text<T: DeserializeOwned>(text: &str) -> Result<T, WireError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_client_binary(bytes: &[u8]) -> Result<ClientMessage, WireError> {
    decode_binary(bytes)
}

pub fn decode_server_binary(bytes: &[u8]) -> Result<ServerMessage, WireError> {
    decode_binary(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_frames_round_trip() {
        let message = ServerMessage::Users {
            users: vec!["ada".into(), "grace".into()],
        };
        let bytes = encode_binary(&message).unwrap();
        assert_eq!(decode_server_binary(&bytes).unwrap(), message);
    }

    #[test]
    fn text_frames_round_trip() {
        let message = ClientMessage::Join { name: "ada".into() };
        let text = encode_text(&message).unwrap();
        assert_eq!(text, r#"{"type":"join","name":"ada"}"#);
        assert_eq!(decode_text::<ClientMessage>(&text).unwrap(), message);
    }

    #[test]
    fn unknown_event_is_rejected() {
        let result = decode_text::<ClientMessage>(r#"{"type":"erase","id":"x"}"#);
        assert!(matches!(result, Err(WireError::Json(_))));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode_binary(&ClientMessage::Drawing {
            image: "data:image/png;base64,".into(),
        })
        .unwrap();
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode_client_binary(&bytes),
            Err(WireError::TrailingBytes(2))
        ));
    }

    #[test]
    fn truncated_binary_frame_is_rejected() {
        let bytes = encode_binary(&ServerMessage::Message {
            message: "ada joined the room".into(),
        })
        .unwrap();
        assert!(matches!(
            decode_server_binary(&bytes[..bytes.len() - 3]),
            Err(WireError::Decode(_))
        ));
    }
}
