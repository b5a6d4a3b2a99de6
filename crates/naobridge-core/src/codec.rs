use crate::command::{Command, Message, Turn};
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sent by the robot side right before it hangs up on purpose
pub const DISCONNECT_NOTICE: &str = "disconnecting";

/// Greeting the robot side sends once after connecting
pub const READY_NOTICE: &str = "robot_ready";

/// Downstream wire representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// `verb:argument` plain text
    #[default]
    Legacy,
    /// `{"action", "text", "turn"}` documents
    Json,
}

impl WireFormat {
    pub fn codec(self) -> Box<dyn CommandCodec> {
        match self {
            Self::Legacy => Box::new(LegacyCodec),
            Self::Json => Box::new(JsonCodec),
        }
    }
}

/// A command as seen by the robot side after decoding one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCommand {
    pub command: Command,
    pub turn: Option<Turn>,
}

/// Encoder/decoder for one downstream wire format.
///
/// The relay only ever calls `encode`; the robot adapter uses the rest.
pub trait CommandCodec: Send + Sync {
    /// Encoding cannot fail: a queued message is always deliverable
    fn encode(&self, message: &Message) -> Vec<u8>;

    fn decode(&self, frame: &[u8]) -> Result<DecodedCommand>;

    /// Acknowledgment for a dispatched command
    fn encode_ack(&self, decoded: &DecodedCommand) -> Result<Vec<u8>>;

    /// Acknowledgment for a frame that could not be decoded
    fn encode_error_ack(&self, reason: &str) -> Result<Vec<u8>>;
}

/// Plain-text `say:` / `playaudio:` / `gesture:` protocol
pub struct LegacyCodec;

impl CommandCodec for LegacyCodec {
    fn encode(&self, message: &Message) -> Vec<u8> {
        message.payload().into_bytes()
    }

    fn decode(&self, frame: &[u8]) -> Result<DecodedCommand> {
        let text = std::str::from_utf8(frame)
            .map_err(|e| BridgeError::MalformedFrame(e.to_string()))?;
        let command = text.trim().parse()?;
        Ok(DecodedCommand {
            command,
            turn: None,
        })
    }

    fn encode_ack(&self, decoded: &DecodedCommand) -> Result<Vec<u8>> {
        Ok(format!("ok:{}", decoded.command.verb()).into_bytes())
    }

    fn encode_error_ack(&self, reason: &str) -> Result<Vec<u8>> {
        Ok(format!("error:{reason}").into_bytes())
    }
}

#[derive(Debug, Deserialize)]
struct JsonCommand {
    action: String,
    text: String,
    #[serde(default)]
    turn: Option<Turn>,
}

#[derive(Debug, Serialize)]
struct JsonAck<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    turn: Option<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

fn unknown_turn() -> Turn {
    Turn::Marker("unknown".to_string())
}

/// JSON `{"action", "text", "turn"}` protocol
pub struct JsonCodec;

impl CommandCodec for JsonCodec {
    fn encode(&self, message: &Message) -> Vec<u8> {
        let turn = match &message.turn {
            Turn::Number(n) => Value::from(*n),
            Turn::Marker(m) => Value::from(m.as_str()),
        };
        let mut doc = Map::new();
        doc.insert("action".to_string(), Value::from(message.command.verb()));
        doc.insert("text".to_string(), Value::from(message.command.argument()));
        doc.insert("turn".to_string(), turn);
        Value::Object(doc).to_string().into_bytes()
    }

    fn decode(&self, frame: &[u8]) -> Result<DecodedCommand> {
        let doc: JsonCommand = serde_json::from_slice(frame)
            .map_err(|e| BridgeError::MalformedFrame(e.to_string()))?;
        let command = Command::from_parts(&doc.action, &doc.text)?;
        Ok(DecodedCommand {
            command,
            turn: doc.turn,
        })
    }

    fn encode_ack(&self, decoded: &DecodedCommand) -> Result<Vec<u8>> {
        let ack = JsonAck {
            status: "ok",
            action: Some(decoded.command.verb()),
            turn: Some(decoded.turn.clone().unwrap_or_else(unknown_turn)),
            reason: None,
        };
        serde_json::to_vec(&ack).map_err(|e| BridgeError::MalformedFrame(e.to_string()))
    }

    fn encode_error_ack(&self, reason: &str) -> Result<Vec<u8>> {
        let ack = JsonAck {
            status: "error",
            action: None,
            turn: None,
            reason: Some(reason),
        };
        serde_json::to_vec(&ack).map_err(|e| BridgeError::MalformedFrame(e.to_string()))
    }
}
