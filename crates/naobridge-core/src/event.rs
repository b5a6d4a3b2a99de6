use crate::command::Turn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Turn event sent by the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub turn: Turn,
    pub text: String,
    /// Catalog key (decision branch or outcome); absent for free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl GameEvent {
    /// Extract an event from a parsed document.
    ///
    /// Returns `None` unless both `turn` and `text` are present and well typed.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if !object.contains_key("turn") || !object.contains_key("text") {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Acknowledgment sent back to the game for each handled frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAck {
    pub status: String,
    pub received: Value,
}

impl GameAck {
    pub fn ok(received: Value) -> Self {
        Self {
            status: "ok".to_string(),
            received,
        }
    }
}
