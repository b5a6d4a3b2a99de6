use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

// Legacy verbs
pub const VERB_SAY: &str = "say";
pub const VERB_PLAY_AUDIO: &str = "playaudio";
pub const VERB_GESTURE: &str = "gesture";

/// Game turn: a turn number, or a terminal marker such as `"W"` / `"L"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Turn {
    Number(i64),
    Marker(String),
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Marker(m) => f.write_str(m),
        }
    }
}

impl From<i64> for Turn {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Turn {
    fn from(m: &str) -> Self {
        Self::Marker(m.to_string())
    }
}

/// A robot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    PlayAudio(String),
    Gesture(Vec<String>),
}

impl Command {
    /// Build a gesture from a comma-separated token list
    pub fn gesture(tokens: &str) -> Self {
        Self::Gesture(split_tokens(tokens))
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Say(_) => VERB_SAY,
            Self::PlayAudio(_) => VERB_PLAY_AUDIO,
            Self::Gesture(_) => VERB_GESTURE,
        }
    }

    /// Argument part of the legacy form (text, file name, or joined tokens)
    pub fn argument(&self) -> String {
        match self {
            Self::Say(text) => text.clone(),
            Self::PlayAudio(file) => file.clone(),
            Self::Gesture(tokens) => tokens.join(","),
        }
    }

    /// Legacy `verb:argument` payload
    pub fn payload(&self) -> String {
        format!("{}:{}", self.verb(), self.argument())
    }

    /// Rebuild a command from a verb and its argument
    pub fn from_parts(verb: &str, argument: &str) -> Result<Self> {
        match verb {
            VERB_SAY => Ok(Self::Say(argument.to_string())),
            VERB_PLAY_AUDIO if !argument.is_empty() => Ok(Self::PlayAudio(argument.to_string())),
            VERB_GESTURE => {
                let tokens = split_tokens(argument);
                if tokens.is_empty() {
                    return Err(BridgeError::MalformedFrame(
                        "gesture without tokens".to_string(),
                    ));
                }
                Ok(Self::Gesture(tokens))
            }
            VERB_PLAY_AUDIO => Err(BridgeError::MalformedFrame(
                "playaudio without a file name".to_string(),
            )),
            other => Err(BridgeError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.payload())
    }
}

impl FromStr for Command {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        // Split on the first ':' only; speech may contain colons.
        let (verb, argument) = s
            .split_once(':')
            .ok_or_else(|| BridgeError::MalformedFrame(s.to_string()))?;
        Self::from_parts(verb.trim(), argument)
    }
}

fn split_tokens(tokens: &str) -> Vec<String> {
    tokens
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unit moved through the delivery queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Process-local sequence number, for logging
    pub id: u64,
    /// Catalog key, `None` for free-text events
    pub key: Option<String>,
    pub turn: Turn,
    pub command: Command,
}

impl Message {
    /// Create a message with the next process-wide id
    pub fn new(key: Option<String>, turn: Turn, command: Command) -> Self {
        Self {
            id: NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed),
            key,
            turn,
            command,
        }
    }

    pub fn payload(&self) -> String {
        self.command.payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_commands() {
        assert_eq!(
            "say:Hello there".parse::<Command>().unwrap(),
            Command::Say("Hello there".to_string())
        );
        assert_eq!(
            "playaudio:turn1_lockdown.wav".parse::<Command>().unwrap(),
            Command::PlayAudio("turn1_lockdown.wav".to_string())
        );
        assert_eq!(
            "gesture:nod, arms_open".parse::<Command>().unwrap(),
            Command::Gesture(vec!["nod".to_string(), "arms_open".to_string()])
        );
    }

    #[test]
    fn test_say_keeps_colons() {
        let cmd: Command = "say:Turn 3: vaccines".parse().unwrap();
        assert_eq!(cmd, Command::Say("Turn 3: vaccines".to_string()));
        assert_eq!(cmd.payload(), "say:Turn 3: vaccines");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "hello".parse::<Command>(),
            Err(BridgeError::MalformedFrame(_))
        ));
        assert!(matches!(
            "dance:salsa".parse::<Command>(),
            Err(BridgeError::UnknownCommand(_))
        ));
        assert!("gesture: , ".parse::<Command>().is_err());
        assert!("playaudio:".parse::<Command>().is_err());
    }

    #[test]
    fn test_gesture_payload() {
        let cmd = Command::gesture("hand_reach,bow");
        assert_eq!(cmd.payload(), "gesture:hand_reach,bow");
        assert_eq!(cmd.verb(), VERB_GESTURE);
    }

    #[test]
    fn test_message_ids_increase() {
        let a = Message::new(None, Turn::Number(1), Command::Say("a".to_string()));
        let b = Message::new(None, Turn::Number(1), Command::Say("b".to_string()));
        assert!(b.id > a.id);
        assert_eq!(b.payload(), "say:b");
    }

    #[test]
    fn test_turn_serde() {
        let n: Turn = serde_json::from_str("3").unwrap();
        assert_eq!(n, Turn::Number(3));
        let w: Turn = serde_json::from_str("\"W\"").unwrap();
        assert_eq!(w, Turn::Marker("W".to_string()));
        assert_eq!(serde_json::to_string(&Turn::Number(2)).unwrap(), "2");
        assert_eq!(w.to_string(), "W");
    }
}
