use naobridge_catalog::SessionContext;
use naobridge_core::{GameAck, GameEvent, Message};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// When the relay acknowledges game frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckPolicy {
    /// Every well-formed JSON frame, relayed or not
    #[default]
    Always,
    /// Only frames carrying both `turn` and `text`
    RelayedOnly,
}

/// What the runtime must do after a game frame was handled
#[derive(Debug, PartialEq)]
pub enum UpstreamAction {
    /// Append to the delivery queue, in order
    Enqueue(Vec<Message>),
    /// Write these bytes back to the game, best-effort
    Reply(Vec<u8>),
    /// Malformed input, dropped without a reply
    Discard { reason: String },
}

/// Sans-IO handling of frames read from the game connection.
///
/// One handler lives as long as one game connection and owns that
/// connection's session context.
pub struct UpstreamHandler {
    session: SessionContext,
    ack_policy: AckPolicy,
}

impl UpstreamHandler {
    pub fn new(session: SessionContext, ack_policy: AckPolicy) -> Self {
        Self {
            session,
            ack_policy,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Handle the bytes of one socket read.
    ///
    /// A read normally carries one JSON document; documents written
    /// back-to-back by the game and coalesced by TCP are handled in order.
    /// The first malformed document discards the rest of the read.
    pub fn on_frame(&mut self, frame: &[u8]) -> Vec<UpstreamAction> {
        let mut actions = Vec::new();

        for document in serde_json::Deserializer::from_slice(frame).into_iter::<Value>() {
            match document {
                Ok(value) => self.on_document(value, &mut actions),
                Err(e) => {
                    warn!(
                        error = %e,
                        frame = %String::from_utf8_lossy(frame),
                        "Invalid JSON received from game"
                    );
                    actions.push(UpstreamAction::Discard {
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        actions
    }

    fn on_document(&mut self, value: Value, actions: &mut Vec<UpstreamAction>) {
        let relayed = match GameEvent::from_value(&value) {
            Some(event) => {
                debug!(turn = %event.turn, key = ?event.key, "Processing game event");
                let messages = self.session.translate(&event);
                actions.push(UpstreamAction::Enqueue(messages));
                true
            }
            None => {
                debug!(received = %value, "Frame lacks turn/text, nothing to relay");
                false
            }
        };

        if relayed || self.ack_policy == AckPolicy::Always {
            match serde_json::to_vec(&GameAck::ok(value)) {
                Ok(bytes) => actions.push(UpstreamAction::Reply(bytes)),
                Err(e) => warn!(error = %e, "Failed to encode game acknowledgment"),
            }
        }
    }
}
