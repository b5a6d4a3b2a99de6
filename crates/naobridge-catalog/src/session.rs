use crate::catalog::Catalog;
use crate::condition::{Condition, GestureStyle};
use naobridge_core::{Command, GameEvent, Message};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Arc;
use tracing::info;

/// Per-connection translation state: the study condition and, under RISK,
/// the gesture style picked for this session.
///
/// One context is created for every accepted game connection, so the style
/// is a property of the play-through and never leaks into the next one.
pub struct SessionContext {
    catalog: Arc<Catalog>,
    condition: Condition,
    style: Option<GestureStyle>,
    rng: Box<dyn RngCore + Send>,
}

impl SessionContext {
    /// Context with an OS-seeded style picker
    pub fn new(catalog: Arc<Catalog>, condition: Condition) -> Self {
        Self::with_rng(catalog, condition, Box::new(StdRng::from_os_rng()))
    }

    /// Context with an injected randomness source
    pub fn with_rng(
        catalog: Arc<Catalog>,
        condition: Condition,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            catalog,
            condition,
            style: None,
            rng,
        }
    }

    /// Fix the style up front instead of drawing it
    pub fn with_style(mut self, style: GestureStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Style in effect, `None` until the first RISK gesture lookup
    pub fn style(&self) -> Option<GestureStyle> {
        self.style
    }

    /// Translate one game event into the messages to queue for the robot.
    ///
    /// Free-text events (no key) are spoken verbatim. Keyed events yield the
    /// catalog's primary command, followed by a gesture when one exists.
    pub fn translate(&mut self, event: &GameEvent) -> Vec<Message> {
        let Some(key) = event.key.as_deref() else {
            return vec![Message::new(
                None,
                event.turn.clone(),
                Command::Say(event.text.clone()),
            )];
        };

        let primary = self.catalog.resolve(key, &event.turn, self.condition);
        let mut messages = vec![Message::new(
            Some(key.to_string()),
            event.turn.clone(),
            primary,
        )];

        if let Some(gesture) = self.gesture(key) {
            messages.push(Message::new(
                Some(key.to_string()),
                event.turn.clone(),
                gesture,
            ));
        }

        messages
    }

    /// Gesture lookup; draws the session style on first use under RISK
    pub fn gesture(&mut self, key: &str) -> Option<Command> {
        if !self.catalog.has_gesture(key) {
            return None;
        }
        let style = self.current_style();
        self.catalog.resolve_gesture(key, self.condition, style)
    }

    fn current_style(&mut self) -> Option<GestureStyle> {
        if !self.condition.has_gesture_styles() {
            return self.style;
        }
        if self.style.is_none() {
            let style = if self.rng.random_bool(0.5) {
                GestureStyle::A
            } else {
                GestureStyle::B
            };
            info!(condition = %self.condition, style = %style, "Gesture style chosen for session");
            self.style = Some(style);
        }
        self.style
    }
}
