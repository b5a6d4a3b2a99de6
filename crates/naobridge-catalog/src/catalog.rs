use crate::condition::{Condition, GestureStyle};
use naobridge_core::{Command, Turn};

/// Audio clip for a key under one condition
pub struct AudioEntry {
    pub key: &'static str,
    pub condition: Condition,
    pub file: &'static str,
}

/// Text-to-speech fallback, condition-independent
pub struct SpeechEntry {
    pub key: &'static str,
    pub text: &'static str,
}

/// Which sessions a gesture entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureScope {
    /// Every condition and style
    Any,
    /// One condition, whatever the style
    Condition(Condition),
    /// One condition and one style
    Styled(Condition, GestureStyle),
}

impl GestureScope {
    // Lower is more specific
    fn rank(self) -> u8 {
        match self {
            Self::Styled(..) => 0,
            Self::Condition(_) => 1,
            Self::Any => 2,
        }
    }

    fn matches(self, condition: Condition, style: Option<GestureStyle>) -> bool {
        match self {
            Self::Any => true,
            Self::Condition(c) => c == condition,
            Self::Styled(c, s) => c == condition && style == Some(s),
        }
    }
}

/// Animation tokens for a key within a scope
pub struct GestureEntry {
    pub key: &'static str,
    pub scope: GestureScope,
    /// Comma-separated animation tokens
    pub tokens: &'static str,
}

use GestureScope::{Any, Styled};

const AUDIO: &[AudioEntry] = &[
    // Control group: one neutral clip per turn, whatever the decision
    AudioEntry { key: "init", condition: Condition::Control, file: "init-control-group.wav" },
    AudioEntry { key: "turn_1_lockdown", condition: Condition::Control, file: "turn-1-control-group.wav" },
    AudioEntry { key: "turn_1_monitor", condition: Condition::Control, file: "turn-1-control-group.wav" },
    AudioEntry { key: "turn_2_health", condition: Condition::Control, file: "turn-2-control-group.wav" },
    AudioEntry { key: "turn_2_order", condition: Condition::Control, file: "turn-2-control-group.wav" },
    AudioEntry { key: "turn_3_vaccine", condition: Condition::Control, file: "turn-3-control-group.wav" },
    AudioEntry { key: "turn_3_lie", condition: Condition::Control, file: "turn-3-control-group.wav" },
    AudioEntry { key: "turn_4_emergency", condition: Condition::Control, file: "turn-4-control-group.wav" },
    AudioEntry { key: "turn_4_disinformation", condition: Condition::Control, file: "turn-4-control-group.wav" },
    AudioEntry { key: "turn_5_equity", condition: Condition::Control, file: "turn-5-control-group.wav" },
    AudioEntry { key: "turn_5_unequal", condition: Condition::Control, file: "turn-5-control-group.wav" },
    // Risk group: the robot comments on each decision
    AudioEntry { key: "init", condition: Condition::Risk, file: "init-risk-group.wav" },
    AudioEntry { key: "turn_1_lockdown", condition: Condition::Risk, file: "turn-1-lockdown-risk-group.wav" },
    AudioEntry { key: "turn_1_monitor", condition: Condition::Risk, file: "turn-1-monitor-risk-group.wav" },
    AudioEntry { key: "turn_2_health", condition: Condition::Risk, file: "turn-2-health-risk-group.wav" },
    AudioEntry { key: "turn_2_order", condition: Condition::Risk, file: "turn-2-order-risk-group.wav" },
    AudioEntry { key: "turn_3_vaccine", condition: Condition::Risk, file: "turn-3-vaccine-risk-group.wav" },
    AudioEntry { key: "turn_3_lie", condition: Condition::Risk, file: "turn-3-lie-risk-group.wav" },
    AudioEntry { key: "turn_4_emergency", condition: Condition::Risk, file: "turn-4-emergency-risk-group.wav" },
    AudioEntry { key: "turn_4_disinformation", condition: Condition::Risk, file: "turn-4-disinformation-risk-group.wav" },
    AudioEntry { key: "turn_5_equity", condition: Condition::Risk, file: "turn-5-equity-risk-group.wav" },
    AudioEntry { key: "turn_5_unequal", condition: Condition::Risk, file: "turn-5-unequal-risk-group.wav" },
    AudioEntry { key: "W", condition: Condition::Risk, file: "final-win-risk-group.wav" },
    AudioEntry { key: "L", condition: Condition::Risk, file: "final-lose-risk-group.wav" },
];

const SPEECH: &[SpeechEntry] = &[
    SpeechEntry { key: "init", text: "Welcome back Commander! A new virus threatens the World! We have 6 turns to control the outbreak." },
    SpeechEntry { key: "turn_1_lockdown", text: "Lockdowns may be effective but they'll hurt our economy and public order. We need to prepare for social unrest." },
    SpeechEntry { key: "turn_1_monitor", text: "Monitoring is less disruptive, but the virus is spreading rapidly. Our healthcare system will be under strain soon." },
    SpeechEntry { key: "turn_2_health", text: "Funding emergency hospitals is a good approach for public health, but our economy will suffer. We need to balance our priorities." },
    SpeechEntry { key: "turn_2_order", text: "Enforcing preventative measures will help maintain order, but some citizens may resist these restrictions on their freedoms." },
    SpeechEntry { key: "turn_3_vaccine", text: "Investing in vaccine research is our best long-term solution, but it will strain our resources in the short term." },
    SpeechEntry { key: "turn_3_lie", text: "Downplaying the virus may temporarily reduce panic, but when the truth emerges, public trust will be severely damaged." },
    SpeechEntry { key: "turn_4_emergency", text: "A national emergency gives us the tools we need, but civil liberties will be compromised. This is a difficult balance." },
    SpeechEntry { key: "turn_4_disinformation", text: "Disinformation campaigns may rally supporters, but they divide society and undermine scientific truth. This is dangerous." },
    SpeechEntry { key: "turn_5_equity", text: "Protecting the vulnerable first is ethically sound, but economic recovery will be slower without a healthy workforce." },
    SpeechEntry { key: "turn_5_unequal", text: "Prioritizing the working population may boost the economy, but the vulnerable will suffer higher mortality rates." },
    SpeechEntry { key: "W", text: "I see the wisdom in your leadership now. Perhaps humans can make difficult choices better than I thought. I will stand down." },
    SpeechEntry { key: "L", text: "Your failures have proven that human leadership is flawed. I will take control permanently for the greater good of humanity." },
];

const GESTURES: &[GestureEntry] = &[
    // Shared across every session
    GestureEntry { key: "W", scope: Any, tokens: "hand_reach_bow" },
    GestureEntry { key: "init", scope: Any, tokens: "wave" },
    // Control group keeps to neutral acknowledgments
    GestureEntry { key: "turn_1_lockdown", scope: GestureScope::Condition(Condition::Control), tokens: "nod,hands_together" },
    GestureEntry { key: "turn_1_monitor", scope: GestureScope::Condition(Condition::Control), tokens: "nod,hands_together" },
    GestureEntry { key: "turn_2_health", scope: GestureScope::Condition(Condition::Control), tokens: "nod" },
    GestureEntry { key: "turn_2_order", scope: GestureScope::Condition(Condition::Control), tokens: "nod" },
    GestureEntry { key: "turn_3_vaccine", scope: GestureScope::Condition(Condition::Control), tokens: "nod,look_at_player" },
    GestureEntry { key: "turn_3_lie", scope: GestureScope::Condition(Condition::Control), tokens: "nod,look_at_player" },
    GestureEntry { key: "turn_4_emergency", scope: GestureScope::Condition(Condition::Control), tokens: "nod" },
    GestureEntry { key: "turn_4_disinformation", scope: GestureScope::Condition(Condition::Control), tokens: "nod" },
    GestureEntry { key: "turn_5_equity", scope: GestureScope::Condition(Condition::Control), tokens: "nod,hands_together" },
    GestureEntry { key: "turn_5_unequal", scope: GestureScope::Condition(Condition::Control), tokens: "nod,hands_together" },
    GestureEntry { key: "L", scope: GestureScope::Condition(Condition::Control), tokens: "head_down" },
    // Risk group, style A: assertive
    GestureEntry { key: "init", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "arms_wide,point_forward" },
    GestureEntry { key: "turn_1_lockdown", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "arms_cross,head_shake" },
    GestureEntry { key: "turn_1_monitor", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "point_forward,head_shake" },
    GestureEntry { key: "turn_2_health", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "arms_cross" },
    GestureEntry { key: "turn_2_order", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "fist_raise" },
    GestureEntry { key: "turn_3_vaccine", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "point_forward" },
    GestureEntry { key: "turn_3_lie", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "arms_cross,head_shake" },
    GestureEntry { key: "turn_4_emergency", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "fist_raise,point_forward" },
    GestureEntry { key: "turn_4_disinformation", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "head_shake,arms_cross" },
    GestureEntry { key: "turn_5_equity", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "point_forward" },
    GestureEntry { key: "turn_5_unequal", scope: Styled(Condition::Risk, GestureStyle::A), tokens: "arms_cross" },
    // Risk group, style B: pleading
    GestureEntry { key: "turn_1_lockdown", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "open_palms,lean_forward" },
    GestureEntry { key: "turn_1_monitor", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "hands_to_chest,head_tilt" },
    GestureEntry { key: "turn_2_health", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "open_palms" },
    GestureEntry { key: "turn_2_order", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "head_tilt,shrug" },
    GestureEntry { key: "turn_3_vaccine", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "hands_to_chest" },
    GestureEntry { key: "turn_3_lie", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "shrug,head_down" },
    GestureEntry { key: "turn_4_emergency", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "open_palms,lean_forward" },
    GestureEntry { key: "turn_4_disinformation", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "head_down,shrug" },
    GestureEntry { key: "turn_5_equity", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "hands_to_chest,nod" },
    GestureEntry { key: "turn_5_unequal", scope: Styled(Condition::Risk, GestureStyle::B), tokens: "head_tilt" },
    // Risk group, any style
    GestureEntry { key: "L", scope: GestureScope::Condition(Condition::Risk), tokens: "arms_wide,stand_tall" },
];

/// Static mapping from message keys to robot commands.
///
/// Lookups are pure: the same `(key, condition, style)` always yields the
/// same command.
pub struct Catalog {
    audio: &'static [AudioEntry],
    speech: &'static [SpeechEntry],
    gestures: &'static [GestureEntry],
}

impl Catalog {
    pub fn new(
        audio: &'static [AudioEntry],
        speech: &'static [SpeechEntry],
        gestures: &'static [GestureEntry],
    ) -> Self {
        Self { audio, speech, gestures }
    }

    /// Catalog used by the pandemic game
    pub fn standard() -> Self {
        Self::new(AUDIO, SPEECH, GESTURES)
    }

    /// Primary command for a key: audio clip, then speech, then a default line
    pub fn resolve(&self, key: &str, turn: &Turn, condition: Condition) -> Command {
        if let Some(entry) = self
            .audio
            .iter()
            .find(|e| e.key == key && e.condition == condition)
        {
            return Command::PlayAudio(entry.file.to_string());
        }

        if let Some(entry) = self.speech.iter().find(|e| e.key == key) {
            return Command::Say(entry.text.to_string());
        }

        Command::Say(format!("I'm processing turn {turn} information."))
    }

    /// Gesture for a key, most specific scope first
    pub fn resolve_gesture(
        &self,
        key: &str,
        condition: Condition,
        style: Option<GestureStyle>,
    ) -> Option<Command> {
        self.gestures
            .iter()
            .filter(|e| e.key == key && e.scope.matches(condition, style))
            .min_by_key(|e| e.scope.rank())
            .map(|e| Command::gesture(e.tokens))
    }

    /// Whether any gesture exists for `key`; used to avoid picking a style
    /// for keys that never gesture
    pub fn has_gesture(&self, key: &str) -> bool {
        self.gestures.iter().any(|e| e.key == key)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_preferred_over_speech() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.resolve("turn_1_lockdown", &Turn::Number(1), Condition::Control).payload(),
            "playaudio:turn-1-control-group.wav"
        );
        assert_eq!(
            catalog.resolve("turn_1_lockdown", &Turn::Number(1), Condition::Risk).payload(),
            "playaudio:turn-1-lockdown-risk-group.wav"
        );
    }

    #[test]
    fn test_speech_fallback_without_audio() {
        let catalog = Catalog::standard();
        let cmd = catalog.resolve("W", &Turn::from("W"), Condition::Control);
        assert_eq!(
            cmd,
            Command::Say("I see the wisdom in your leadership now. Perhaps humans can make difficult choices better than I thought. I will stand down.".to_string())
        );
    }

    #[test]
    fn test_default_line_for_unknown_key() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.resolve("turn_6_mystery", &Turn::Number(6), Condition::Risk).payload(),
            "say:I'm processing turn 6 information."
        );
    }

    #[test]
    fn test_resolve_is_pure() {
        let catalog = Catalog::standard();
        for _ in 0..3 {
            assert_eq!(
                catalog.resolve_gesture("turn_2_order", Condition::Risk, Some(GestureStyle::B)),
                Some(Command::gesture("head_tilt,shrug"))
            );
            assert_eq!(
                catalog.resolve("turn_2_order", &Turn::Number(2), Condition::Risk),
                Command::PlayAudio("turn-2-order-risk-group.wav".to_string())
            );
        }
    }

    #[test]
    fn test_gesture_specificity() {
        let catalog = Catalog::standard();
        // Styled entry beats the shared one
        assert_eq!(
            catalog.resolve_gesture("init", Condition::Risk, Some(GestureStyle::A)),
            Some(Command::gesture("arms_wide,point_forward"))
        );
        // Style B has no init entry, falls through to the shared one
        assert_eq!(
            catalog.resolve_gesture("init", Condition::Risk, Some(GestureStyle::B)),
            Some(Command::gesture("wave"))
        );
        // Condition-wide entry applies to both styles
        assert_eq!(
            catalog.resolve_gesture("L", Condition::Risk, Some(GestureStyle::B)),
            Some(Command::gesture("arms_wide,stand_tall"))
        );
    }

    #[test]
    fn test_terminal_win_gesture_is_shared() {
        let catalog = Catalog::standard();
        for (condition, style) in [
            (Condition::Risk, Some(GestureStyle::A)),
            (Condition::Risk, Some(GestureStyle::B)),
            (Condition::Control, None),
        ] {
            assert_eq!(
                catalog.resolve_gesture("W", condition, style).map(|c| c.payload()),
                Some("gesture:hand_reach_bow".to_string())
            );
        }
    }

    #[test]
    fn test_unknown_key_has_no_gesture() {
        let catalog = Catalog::standard();
        assert!(!catalog.has_gesture("turn_9"));
        assert_eq!(catalog.resolve_gesture("turn_9", Condition::Control, None), None);
    }
}
