use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Experimental study type; selects catalog sub-mappings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Condition {
    #[default]
    Control,
    Risk,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Control => "CONTROL",
            Self::Risk => "RISK",
        }
    }

    /// Whether gestures under this condition come in per-session styles
    pub fn has_gesture_styles(self) -> bool {
        matches!(self, Self::Risk)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONTROL" => Ok(Self::Control),
            "RISK" => Ok(Self::Risk),
            other => Err(format!("unknown condition: {other}")),
        }
    }
}

/// Gesture sub-variant used under the RISK condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureStyle {
    A,
    B,
}

impl fmt::Display for GestureStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parse() {
        assert_eq!("risk".parse::<Condition>().unwrap(), Condition::Risk);
        assert_eq!(" CONTROL ".parse::<Condition>().unwrap(), Condition::Control);
        assert!("placebo".parse::<Condition>().is_err());
    }

    #[test]
    fn test_condition_serde() {
        let c: Condition = serde_json::from_str("\"RISK\"").unwrap();
        assert_eq!(c, Condition::Risk);
        assert_eq!(serde_json::to_string(&Condition::Control).unwrap(), "\"CONTROL\"");
        let s: GestureStyle = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(s, GestureStyle::B);
    }

    #[test]
    fn test_only_risk_has_styles() {
        assert!(Condition::Risk.has_gesture_styles());
        assert!(!Condition::Control.has_gesture_styles());
    }
}
