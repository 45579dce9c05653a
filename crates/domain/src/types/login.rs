//! Login flow vocabulary shared by the coordinator and its SDK port

use serde::{Deserialize, Serialize};

use crate::impl_label_conversions;

/// Phase of the login flow coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginPhase {
    #[default]
    Idle,
    Initializing,
    AttemptingSilent,
    AttemptingPopup,
    Resolved,
    Failed,
}

impl LoginPhase {
    /// Whether a login attempt is outstanding in this phase
    #[must_use]
    pub const fn is_attempting(self) -> bool {
        matches!(self, Self::Initializing | Self::AttemptingSilent | Self::AttemptingPopup)
    }
}

impl_label_conversions!(LoginPhase {
    Idle => "idle",
    Initializing => "initializing",
    AttemptingSilent => "attempting_silent",
    AttemptingPopup => "attempting_popup",
    Resolved => "resolved",
    Failed => "failed",
});

/// Outcome notifications reported by the identity SDK's silent prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMoment {
    /// The prompt could not be shown (no provider session, blocked, ...)
    NotDisplayed,
    /// The prompt was skipped by the provider
    Skipped,
    /// The user closed the prompt
    Dismissed,
    /// The prompt is visible; no action needed
    Displayed,
}

impl PromptMoment {
    /// Whether the coordinator should fall back to the popup flow
    #[must_use]
    pub const fn falls_back(self) -> bool {
        matches!(self, Self::NotDisplayed | Self::Skipped)
    }
}

impl_label_conversions!(PromptMoment {
    NotDisplayed => "not_displayed",
    Skipped => "skipped",
    Dismissed => "dismissed",
    Displayed => "displayed",
});

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_attempting_phases() {
        assert!(LoginPhase::AttemptingSilent.is_attempting());
        assert!(LoginPhase::Initializing.is_attempting());
        assert!(!LoginPhase::Resolved.is_attempting());
        assert!(!LoginPhase::default().is_attempting());
    }

    #[test]
    fn test_prompt_fallback_moments() {
        assert!(PromptMoment::NotDisplayed.falls_back());
        assert!(PromptMoment::Skipped.falls_back());
        assert!(!PromptMoment::Dismissed.falls_back());
        assert_eq!(PromptMoment::from_str("not_displayed").unwrap(), PromptMoment::NotDisplayed);
        assert_eq!(LoginPhase::AttemptingPopup.to_string(), "attempting_popup");
    }
}
