//! Login flow state machine
//!
//! Pure transition function over `(phase, active attempt, event)`. The
//! coordinator owns the side effects; this module only decides which ones
//! run. Events tagged with an attempt other than the active one are stale
//! and produce no effects, which makes settlement idempotent: the first
//! event that settles an attempt wins and everything after it is a no-op.

use bookline_domain::{AuthError, AuthSuccess, LoginPhase, PromptMoment};

/// Which timer an `ArmTimer` effect refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Soft: falls back from the silent prompt to the popup flow
    SilentFallback,
    /// Hard: fails the attempt with `AuthenticationTimeout`
    PopupDeadline,
}

/// Inputs to the state machine
#[derive(Debug, Clone)]
pub enum LoginEvent {
    /// `login()` was called; starts attempt `attempt`
    Begin { attempt: u64 },
    /// The SDK finished loading and initializing
    Initialized { attempt: u64 },
    /// The SDK could not be loaded or initialized
    InitFailed { attempt: u64, error: AuthError },
    /// The silent prompt reported a moment
    Prompt { attempt: u64, moment: PromptMoment },
    /// The silent prompt produced a credential (or an empty response)
    Credential { attempt: u64, credential: Option<String> },
    /// The soft silent-prompt timer fired
    SilentTimedOut { attempt: u64 },
    /// The popup window opened
    PopupOpened { attempt: u64 },
    /// The popup window could not be opened
    PopupBlocked { attempt: u64 },
    /// The hard popup timer fired
    PopupTimedOut { attempt: u64 },
    /// A success payload arrived (credential exchange or popup message)
    Succeeded { attempt: u64, payload: Box<AuthSuccess> },
    /// A failure arrived (credential exchange or popup message)
    Rejected { attempt: u64, error: AuthError },
    /// `cleanup()` was called
    Cancel,
}

impl LoginEvent {
    const fn attempt(&self) -> Option<u64> {
        match self {
            Self::Begin { attempt }
            | Self::Initialized { attempt }
            | Self::InitFailed { attempt, .. }
            | Self::Prompt { attempt, .. }
            | Self::Credential { attempt, .. }
            | Self::SilentTimedOut { attempt }
            | Self::PopupOpened { attempt }
            | Self::PopupBlocked { attempt }
            | Self::PopupTimedOut { attempt }
            | Self::Succeeded { attempt, .. }
            | Self::Rejected { attempt, .. } => Some(*attempt),
            Self::Cancel => None,
        }
    }
}

/// Side effects requested by a transition, applied in order
#[derive(Debug, Clone)]
pub enum Effect {
    /// Abort whichever timer is armed
    CancelTimer,
    ArmTimer(TimerKind),
    /// Show the SDK's silent prompt
    ShowPrompt,
    /// Issue a nonce and open the authorization popup
    OpenPopup,
    /// Post the credential to the backend
    ExchangeCredential(String),
    /// Drop the stored OAuth nonce
    ClearNonce,
    /// Settle the pending request successfully
    Resolve(Box<AuthSuccess>),
    /// Settle the pending request with an error
    Reject(AuthError),
}

/// Result of applying one event
#[derive(Debug, Clone)]
pub struct Transition {
    /// Phase after the event
    pub phase: LoginPhase,
    /// Effects to run, in order
    pub effects: Vec<Effect>,
}

impl Transition {
    const fn stay(phase: LoginPhase) -> Self {
        Self { phase, effects: Vec::new() }
    }

    const fn to(phase: LoginPhase, effects: Vec<Effect>) -> Self {
        Self { phase, effects }
    }
}

fn fail(error: AuthError) -> Transition {
    Transition::to(
        LoginPhase::Failed,
        vec![Effect::CancelTimer, Effect::ClearNonce, Effect::Reject(error)],
    )
}

/// Compute the next phase and effects.
///
/// `active` is the id of the attempt currently holding the pending request,
/// or `None` when nothing is pending.
#[must_use]
pub fn transition(phase: LoginPhase, active: Option<u64>, event: LoginEvent) -> Transition {
    use LoginPhase as P;

    match (&event, event.attempt()) {
        // A new attempt supersedes whatever is outstanding
        (LoginEvent::Begin { .. }, _) => {
            let mut effects = vec![Effect::CancelTimer, Effect::ClearNonce];
            if active.is_some() {
                effects.push(Effect::Reject(AuthError::Cancelled));
            }
            return Transition::to(P::Initializing, effects);
        }
        (LoginEvent::Cancel, _) => {
            let mut effects = vec![Effect::CancelTimer, Effect::ClearNonce];
            if active.is_some() {
                effects.push(Effect::Reject(AuthError::Cancelled));
                return Transition::to(P::Failed, effects);
            }
            return Transition::to(phase, effects);
        }
        (_, attempt) if attempt != active => return Transition::stay(phase),
        _ => {}
    }

    match (phase, event) {
        (P::Initializing, LoginEvent::Initialized { .. }) => Transition::to(
            P::AttemptingSilent,
            vec![Effect::ArmTimer(TimerKind::SilentFallback), Effect::ShowPrompt],
        ),
        (P::Initializing, LoginEvent::InitFailed { error, .. }) => fail(error),

        (P::AttemptingSilent, LoginEvent::Prompt { moment, .. }) if moment.falls_back() => {
            Transition::to(P::AttemptingPopup, vec![Effect::CancelTimer, Effect::OpenPopup])
        }
        (P::AttemptingSilent, LoginEvent::Prompt { moment: PromptMoment::Dismissed, .. }) => {
            fail(AuthError::UserCancelled)
        }
        (P::AttemptingSilent, LoginEvent::SilentTimedOut { .. }) => {
            Transition::to(P::AttemptingPopup, vec![Effect::OpenPopup])
        }

        // A credential can still arrive after the popup fallback started
        (P::AttemptingSilent | P::AttemptingPopup, LoginEvent::Credential { credential, .. }) => {
            match credential.filter(|c| !c.is_empty()) {
                Some(credential) => {
                    let mut effects = Vec::new();
                    if phase == P::AttemptingSilent {
                        effects.push(Effect::CancelTimer);
                    }
                    effects.push(Effect::ExchangeCredential(credential));
                    Transition::to(phase, effects)
                }
                None => fail(AuthError::InvalidCredentialResponse(
                    "No credential received from Google".to_string(),
                )),
            }
        }

        (P::AttemptingPopup, LoginEvent::PopupOpened { .. }) => {
            Transition::to(P::AttemptingPopup, vec![Effect::ArmTimer(TimerKind::PopupDeadline)])
        }
        (P::AttemptingPopup, LoginEvent::PopupBlocked { .. }) => fail(AuthError::PopupBlocked),
        (P::AttemptingPopup, LoginEvent::PopupTimedOut { .. }) => {
            fail(AuthError::AuthenticationTimeout)
        }

        (P::AttemptingSilent | P::AttemptingPopup, LoginEvent::Succeeded { payload, .. }) => {
            Transition::to(
                P::Resolved,
                vec![Effect::CancelTimer, Effect::ClearNonce, Effect::Resolve(payload)],
            )
        }
        (P::AttemptingSilent | P::AttemptingPopup, LoginEvent::Rejected { error, .. }) => {
            fail(error)
        }

        (phase, _) => Transition::stay(phase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Box<AuthSuccess> {
        Box::new(serde_json::from_str(r#"{"user": {"id": 7}}"#).unwrap())
    }

    fn has_reject(t: &Transition, expected: &AuthError) -> bool {
        t.effects.iter().any(|e| matches!(e, Effect::Reject(err) if err == expected))
    }

    #[test]
    fn test_begin_supersedes_pending_attempt() {
        let t = transition(LoginPhase::AttemptingPopup, Some(1), LoginEvent::Begin { attempt: 2 });

        assert_eq!(t.phase, LoginPhase::Initializing);
        assert!(has_reject(&t, &AuthError::Cancelled));

        let fresh = transition(LoginPhase::Idle, None, LoginEvent::Begin { attempt: 1 });
        assert!(!fresh.effects.iter().any(|e| matches!(e, Effect::Reject(_))));
    }

    #[test]
    fn test_not_displayed_falls_back_without_settling() {
        let t = transition(
            LoginPhase::AttemptingSilent,
            Some(1),
            LoginEvent::Prompt { attempt: 1, moment: PromptMoment::NotDisplayed },
        );

        assert_eq!(t.phase, LoginPhase::AttemptingPopup);
        assert!(matches!(t.effects.as_slice(), [Effect::CancelTimer, Effect::OpenPopup]));
    }

    #[test]
    fn test_dismissed_rejects_with_user_cancelled() {
        let t = transition(
            LoginPhase::AttemptingSilent,
            Some(1),
            LoginEvent::Prompt { attempt: 1, moment: PromptMoment::Dismissed },
        );

        assert_eq!(t.phase, LoginPhase::Failed);
        assert!(has_reject(&t, &AuthError::UserCancelled));
    }

    #[test]
    fn test_silent_timeout_is_soft_popup_timeout_is_hard() {
        let soft = transition(
            LoginPhase::AttemptingSilent,
            Some(1),
            LoginEvent::SilentTimedOut { attempt: 1 },
        );
        assert_eq!(soft.phase, LoginPhase::AttemptingPopup);
        assert!(!soft.effects.iter().any(|e| matches!(e, Effect::Reject(_))));

        let hard = transition(
            LoginPhase::AttemptingPopup,
            Some(1),
            LoginEvent::PopupTimedOut { attempt: 1 },
        );
        assert_eq!(hard.phase, LoginPhase::Failed);
        assert!(has_reject(&hard, &AuthError::AuthenticationTimeout));
    }

    #[test]
    fn test_stale_events_are_noops() {
        let t = transition(
            LoginPhase::AttemptingPopup,
            Some(2),
            LoginEvent::Succeeded { attempt: 1, payload: payload() },
        );
        assert_eq!(t.phase, LoginPhase::AttemptingPopup);
        assert!(t.effects.is_empty());

        let settled =
            transition(LoginPhase::Resolved, None, LoginEvent::Succeeded { attempt: 1, payload: payload() });
        assert_eq!(settled.phase, LoginPhase::Resolved);
        assert!(settled.effects.is_empty());
    }

    #[test]
    fn test_silent_timer_ignored_after_fallback() {
        let t = transition(
            LoginPhase::AttemptingPopup,
            Some(1),
            LoginEvent::SilentTimedOut { attempt: 1 },
        );
        assert_eq!(t.phase, LoginPhase::AttemptingPopup);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_late_credential_during_popup_is_exchanged() {
        let t = transition(
            LoginPhase::AttemptingPopup,
            Some(1),
            LoginEvent::Credential { attempt: 1, credential: Some("jwt".into()) },
        );
        assert_eq!(t.phase, LoginPhase::AttemptingPopup);
        assert!(matches!(t.effects.as_slice(), [Effect::ExchangeCredential(c)] if c == "jwt"));
    }

    #[test]
    fn test_missing_credential_is_invalid() {
        let t = transition(
            LoginPhase::AttemptingSilent,
            Some(1),
            LoginEvent::Credential { attempt: 1, credential: None },
        );
        assert_eq!(t.phase, LoginPhase::Failed);
        assert!(t.effects.iter().any(|e| matches!(e, Effect::Reject(AuthError::InvalidCredentialResponse(_)))));
    }

    #[test]
    fn test_cancel_from_any_phase() {
        for phase in [
            LoginPhase::Idle,
            LoginPhase::Initializing,
            LoginPhase::AttemptingSilent,
            LoginPhase::AttemptingPopup,
            LoginPhase::Resolved,
            LoginPhase::Failed,
        ] {
            let t = transition(phase, None, LoginEvent::Cancel);
            assert!(matches!(t.effects.first(), Some(Effect::CancelTimer)));
            assert!(!t.effects.iter().any(|e| matches!(e, Effect::Reject(_))));
        }

        let pending = transition(LoginPhase::AttemptingSilent, Some(4), LoginEvent::Cancel);
        assert_eq!(pending.phase, LoginPhase::Failed);
        assert!(has_reject(&pending, &AuthError::Cancelled));
    }

    #[test]
    fn test_success_resolves_and_clears() {
        let t = transition(
            LoginPhase::AttemptingPopup,
            Some(3),
            LoginEvent::Succeeded { attempt: 3, payload: payload() },
        );
        assert_eq!(t.phase, LoginPhase::Resolved);
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::CancelTimer, Effect::ClearNonce, Effect::Resolve(_)]
        ));
    }
}
