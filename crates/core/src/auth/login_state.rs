//! Observable state machine for one login attempt

use std::sync::atomic::{AtomicBool, Ordering};

use inkstat_common::lifecycle::{EventBus, Observable};
use inkstat_domain::{ApiError, LoginEvent, LoginState, PipelineStage};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Holds the [`LoginState`] of the current attempt.
///
/// Within an attempt the state only moves forward:
/// `Idle → Loading(stage…) → Success | Error`. Out-of-order transitions are
/// rejected and logged. A dismissed attempt accepts no further transitions.
/// [`reset`](Self::reset) begins a fresh attempt.
#[derive(Debug)]
pub struct LoginStateMachine {
    state: Observable<LoginState>,
    events: EventBus<LoginEvent>,
    dismissed: AtomicBool,
}

impl LoginStateMachine {
    pub fn new(events: EventBus<LoginEvent>) -> Self {
        Self { state: Observable::new(LoginState::Idle), events, dismissed: AtomicBool::new(false) }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> LoginState {
        self.state.get()
    }

    /// Error of the attempt, if it failed.
    pub fn last_error(&self) -> Option<ApiError> {
        self.current().error().cloned()
    }

    /// Move to `Loading(stage)`. Only later stages than the current one are
    /// accepted.
    pub fn advance(&self, stage: PipelineStage) -> bool {
        if !matches!(
            stage,
            PipelineStage::ExchangingSessionToken
                | PipelineStage::ExchangingAccessToken
                | PipelineStage::ExchangingWebServiceToken
        ) {
            warn!(%stage, "not a loading stage");
            return false;
        }
        let moved = self.transition(LoginState::Loading(stage));
        if moved {
            info!(%stage, "login stage started");
        }
        moved
    }

    /// Finish the attempt successfully and announce it once.
    pub fn succeed(&self) -> bool {
        let moved = self.transition(LoginState::Success);
        if moved {
            info!("login succeeded");
            self.events.publish(LoginEvent::Succeeded);
        }
        moved
    }

    /// Finish the attempt with `error`.
    pub fn fail(&self, error: ApiError) -> bool {
        let label = error.label();
        let moved = self.transition(LoginState::Error(error));
        if moved {
            warn!(error_type = label, "login failed");
        }
        moved
    }

    /// End an unfinished attempt without recording a failure.
    ///
    /// The state returns to `Idle` and stays there until [`reset`](Self::reset).
    /// Returns `false` when the attempt had already finished.
    pub fn dismiss(&self) -> bool {
        self.state.update(|state| {
            if state.is_terminal() {
                return false;
            }
            self.dismissed.store(true, Ordering::Release);
            if *state == LoginState::Idle {
                return false;
            }
            info!(stage = %state.stage(), "login dismissed");
            *state = LoginState::Idle;
            true
        })
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed.load(Ordering::Acquire)
    }

    /// Start a fresh attempt.
    pub fn reset(&self) {
        self.state.update(|state| {
            self.dismissed.store(false, Ordering::Release);
            *state = LoginState::Idle;
            true
        });
    }

    fn transition(&self, next: LoginState) -> bool {
        self.state.update(|state| {
            if self.dismissed.load(Ordering::Acquire) {
                debug!(to = %next.stage(), "attempt dismissed, transition ignored");
                return false;
            }
            let allowed = !state.is_terminal() && next.stage() > state.stage();
            if !allowed {
                warn!(from = %state.stage(), to = %next.stage(), "rejected login state transition");
                return false;
            }
            *state = next;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use inkstat_domain::{ProviderErrorReason, MISSING_GAME_DATA_MESSAGE_KEY};

    use super::*;

    fn machine() -> (LoginStateMachine, EventBus<LoginEvent>) {
        let bus = EventBus::new(4);
        (LoginStateMachine::new(bus.clone()), bus)
    }

    #[tokio::test]
    async fn walks_the_chain_and_announces_success_once() {
        let (machine, bus) = machine();
        let mut events = bus.subscribe();

        assert!(machine.advance(PipelineStage::ExchangingSessionToken));
        assert!(machine.advance(PipelineStage::ExchangingAccessToken));
        assert!(machine.advance(PipelineStage::ExchangingWebServiceToken));
        assert!(machine.succeed());
        assert!(!machine.succeed());

        assert_eq!(machine.current(), LoginState::Success);
        assert_eq!(events.recv().await.unwrap(), LoginEvent::Succeeded);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn rejects_backwards_and_repeated_stages() {
        let (machine, _bus) = machine();
        assert!(machine.advance(PipelineStage::ExchangingAccessToken));
        assert!(!machine.advance(PipelineStage::ExchangingSessionToken));
        assert!(!machine.advance(PipelineStage::ExchangingAccessToken));
        assert!(!machine.advance(PipelineStage::Success));
        assert_eq!(machine.current(), LoginState::Loading(PipelineStage::ExchangingAccessToken));
    }

    #[test]
    fn error_is_terminal_until_reset() {
        let (machine, _bus) = machine();
        machine.advance(PipelineStage::ExchangingSessionToken);
        let error = ApiError::ProviderDomain(ProviderErrorReason::MissingGameData);
        assert!(machine.fail(error.clone()));

        assert!(!machine.advance(PipelineStage::ExchangingAccessToken));
        assert!(!machine.succeed());
        assert_eq!(machine.last_error(), Some(error.clone()));
        assert_eq!(machine.last_error().unwrap().user_message_key(), MISSING_GAME_DATA_MESSAGE_KEY);

        machine.reset();
        assert_eq!(machine.current(), LoginState::Idle);
        assert_eq!(machine.last_error(), None);
    }

    #[test]
    fn dismiss_returns_to_idle_without_error() {
        let (machine, _bus) = machine();
        machine.advance(PipelineStage::ExchangingAccessToken);
        assert!(machine.dismiss());
        assert_eq!(machine.current(), LoginState::Idle);
        assert_eq!(machine.last_error(), None);
        assert!(!machine.dismiss());
    }

    #[tokio::test]
    async fn dismissed_attempt_rejects_later_transitions() {
        let (machine, bus) = machine();
        let mut events = bus.subscribe();
        machine.advance(PipelineStage::ExchangingWebServiceToken);
        machine.dismiss();

        assert!(machine.is_dismissed());
        assert!(!machine.advance(PipelineStage::ExchangingWebServiceToken));
        assert!(!machine.succeed());
        assert!(!machine.fail(ApiError::Authorization));
        assert_eq!(machine.current(), LoginState::Idle);
        assert!(events.try_recv().is_err());

        machine.reset();
        assert!(!machine.is_dismissed());
        assert!(machine.advance(PipelineStage::ExchangingSessionToken));
    }

    #[test]
    fn dismiss_before_first_stage_blocks_the_attempt() {
        let (machine, _bus) = machine();
        assert!(!machine.dismiss());
        assert!(machine.is_dismissed());
        assert!(!machine.advance(PipelineStage::ExchangingSessionToken));
    }

    #[test]
    fn finished_attempt_cannot_be_dismissed() {
        let (machine, _bus) = machine();
        machine.advance(PipelineStage::ExchangingSessionToken);
        machine.succeed();
        assert!(!machine.dismiss());
        assert!(!machine.is_dismissed());
        assert_eq!(machine.current(), LoginState::Success);
    }

    #[tokio::test]
    async fn subscribers_observe_each_transition() {
        let (machine, _bus) = machine();
        let mut rx = machine.subscribe();

        machine.advance(PipelineStage::ExchangingSessionToken);
        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            LoginState::Loading(PipelineStage::ExchangingSessionToken)
        );

        machine.fail(ApiError::Authorization);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), LoginState::Error(ApiError::Authorization));
    }
}
