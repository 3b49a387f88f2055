//! Application state management
//!
//! Defines the application state machine and its transitions. A selection
//! session and its topology snapshot only exist while the app is selecting.

use crate::domain::selection::{SelectionSession, SessionEvent, SessionOutcome};
use crate::domain::topology::ScreenTopology;

/// Main application state - either idle or actively selecting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppState {
    /// Waiting for the capture hotkey
    #[default]
    Idle,
    /// A selection session is running
    Selecting(SelectionSession),
}

impl AppState {
    pub fn session(&self) -> Option<&SelectionSession> {
        match self {
            AppState::Idle => None,
            AppState::Selecting(session) => Some(session),
        }
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self, AppState::Selecting(_))
    }
}

/// Possible state transition events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// Capture hotkey fired; carries the freshly read display layout
    CaptureRequested(ScreenTopology),
    /// Pointer or keyboard input for the running session
    Session(SessionEvent),
}

/// Result of processing one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: AppState,
    /// Set when the running session finished with this event
    pub outcome: Option<SessionOutcome>,
    /// A running session was force-cancelled to make room for a new one
    pub superseded: bool,
}

impl Transition {
    fn to(state: AppState) -> Self {
        Self {
            state,
            outcome: None,
            superseded: false,
        }
    }
}

/// State machine for application state transitions
pub struct StateMachine;

impl StateMachine {
    /// Processes a state event and returns the resulting transition
    ///
    /// A capture request while selecting cancels the running session and
    /// arms a new one over the new snapshot. A session that reaches a
    /// terminal state is dropped and the app returns to idle.
    pub fn process_event(current_state: AppState, event: StateEvent) -> Transition {
        match (current_state, event) {
            (AppState::Idle, StateEvent::CaptureRequested(topology)) => {
                log::debug!(
                    "state: Idle -> Selecting ({} monitors)",
                    topology.monitor_count()
                );
                Transition::to(AppState::Selecting(Self::armed(topology)))
            }

            (AppState::Selecting(mut session), StateEvent::CaptureRequested(topology)) => {
                // The superseded session's outcome is not reported
                let _ = session.cancel();
                log::debug!("state: Selecting -> Selecting (previous session cancelled)");
                Transition {
                    state: AppState::Selecting(Self::armed(topology)),
                    outcome: None,
                    superseded: true,
                }
            }

            (AppState::Selecting(mut session), StateEvent::Session(event)) => {
                let outcome = session.apply(event);
                if session.is_terminal() {
                    log::debug!("state: Selecting -> Idle");
                    Transition {
                        state: AppState::Idle,
                        outcome,
                        superseded: false,
                    }
                } else {
                    Transition {
                        state: AppState::Selecting(session),
                        outcome,
                        superseded: false,
                    }
                }
            }

            // Input without a session - ignore event
            (AppState::Idle, StateEvent::Session(_)) => Transition::to(AppState::Idle),
        }
    }

    fn armed(topology: ScreenTopology) -> SelectionSession {
        let mut session = SelectionSession::new(topology);
        let _ = session.start();
        session
    }
}
