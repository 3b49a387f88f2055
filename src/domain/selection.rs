//! Interactive rectangle selection
//!
//! This module turns a stream of pointer and cancel events into either a
//! finalized rectangle or a cancellation. The transitions are a pure function
//! over `SessionState`; `SelectionSession` wraps them together with the
//! topology snapshot taken when the session was created and resolves the
//! finished rectangle into a `CaptureInstruction`.
//!
//! States: `Idle -> Armed -> Dragging -> {Completed | Cancelled}`.
//! Releasing a drag that is too small returns to `Armed` so the user can try
//! again without restarting the session.

use crate::domain::core::{Point, Rect};
use crate::domain::topology::{CaptureInstruction, ScreenTopology, TopologyError};

/// Minimum extent, exclusive, a finished drag needs in both dimensions
pub const MIN_SELECTION_SIZE: i32 = 5;

/// Selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session exists but the selection surface is not shown
    Idle,
    /// Surface visible, waiting for the button to go down
    Armed,
    /// Button held; `start` is fixed and `end` follows the pointer
    Dragging { start: Point, end: Point },
    /// Drag released with a large enough rectangle
    Completed { rect: Rect },
    /// Selection abandoned
    Cancelled,
}

/// Input consumed by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    Cancel,
}

/// Terminal signal produced by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Finalized(Rect),
    Cancelled,
}

/// Result of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub state: SessionState,
    pub gesture: Option<Gesture>,
}

impl Step {
    fn stay(state: SessionState) -> Self {
        Self {
            state,
            gesture: None,
        }
    }
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed { .. } | SessionState::Cancelled)
    }

    /// Normalized rectangle of the drag in progress
    pub fn drag_rect(&self) -> Option<Rect> {
        match self {
            SessionState::Dragging { start, end } => Some(Rect::from_corners(*start, *end)),
            _ => None,
        }
    }

    /// Applies an event and returns the next state plus any terminal gesture
    ///
    /// Events that make no sense in the current state leave it unchanged.
    pub fn on_event(self, event: SessionEvent, min_size: i32) -> Step {
        match (self, event) {
            (SessionState::Idle, SessionEvent::Start) => Step::stay(SessionState::Armed),

            (SessionState::Armed | SessionState::Dragging { .. }, SessionEvent::PointerDown(p)) => {
                Step::stay(SessionState::Dragging { start: p, end: p })
            }

            (SessionState::Dragging { start, .. }, SessionEvent::PointerMove(p)) => {
                Step::stay(SessionState::Dragging { start, end: p })
            }

            (SessionState::Dragging { start, .. }, SessionEvent::PointerUp(p)) => {
                let rect = Rect::from_corners(start, p);
                if rect.w > min_size && rect.h > min_size {
                    Step {
                        state: SessionState::Completed { rect },
                        gesture: Some(Gesture::Finalized(rect)),
                    }
                } else {
                    // Accidental click: keep the surface up and wait for another drag
                    Step::stay(SessionState::Armed)
                }
            }

            (SessionState::Armed | SessionState::Dragging { .. }, SessionEvent::Cancel) => Step {
                state: SessionState::Cancelled,
                gesture: Some(Gesture::Cancelled),
            },

            (state, _) => Step::stay(state),
        }
    }
}

/// What a finished session hands to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Selection resolved to a capture target
    Resolved(CaptureInstruction),
    /// Selection finished but covers no capturable pixels
    Unresolved(TopologyError),
    /// User cancelled
    Cancelled,
}

/// One capture session: a topology snapshot plus the selection state machine
///
/// The session owns its snapshot for its whole lifetime and emits at most one
/// outcome. Once terminal, further events are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSession {
    topology: ScreenTopology,
    state: SessionState,
    min_size: i32,
}

impl SelectionSession {
    /// Creates an idle session over the given snapshot
    pub fn new(topology: ScreenTopology) -> Self {
        Self {
            topology,
            state: SessionState::Idle,
            min_size: MIN_SELECTION_SIZE,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn topology(&self) -> &ScreenTopology {
        &self.topology
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// True while the selection surface should be shown
    pub fn surface_visible(&self) -> bool {
        matches!(self.state, SessionState::Armed | SessionState::Dragging { .. })
    }

    /// Rectangle currently being dragged, in global coordinates
    pub fn current_rect(&self) -> Option<Rect> {
        self.state.drag_rect()
    }

    /// Area the selection surface has to cover
    pub fn overlay_geometry(&self) -> Rect {
        self.topology.combined_geometry()
    }

    pub fn start(&mut self) -> Option<SessionOutcome> {
        self.apply(SessionEvent::Start)
    }

    pub fn pointer_down(&mut self, point: Point) -> Option<SessionOutcome> {
        self.apply(SessionEvent::PointerDown(point))
    }

    pub fn pointer_move(&mut self, point: Point) -> Option<SessionOutcome> {
        self.apply(SessionEvent::PointerMove(point))
    }

    pub fn pointer_up(&mut self, point: Point) -> Option<SessionOutcome> {
        self.apply(SessionEvent::PointerUp(point))
    }

    pub fn cancel(&mut self) -> Option<SessionOutcome> {
        self.apply(SessionEvent::Cancel)
    }

    /// Feeds one event through the state machine
    pub fn apply(&mut self, event: SessionEvent) -> Option<SessionOutcome> {
        let step = self.state.on_event(event, self.min_size);
        if step.state != self.state {
            log::debug!("selection: {:?} -> {:?}", self.state, step.state);
        }
        self.state = step.state;

        step.gesture.map(|gesture| match gesture {
            Gesture::Finalized(rect) => match self.topology.resolve(&rect) {
                Ok(instruction) => SessionOutcome::Resolved(instruction),
                Err(err) => SessionOutcome::Unresolved(err),
            },
            Gesture::Cancelled => SessionOutcome::Cancelled,
        })
    }
}
