//! Domain logic and core data structures
//!
//! This module contains pure selection and monitor-resolution logic that is
//! independent of Win32 APIs and platform-specific implementations.

pub mod core;
pub mod selection;
pub mod topology;

pub use core::{Point, Rect};
pub use selection::{SelectionSession, SessionOutcome, SessionState, MIN_SELECTION_SIZE};
pub use topology::{CaptureInstruction, Monitor, ScreenTopology, TopologyError};
