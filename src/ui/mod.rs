pub mod renderer;

#[cfg(windows)]
pub mod overlay;

#[cfg(windows)]
pub use overlay::{OverlayError, OverlayEvent, SelectionOverlay};
pub use renderer::{OverlayStyle, RendererError, SelectionRenderer};
