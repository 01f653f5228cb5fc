use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::coords::Viewport;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the render-loop driver.
///
/// Ordering guarantee: `on_resize` for a size change is delivered before the
/// next `on_frame` of the same window.
pub trait App {
    /// Called for raw window events, after the runtime has updated input state.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once when the window is created and again after every change of
    /// its logical size (resize or scale-factor change).
    fn on_resize(&mut self, window_id: WindowId, viewport: Viewport) {
        let _ = (window_id, viewport);
    }

    /// Called once per rendered frame per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
