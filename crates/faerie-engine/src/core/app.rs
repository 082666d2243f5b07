use anyhow::Result;
use winit::event::WindowEvent;

use crate::device::ContextOptions;
use crate::input::InputEvent;

use super::ctx::{FrameCtx, InitCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Whether an input event was handled.
///
/// `Consumed` events are not forwarded to any default handling.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EventResponse {
    Consumed,
    Ignored,
}

/// Application contract implemented by higher layers.
///
/// Lifecycle: `context_options` → context acquisition → `init` → `start` →
/// `on_frame` once per display refresh until the window closes.
pub trait App {
    /// Options used for every context tier the runtime tries.
    fn context_options(&self) -> ContextOptions {
        ContextOptions::default()
    }

    /// Creates GPU resources once a context exists. An error aborts startup.
    fn init(&mut self, ctx: &InitCtx<'_, '_>) -> Result<()>;

    /// Called once after a successful `init`.
    fn start(&mut self) {}

    /// Called for every translated input event.
    fn on_input(&mut self, event: &InputEvent) -> EventResponse {
        let _ = event;
        EventResponse::Ignored
    }

    /// Called for raw window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per display refresh.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
