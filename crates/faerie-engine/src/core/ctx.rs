use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::time::FrameTime;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

/// Context passed to `core::App::init`.
pub struct InitCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a Gpu<'w>,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires a frame, calls `draw` with the GPU and the frame, then presents it.
    ///
    /// Surface errors are resolved here: recoverable ones skip the frame, fatal
    /// ones ask the runtime to exit.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&Gpu<'w>, &mut GpuFrame),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    log::error!("surface lost beyond recovery");
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        draw(&*self.gpu, &mut frame);

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
