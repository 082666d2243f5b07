use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, EventResponse, FrameCtx, InitCtx, WindowCtx};
use crate::device::{acquire_context, Gpu, GpuInit, WindowContextSource};
use crate::input::InputEvent;
use crate::input::platform::translate_window_event;
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "faerie bubbles".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
        }
    }
}

/// Entry point for the runtime.
///
/// Drives exactly one window: the drawing surface of the app.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.exit_status()
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,

    /// Why the window never came up, reported by `Runtime::run`.
    startup_error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            exit_requested: false,
            startup_error: None,
        }
    }

    /// `Err` when the window or the app never came up.
    fn exit_status(&mut self) -> Result<()> {
        match self.startup_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    /// Creates the window, acquires its context and hands it to the app.
    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let options = self.app.context_options();
        let gpu_init = self.gpu_init.clone();

        let mut entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                let mut source = WindowContextSource::new(w, gpu_init);
                acquire_context(&mut source, &options).map(|acquired| acquired.context)
            },
        }
        .try_build()
        .context("cannot create a rendering context")?;

        let app = &mut self.app;
        entry.with(|fields| {
            let info = fields.gpu.adapter_info();
            log::info!(
                "rendering on '{}' tier via {:?} ({})",
                fields.gpu.tier(),
                info.backend,
                info.name
            );

            let ctx = InitCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
            };
            app.init(&ctx)
        })?;

        // Timestamps start when the loop does.
        entry.with_clock_mut(|clock| *clock = FrameClock::new());

        Ok(entry)
    }
}

/// Offers the translated input to the app, then the raw event unless the
/// input was consumed.
fn dispatch_event<A>(app: &mut A, input: Option<InputEvent>, raw: &WindowEvent) -> AppControl
where
    A: CoreApp,
{
    if let Some(ev) = input {
        if app.on_input(&ev) == EventResponse::Consumed {
            log::trace!("input consumed: {ev:?}");
            return AppControl::Continue;
        }
    }
    app.on_window_event(raw)
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                self.app.start();
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.startup_error = Some(e);
                self.request_exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: every presented frame schedules the next one.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        let input = translate_window_event(&event);
        if dispatch_event(&mut self.app, input, &event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.entry = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let app = &mut self.app;
                let control = entry.with_mut(|fields| {
                    let time: FrameTime = fields.clock.tick();
                    let mut ctx = FrameCtx {
                        window: WindowCtx {
                            id: window_id,
                            window: fields.window,
                        },
                        gpu: fields.gpu,
                        time,
                    };
                    app.on_frame(&mut ctx)
                });

                if control == AppControl::Exit {
                    self.request_exit(event_loop);
                }
            }

            _ => {}
        }
    }
}
