use anyhow::{Context, Result};

use faerie_engine::core::{App, AppControl, EventResponse, FrameCtx, InitCtx};
use faerie_engine::device::{ContextOptions, PartialContextOptions};
use faerie_engine::input::InputEvent;

use crate::animation::AnimationState;
use crate::latch::InputLatch;
use crate::loader::{ImagePoll, ImageRequest};
use crate::render::{Globals, QuadRenderer};

/// Image bundled with the crate.
pub const DEFAULT_IMAGE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/faerie.bubbles.png");

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Resources may exist but no frame has been scheduled.
    Idle,
    Running,
}

/// The demo instance: resources, input state and the animation clock.
pub struct FaerieBubbles {
    options: ContextOptions,
    image_url: String,

    state: LoopState,
    latch: InputLatch,
    animation: AnimationState,

    renderer: Option<QuadRenderer>,
    image: Option<ImageRequest>,
}

impl FaerieBubbles {
    /// Context options are the defaults with `overrides` applied.
    pub fn new(overrides: &PartialContextOptions) -> Self {
        Self {
            options: ContextOptions::merged(overrides),
            image_url: DEFAULT_IMAGE.to_string(),
            state: LoopState::Idle,
            latch: InputLatch::default(),
            animation: AnimationState::new(),
            renderer: None,
            image: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn latch(&self) -> InputLatch {
        self.latch
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// Kicks off the image request. Later calls keep the first request.
    pub fn load(&mut self) {
        if self.image.is_none() {
            self.image = Some(ImageRequest::spawn(&self.image_url));
        }
    }

    /// Begins the animation loop.
    pub fn start(&mut self) {
        match self.state {
            LoopState::Idle => {
                self.state = LoopState::Running;
                log::info!("faerie bubbles running");
            }
            LoopState::Running => log::debug!("start requested while already running; ignored"),
        }
    }

    /// Advances the animation to `now_ms` and returns the frame's uniforms.
    ///
    /// Idle instances draw nothing.
    pub fn advance(&mut self, now_ms: f64, aspect: f32) -> Option<Globals> {
        if self.state != LoopState::Running {
            return None;
        }
        self.animation.tick(self.latch, now_ms);
        Some(Globals::for_frame(self.animation.rotation_vector(), aspect))
    }

    fn poll_image(&mut self, ctx: &FrameCtx<'_, '_>) {
        let Some(request) = self.image.as_mut() else {
            return;
        };

        match request.poll() {
            ImagePoll::Pending => return,
            ImagePoll::Ready(image) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    match renderer.replace_texture(&*ctx.gpu, &image) {
                        Ok(()) => {
                            let texture = renderer.texture();
                            log::info!(
                                "bubble image loaded from {} ({:?}, {} mip level(s))",
                                image.source.display(),
                                texture.filtering(),
                                texture.mip_level_count()
                            );
                        }
                        Err(e) => log::warn!("{e}; keeping placeholder texture"),
                    }
                }
            }
            ImagePoll::Abandoned => {}
        }

        self.image = None;
    }
}

impl App for FaerieBubbles {
    fn context_options(&self) -> ContextOptions {
        self.options
    }

    fn init(&mut self, ctx: &InitCtx<'_, '_>) -> Result<()> {
        let renderer = QuadRenderer::new(ctx.gpu).context("cannot initialize faerie bubbles")?;
        self.renderer = Some(renderer);
        self.load();
        log::info!("faerie bubbles loaded");
        Ok(())
    }

    fn start(&mut self) {
        FaerieBubbles::start(self);
    }

    fn on_input(&mut self, event: &InputEvent) -> EventResponse {
        self.latch.apply(event)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.poll_image(ctx);

        let Some(globals) = self.advance(ctx.time.now_ms, ctx.gpu.aspect_ratio()) else {
            return AppControl::Continue;
        };
        let Some(renderer) = self.renderer.as_ref() else {
            return AppControl::Continue;
        };

        ctx.render(|gpu, frame| renderer.draw(gpu, frame, &globals))
    }
}

#[cfg(test)]
mod tests {
    use faerie_engine::device::PowerPreference;
    use faerie_engine::input::{Key, KeyState};

    use super::*;
    use crate::animation::{MAX_ANGLE, MIN_ANGLE};

    fn press(key: Key) -> InputEvent {
        InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
        }
    }

    #[test]
    fn overrides_merge_into_defaults() {
        let demo = FaerieBubbles::new(&PartialContextOptions {
            antialias: Some(false),
            power_preference: Some(PowerPreference::LowPower),
            ..Default::default()
        });
        let o = demo.options();
        assert!(!o.antialias);
        assert_eq!(o.power_preference, PowerPreference::LowPower);
        assert!(o.depth && o.stencil && o.desynchronized);
        assert!(!o.alpha);
    }

    #[test]
    fn idle_demo_does_not_animate() {
        let mut demo = FaerieBubbles::new(&PartialContextOptions::default());
        demo.on_input(&press(Key::ArrowRight));
        assert_eq!(demo.state(), LoopState::Idle);
        assert!(demo.advance(1000.0, 1.0).is_none());
        assert_eq!(demo.animation().current_angle(), 0.0);
    }

    #[test]
    fn start_is_one_shot() {
        let mut demo = FaerieBubbles::new(&PartialContextOptions::default());
        demo.start();
        demo.advance(400.0, 1.0);
        demo.start();
        assert_eq!(demo.state(), LoopState::Running);
        assert_eq!(demo.animation().previous_frame_time(), 400.0);
    }

    #[test]
    fn held_keys_drive_the_angle() {
        let mut demo = FaerieBubbles::new(&PartialContextOptions::default());
        demo.start();

        demo.on_input(&press(Key::ArrowRight));
        let g = demo.advance(2000.0, 1.0).unwrap();
        assert_eq!(demo.animation().current_angle(), MAX_ANGLE);
        assert!((g.rotation_vector[0] as f64 - MAX_ANGLE.sin()).abs() < 1e-6);

        demo.on_input(&InputEvent::Key {
            key: Key::ArrowRight,
            state: KeyState::Released,
            repeat: false,
        });
        demo.on_input(&press(Key::ArrowLeft));
        demo.advance(6000.0, 1.0);
        assert_eq!(demo.animation().current_angle(), MIN_ANGLE);
        assert_eq!(demo.latch().direction(), -1.0);
    }

    #[test]
    fn unrelated_keys_pass_through() {
        let mut demo = FaerieBubbles::new(&PartialContextOptions::default());
        assert_eq!(demo.on_input(&press(Key::ArrowUp)), EventResponse::Ignored);
        assert_eq!(demo.on_input(&press(Key::ArrowLeft)), EventResponse::Consumed);
    }

    #[test]
    fn load_requests_the_image_once() {
        let mut demo = FaerieBubbles::new(&PartialContextOptions::default())
            .with_image("file:///nonexistent/faerie.png");
        demo.load();
        let first = demo.image.as_ref().map(|r| r.source().to_path_buf());
        demo.load();
        let second = demo.image.as_ref().map(|r| r.source().to_path_buf());
        assert_eq!(first, second);
        assert_eq!(
            first.as_deref(),
            Some(std::path::Path::new("/nonexistent/faerie.png"))
        );
    }
}
