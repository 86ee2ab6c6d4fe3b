use crate::animation::clock::tick;
use crate::avatar::config::AvatarConfig;
use crate::avatar::resolve::resolve;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::render::raster::{FrameRenderer, Rasterizer, clear_pixel};
use crate::render::surface::Surface;
use crate::scene::graph::{SceneNode, compose, place_at_center};

/// Options for a mounted avatar.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionOpts {
    /// Surface size; the monster is centered on it.
    pub canvas: Canvas,
    /// Frame rate the scheduler runs at.
    pub fps: Fps,
    /// Straight-alpha background; `None` keeps the surface transparent.
    pub clear_rgba: Option<[u8; 4]>,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 300,
                height: 300,
            },
            fps: Fps { num: 60, den: 1 },
            clear_rgba: None,
        }
    }
}

/// Registration returned by [`FrameScheduler::request_frames`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Source of per-frame callbacks.
///
/// The driver asks for the next frame time and hands it to [`AvatarSession::frame`];
/// nothing is delivered once the registration is cancelled.
pub trait FrameScheduler {
    /// Starts a registration; frame time restarts at zero.
    fn request_frames(&mut self) -> FrameHandle;

    /// Ends `handle`. Unknown or already-cancelled handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);

    /// Seconds since the registration started, for the next frame.
    fn next_frame(&mut self) -> Option<f64>;
}

/// Deterministic scheduler that advances by exactly one frame period per call.
#[derive(Clone, Debug)]
pub struct ManualScheduler {
    fps: Fps,
    frame: u64,
    active: Option<FrameHandle>,
    next_id: u64,
}

impl ManualScheduler {
    /// A scheduler with no registration.
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            frame: 0,
            active: None,
            next_id: 0,
        }
    }

    /// `true` while a registration is live.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Frames handed out since the last registration.
    pub fn frames_delivered(&self) -> u64 {
        self.frame
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frames(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.active = Some(handle);
        self.frame = 0;
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.active == Some(handle) {
            self.active = None;
        }
    }

    fn next_frame(&mut self) -> Option<f64> {
        self.active?;
        let t = self.fps.frames_to_secs(self.frame);
        self.frame += 1;
        Some(t)
    }
}

/// A live avatar: the current configuration, its scene graph and the last drawn
/// surface.
///
/// Mounting draws the default configuration. A configuration delivered later is
/// staged and swapped in at the start of the next frame; the clock keeps running
/// across the swap. All mutation happens inside [`AvatarSession::frame`].
pub struct AvatarSession {
    opts: SessionOpts,
    config: AvatarConfig,
    staged: Option<AvatarConfig>,
    root: SceneNode,
    renderer: Box<dyn FrameRenderer>,
    surface: Option<Surface>,
    handle: Option<FrameHandle>,
    elapsed: f64,
    failed_frames: u64,
}

impl std::fmt::Debug for AvatarSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarSession")
            .field("opts", &self.opts)
            .field("config", &self.config)
            .field("staged", &self.staged.is_some())
            .field("running", &self.handle.is_some())
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

impl AvatarSession {
    /// Mounts with a [`Rasterizer`] for `opts`.
    pub fn mount(opts: SessionOpts, scheduler: &mut dyn FrameScheduler) -> AvatarResult<Self> {
        let canvas = Canvas::new(opts.canvas.width, opts.canvas.height)?;
        let renderer = Rasterizer::new(canvas, opts.clear_rgba)?;
        Self::mount_with_renderer(opts, Box::new(renderer), scheduler)
    }

    /// Mounts with a caller-provided renderer, which must draw at `opts.canvas`.
    pub fn mount_with_renderer(
        opts: SessionOpts,
        renderer: Box<dyn FrameRenderer>,
        scheduler: &mut dyn FrameScheduler,
    ) -> AvatarResult<Self> {
        let canvas = Canvas::new(opts.canvas.width, opts.canvas.height)?;
        let rc = renderer.canvas();
        if rc != canvas {
            return Err(AvatarError::validation(format!(
                "renderer draws {}x{} but the session canvas is {}x{}",
                rc.width, rc.height, canvas.width, canvas.height
            )));
        }
        let config = AvatarConfig::default();
        let root = build_scene(&config, canvas);
        let surface = Surface::new(canvas, clear_pixel(opts.clear_rgba));
        let handle = scheduler.request_frames();
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            ?handle,
            "avatar mounted"
        );
        Ok(Self {
            opts,
            config,
            staged: None,
            root,
            renderer,
            surface: Some(surface),
            handle: Some(handle),
            elapsed: 0.0,
            failed_frames: 0,
        })
    }

    /// Options the session was mounted with.
    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Configuration currently drawn.
    pub fn config(&self) -> &AvatarConfig {
        &self.config
    }

    /// Scene graph currently drawn.
    pub fn scene(&self) -> &SceneNode {
        &self.root
    }

    /// Last drawn surface; `None` after [`AvatarSession::stop`].
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Time of the last frame, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Frames whose render failed.
    pub fn failed_frames(&self) -> u64 {
        self.failed_frames
    }

    /// `false` after [`AvatarSession::stop`].
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// `true` while a delivered configuration waits for the next frame.
    pub fn has_staged_config(&self) -> bool {
        self.staged.is_some()
    }

    /// Stages `config` for the next frame. A later delivery replaces an earlier one
    /// that has not been applied yet.
    pub fn deliver_config(&mut self, config: AvatarConfig) {
        self.staged = Some(config);
    }

    /// Runs one frame at elapsed time `t`.
    ///
    /// A render failure is logged and the previous surface stays current. Returns the
    /// current surface, or `None` once stopped.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn frame(&mut self, t: f64) -> Option<&Surface> {
        self.handle?;

        if let Some(config) = self.staged.take() {
            tracing::debug!(?config, "applying staged avatar config");
            self.root = build_scene(&config, self.opts.canvas);
            self.config = config;
        }

        tick(&mut self.root, t);
        self.elapsed = t;

        match self.renderer.render(&self.root) {
            Ok(surface) => self.surface = Some(surface),
            Err(e) => {
                self.failed_frames += 1;
                tracing::warn!(error = %e, t, "frame render failed; keeping last surface");
            }
        }
        self.surface.as_ref()
    }

    /// Cancels the frame registration and releases the surface. Calling it again is a
    /// no-op.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        scheduler.cancel(handle);
        if let Some(surface) = self.surface.as_mut() {
            surface.dispose();
        }
        self.surface = None;
        tracing::debug!(?handle, elapsed = self.elapsed, "avatar stopped");
    }

    /// Pulls up to `max_frames` frames from `scheduler`, handing each surface to
    /// `on_frame`. Returns the number of frames run.
    pub fn run(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        max_frames: u64,
        mut on_frame: impl FnMut(u64, f64, &Surface) -> AvatarResult<()>,
    ) -> AvatarResult<u64> {
        let mut n = 0;
        while n < max_frames {
            let Some(t) = scheduler.next_frame() else {
                break;
            };
            let Some(surface) = self.frame(t) else {
                break;
            };
            on_frame(n, t, surface)?;
            n += 1;
        }
        Ok(n)
    }
}

fn build_scene(config: &AvatarConfig, canvas: Canvas) -> SceneNode {
    let mut root = compose(&resolve(config));
    place_at_center(&mut root, canvas);
    root
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
