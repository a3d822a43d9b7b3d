//! The fly-through engine: navigation, palette, and renderer behind one
//! thread-safe handle.
//!
//! Ticks never wait for a render. If the previous frame is still being
//! produced the tick only updates velocity and the viewport is moved on the
//! next tick instead. Explicit commands (reset, resize, recolor) wait for the
//! in-flight frame and then render a fresh one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};

use rand::Rng;
use tracing::{debug, info};

use flybrot_core::{
    EscapeParams, NavPhase, NavigationState, TickOutcome, Viewport, ZoomButton,
};

use crate::error::RenderError;
use crate::palette::Palette;
use crate::renderer::{Frame, RenderPool};

/// Static engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    /// Worker threads; `0` uses one per available core.
    pub threads: usize,
    pub escape: EscapeParams,
    pub initial_view: Viewport,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            threads: 0,
            escape: EscapeParams::default(),
            initial_view: Viewport::default(),
        }
    }
}

/// What one [`FlyThrough::tick`] did.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub velocity: f64,
    /// The frame rendered this tick, if the viewport moved.
    pub frame: Option<Arc<Frame>>,
}

/// Navigation state and the canvas it is drawn on.
#[derive(Debug)]
struct Session {
    viewport: Viewport,
    nav: NavigationState,
    width: u32,
    height: u32,
}

pub struct FlyThrough {
    session: Mutex<Session>,
    palette: RwLock<Palette>,
    /// Held for the duration of every render.
    render_slot: Mutex<()>,
    latest: Mutex<Option<Arc<Frame>>>,
    pool: RenderPool,
}

impl FlyThrough {
    pub fn new(config: EngineConfig, palette: Palette) -> crate::Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: config.width,
                height: config.height,
            });
        }
        config.initial_view.validate()?;
        let pool = RenderPool::new(config.threads, config.escape)?;
        info!(
            width = config.width,
            height = config.height,
            threads = pool.threads(),
            "Fly-through engine ready"
        );
        Ok(Self {
            session: Mutex::new(Session {
                viewport: config.initial_view,
                nav: NavigationState::new(),
                width: config.width,
                height: config.height,
            }),
            palette: RwLock::new(palette),
            render_slot: Mutex::new(()),
            latest: Mutex::new(None),
            pool,
        })
    }

    // -- Input ---------------------------------------------------------------

    pub fn press(&self, button: ZoomButton, now_ms: u64) {
        self.session().nav.press(button, now_ms);
    }

    pub fn release(&self, button: ZoomButton) {
        self.session().nav.release(button);
    }

    pub fn pointer_moved(&self, x: i32, y: i32) {
        self.session().nav.pointer_moved(x, y);
    }

    pub fn nudge(&self, delta: f64) {
        self.session().nav.nudge(delta);
    }

    pub fn stop(&self) {
        self.session().nav.stop();
    }

    // -- Commands that always render -----------------------------------------

    /// Return to the default view at rest and render it.
    pub fn reset_view(&self) -> crate::Result<Arc<Frame>> {
        {
            let mut session = self.session();
            let Session { viewport, nav, .. } = &mut *session;
            nav.reset(viewport);
        }
        info!("View reset");
        self.render_now()
    }

    /// Change the canvas size and render at the new size.
    pub fn resize(&self, width: u32, height: u32) -> crate::Result<Arc<Frame>> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        {
            let mut session = self.session();
            session.width = width;
            session.height = height;
        }
        debug!(width, height, "Canvas resized");
        self.render_now()
    }

    /// Replace every palette entry and re-render.
    ///
    /// Waits for any in-flight frame to release the palette first.
    pub fn regenerate_palette<R: Rng + ?Sized>(&self, rng: &mut R) -> crate::Result<Arc<Frame>> {
        {
            let mut palette = self.palette.write().unwrap_or_else(PoisonError::into_inner);
            palette.regenerate(rng);
            info!(version = palette.version(), "Palette regenerated");
        }
        self.render_now()
    }

    /// Render the current view, waiting for any in-flight frame first.
    pub fn render_now(&self) -> crate::Result<Arc<Frame>> {
        let _slot = self.render_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let (viewport, width, height) = {
            let session = self.session();
            (session.viewport, session.width, session.height)
        };
        self.render_and_publish(&viewport, width, height)
    }

    // -- Ticking -------------------------------------------------------------

    /// Advance navigation to `now_ms` and render if the viewport moved.
    pub fn tick(&self, now_ms: u64) -> crate::Result<TickReport> {
        let slot = match self.render_slot.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::WouldBlock) => None,
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
        };

        let (outcome, velocity, viewport, width, height) = {
            let mut session = self.session();
            let Session {
                viewport,
                nav,
                width,
                height,
            } = &mut *session;
            let outcome = nav.tick(viewport, *width, *height, now_ms, slot.is_none())?;
            (outcome, nav.velocity(), *viewport, *width, *height)
        };

        let frame = match (outcome, slot) {
            (TickOutcome::Recentered, Some(_slot)) => {
                Some(self.render_and_publish(&viewport, width, height)?)
            }
            (TickOutcome::Deferred, _) => {
                debug!(velocity, "Render in flight, tick deferred");
                None
            }
            _ => None,
        };

        Ok(TickReport {
            outcome,
            velocity,
            frame,
        })
    }

    // -- Queries -------------------------------------------------------------

    /// `true` while a frame is being rendered.
    pub fn is_rendering(&self) -> bool {
        matches!(self.render_slot.try_lock(), Err(TryLockError::WouldBlock))
    }

    /// Claim the render slot without rendering, blocking ticks from moving
    /// the viewport until the guard is dropped.
    #[cfg(test)]
    pub(crate) fn hold_render_slot(&self) -> MutexGuard<'_, ()> {
        self.render_slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn viewport(&self) -> Viewport {
        self.session().viewport
    }

    pub fn velocity(&self) -> f64 {
        self.session().nav.velocity()
    }

    pub fn phase(&self) -> NavPhase {
        self.session().nav.phase()
    }

    pub fn canvas(&self) -> (u32, u32) {
        let session = self.session();
        (session.width, session.height)
    }

    pub fn palette_version(&self) -> u64 {
        self.palette.read().unwrap_or_else(PoisonError::into_inner).version()
    }

    /// Window-title summary of speed and bounds.
    pub fn title(&self) -> String {
        let session = self.session();
        session.nav.title(&session.viewport)
    }

    pub fn escape_params(&self) -> &EscapeParams {
        self.pool.params()
    }

    // -- Internals -----------------------------------------------------------

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller must hold the render slot.
    fn render_and_publish(
        &self,
        viewport: &Viewport,
        width: u32,
        height: u32,
    ) -> crate::Result<Arc<Frame>> {
        let frame = {
            let palette = self.palette.read().unwrap_or_else(PoisonError::into_inner);
            Arc::new(self.pool.render_frame(viewport, width, height, &palette)?)
        };
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&frame));
        Ok(frame)
    }
}
