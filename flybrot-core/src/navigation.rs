//! Velocity-driven fly-through navigation.
//!
//! Holding a zoom button accelerates the view towards (or away from) the
//! pointer; releasing it lets the view coast at the current velocity until it
//! is stopped or runs into a zoom bound.

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::viewport::{Viewport, ZoomLimit};

/// Default spacing between navigation ticks.
pub const TICK_INTERVAL_MS: u64 = 50;

/// Milliseconds of hold time that add one unit of velocity per tick.
pub const HOLD_MS_PER_VELOCITY: f64 = 5000.0;

/// On zoom-out release, velocities smaller than this snap to zero.
pub const DRIFT_SNAP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomButton {
    /// Primary button: fly inwards.
    In,
    /// Secondary button: fly outwards.
    Out,
}

/// Coarse navigation phase, derived from velocity and held buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    Accelerating,
    Cruising,
}

impl NavPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Accelerating => "Accelerating",
            Self::Cruising => "Cruising",
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Velocity is zero; nothing moved.
    Idle,
    /// A zoom bound was hit and velocity forced to zero.
    Clamped(ZoomLimit),
    /// The viewport moved; the caller should render it.
    Recentered,
    /// Velocity is non-zero but a render is still in flight, so the
    /// viewport was left alone this tick.
    Deferred,
}

/// Velocity, held-button timestamps, and the last pointer position.
///
/// Timestamps are caller-supplied milliseconds on any monotonic clock.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationState {
    velocity: f64,
    zoom_in_since: Option<u64>,
    zoom_out_since: Option<u64>,
    pointer: (i32, i32),
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn pointer(&self) -> (i32, i32) {
        self.pointer
    }

    pub fn is_held(&self, button: ZoomButton) -> bool {
        match button {
            ZoomButton::In => self.zoom_in_since.is_some(),
            ZoomButton::Out => self.zoom_out_since.is_some(),
        }
    }

    pub fn phase(&self) -> NavPhase {
        if self.zoom_in_since.is_some() || self.zoom_out_since.is_some() {
            NavPhase::Accelerating
        } else if self.velocity != 0.0 {
            NavPhase::Cruising
        } else {
            NavPhase::Idle
        }
    }

    pub fn press(&mut self, button: ZoomButton, now_ms: u64) {
        debug!(?button, now_ms, "Zoom button pressed");
        match button {
            ZoomButton::In => self.zoom_in_since = Some(now_ms),
            ZoomButton::Out => self.zoom_out_since = Some(now_ms),
        }
    }

    pub fn release(&mut self, button: ZoomButton) {
        match button {
            ZoomButton::In => self.zoom_in_since = None,
            ZoomButton::Out => {
                self.zoom_out_since = None;
                if self.velocity.abs() < DRIFT_SNAP {
                    self.velocity = 0.0;
                }
            }
        }
    }

    pub fn pointer_moved(&mut self, x: i32, y: i32) {
        self.pointer = (x, y);
    }

    /// Halt immediately and forget any held buttons.
    pub fn stop(&mut self) {
        self.velocity = 0.0;
        self.zoom_in_since = None;
        self.zoom_out_since = None;
    }

    /// [`stop`](Self::stop) and return the viewport to its default rectangle.
    pub fn reset(&mut self, viewport: &mut Viewport) {
        self.stop();
        viewport.reset();
    }

    /// Add a fixed amount of velocity (keyboard `+` / `-`).
    pub fn nudge(&mut self, delta: f64) {
        self.velocity += delta;
    }

    /// Advance one tick at time `now_ms`.
    ///
    /// Updates velocity from the held buttons and, unless
    /// `render_in_flight` is set, recentres `viewport` on the pointer. A
    /// canvas of zero size is the only error.
    pub fn tick(
        &mut self,
        viewport: &mut Viewport,
        width: u32,
        height: u32,
        now_ms: u64,
        render_in_flight: bool,
    ) -> crate::Result<TickOutcome> {
        let limit = viewport.zoom_limit();
        if let Some(limit) = limit {
            if self.velocity != 0.0 {
                self.clamp(limit);
                return Ok(TickOutcome::Clamped(limit));
            }
        }

        if let Some(since) = self.zoom_in_since {
            if limit != Some(ZoomLimit::Floor) {
                self.velocity += held_for(since, now_ms);
            }
        } else if let Some(since) = self.zoom_out_since {
            if limit != Some(ZoomLimit::Ceiling) {
                self.velocity -= held_for(since, now_ms);
            }
        }

        if self.velocity == 0.0 {
            return Ok(TickOutcome::Idle);
        }
        if render_in_flight {
            return Ok(TickOutcome::Deferred);
        }

        let (px, py) = self.pointer;
        match viewport.recenter_towards(px as f64, py as f64, width, height, self.velocity) {
            Ok(()) => Ok(TickOutcome::Recentered),
            Err(CoreError::DegenerateViewport { reason }) => {
                warn!(velocity = self.velocity, %reason, "Step would collapse the viewport");
                self.clamp(ZoomLimit::Floor);
                Ok(TickOutcome::Clamped(ZoomLimit::Floor))
            }
            Err(e) => Err(e),
        }
    }

    /// Window-title style summary of speed and bounds.
    pub fn title(&self, viewport: &Viewport) -> String {
        format!(
            "Speed: {:.2}, Coordinates: [{},{}] to [{},{}]",
            self.velocity, viewport.start_x, viewport.start_y, viewport.end_x, viewport.end_y
        )
    }

    fn clamp(&mut self, limit: ZoomLimit) {
        warn!(?limit, velocity = self.velocity, "Zoom bound reached, stopping");
        self.velocity = 0.0;
        match limit {
            ZoomLimit::Floor => self.zoom_in_since = None,
            ZoomLimit::Ceiling => self.zoom_out_since = None,
        }
    }
}

#[inline]
fn held_for(since: u64, now_ms: u64) -> f64 {
    now_ms.saturating_sub(since) as f64 / HOLD_MS_PER_VELOCITY
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 800;
    const H: u32 = 600;

    fn tiny_viewport() -> Viewport {
        Viewport::new(-0.75, -0.75 + 3e-13, 0.1, 0.1 + 2e-13).unwrap()
    }

    #[test]
    fn five_second_hold_gives_unit_velocity() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::default();
        nav.press(ZoomButton::In, 0);

        let outcome = nav.tick(&mut vp, W, H, 5000, true).unwrap();

        assert_eq!(nav.velocity(), 1.0);
        assert_eq!(outcome, TickOutcome::Deferred);
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn velocity_accumulates_each_tick() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::default();
        nav.press(ZoomButton::In, 1000);
        nav.pointer_moved(400, 300);

        nav.tick(&mut vp, W, H, 1050, false).unwrap();
        nav.tick(&mut vp, W, H, 1100, false).unwrap();

        // 50/5000 + 100/5000
        assert!((nav.velocity() - 0.03).abs() < 1e-12);
        assert!(vp.width() < 3.0);
        assert_eq!(nav.phase(), NavPhase::Accelerating);
    }

    #[test]
    fn zoom_out_hold_decreases_velocity() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::default();
        nav.press(ZoomButton::Out, 0);
        let outcome = nav.tick(&mut vp, W, H, 500, false).unwrap();

        assert!((nav.velocity() + 0.1).abs() < 1e-12);
        assert_eq!(outcome, TickOutcome::Recentered);
        assert!(vp.width() > 3.0);
    }

    #[test]
    fn zoom_in_wins_when_both_held() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::default();
        nav.press(ZoomButton::In, 0);
        nav.press(ZoomButton::Out, 0);
        nav.tick(&mut vp, W, H, 500, true).unwrap();
        assert!(nav.velocity() > 0.0);
    }

    #[test]
    fn floor_clamp_freezes_bounds() {
        let mut nav = NavigationState::new();
        let mut vp = tiny_viewport();
        let before = vp;
        nav.nudge(0.5);
        nav.press(ZoomButton::In, 0);
        nav.pointer_moved(10, 20);

        let first = nav.tick(&mut vp, W, H, 50, false).unwrap();
        assert_eq!(first, TickOutcome::Clamped(ZoomLimit::Floor));
        assert!(!nav.is_held(ZoomButton::In));

        for t in 2..20u64 {
            nav.tick(&mut vp, W, H, t * 50, false).unwrap();
        }
        assert_eq!(nav.velocity(), 0.0);
        assert_eq!(vp, before);
    }

    #[test]
    fn floor_blocks_new_zoom_in_but_allows_zoom_out() {
        let mut nav = NavigationState::new();
        let mut vp = tiny_viewport();
        let before = vp;

        nav.press(ZoomButton::In, 0);
        assert_eq!(nav.tick(&mut vp, W, H, 1000, false).unwrap(), TickOutcome::Idle);
        assert_eq!(vp, before);
        nav.release(ZoomButton::In);

        nav.press(ZoomButton::Out, 1000);
        let outcome = nav.tick(&mut vp, W, H, 2000, false).unwrap();
        assert_eq!(outcome, TickOutcome::Recentered);
        assert!(nav.velocity() < 0.0);
        assert!(vp.width() > before.width());
    }

    #[test]
    fn ceiling_clamp_clears_zoom_out_hold() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::new(-5.0, 3.0, -2.0, 2.0).unwrap();
        nav.nudge(-1.0);
        nav.press(ZoomButton::Out, 0);

        let outcome = nav.tick(&mut vp, W, H, 50, false).unwrap();
        assert_eq!(outcome, TickOutcome::Clamped(ZoomLimit::Ceiling));
        assert_eq!(nav.velocity(), 0.0);
        assert!(!nav.is_held(ZoomButton::Out));
    }

    #[test]
    fn overshoot_is_treated_as_floor() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::default();
        nav.nudge(150.0);
        nav.pointer_moved(400, 300);

        let outcome = nav.tick(&mut vp, W, H, 0, false).unwrap();
        assert_eq!(outcome, TickOutcome::Clamped(ZoomLimit::Floor));
        assert_eq!(nav.velocity(), 0.0);
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn small_drift_snaps_on_zoom_out_release() {
        let mut nav = NavigationState::new();
        nav.nudge(0.04);
        nav.press(ZoomButton::Out, 0);
        nav.release(ZoomButton::Out);
        assert_eq!(nav.velocity(), 0.0);

        nav.nudge(0.2);
        nav.press(ZoomButton::Out, 0);
        nav.release(ZoomButton::Out);
        assert!((nav.velocity() - 0.2).abs() < 1e-12);
        assert_eq!(nav.phase(), NavPhase::Cruising);
    }

    #[test]
    fn zoom_in_release_keeps_drift() {
        let mut nav = NavigationState::new();
        nav.nudge(0.01);
        nav.press(ZoomButton::In, 0);
        nav.release(ZoomButton::In);
        assert!((nav.velocity() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn stop_and_reset() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::new(0.0, 0.5, 0.0, 0.5).unwrap();
        nav.press(ZoomButton::In, 0);
        nav.press(ZoomButton::Out, 0);
        nav.nudge(2.0);

        nav.stop();
        assert_eq!(nav.velocity(), 0.0);
        assert_eq!(nav.phase(), NavPhase::Idle);
        assert_eq!(vp, Viewport::new(0.0, 0.5, 0.0, 0.5).unwrap());

        nav.nudge(1.0);
        nav.reset(&mut vp);
        assert_eq!(nav.velocity(), 0.0);
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn idle_tick_does_nothing() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::default();
        assert_eq!(nav.tick(&mut vp, W, H, 100, false).unwrap(), TickOutcome::Idle);
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn empty_canvas_is_an_error() {
        let mut nav = NavigationState::new();
        let mut vp = Viewport::default();
        nav.nudge(1.0);
        assert!(nav.tick(&mut vp, 0, 0, 100, false).is_err());
    }

    #[test]
    fn title_format() {
        let mut nav = NavigationState::new();
        nav.nudge(1.0);
        nav.nudge(0.234);
        let title = nav.title(&Viewport::default());
        assert_eq!(title, "Speed: 1.23, Coordinates: [-2,-1] to [1,1]");
    }

    #[test]
    fn phase_labels_follow_state() {
        let mut nav = NavigationState::new();
        assert_eq!(nav.phase().label(), "Idle");
        nav.press(ZoomButton::Out, 0);
        assert_eq!(nav.phase().label(), "Accelerating");
        nav.nudge(-0.5);
        nav.release(ZoomButton::Out);
        assert_eq!(nav.phase().label(), "Cruising");
    }
}
