use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use flybrot_core::{TickOutcome, ZoomButton};
use flybrot_render::{ExportMetadata, FlyThrough, Palette};

use crate::error::AppError;
use crate::preferences::Preferences;
use crate::screenshot::ScreenshotWriter;
use crate::script::{FlightAction, PointerButton, Script};

/// Counters for a finished run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub ticks: u64,
    /// Frames rendered by ticks (explicit commands not included).
    pub frames: u64,
    pub deferred: u64,
    pub clamps: u64,
    pub screenshots: Vec<PathBuf>,
    pub title: String,
}

/// Replays a script against the engine on a simulated clock.
pub struct Driver {
    engine: FlyThrough,
    script: Script,
    shots: ScreenshotWriter,
    rng: StdRng,
    tick_interval_ms: u64,
    end_ms: u64,
    screenshot_every: u32,
}

impl Driver {
    pub fn new(prefs: &Preferences) -> Result<Self, AppError> {
        let config = prefs.engine_config()?;
        let mut rng = match prefs.palette_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let engine = FlyThrough::new(config, Palette::random(&mut rng))?;
        let shots = ScreenshotWriter::new(prefs.screenshot_directory(), prefs.screenshot_format)?;
        let script = Script::new(prefs.script.clone());
        let end_ms = prefs.duration_ms.max(script.last_at());
        debug!(next_screenshot = shots.next_index(), end_ms, "Driver ready");

        Ok(Self {
            engine,
            script,
            shots,
            rng,
            tick_interval_ms: prefs.tick_interval_ms,
            end_ms,
            screenshot_every: prefs.screenshot_every,
        })
    }

    #[cfg(test)]
    pub fn engine(&self) -> &FlyThrough {
        &self.engine
    }

    pub fn run(&mut self) -> Result<RunSummary, AppError> {
        self.engine.render_now()?;
        info!(title = %self.engine.title(), end_ms = self.end_ms, "Flight started");

        let mut summary = RunSummary::default();
        let mut now = 0;
        loop {
            let due = self.script.due(now).to_vec();
            for event in &due {
                self.apply(&event.action, now, &mut summary)?;
            }

            let report = self.engine.tick(now)?;
            summary.ticks += 1;
            match report.outcome {
                TickOutcome::Recentered => summary.frames += 1,
                TickOutcome::Deferred => summary.deferred += 1,
                TickOutcome::Clamped(_) => summary.clamps += 1,
                TickOutcome::Idle => {}
            }

            if report.frame.is_some() {
                debug!(
                    phase = self.engine.phase().label(),
                    title = %self.engine.title(),
                    "Tick rendered"
                );
                if self.screenshot_every > 0
                    && summary.frames % u64::from(self.screenshot_every) == 0
                {
                    self.capture(&mut summary)?;
                }
            }

            if now >= self.end_ms && self.script.is_finished() {
                break;
            }
            now += self.tick_interval_ms;
        }

        summary.title = self.engine.title();
        Ok(summary)
    }

    fn apply(
        &mut self,
        action: &FlightAction,
        now: u64,
        summary: &mut RunSummary,
    ) -> Result<(), AppError> {
        debug!(?action, now, "Input");
        match *action {
            FlightAction::Press { button } => match button {
                PointerButton::Left => self.engine.press(ZoomButton::In, now),
                PointerButton::Right => self.engine.press(ZoomButton::Out, now),
                PointerButton::Middle => self.engine.stop(),
            },
            FlightAction::Release { button } => match button {
                PointerButton::Left => self.engine.release(ZoomButton::In),
                PointerButton::Right => self.engine.release(ZoomButton::Out),
                PointerButton::Middle => {}
            },
            FlightAction::Move { x, y } => self.engine.pointer_moved(x, y),
            FlightAction::Stop => self.engine.stop(),
            FlightAction::Reset => {
                self.engine.reset_view()?;
            }
            FlightAction::Recolor => {
                self.engine.regenerate_palette(&mut self.rng)?;
            }
            FlightAction::Faster => self.engine.nudge(1.0),
            FlightAction::Slower => self.engine.nudge(-1.0),
            FlightAction::Screenshot => self.capture(summary)?,
            FlightAction::Resize { width, height } => {
                self.engine.resize(width, height)?;
            }
            FlightAction::Key { key } => match FlightAction::from_key(key) {
                Some(mapped) => self.apply(&mapped, now, summary)?,
                None => warn!("No action bound to key {key:?}"),
            },
        }
        Ok(())
    }

    fn capture(&mut self, summary: &mut RunSummary) -> Result<(), AppError> {
        let frame = match self.engine.latest_frame() {
            Some(frame) => frame,
            None => self.engine.render_now()?,
        };
        let meta = ExportMetadata {
            velocity: self.engine.velocity(),
            max_iterations: self.engine.escape_params().max_iterations,
        };
        let path = self.shots.capture(&frame, &meta)?;
        summary.screenshots.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screenshot::ScreenshotFormat;
    use crate::script::TimedEvent;
    use flybrot_core::Viewport;

    fn prefs(dir: &str, script: Vec<TimedEvent>) -> Preferences {
        let dir = std::env::temp_dir().join(dir);
        let _ = std::fs::remove_dir_all(&dir);
        Preferences {
            width: 48,
            height: 32,
            max_iterations: 128,
            threads: 2,
            palette_seed: Some(17),
            screenshot_dir: dir.to_string_lossy().into_owned(),
            screenshot_format: ScreenshotFormat::Png,
            duration_ms: 1000,
            script,
            ..Preferences::default()
        }
    }

    fn cleanup(prefs: &Preferences) {
        let _ = std::fs::remove_dir_all(&prefs.screenshot_dir);
    }

    #[test]
    fn held_zoom_flies_inwards() {
        let p = prefs(
            "flybrot_test_driver_zoom",
            vec![
                TimedEvent::new(0, FlightAction::Move { x: 20, y: 18 }),
                TimedEvent::new(
                    0,
                    FlightAction::Press {
                        button: PointerButton::Left,
                    },
                ),
                TimedEvent::new(
                    600,
                    FlightAction::Release {
                        button: PointerButton::Left,
                    },
                ),
                TimedEvent::new(1000, FlightAction::Key { key: 'p' }),
            ],
        );
        let mut driver = Driver::new(&p).unwrap();
        let summary = driver.run().unwrap();

        // 0, 50, …, 1000 ms.
        assert_eq!(summary.ticks, 21);
        // The first tick has zero hold time; every later one moves.
        assert_eq!(summary.frames, 20);
        assert_eq!(summary.screenshots.len(), 1);
        assert!(summary.screenshots[0].ends_with("image1.png"));
        assert!(driver.engine().viewport().width() < 3.0);
        assert!(summary.title.starts_with("Speed: "));

        cleanup(&p);
    }

    #[test]
    fn middle_button_and_reset() {
        let p = prefs(
            "flybrot_test_driver_reset",
            vec![
                TimedEvent::new(0, FlightAction::Key { key: '=' }),
                TimedEvent::new(
                    200,
                    FlightAction::Press {
                        button: PointerButton::Middle,
                    },
                ),
                TimedEvent::new(300, FlightAction::Key { key: '\r' }),
            ],
        );
        let mut driver = Driver::new(&p).unwrap();
        let summary = driver.run().unwrap();

        // Ticks at 0, 50, 100, 150 move; the middle button halts at 200.
        assert_eq!(summary.frames, 4);
        assert_eq!(driver.engine().velocity(), 0.0);
        assert_eq!(driver.engine().viewport(), Viewport::default());

        cleanup(&p);
    }

    #[test]
    fn recolor_and_periodic_screenshots() {
        let mut p = prefs(
            "flybrot_test_driver_recolor",
            vec![
                TimedEvent::new(0, FlightAction::Faster),
                TimedEvent::new(100, FlightAction::Recolor),
                TimedEvent::new(190, FlightAction::Stop),
            ],
        );
        p.screenshot_every = 2;
        p.duration_ms = 300;

        let mut driver = Driver::new(&p).unwrap();
        let summary = driver.run().unwrap();

        assert_eq!(driver.engine().palette_version(), 1);
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.screenshots.len(), 2);

        cleanup(&p);
    }

    #[test]
    fn resize_changes_canvas() {
        let p = prefs(
            "flybrot_test_driver_resize",
            vec![TimedEvent::new(
                0,
                FlightAction::Resize {
                    width: 30,
                    height: 20,
                },
            )],
        );
        let mut driver = Driver::new(&p).unwrap();
        driver.run().unwrap();
        assert_eq!(driver.engine().canvas(), (30, 20));
        let frame = driver.engine().latest_frame().unwrap();
        assert_eq!(frame.raster.width, 30);

        cleanup(&p);
    }
}
