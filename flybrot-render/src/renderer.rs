use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use flybrot_core::{EscapeParams, Viewport};

use crate::error::RenderError;
use crate::palette::Palette;
use crate::raster::Raster;
use crate::rows::{build_row_jobs, render_row, RowJob};

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A fully rendered frame, ready to hand to a display.
#[derive(Debug, Clone)]
pub struct Frame {
    pub raster: Raster,
    /// The viewport the frame was rendered from.
    pub viewport: Viewport,
    /// Version of the palette used to color it.
    pub palette_version: u64,
    pub elapsed: Duration,
    pub rows_rendered: usize,
    pub pixels_written: usize,
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// A fixed-size worker pool that renders frames one row per task.
pub struct RenderPool {
    pool: rayon::ThreadPool,
    params: EscapeParams,
}

impl RenderPool {
    /// Build a pool with `threads` workers; `0` means one per available core.
    pub fn new(threads: usize, params: EscapeParams) -> crate::Result<Self> {
        let threads = if threads == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("render-worker-{i}"))
            .build()?;
        debug!(threads, "Render pool ready");
        Ok(Self { pool, params })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn params(&self) -> &EscapeParams {
        &self.params
    }

    /// Render `viewport` onto a `width × height` raster.
    ///
    /// Blocks until every row has been written. If any row fails the whole
    /// frame is discarded and the first failure is returned.
    pub fn render_frame(
        &self,
        viewport: &Viewport,
        width: u32,
        height: u32,
        palette: &Palette,
    ) -> crate::Result<Frame> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        viewport.validate()?;

        let start = Instant::now();
        let jobs = build_row_jobs(viewport, width, height);
        debug!(width, height, rows = jobs.len(), "Starting frame");

        let params = self.params;
        let mut raster = Raster::new(width, height);
        let pixels_written = self.execute_rows(&jobs, &mut raster, |job, row| {
            render_row(job, palette, &params, row)
        })?;

        let elapsed = start.elapsed();
        info!(
            elapsed_ms = elapsed.as_millis(),
            rows = jobs.len(),
            palette_version = palette.version(),
            "Frame complete"
        );

        Ok(Frame {
            raster,
            viewport: *viewport,
            palette_version: palette.version(),
            elapsed,
            rows_rendered: jobs.len(),
            pixels_written,
        })
    }

    /// Run `kernel` once per job on the pool, each against its own row.
    ///
    /// Returns the number of pixels written once all jobs have finished.
    pub(crate) fn execute_rows<K>(
        &self,
        jobs: &[RowJob],
        raster: &mut Raster,
        kernel: K,
    ) -> crate::Result<usize>
    where
        K: Fn(&RowJob, &mut [u8]) -> crate::Result<()> + Sync,
    {
        let stride = raster.stride();
        let written = AtomicUsize::new(0);

        self.pool.install(|| {
            raster
                .pixels
                .par_chunks_mut(stride)
                .zip(jobs.par_iter())
                .try_for_each(|(row, job)| {
                    run_row_task(job, row, &kernel)?;
                    written.fetch_add(job.width as usize, Ordering::Relaxed);
                    Ok::<(), RenderError>(())
                })
        })?;

        Ok(written.into_inner())
    }
}

/// Run one row, turning both errors and panics into a task failure.
fn run_row_task<K>(job: &RowJob, row: &mut [u8], kernel: &K) -> crate::Result<()>
where
    K: Fn(&RowJob, &mut [u8]) -> crate::Result<()>,
{
    match catch_unwind(AssertUnwindSafe(|| kernel(job, row))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(RenderError::RenderTaskFailure {
            row: job.y,
            reason: e.to_string(),
        }),
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "row task panicked".to_string());
            Err(RenderError::RenderTaskFailure { row: job.y, reason })
        }
    }
}
