mod driver;
mod error;
mod preferences;
mod screenshot;
mod script;

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use driver::Driver;
use error::AppError;
use preferences::Preferences;

fn run(config: Option<PathBuf>) -> Result<(), AppError> {
    let prefs = Preferences::load(config.as_deref());
    let mut driver = Driver::new(&prefs)?;
    let summary = driver.run()?;

    info!(
        ticks = summary.ticks,
        frames = summary.frames,
        deferred = summary.deferred,
        clamps = summary.clamps,
        screenshots = summary.screenshots.len(),
        "Flight finished"
    );
    println!("{}", summary.title);
    for path in &summary.screenshots {
        println!("{}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Flybrot");

    // Optional first argument: path to a preferences file.
    let config = std::env::args_os().nth(1).map(PathBuf::from);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
