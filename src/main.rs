use anyhow::{Context, Result};
use clap::Parser;
use std::io;

use sunalert::args::{Cli, CliAction};
use sunalert::config::Config;
use sunalert::constants::EXIT_FAILURE;
use sunalert::local_time::SystemClock;
use sunalert::logger::Log;
use sunalert::sun_times::SunTimesClient;
use sunalert::surface::{self, TerminalSurface};
use sunalert::tracker::{SunTracker, run as run_session};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    Log::set_debug(cli.debug);
    Log::set_enabled(!cli.quiet());

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_FAILURE),
        Err(e) => {
            // Fatal errors are reported even in quiet mode.
            Log::set_enabled(true);
            Log::log_pipe();
            Log::log_critical(&format!("{:#}", e));
            Log::log_end();
            std::process::exit(EXIT_FAILURE);
        }
    }
}

/// Run the selected mode. `Ok(false)` means a one-shot lookup failed.
async fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if cli.strict {
        config.strict_coordinates = Some(true);
    }

    Log::log_version();
    if cli.debug {
        Log::log_debug("Debug mode enabled");
        config.log_config();
    }

    let client = SunTimesClient::new(config.api_url(), config.request_timeout())?;
    let (mut tracker, fired_rx) = SunTracker::new(client, SystemClock, &config);

    match cli.action() {
        CliAction::Once { coords } => {
            let input = coords
                .or_else(|| config.default_coordinates.clone())
                .context("--once needs coordinates, either as an argument or default_coordinates in the config")?;

            Log::log_decorated(&format!("Looking up {}", input));
            let result = match tracker.begin_cycle(&input) {
                Ok(coordinate) => {
                    Log::log_debug(tracker.display().status());
                    tracker.finish_cycle(coordinate, false).await
                }
                Err(e) => Err(e),
            };
            surface::render_to(&mut io::stdout().lock(), tracker.display_mut())
                .context("Failed to write to terminal")?;
            if let Err(e) = &result {
                Log::log_debug(&format!("Lookup failed: {}", e));
            }
            Log::log_end();
            Ok(result.is_ok())
        }
        CliAction::Run { initial } => {
            let initial = initial.or_else(|| config.default_coordinates.clone());

            Log::log_decorated("Enter coordinates as lat,lon (\"quit\" to exit)");
            let mut terminal = TerminalSurface::new()?;
            run_session(&mut tracker, fired_rx, &mut terminal, initial).await?;
            Log::log_end();
            Ok(true)
        }
    }
}
