// vidmend-cli/src/lib.rs
//
// Library portion of the Vidmend CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod terminal;

use vidmend_core::MediaProbe;

pub use cli::{Cli, Commands};
pub use error::{CliResult, describe};

/// Dispatches a parsed command line. Logging must already be initialised.
pub fn run(cli: &Cli) -> CliResult<()> {
    let store = config::open_store(cli.config.as_deref());
    log::debug!("Settings file: {}", store.path().display());

    match &cli.command {
        Commands::Config(args) => commands::config::run_config(&args.action, &store),
        Commands::Probe(args) => {
            let core_config = config::resolve_config(&store, cli.ffmpeg_dir.as_deref())?;
            let probe = MediaProbe::new(&core_config.ffprobe_path);
            commands::probe::run_probe(args, &probe)
        }
        Commands::Convert(args) => {
            let core_config = config::resolve_config(&store, cli.ffmpeg_dir.as_deref())?;
            commands::convert::run_convert(args, &core_config, cli.verbose)
        }
        Commands::Watermark(args) => {
            let core_config = config::resolve_config(&store, cli.ffmpeg_dir.as_deref())?;
            commands::watermark::run_watermark(args, &core_config, cli.verbose)
        }
        Commands::Screenshot(args) => {
            let core_config = config::resolve_config(&store, cli.ffmpeg_dir.as_deref())?;
            commands::screenshot::run_screenshot(args, &core_config)
        }
    }
}
