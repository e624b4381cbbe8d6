// Author: Dustin Pilgrim
// License: MIT

mod cli;
mod config;
mod host;
mod logging;
mod paths;
mod run;

use clap::Parser;

use cli::{Args, Cmd};

fn main() {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(paths::default_log_path);

    // Logging first; nothing below writes to stderr directly.
    if let Err(e) = logging::init_logging(&log_path, args.verbose) {
        eprintln!("scrim: failed to init logging: {e}");
        std::process::exit(1);
    }

    eventline::info!("scrim starting");
    eventline::debug!("verbose={}", args.verbose);
    eventline::debug!("log_path={}", log_path.display());

    if let Err(e) = dispatch(args) {
        eventline::error!("{e}");
        std::process::exit(1);
    }
}

fn dispatch(args: Args) -> Result<(), String> {
    let config_path = args.config.unwrap_or_else(paths::default_config_path);
    let mut cfg = config::load(&config_path)?;
    eventline::debug!("config_path={}", config_path.display());

    match args.cmd {
        Cmd::Render {
            screen,
            out,
            anchors,
            look,
        } => {
            cfg.apply(&look)?;
            eventline::debug!("config {cfg:?}");
            run::render(&screen, &out, &anchors, &cfg)
        }
        Cmd::Region {
            size,
            top_inset,
            anchors,
        } => {
            println!("{}", run::region(size, top_inset.unwrap_or(cfg.top_inset), &anchors));
            Ok(())
        }
    }
}
