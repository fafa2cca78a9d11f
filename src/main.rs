use clap::Parser;
use vitabs::cli::commands::Cli;
use vitabs::cli::handlers;
use vitabs::io::{config_io, logging};

fn main() {
    let cli = Cli::parse();
    logging::init();

    let result = match cli.command {
        // No subcommand → launch TUI
        None => config_io::read_config(cli.config.as_deref())
            .map_err(Into::into)
            .and_then(|config| vitabs::tui::run(cli.file.as_deref(), &config)),
        Some(cmd) => handlers::dispatch(cmd),
    };

    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
