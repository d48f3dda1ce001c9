mod cli;
mod commands;

use clap::Parser;
use cli::cmd_enums::{Cli, Commands, GlobalOptions};
use commands::{get, list, status, sync, version};
use dotbins::{log_debug, log_error, logger};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.debug);
    log_debug!("[dotbins] Debug logging enabled");

    let global = GlobalOptions {
        config: cli.config,
        tools_dir: cli.tools_dir,
        github_token: cli.github_token,
    };

    let result = match cli.command {
        Commands::Sync(args) => sync::run(&global, args),
        Commands::Get(args) => get::run(&global, args),
        Commands::List => list::run(&global),
        Commands::Status => status::run(&global),
        Commands::Version => version::run(),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            log_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
