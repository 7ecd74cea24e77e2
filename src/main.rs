mod cli;
mod commands;
mod logging;
mod output;

use clap::Parser;
use cli::Cli;
use commands::handle_command;
use logging::init_logging;
use output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = handle_command(&cli.command, cli.config.as_deref()).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
