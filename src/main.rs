use anyhow::Result;

use general_rating::cli::{Cli, Command};
use general_rating::{handle_results, handle_show, handle_vote, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Vote(args) => handle_vote(&cli.options, args.ratings()),
        Command::Show => handle_show(&cli.options),
        Command::Results => handle_results(&cli.options),
    }
}
