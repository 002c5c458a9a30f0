mod aggregator;
mod cli;
mod error;
#[cfg(feature = "xlsx")]
mod export;
mod fmt;
mod importer;
mod models;
mod sample;
mod settings;
mod sink;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { force } => cli::init::run(force),
        Commands::Config => cli::config::run(),
        Commands::Analyze { file, args } => cli::analyze::run(&file, args),
        Commands::Demo { args } => cli::demo::run(args),
        #[cfg(feature = "xlsx")]
        Commands::Show { file } => cli::show::run(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
