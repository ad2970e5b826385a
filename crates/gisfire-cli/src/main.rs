use clap::Parser;
use gisfire_cli::{Cli, Commands, GisfireConfig};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let config = match GisfireConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level.unwrap_or_else(|| config.logging.level()))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let (label, result) = match &cli.command {
        Commands::Match(args) => {
            info!("Matching reports from {}", args.firefighters.display());
            ("Match", commands::matching::handle(args, &config))
        }
        Commands::Fill { command } => ("Fill", commands::fill::handle(command, &config)),
        Commands::Learn { command } => ("Learn", commands::learn::handle(command, &config)),
        Commands::Completions { shell, out } => (
            "Completions",
            commands::completions::handle(*shell, out.as_deref()),
        ),
    };

    match result {
        Ok(()) => info!("{label} successful!"),
        Err(e) => {
            error!("{label} failed: {:?}", e);
            std::process::exit(1);
        }
    }
}
