use clap::Parser;
use owo_colors::{OwoColorize, Style};
use rota_core::error::CoreError;
use rota_core::store::JsonFileStore;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod timezone;
mod util;
mod views;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rota=warn,rota_core=warn".into()),
        )
        .init();

    let cli = cli::Cli::parse();

    let config = config::Config::new().unwrap_or_else(|e| {
        warn!(error = %e, "could not load configuration, using defaults");
        config::Config::default()
    });
    let data_file = cli.file.clone().unwrap_or_else(|| config.data_file.clone());
    debug!(data_file = %data_file.display(), "using routine file");
    let store = JsonFileStore::new(data_file);

    let result = match cli.command {
        cli::Commands::Next(command) => commands::next::next_occurrence(command, &config),
        cli::Commands::Preview(command) => commands::preview::preview_rule(command, &config),
        cli::Commands::Calendar(command) => {
            commands::calendar::show_calendar(&store, command, &config)
        }
        cli::Commands::Complete(command) => {
            commands::complete::complete(&store, command, &config)
        }
        cli::Commands::Migrate(command) => commands::migrate::migrate(&store, command),
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::AmbiguousId(routines)) => {
            eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
            eprintln!("Did you mean one of these?");
            for (id, title) in routines {
                eprintln!("  {} ({})", id.yellow(), title);
            }
        }
        Some(CoreError::Json(e)) => {
            eprintln!(
                "{} The routine file is not valid JSON: {}",
                "Error:".style(error_style),
                e
            );
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
