mod args;
mod handlers;
mod output;

use crate::args::{Cli, Commands};
use crate::output::Output;
use abook_addresses::{AddressBook, MIGRATIONS};
use abook_database::Database;
use abook_kernel::config::load_optional_config;
use abook_kernel::domain::config::{AppConfig, DatabaseConfig, LoggerSettings};
use abook_logger::{Logger, parse_level};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config: AppConfig =
        load_optional_config(cli.config.as_ref()).context("Loading configuration")?;
    let _logger = logger(&config.logger).context("Initializing logging")?;

    let db = database(&config.database).await.context("Opening the address book database")?;
    let book = AddressBook::new(db);
    let out = Output::new(cli.json);

    info!(command = ?cli.command, "Running command");
    match cli.command {
        Commands::State { action } => handlers::state(&book, &out, action).await,
        Commands::City { action } => handlers::city(&book, &out, action).await,
        Commands::Address { action } => handlers::address(&book, &out, action).await,
    }
}

fn logger(settings: &LoggerSettings) -> Result<Logger> {
    let mut builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&settings.level)?)
        .console(settings.console)
        .json(settings.json);
    if let Some(directory) = &settings.directory {
        builder = builder.directory(directory);
    }
    if let Some(filter) = &settings.env_filter {
        builder = builder.env_filter(filter);
    }
    Ok(builder.init()?)
}

async fn database(config: &DatabaseConfig) -> Result<Database> {
    let mut builder = Database::builder()
        .url(&config.url)
        .session(&config.namespace, &config.database)
        .migrations(MIGRATIONS.iter().copied());
    if let Some(credentials) = &config.credentials {
        builder = builder.auth(&credentials.username, &credentials.password);
    }
    Ok(builder.init().await?)
}
