mod args;
mod handlers;

pub use args::{Cli, Commands, ConfigCommand, SessionsCommand};

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use ward_store::Store;

pub fn run(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data_dir = expand_tilde(&cli.data_dir);

    match cli.command {
        Commands::Serve { addr, api_key } => {
            let store = Store::open(data_dir)?;
            handlers::serve::handle(store, &addr, api_key)
        }
        Commands::Sessions { command } => {
            let store = Store::open(data_dir)?;
            match command {
                SessionsCommand::List { limit } => handlers::sessions::list(&store, limit),
                SessionsCommand::Show { session_id } => handlers::sessions::show(&store, &session_id),
            }
        }
        Commands::Config { command } => {
            let store = Store::open(data_dir)?;
            match command {
                ConfigCommand::Get => handlers::config::get(&store),
                ConfigCommand::Set { key, value } => handlers::config::set(&store, &key, &value),
            }
        }
        Commands::Cleanup { retention_days } => {
            let store = Store::open(data_dir)?;
            handlers::cleanup::handle(&store, retention_days)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
