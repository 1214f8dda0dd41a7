use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ward")]
#[command(about = "Run and inspect the ward monitoring engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Root directory for session, registry, and config storage.
    #[arg(long, default_value = "~/.ward", global = true)]
    pub data_dir: String,

    /// Log verbosity passed to the tracing subscriber's env filter.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP/WebSocket ingest-and-dashboard server.
    Serve {
        /// Address to bind, e.g. 127.0.0.1:8787.
        #[arg(long, default_value = "127.0.0.1:8787")]
        addr: String,

        /// Require this value in the `x-api-key` header (or `api_key` query
        /// param) on every dashboard-facing route. Unset disables auth.
        #[arg(long, env = "WARD_API_KEY")]
        api_key: Option<String>,
    },

    /// Inspect recorded sessions.
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },

    /// Read or patch the engine's tunable configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Delete session/issue/step records older than the retention window.
    Cleanup {
        /// Override `log_retention_days` from the stored config.
        #[arg(long)]
        retention_days: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum SessionsCommand {
    /// List recent sessions, most recently started first.
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Print one session's full normalized document.
    Show { session_id: String },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the current configuration as JSON.
    Get,
    /// Patch a single key. Rejected if `key` isn't one of
    /// `EngineConfig::MUTABLE_KEYS` or the resulting config fails validation.
    Set { key: String, value: String },
}
