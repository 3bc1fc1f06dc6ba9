pub mod config;
pub mod mock;

use clap::{Parser, Subcommand};

/// Clipflow — the AI video-creation gateway.
#[derive(Debug, Parser)]
#[command(name = "clipflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Mock-data mode toggles (local state only, no server needed).
    #[command(subcommand)]
    Mock(MockCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum MockCommand {
    /// Enable mock-data mode with a fake confirmed identity.
    Enable {
        /// Email written as the fake signed-in user.
        #[arg(long, default_value = "mock@clipflow.dev")]
        email: String,
    },
    /// Disable mock-data mode and drop the fake identity.
    Disable,
    /// Print the current mock-data state.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `CLIPFLOW_CONFIG` (or
/// `config.toml` by default). Returns the parsed config and the path
/// that was used. A missing file means defaults — the gateway runs
/// against a local store out of the box.
pub fn load_config() -> anyhow::Result<(cf_domain::config::Config, String)> {
    let config_path = std::env::var("CLIPFLOW_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        cf_domain::config::Config::default()
    };

    Ok((config, config_path))
}
