use std::time::Duration;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{
    LedgerConfig, PoolConfig, ServerConfig, DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_DATABASE_URL,
    DEFAULT_POOL_INCREMENT, DEFAULT_POOL_MAX, DEFAULT_POOL_MIN, DEFAULT_PORT,
};
use crate::domain::{monthly_emi, parse_cents};
use crate::server::Server;
use crate::storage::Repository;

/// Corebank - Core banking REST API
#[derive(Parser, Debug)]
#[command(name = "corebank")]
#[command(about = "A core-banking REST facade over a transactional ledger")]
#[command(version)]
pub struct Cli {
    /// Ledger connect string
    #[arg(long, env = "LEDGER_DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    pub database_url: String,

    /// Connections kept open in the pool
    #[arg(long, env = "LEDGER_POOL_MIN", default_value_t = DEFAULT_POOL_MIN, global = true)]
    pub pool_min: u32,

    /// Upper bound on pooled connections
    #[arg(long, env = "LEDGER_POOL_MAX", default_value_t = DEFAULT_POOL_MAX, global = true)]
    pub pool_max: u32,

    /// Connections opened when the pool grows
    #[arg(long, env = "LEDGER_POOL_INCREMENT", default_value_t = DEFAULT_POOL_INCREMENT, global = true)]
    pub pool_increment: u32,

    /// Seconds to wait for a free connection
    #[arg(long, env = "LEDGER_ACQUIRE_TIMEOUT_SECS", default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS, global = true)]
    pub acquire_timeout: u64,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "corebank=debug")
    #[arg(long, env = "COREBANK_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(
        long,
        env = "COREBANK_LOG_JSON",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        global = true
    )]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run migrations, then serve the HTTP API
    Serve {
        /// Listen port
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Create the ledger schema and exit
    Init,

    /// Print the monthly installment for a loan
    Emi {
        /// Principal (e.g., "100000" or "2500.50")
        principal: String,

        /// Annual interest rate in percent
        rate: f64,

        /// Term in months
        months: i64,
    },
}

impl Cli {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            database_url: self.database_url.clone(),
            pool: PoolConfig {
                min: self.pool_min,
                max: self.pool_max,
                increment: self.pool_increment,
            },
            acquire_timeout: Duration::from_secs(self.acquire_timeout),
        }
    }

    pub async fn run(self) -> Result<()> {
        init_tracing(&self.log_level, self.log_json)?;
        let ledger = self.ledger_config();

        match self.command {
            Commands::Serve { port } => {
                Server::new(ledger, ServerConfig { port }).run().await?;
            }

            Commands::Init => {
                let repo = Repository::init(&ledger).await?;
                repo.close().await;
                println!("Database initialized: {}", ledger.database_url);
            }

            Commands::Emi {
                principal,
                rate,
                months,
            } => {
                let principal_cents = parse_cents(&principal)
                    .context("Invalid principal format. Use '100000' or '2500.50'")?;
                println!("{:.2}", monthly_emi(principal_cents, rate, months));
            }
        }

        Ok(())
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `filter`.
fn init_tracing(filter: &str, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.context("Failed to initialise logging")
}
