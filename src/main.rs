//! ormeta
//!
//! Command line front end: builds descriptors for the demo models and prints
//! them as JSON, or maps their columns for a database.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ormeta::{DatabaseType, Registry, RegistryConfig, demo, dialect_for, table_columns};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ormeta", version, about = "Inspect ORM metadata of the demo models")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the demo models and their tables
    Models(RegistryArgs),

    /// Print model descriptors as JSON
    Inspect {
        /// Only this model (type or table name)
        #[arg(short, long)]
        model: Option<String>,

        #[command(flatten)]
        registry: RegistryArgs,
    },

    /// Print the column definitions of a model
    Columns {
        /// Model type or table name
        #[arg(short, long)]
        model: String,

        /// Print JSON instead of one column per line
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        registry: RegistryArgs,
    },
}

#[derive(Args)]
struct RegistryArgs {
    /// Registry configuration file (TOML)
    #[arg(short, long, env = "ORMETA_CONFIG")]
    config: Option<PathBuf>,

    /// Use singular table names
    #[arg(long)]
    singular: bool,

    /// Target database: postgres, mysql or sqlite
    #[arg(short, long)]
    dialect: Option<DatabaseType>,
}

impl RegistryArgs {
    fn registry(&self) -> Result<Registry> {
        let mut config = match &self.config {
            Some(path) => RegistryConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => RegistryConfig::default(),
        };

        if self.singular {
            config.singular_table = true;
        }
        if let Some(database) = self.dialect {
            config.database = database;
        }

        tracing::debug!(
            singular_table = config.singular_table,
            database = %config.database,
            "Registry configured"
        );
        Ok(Registry::with_config(config))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ormeta=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Models(args) => {
            let registry = args.registry()?;
            for descriptor in demo::descriptors(&registry)? {
                println!("{:<12} {}", descriptor.type_name(), descriptor.table_name());
            }
        }
        Command::Inspect { model, registry } => {
            let registry = registry.registry()?;
            let json = match model {
                Some(name) => serde_json::to_string_pretty(&*demo::descriptor(&registry, &name)?)?,
                None => {
                    let descriptors = demo::descriptors(&registry)?;
                    let views: Vec<_> = descriptors.iter().map(|d| &**d).collect();
                    serde_json::to_string_pretty(&views)?
                }
            };
            println!("{}", json);
        }
        Command::Columns {
            model,
            json,
            registry,
        } => {
            let registry = registry.registry()?;
            let descriptor = demo::descriptor(&registry, &model)?;
            let dialect = dialect_for(registry.database());
            let columns = table_columns(dialect, &descriptor)
                .with_context(|| format!("mapping columns of {}", descriptor.type_name()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                println!("-- {} ({})", descriptor.table_name(), dialect.name());
                for column in &columns {
                    let key = if column.primary_key { " PRIMARY KEY" } else { "" };
                    println!("{} {}{}", column.name, column.sql_type, key);
                }
            }
        }
    }

    Ok(())
}
