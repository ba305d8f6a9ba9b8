use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use shop_backoffice::{
    config::{init_tracing, load_config},
    db::{self, DbConfig},
    migrator::Migrator,
};
use tracing::info;

/// Applies or rolls back the back-office schema
#[derive(Debug, Parser)]
#[command(name = "migration", version)]
struct Cli {
    /// Database URL; defaults to `database_url` from the loaded configuration
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<MigrationCommand>,
}

#[derive(Debug, Subcommand)]
enum MigrationCommand {
    /// Apply pending migrations (default)
    Up {
        /// Apply at most this many migrations
        #[arg(short, long)]
        num: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(short, long, default_value_t = 1)]
        num: u32,
    },
    /// Drop every table and re-apply all migrations
    Fresh,
    /// Show which migrations are applied
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config()?;
    init_tracing(config.log_level(), config.log_json);

    let db_config = DbConfig {
        url: cli
            .database_url
            .unwrap_or_else(|| config.database_url().to_string()),
        ..DbConfig::from(&config)
    };
    info!("Connecting to database: {}", db_config.url);
    let pool = db::establish_connection_with_config(&db_config).await?;

    match cli.command.unwrap_or(MigrationCommand::Up { num: None }) {
        MigrationCommand::Up { num } => {
            Migrator::up(&pool, num).await?;
            info!("Migration completed successfully");
        }
        MigrationCommand::Down { num } => {
            Migrator::down(&pool, Some(num)).await?;
            info!("Rolled back {} migration(s)", num);
        }
        MigrationCommand::Fresh => {
            Migrator::fresh(&pool).await?;
            info!("Schema recreated");
        }
        MigrationCommand::Status => {
            Migrator::status(&pool).await?;
        }
    }

    db::close_pool(pool).await?;
    Ok(())
}
