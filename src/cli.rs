use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::utils::sanitize::mask_url_password;
use crate::AppState;

#[derive(Parser)]
#[command(name = "core-academy")]
#[command(about = "Core Academy - course sales and order analytics API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,

    /// Delete all data and load the demo dataset
    Seed,
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed");
    Ok(())
}

pub async fn handle_db_seed(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;
    crate::db::run_migrations(&pool).await?;

    let state = AppState::postgres(pool, config.clone());
    let summary = state.seeder.wipe_and_reseed().await?;

    println!("✓ Database wiped and reseeded:");
    println!("  Users:         {}", summary.users);
    println!("  Courses:       {}", summary.courses);
    println!("  Orders:        {}", summary.orders);
    println!("  Failed orders: {}", summary.failed_orders);
    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Port: {}", config.port);
    println!("  Database URL: {}", mask_url_password(&config.database_url));
    println!("  JWT expiration: {}h", config.jwt_expiration_hours);
    println!("  Seed on startup: {}", config.seed_on_startup);
    match &config.cors_allowed_origins {
        Some(origins) => println!("  CORS origins: {}", origins.join(", ")),
        None => println!("  CORS origins: *"),
    }
    println!("  Log format: {:?}", config.log_format);

    println!("✓ Configuration is valid");
    Ok(())
}
