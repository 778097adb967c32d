use anyhow::Context;
use clap::Parser;
use raffle_server::adapters::open_stores;
use raffle_server::config::AppConfig;
use raffle_server::core::admin::AdminService;
use raffle_server::utils::{logger, validation::Validate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "create_admin")]
#[command(about = "Create an administrator account that can log in and run draws")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "RAFFLE_CONFIG")]
    config: Option<PathBuf>,

    /// Override database.url
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long)]
    email: String,

    #[arg(long)]
    full_name: String,

    #[arg(long, default_value = "+00000000000")]
    phone: String,

    /// Password for the new administrator
    #[arg(long, env = "RAFFLE_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path).context("failed to load config")?,
        None => AppConfig::default(),
    };
    if let Some(url) = &args.database_url {
        config.database.url = url.clone();
    }

    config.validate().context("invalid configuration")?;
    config.database.require_persistent()?;

    let (participants, winners) = open_stores(&config.database).await?;
    let admin = AdminService::new(participants, winners, config.auth.password_iterations);

    match admin
        .create_admin(&args.email, &args.full_name, &args.phone, &args.password)
        .await
    {
        Ok(created) => {
            println!("✅ Administrator created: {}", created);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Could not create administrator: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }
}
