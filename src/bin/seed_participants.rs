use anyhow::Context;
use clap::Parser;
use raffle_server::adapters::open_stores;
use raffle_server::config::AppConfig;
use raffle_server::core::admin::AdminService;
use raffle_server::utils::{logger, validation::Validate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seed_participants")]
#[command(about = "Insert verified demo participants for trying out the draw")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "RAFFLE_CONFIG")]
    config: Option<PathBuf>,

    /// Override database.url
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
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

    let report = admin
        .seed_fake_participants()
        .await
        .context("seeding demo participants failed")?;

    for email in &report.created {
        println!("✅ Created {}", email);
    }
    for email in &report.skipped {
        println!("⏭️  Already exists: {}", email);
    }
    println!(
        "📊 {} created, {} skipped",
        report.created.len(),
        report.skipped.len()
    );
    Ok(())
}
