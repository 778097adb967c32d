use anyhow::Context;
use clap::Parser;
use raffle_server::adapters::{http, mail, open_stores};
use raffle_server::config::cli::CliArgs;
use raffle_server::utils::{logger, validation::Validate};
use raffle_server::AppState;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(config.logging.verbose, config.logging.json);
    tracing::info!("Starting raffle-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Config: {:?}", config.server);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    if config.uses_default_secret() {
        tracing::warn!("⚠️ auth.jwt_secret is the built-in default, set a real secret before deploying");
    }

    let (participants, winners) = open_stores(&config.database)
        .await
        .context("failed to open the participant store")?;
    let notifier = mail::build_notifier(&config.mail).context("failed to build the mail notifier")?;
    tracing::info!(backend = ?config.mail.backend, "📧 Mail backend ready");

    let state = Arc::new(AppState::new(participants, winners, notifier, &config));
    let routes = http::routes(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address()))?;

    let (bound, server) = warp::serve(routes).try_bind_with_graceful_shutdown(addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("🛑 Shutdown signal received");
    })?;

    tracing::info!("🚀 Listening on http://{}", bound);
    server.await;
    tracing::info!("✅ Server stopped");
    Ok(())
}
