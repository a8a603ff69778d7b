use anyhow::{Context, Result};
use clap::Parser;
use kyr_cards::{create_router, AppContext, AppState, Config};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kyr-cards")]
#[command(about = "KnowYourRights Cards service")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/kyr-cards")]
    config: String,

    /// Override the HTTP port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kyr_cards=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("KnowYourRights Cards v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Storage: {}", cfg.storage.path);
    info!("Recordings: {}", cfg.recording.recordings_path);

    let ctx = AppContext::from_config(&cfg).await?;
    if let Some(card) = ctx.restore_selection().await {
        info!("Restored region {}", card.state);
    }

    let app = create_router(AppState::new(ctx));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
