use imei_bot::config::{Config, SourceKind};
use imei_bot::lookup::{ApiResolver, Resolver, ScrapeResolver};
use imei_bot::telegram::{BotClient, BotService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    match cfg.source.kind {
        SourceKind::Scrape => {
            let resolver = ScrapeResolver::new(cfg.source.clone(), cfg.request_timeout)?;
            serve(&cfg, resolver).await
        }
        SourceKind::Api => {
            let resolver = ApiResolver::new(cfg.source.clone(), cfg.request_timeout)?;
            serve(&cfg, resolver).await
        }
    }
}

async fn serve<R: Resolver>(cfg: &Config, resolver: R) -> anyhow::Result<()> {
    let bot = BotClient::new(&cfg.telegram_api_url, &cfg.bot_token, cfg.poll_timeout_secs)?;

    info!(
        source = resolver.source_name(),
        base_url = %cfg.source.base_url,
        timeout_secs = cfg.request_timeout.as_secs(),
        "Bot starting"
    );

    BotService::new(bot, resolver, cfg.chat_idle)
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                // never resolve; keep serving
                std::future::pending::<()>().await;
            }
        })
        .await
}
