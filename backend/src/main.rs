use anyhow::Context as _;
use order_mailer::{AppConfig, AppContext, EnvConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("reading configuration from environment")?;
    if !config.has_credentials() {
        tracing::warn!(
            "GMAIL_USER or GMAIL_APP_PASSWORD not set. Orders cannot be emailed until configured."
        );
    }
    if config.recipient().is_none() {
        tracing::warn!("TO_EMAIL and GMAIL_USER not set. Orders will be rejected.");
    }

    let port = config.port;
    let ctx = AppContext::new(config).context("configuring SMTP mailer")?;

    let listener = order_mailer::serve::bind(port)
        .await
        .with_context(|| format!("binding port {port}"))?;
    order_mailer::serve(listener, order_mailer::router(ctx))
        .await
        .context("error running HTTP server")?;
    Ok(())
}
