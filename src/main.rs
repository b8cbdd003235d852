use quill::{config::Config, run_app};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quill=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if let Err(error) = run_app(config).await {
        tracing::error!(error = %quill::logger::Masked(format!("{error:#}")), "Server stopped");
        return Err(error);
    }
    Ok(())
}
