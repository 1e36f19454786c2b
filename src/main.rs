/// Adressen Meister - contact directory server
///
/// Serves the public directory and the magic-link login flow over HTTP.
use adressen_meister::{config::ServerConfig, context::AppContext, error::DirectoryResult, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> DirectoryResult<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize logging
    let json = config.logging.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("adressen_meister={},tower_http=debug", config.logging.level).into()
            }),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    print_banner();

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    _       _
   / \   __| |_ __ ___  ___ ___  ___ _ __
  / _ \ / _` | '__/ _ \/ __/ __|/ _ \ '_ \
 / ___ \ (_| | | |  __/\__ \__ \  __/ | | |
/_/   \_\__,_|_|  \___||___/___/\___|_| |_|

        Adressen Meister v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
