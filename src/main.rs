use anyhow::Result;
use dhcpctl::token::TokenSource;
use dhcpctl::{Config, SharedConfig, TokenStore};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let config_file = std::env::args().nth(1);
    let config = config_init(config_file)?;
    for path in config.missing_files() {
        if config.is_production() {
            tracing::warn!("config path does not exist: {}", path.display());
        } else {
            tracing::debug!("config path does not exist: {}", path.display());
        }
    }

    let (token, source) = TokenStore::resolve(&config).await?;
    announce_token(&token, source).await;

    tracing::info!("DHCP config: {}", config.dhcp_conf_path.display());
    tracing::info!("interfaces config: {}", config.interfaces_conf_path.display());
    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = dhcpctl::api::new(
        config.clone(),
        config.host_store(),
        config.interface_store(),
        Arc::new(token),
    )?;
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dhcpctl=info".into()),
        )
        .init();
}

fn config_init(config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => {
            tracing::info!("no config file given, using defaults");
            Ok(Arc::new(Config::default()))
        }
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}

async fn announce_token(token: &TokenStore, source: TokenSource) {
    let path = token.path().display();
    match source {
        TokenSource::File => tracing::info!("API token loaded from {path}"),
        TokenSource::Config => tracing::info!("API token loaded from config"),
        TokenSource::Generated { saved } => {
            if saved {
                tracing::info!("generated a new API token and saved it to {path}");
            }
            if std::io::stdout().is_terminal() {
                println!("API token: {}", token.current().await);
            } else if !saved {
                // Nowhere else to find it.
                tracing::warn!("generated API token: {}", token.current().await);
            }
        }
    }
}
