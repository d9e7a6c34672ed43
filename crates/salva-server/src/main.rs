use std::path::Path;

use anyhow::Result;
use salva_core::config::SalvaConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,salva=debug")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let mut config = SalvaConfig::load_from(Path::new(&path))?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => SalvaConfig::load()?,
    };

    salva_server::serve(&config).await
}
