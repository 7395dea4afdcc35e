mod notify;
mod shell;
mod utils;
mod worker;

use anyhow::{Context, Result};
use kerio_import_core::config::AppConfig;
use kerio_import_core::credentials::CredentialStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::shell::Form;

const DEFAULT_LOG_FILTER: &str = "kerio_import=info,kerio_import_core=info,kerio_import_caldav=info";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let store = CredentialStore::default_location().context("Failed to locate credential file")?;
    info!(
        "Using server {} and credentials at {}",
        config.server_url,
        store.path().display()
    );

    println!("Kerio Connect CSV Import\n");

    let notifier = notify::for_config(&config);
    Form::new(config, store, notifier).run()
}
