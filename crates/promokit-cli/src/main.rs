//! promokit - list the apps a host app cross-promotes.
//!
//! Loads the promo catalog with the same network → cache → empty fallback
//! an embedding app gets, and prints the result for the active locale.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use promokit_core::{CacheManager, FileStore, Language, PromoService, Settings, TracingSink};

const USAGE: &str = "\
Usage: promokit [COMMAND]

Commands:
  list      Load and print promoted apps (default)
  refresh   Clear the cache, then load and print
  status    Show cache status
  clear     Remove the cached catalog
  init      Write the current settings, env overrides included, to the config file

Environment:
  PROMOKIT_APP_ID        id of the host app (required for list/refresh)
  PROMOKIT_CATALOG_URL   catalog URL override
  PROMOKIT_LOCALE        locale override, e.g. ko-KR
  RUST_LOG               log filter, e.g. debug";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("list");

    let settings = Settings::load()?.with_env();
    let cache = || -> Result<CacheManager> {
        Ok(CacheManager::new(Arc::new(FileStore::new(settings.cache_dir()?)?)))
    };

    match command {
        "list" => list(&settings, false).await,
        "refresh" => list(&settings, true).await,
        "status" => {
            println!("Cache: {}", cache()?.status().await.describe());
            Ok(())
        }
        "clear" => {
            cache()?.clear().await;
            println!("Cache cleared");
            Ok(())
        }
        "init" => {
            settings.save()?;
            println!("Settings saved");
            Ok(())
        }
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}

async fn list(settings: &Settings, force: bool) -> Result<()> {
    let service = PromoService::from_settings(settings)?;
    let language = settings
        .locale
        .as_deref()
        .map(Language::from_locale)
        .unwrap_or_else(Language::detect);

    let config = service.config();
    info!(
        url = config.catalog_url(),
        app_id = config.current_app_id(),
        language = language.code(),
        "Loading promo catalog"
    );

    let sink = Arc::new(TracingSink);
    service.set_event_sink(&sink);

    if force {
        service.force_refresh().await;
    } else {
        service.load_apps().await;
    }

    let snapshot = service.snapshot();
    if let Some(error) = &snapshot.error {
        eprintln!("Could not load apps: {}", error);
        eprintln!("Run `promokit` again to retry.");
        std::process::exit(1);
    }

    if snapshot.apps.is_empty() {
        println!("No apps to show.");
    }
    for app in &snapshot.apps {
        service.handle_impression(&app.id);
        println!(
            "{:<20} {:<16} {}",
            app.name,
            app.category,
            app.tagline.for_language(language)
        );
    }

    service.clear_event_sink();
    Ok(())
}
