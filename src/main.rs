//! Quipboard - reaction counters for the quote feed

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quipboard::{
    config::Args,
    model::QuoteRecord,
    reaction::ReactionService,
    server,
    store::{MemoryStore, MongoStore, ReactionStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("quipboard={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Quipboard - quote feed reactions");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!(
        "Mode: {}",
        if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" }
    );
    info!(
        "Moderation: delete when '{}' > {}",
        args.moderated_reaction, args.report_threshold
    );
    info!("Migration retry cap: {}", args.max_migration_retries);
    if !args.dev_mode {
        info!(
            "MongoDB: {} (db '{}', collection '{}')",
            args.mongodb_uri, args.mongodb_db, args.mongodb_collection
        );
    }
    info!("======================================");

    let store: Arc<dyn ReactionStore> = if args.dev_mode {
        warn!("Dev mode: using in-memory store, records do not survive restart");
        let memory = MemoryStore::new();
        // A migrated and a legacy record, so both update paths are reachable
        memory.insert(QuoteRecord::new(
            "demo-1",
            "Asha",
            "Deploys on Friday, prays on Saturday.",
        ));
        memory.insert(QuoteRecord::legacy(
            "demo-2",
            "Rohan",
            "Uses dark mode to hide the bugs.",
        ));
        Arc::new(memory)
    } else {
        let mongo = MongoStore::connect(
            &args.mongodb_uri,
            &args.mongodb_db,
            &args.mongodb_collection,
            args.request_timeout_ms,
        )
        .await?;
        info!("MongoDB connected successfully");
        Arc::new(mongo)
    };

    let service = Arc::new(
        ReactionService::new(store, args.moderation_policy())
            .with_max_retries(args.max_migration_retries),
    );

    server::run(args.listen, service).await
}
