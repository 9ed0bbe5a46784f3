//! Nyaya Kavach - complaint filing and case tracking API server

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use nyaya_kavach::{
    config::{Args, LogFormat},
    db::MongoClient,
    logging,
    server::{self, AppState},
    services::ComplaintDesk,
    store::{ComplaintStore, MemoryComplaintStore, MongoComplaintStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(
        "nyaya_kavach",
        &args.log_level,
        args.log_format == LogFormat::Json,
    );

    if let Err(e) = args.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Nyaya Kavach - Complaint Service");
    info!("======================================");
    info!("Listen: {}", args.listen_addr());
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("Collection: {}", args.collection);
    info!("======================================");

    // MongoDB is optional in dev mode only
    let mongo = match connect_store(&args).await {
        Ok(connected) => Some(connected),
        Err(e) if args.dev_mode => {
            warn!("MongoDB unavailable (dev mode, continuing in memory): {}", e);
            None
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let (mongo, store): (Option<MongoClient>, Arc<dyn ComplaintStore>) = match mongo {
        Some((client, store)) => (Some(client), Arc::new(store)),
        None => (None, Arc::new(MemoryComplaintStore::new())),
    };

    let state = Arc::new(AppState::new(args, ComplaintDesk::new(store), mongo));

    let result = server::run(Arc::clone(&state)).await;

    if let Some(client) = state.mongo.clone() {
        client.shutdown().await;
    }

    result?;
    info!("Shutdown complete");
    Ok(())
}

async fn connect_store(args: &Args) -> nyaya_kavach::Result<(MongoClient, MongoComplaintStore)> {
    let client = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;
    let store = MongoComplaintStore::new(&client, &args.collection).await?;
    info!("MongoDB connected successfully");
    Ok((client, store))
}
