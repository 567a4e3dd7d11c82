use dotenvy::dotenv;
use tracing::info;

use notebot_scheduler::config::Config;
use notebot_scheduler::db::Db;
use notebot_scheduler::jobs::job_handler;
use notebot_scheduler::notify::LogNotifier;

#[tokio::main]
async fn main() {
    let _ = dotenv(); // .env is optional in deployment
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("invalid configuration");
    let db = Db::connect(&config.database_url).await.expect("failed to open database");
    db.create_tables().await.expect("failed to create tables");

    info!(poll_secs = config.poll_interval.as_secs(), "scheduler starting");
    tokio::spawn(job_handler(db.clone(), LogNotifier, config));

    tokio::signal::ctrl_c().await.expect("failed to listen for shutdown signal");
    info!("shutting down");
    db.close().await;
}
