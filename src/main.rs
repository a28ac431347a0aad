use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nordsee_feed::config::FeedConfig;
use nordsee_feed::NordseeFeed;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting NORDSEE vacancy feed");

    let config = FeedConfig::from_env()?;
    let feed = Arc::new(NordseeFeed::new(&config)?);

    let Some(schedule) = config.schedule.clone() else {
        let summary = feed.refresh().await?;
        info!("Run finished: {}", serde_json::to_string(&summary)?);
        return Ok(());
    };

    // Run once immediately, then on the schedule
    if let Err(e) = feed.refresh().await {
        error!("Error during initial run: {}", e);
    }

    let sched = JobScheduler::new().await?;

    let job_feed = Arc::clone(&feed);
    sched
        .add(Job::new_async(schedule.as_str(), move |_uuid, _l| {
            let feed = Arc::clone(&job_feed);
            Box::pin(async move {
                if let Err(e) = feed.refresh().await {
                    error!("Error refreshing feed: {}", e);
                }
            })
        })?)
        .await?;

    info!("Scheduler started with schedule `{}`", schedule);
    sched.start().await?;

    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
    }
}
