use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use watershed_monitor::{
    alerts::ReadingEvaluator,
    clock::SystemClock,
    config::{Config, NotifierConfig, Recipients, StorageConfig, read_config_file},
    monitor::Monitor,
    notify::{Notifier, webhook::WebhookNotifier},
    source::WatershedClient,
    storage::{BlobStore, file::FileBlobStore, memory::MemoryBlobStore},
    threshold::ThresholdResolver,
};
#[cfg(feature = "aws")]
use watershed_monitor::util::get_region;

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Run continuously, one cycle every interval
    #[arg(long)]
    continuous: bool,

    /// Config file
    #[arg(short)]
    file: Option<String>,

    /// Log everything down to trace level
    #[arg(short, long)]
    verbose: bool,
}

fn log_filter(verbose: bool) -> filter::Targets {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    filter::Targets::new().with_target("watershed_monitor", level)
}

fn init(verbose: bool) {
    dotenv::dotenv().ok();

    let filter = log_filter(verbose);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    let monitor = build_monitor(&config).await?;

    if args.continuous {
        let interval = Duration::from_secs(config.interval_secs);
        info!("starting continuous monitoring every {}s", interval.as_secs());
        monitor.run_forever(interval).await;
    } else if let Err(e) = monitor.run_once().await {
        error!("error in monitoring cycle: {e}");
    }

    Ok(())
}

async fn build_monitor(config: &Config) -> anyhow::Result<Monitor> {
    let recipients = Recipients::from_env();
    if recipients.recipient.is_none() {
        info!("no EMAIL_RECIPIENT configured, out-of-range readings will only be logged");
    }

    let source = Arc::new(WatershedClient::from_config(&config.source)?);
    let store = build_store(&config.storage).await?;
    let notifier = build_notifier(&config.notifier, recipients.sender).await?;
    info!("persisting alert state to {}", store.describe());

    let evaluator = ReadingEvaluator::new(
        ThresholdResolver::from_env(),
        notifier,
        Arc::new(SystemClock),
        recipients.recipient,
    )
    .with_cooldown(config.cooldown()?);

    Ok(Monitor::new(
        source,
        store,
        evaluator,
        config.source.sampling_feature_code.clone(),
    )
    .with_window(config.source.window()?))
}

async fn build_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    match config {
        StorageConfig::None => Ok(Arc::new(MemoryBlobStore::new())),
        StorageConfig::File { path } => Ok(Arc::new(FileBlobStore::new(path))),
        #[cfg(feature = "aws")]
        StorageConfig::S3 { bucket, region } => {
            let region = region.clone().or_else(get_region);
            Ok(Arc::new(
                watershed_monitor::storage::s3::S3BlobStore::from_env(bucket.clone(), region)
                    .await,
            ))
        }
        #[cfg(not(feature = "aws"))]
        StorageConfig::S3 { .. } => {
            anyhow::bail!("S3 storage requested, but built without the `aws` feature")
        }
    }
}

async fn build_notifier(
    config: &NotifierConfig,
    sender: Option<String>,
) -> anyhow::Result<Arc<dyn Notifier>> {
    match config {
        NotifierConfig::Webhook { url } => Ok(Arc::new(WebhookNotifier::new(url, sender)?)),
        #[cfg(feature = "aws")]
        NotifierConfig::Ses { region } => {
            let region = region.clone().or_else(get_region);
            Ok(Arc::new(
                watershed_monitor::notify::ses::SesNotifier::from_env(sender, region).await,
            ))
        }
        #[cfg(not(feature = "aws"))]
        NotifierConfig::Ses { .. } => {
            anyhow::bail!("SES delivery requested, but built without the `aws` feature")
        }
    }
}
