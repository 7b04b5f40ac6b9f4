use clap::Parser;
use dotenvy::dotenv;
use parallel_upload::config::UploadConfig;
use parallel_upload::infrastructure::storage;
use parallel_upload::services::chunking::MAX_CHUNKS;
use parallel_upload::services::parallel_upload::ParallelUploader;
use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload a local file as parallel chunk objects", long_about = None)]
struct Args {
    /// File to upload
    file: PathBuf,

    /// Number of chunks / concurrent uploads (overrides UPLOAD_THREADS)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=MAX_CHUNKS as i64))]
    threads: Option<u16>,

    /// Destination bucket (overrides STORAGE_BUCKET)
    #[arg(short, long)]
    bucket: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parallel_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = UploadConfig::from_env();
    if let Some(threads) = args.threads {
        config.num_threads = usize::from(threads);
    }
    if let Some(bucket) = args.bucket {
        config.bucket = bucket;
    }

    info!("☁️  Connecting to storage...");
    let storage = storage::setup_storage(&config).await;
    let uploader = ParallelUploader::new(storage, &config);

    let report = uploader.upload(&args.file).await?;

    for part in &report.parts {
        match &part.error {
            None => info!("  ✅ {} ({} bytes)", part.blob_name, part.len),
            Some(e) => error!("  ❌ {} ({} bytes): {}", part.blob_name, part.len, e),
        }
    }
    info!(
        "File {} uploaded in parallel to {}",
        report.file_path.display(),
        report.bucket
    );

    Ok(())
}
