use anyhow::Result;
use b3scraper::{fetch, pipeline, pipeline::Stage, publish::S3Store};
use clap::Parser;
use reqwest::Client;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
struct Args {
    /// S3 bucket receiving the partitioned artifacts
    #[arg(long, env = "B3SCRAPER_BUCKET", default_value = "data-lake-tc2-data")]
    bucket: String,

    /// AWS region of the bucket
    #[arg(long, env = "B3SCRAPER_REGION", default_value = "us-east-1")]
    region: String,

    /// Download endpoint for the daily report
    #[arg(long, env = "B3SCRAPER_SOURCE_URL", default_value = fetch::DAILY_REPORT_URL)]
    source_url: String,

    /// Per-invocation scratch directory
    #[arg(long, env = "B3SCRAPER_SCRATCH", default_value = "/tmp/b3scraper")]
    scratch: PathBuf,

    /// Skip the download and process this already-fetched CSV instead
    #[arg(long)]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let args = Args::parse();

    // ─── 2) configure scratch dirs ───────────────────────────────────
    let downloads = args.scratch.join("downloads");
    fs::create_dir_all(&downloads)?;

    // ─── 3) obtain the daily report ──────────────────────────────────
    let csv_path = match &args.input {
        Some(path) => path.clone(),
        None => {
            info!(stage = %Stage::Fetching, url = %args.source_url, "downloading report");
            let client = Client::new();
            fetch::download_report(&client, &args.source_url, &downloads).await?;
            fetch::find_csv(&downloads)?
        }
    };
    info!(source = %csv_path.display(), "report ready");

    // ─── 4) normalize, encode, publish ───────────────────────────────
    let store = S3Store::new(&args.bucket, &args.region).await;
    let summary = pipeline::run(&csv_path, &args.scratch, &store).await?;

    info!(
        date = %summary.date,
        rows = summary.rows,
        dropped = summary.dropped,
        bytes = summary.artifact_bytes,
        key = %summary.key,
        "published"
    );
    Ok(())
}
