use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

/// B3 page whose download link serves the daily composition file. Driving
/// the page itself is the browser collaborator's job; this module covers
/// the plain-HTTP path and the downloads-directory handoff.
pub const DAILY_REPORT_URL: &str =
    "https://sistemaswebb3-listados.b3.com.br/indexPage/day/IBOV?language=pt-br";

/// Download the report at `url_str` and save it under `dest_dir` using the
/// final URL path segment as the filename. Returns the saved path.
pub async fn download_report(
    client: &Client,
    url_str: &str,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    let url = Url::parse(url_str).with_context(|| format!("parsing report URL {url_str}"))?;
    let filename = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or("IBOVDia.csv");
    let dest_path = dest_dir.join(filename);

    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()?;
    let bytes = resp.bytes().await?;
    fs::write(&dest_path, &bytes).await?;

    Ok(dest_path)
}

/// Locate the report in a downloads directory. The browser collaborator
/// drops exactly one CSV there per run; the lexically first one wins.
pub fn find_csv(dir: &Path) -> Result<PathBuf> {
    let mut csvs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing downloads dir {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    csvs.sort();

    csvs.into_iter()
        .next()
        .ok_or_else(|| anyhow!("no CSV file found in {}", dir.display()))
}
