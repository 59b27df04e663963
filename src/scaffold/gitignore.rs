//! Default .gitignore download

use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Where the written .gitignore came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitignoreSource {
    Downloaded,
    Fallback,
}

/// GET `url`, returning the body of a successful response
pub fn fetch_gitignore(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(format!("porosdjango/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch .gitignore from {}", url))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        bail!("Failed to fetch .gitignore from {}: HTTP {}", url, status.as_u16());
    }

    let body = response
        .text()
        .with_context(|| format!("Failed to read .gitignore body from {}", url))?;
    if body.trim().is_empty() {
        bail!("Empty .gitignore returned by {}", url);
    }
    Ok(body)
}
