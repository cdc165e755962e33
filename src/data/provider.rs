use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::loader::{self, Format};
use super::model::{CovidData, Table};
use super::schema::TableSchema;

/// Anything that can hand back the raw text of a table.
#[async_trait]
pub trait Fetch {
    async fn fetch(&self) -> Result<String>;
}

/// Where a table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `http://` or `https://` URL.
    Url(String),
    /// Local path, given plainly or as a `file://` URL.
    File(PathBuf),
}

impl Source {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Source::Url(source.to_string())
        } else {
            let path = source.strip_prefix("file://").unwrap_or(source);
            Source::File(PathBuf::from(path))
        }
    }
}

struct UrlFetcher<'a>(&'a str);

#[async_trait]
impl<'a> Fetch for UrlFetcher<'a> {
    async fn fetch(&self) -> Result<String> {
        let response = reqwest::get(self.0)
            .await
            .with_context(|| format!("requesting {}", self.0))?
            .error_for_status()
            .with_context(|| format!("fetching {}", self.0))?;
        Ok(response.text().await?)
    }
}

struct FileFetcher<'a>(&'a Path);

#[async_trait]
impl<'a> Fetch for FileFetcher<'a> {
    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(self.0)
            .await
            .with_context(|| format!("reading {}", self.0.display()))
    }
}

/// Fetch and parse one table, then check it against `schema`.
pub async fn fetch_table(name: &str, source: &str, schema: &TableSchema) -> Result<Table> {
    let format = Format::from_source(source)?;
    let table = match (Source::parse(source), format) {
        (Source::File(path), Format::Parquet) => {
            let name = name.to_string();
            tokio::task::spawn_blocking(move || loader::load_file(&name, &path))
                .await
                .context("parquet loader task")??
        }
        (Source::File(path), format) => {
            let text = FileFetcher(&path).fetch().await?;
            loader::parse_text(name, format, &text)?
        }
        (Source::Url(url), format) => {
            let text = UrlFetcher(&url).fetch().await?;
            loader::parse_text(name, format, &text)?
        }
    };

    schema
        .validate(&table)
        .with_context(|| format!("validating table '{name}' from {source}"))?;
    Ok(table)
}

/// Load both dashboard tables concurrently. Any failure is fatal to startup.
pub async fn fetch_tables(historical_source: &str, latest_source: &str) -> Result<CovidData> {
    let historical_schema = TableSchema::historical();
    let latest_schema = TableSchema::latest();

    let (historical, latest) = tokio::try_join!(
        fetch_table("historical", historical_source, &historical_schema),
        fetch_table("latest", latest_source, &latest_schema),
    )?;

    log::info!(
        "Loaded historical table: {} rows x {} columns",
        historical.len(),
        historical.columns().len()
    );
    log::info!(
        "Loaded latest table: {} rows x {} columns",
        latest.len(),
        latest.columns().len()
    );

    Ok(CovidData { historical, latest })
}
