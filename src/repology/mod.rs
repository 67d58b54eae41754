pub mod filter;
pub mod resolve;

use crate::actions::error::UpdateError;
use crate::debug;

use reqwest::{header::USER_AGENT, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const REPOLOGY_API_ROOT: &str = "https://repology.org/api/v1";
const PAGE_SIZE: usize = 200;
const MAX_RETRY: usize = 3;
const UA: &str = concat!("pacup/", env!("CARGO_PKG_VERSION"));

/// One (repository, package, version) tuple as tracked by Repology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub repo: String,
    pub name: String,
    pub version: String,
}

#[derive(Deserialize)]
struct ApiPackage {
    repo: String,
    #[serde(default)]
    visiblename: Option<String>,
    #[serde(default)]
    srcname: Option<String>,
    #[serde(default)]
    binname: Option<String>,
    version: String,
}

pub struct RepologyClient {
    client: Client,
    api_root: String,
}

impl RepologyClient {
    pub fn new() -> Self {
        Self::with_api_root(REPOLOGY_API_ROOT)
    }

    pub fn with_api_root(api_root: &str) -> Self {
        RepologyClient {
            client: Client::new(),
            api_root: api_root.to_string(),
        }
    }

    /// Fetch every record Repology tracks for a project, paging until a
    /// short page. An unknown project yields an empty set, not an error.
    pub async fn fetch_project(&self, project: &str) -> Result<Vec<RemoteRecord>, UpdateError> {
        let mut records = Vec::new();
        let mut page = 0usize;
        loop {
            let url = format!("{}/project/{}?page={}", self.api_root, project, page);
            let batch = self.fetch_page(&url, project).await?;
            let short = batch.len() < PAGE_SIZE;
            records.extend(batch);
            if short {
                break;
            }
            page += 1;
        }
        debug!("repology: {} records for {}", records.len(), project);
        Ok(records)
    }

    async fn fetch_page(&self, url: &str, project: &str) -> Result<Vec<RemoteRecord>, UpdateError> {
        let mut wait = Duration::from_secs(1);
        let mut last_error = String::new();
        for attempt in 0..=MAX_RETRY {
            if attempt > 0 {
                debug!(
                    "Retrying {} in {}s (attempt {}/{})",
                    url,
                    wait.as_secs(),
                    attempt,
                    MAX_RETRY
                );
                tokio::time::sleep(wait).await;
                wait *= 2;
            }
            match self.try_fetch_page(url, project).await {
                Ok(records) => return Ok(records),
                Err(e) => last_error = e,
            }
        }
        Err(UpdateError::QueryFailed(last_error))
    }

    async fn try_fetch_page(&self, url: &str, project: &str) -> Result<Vec<RemoteRecord>, String> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, UA)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        // Repology answers 404 for projects it doesn't track
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let resp = resp.error_for_status().map_err(|e| e.to_string())?;
        let packages: Vec<ApiPackage> = resp.json().await.map_err(|e| e.to_string())?;

        Ok(packages
            .into_iter()
            .map(|p| RemoteRecord {
                repo: p.repo,
                name: p
                    .visiblename
                    .or(p.srcname)
                    .or(p.binname)
                    .unwrap_or_else(|| project.to_string()),
                version: p.version,
            })
            .collect())
    }
}

impl Default for RepologyClient {
    fn default() -> Self {
        Self::new()
    }
}
