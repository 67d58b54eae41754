use crate::cli;
use crate::types::ChecksumKind;

use anyhow::{format_err, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> Self {
        Downloader {
            client: Client::new(),
        }
    }

    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Download the artifact at `url` into `dir`, hashing it as the bytes
    /// stream in. Returns the file path and the hex digest. Any non-success
    /// status or transport error aborts before anything else is mutated.
    pub async fn fetch_artifact(
        &self,
        url: &str,
        dir: &Path,
        kind: ChecksumKind,
    ) -> Result<(PathBuf, String)> {
        if !dir.is_dir() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut resp = self.client.get(url).send().await?;
        resp.error_for_status_ref()?;

        let filename = resp
            .url()
            .path_segments()
            .and_then(|segments| segments.last())
            .and_then(|name| if name.is_empty() { None } else { Some(name) })
            .ok_or_else(|| format_err!("{} doesn't contain a filename", url))?
            .to_string();

        let bar_template = {
            let max_len = crate::WRITER.get_max_len();
            if max_len < 90 {
                " {wide_msg} {total_bytes:>10} {binary_bytes_per_sec:>12} {eta:>4} {percent:>3}%"
            } else {
                " {msg:<48} {total_bytes:>10} {binary_bytes_per_sec:>12} {eta:>4} [{wide_bar:.white/black}] {percent:>3}%"
            }
        };
        let bar = ProgressBar::new(resp.content_length().unwrap_or(0));
        bar.set_style(
            ProgressStyle::default_bar()
                .template(bar_template)
                .progress_chars("=>-"),
        );
        let mut progress_text = filename.clone();
        if console::measure_text_width(&progress_text) > 48 {
            progress_text = console::truncate_str(&progress_text, 45, "...").to_string();
        }
        bar.set_message(progress_text);

        let file_path = dir.join(&filename);
        let mut f = tokio::fs::File::create(&file_path).await?;
        let mut hasher = kind.hasher();
        while let Some(chunk) = resp.chunk().await? {
            f.write_all(&chunk).await?;
            hasher.update(&chunk);
            bar.inc(chunk.len() as u64);
        }
        f.shutdown().await?;

        bar.finish_and_clear();
        bar.println(format!(
            "{}{}",
            cli::gen_prefix(&console::style("DONE").dim().to_string()),
            &filename
        ));

        Ok((file_path, hasher.finish()))
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}
