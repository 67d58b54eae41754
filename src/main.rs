mod actions;
mod cli;
mod config;
mod executor;
mod pacscript;
mod repology;
mod types;
mod utils;

use actions::PipelineItem;
use anyhow::Result;
use clap::Parser;
use config::Opts;
use console::style;
use futures_util::future::join_all;
use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use types::VersionStatus;

// Initialize writer
lazy_static! {
    static ref WRITER: cli::Writer = cli::Writer::new();
}

pub static DEBUG: AtomicBool = AtomicBool::new(false);

// Repology overloads if more than 11 concurrent requests are made
const MAX_REPOLOGY_CONCURRENCY: usize = 11;
const DOWNLOAD_DIR: &str = "/tmp/pacup";

/// Exit codes:
/// 1 => usage or environment error
/// 70 => at least one pacscript failed to update
#[tokio::main(flavor = "current_thread")]
async fn main() {
    match try_main().await {
        Ok(failures) if failures > 0 => std::process::exit(70),
        Ok(_) => (),
        Err(err) => {
            error!("{}", err.to_string());
            err.chain().skip(1).for_each(|cause| {
                due_to!("{}", cause);
            });
            std::process::exit(1);
        }
    }
}

async fn try_main() -> Result<usize> {
    let opts = Opts::parse();
    DEBUG.store(opts.debug, Ordering::Relaxed);
    config::validate_pacscript_paths(&opts.pacscripts)?;

    // Resolve all pacscripts concurrently; one pacscript's failure or
    // slowness never blocks a sibling
    info!("Resolving {} pacscript(s)...", opts.pacscripts.len());
    let client = Arc::new(repology::RepologyClient::new());
    let permits = Arc::new(tokio::sync::Semaphore::new(MAX_REPOLOGY_CONCURRENCY));
    let mut handles = Vec::with_capacity(opts.pacscripts.len());
    for path in &opts.pacscripts {
        let path = path.clone();
        let client = client.clone();
        let permits = permits.clone();
        handles.push(tokio::spawn(async move {
            actions::update::parse_and_resolve(path, client, permits).await
        }));
    }

    let mut items: Vec<PipelineItem> = Vec::with_capacity(handles.len());
    for (path, joined) in opts.pacscripts.iter().zip(join_all(handles).await) {
        match joined {
            Ok(item) => items.push(item),
            // A panicking task only takes down its own pacscript
            Err(e) => items.push(PipelineItem {
                path: path.clone(),
                result: Err(actions::error::UpdateError::QueryFailed(e.to_string())),
                failure_trace: None,
            }),
        }
    }

    actions::show_status_tables(&items);

    if opts.show_repology {
        for item in &items {
            actions::show::show_repology(item);
        }
        // Inspection only; report hard failures but mutate nothing
        return Ok(count_resolution_failures(&items));
    }

    // Update the outdated ones, sequentially: each one ends with an
    // interactive install and confirmation
    let downloader = utils::downloader::Downloader::new();
    let mut succeeded: Vec<(String, String)> = Vec::new();
    let mut failed: Vec<(String, String)> = Vec::new();

    for item in &items {
        match &item.result {
            Ok(resolved) if resolved.status == VersionStatus::Outdated => {
                msg!(
                    "=>",
                    "Updating {} ({} => {})",
                    style(item.stem()).bold(),
                    resolved.ps.version.value,
                    resolved.resolved.version
                );
                let update = format!(
                    "{} => {}",
                    resolved.ps.version.value, resolved.resolved.version
                );
                match actions::update::update_one(resolved, &opts, &downloader).await {
                    Ok(()) => succeeded.push((item.stem().to_string(), update)),
                    Err(reason) => {
                        error!("Failed to update {}: {}", item.stem(), reason);
                        failed.push((item.stem().to_string(), reason));
                    }
                }
                // Clear the downloaded artifact either way
                let _ = tokio::fs::remove_dir_all(DOWNLOAD_DIR).await;
            }
            Ok(_) => (),
            Err(e) if e.is_skip() => {
                debug!("Skipping {}: {}", item.stem(), e);
            }
            Err(e) => {
                failed.push((item.stem().to_string(), e.to_string()));
            }
        }
    }

    actions::show_summary(&succeeded, &failed);
    Ok(failed.len())
}

fn count_resolution_failures(items: &[PipelineItem]) -> usize {
    items
        .iter()
        .filter(|item| matches!(&item.result, Err(e) if !e.is_skip()))
        .count()
}
