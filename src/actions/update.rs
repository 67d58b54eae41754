use super::{error::UpdateError, FailureTrace, PipelineItem, ResolvedPacscript};
use crate::cli::prompt::{ask_confirm, ask_confirm_default};
use crate::config::Opts;
use crate::pacscript::{patch, Pacscript};
use crate::repology::{filter::FilterSpec, resolve::resolve, RemoteRecord, RepologyClient};
use crate::types::version_status;
use crate::utils::{downloader::Downloader, release_notes};
use crate::{debug, executor, msg, success, warn};

use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Parse → compile filters → query → filter → resolve, for one pacscript.
/// Every failure is converted into a per-pacscript outcome so concurrent
/// siblings keep running. Once the filters compiled they are carried in the
/// outcome even on failure, for `--show-repology`.
pub async fn parse_and_resolve(
    path: PathBuf,
    client: Arc<RepologyClient>,
    permits: Arc<Semaphore>,
) -> PipelineItem {
    let (result, failure_trace) = resolve_one(&path, &client, &permits).await;
    PipelineItem {
        path,
        result,
        failure_trace,
    }
}

type ResolveOutcome = (
    Result<ResolvedPacscript, UpdateError>,
    Option<FailureTrace>,
);

async fn resolve_one(path: &Path, client: &RepologyClient, permits: &Semaphore) -> ResolveOutcome {
    let ps = match Pacscript::load(path).await {
        Ok(ps) => ps,
        Err(e) => return (Err(UpdateError::ParseError(e.to_string())), None),
    };
    let filter = match FilterSpec::compile(&ps.repology) {
        Ok(filter) => filter,
        Err(e) => return (Err(e), None),
    };

    let records = {
        // Repology overloads beyond a handful of concurrent requests
        let _permit = match permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return (
                    Err(UpdateError::QueryFailed(e.to_string())),
                    Some(FailureTrace {
                        filter,
                        filtrate: Vec::new(),
                    }),
                )
            }
        };
        client.fetch_project(&filter.project).await
    };
    let records = match records {
        Ok(records) => records,
        Err(e) => {
            return (
                Err(e),
                Some(FailureTrace {
                    filter,
                    filtrate: Vec::new(),
                }),
            )
        }
    };

    finish_resolution(ps, filter, &records)
}

/// Filter the fetched records and pick a version. On failure the compiled
/// filters and the (possibly empty) filtrate ride along in the trace.
fn finish_resolution(ps: Pacscript, filter: FilterSpec, records: &[RemoteRecord]) -> ResolveOutcome {
    let filtrate = filter.apply(records);
    debug!(
        "{}: {} of {} records survived filtering",
        ps.pkgname,
        filtrate.len(),
        records.len()
    );
    match resolve(&filtrate) {
        Ok(resolved) => {
            let status = version_status(&ps.version.value, &resolved.version);
            (
                Ok(ResolvedPacscript {
                    ps,
                    filter,
                    filtrate,
                    resolved,
                    status,
                }),
                None,
            )
        }
        Err(e) => (Err(e), Some(FailureTrace { filter, filtrate })),
    }
}

/// Fetch the new artifact, patch the pacscript on disk, then hand over to
/// pacstall and the operator. The pacscript file is only touched after the
/// download succeeded, so a dead URL never ships.
pub async fn update_one(
    item: &ResolvedPacscript,
    opts: &Opts,
    downloader: &Downloader,
) -> Result<(), String> {
    let ps = &item.ps;
    let latest = &item.resolved.version;
    let stem = ps.stem();

    show_release_notes(item, opts, downloader).await;

    if let Some(warning) = &ps.expand_warning {
        warn!("{}", warning);
    }
    if !ps.expanded_url.contains(&ps.version.value) {
        // The patch can't rewrite what isn't there; the download below is
        // the real gate for whether the url is still valid
        warn!(
            "Current version {} doesn't appear in the url; leaving the url as is",
            style(&ps.version.value).bold()
        );
    }

    let new_url = ps.expanded_url.replace(&ps.version.value, latest);
    debug!("Fetching {}", new_url);
    let (artifact, digest) = downloader
        .fetch_artifact(&new_url, Path::new(crate::DOWNLOAD_DIR), ps.hash_kind)
        .await
        .map_err(|e| UpdateError::FetchFailed(e.to_string()).to_string())?;
    debug!(
        "Downloaded {} ({}: {})",
        artifact.display(),
        ps.hash_kind,
        digest
    );

    let patched = patch::patch(ps, latest, Some(&digest));
    patch::show_diff(&patched, stem);
    patch::write_atomic(&ps.path, &patched.lines, ps.trailing_newline)
        .await
        .map_err(|e| e.to_string())?;

    msg!("=>", "Installing {} with pacstall", style(stem).bold());
    executor::pacstall::install(stem).map_err(|e| e.to_string())?;

    match ask_confirm(opts, &format!("Does {} work?", ps.pkgname)) {
        Ok(true) => {
            success!("Finished updating {}", style(stem).bold());
            Ok(())
        }
        Ok(false) => Err(format!("{} doesn't work", ps.pkgname)),
        Err(e) => Err(e.to_string()),
    }
}

async fn show_release_notes(item: &ResolvedPacscript, opts: &Opts, downloader: &Downloader) {
    let ps = &item.ps;
    let notes =
        release_notes::fetch(downloader.http_client(), &ps.expanded_url, &ps.version.value).await;
    if notes.is_empty() {
        msg!("", "Could not find release notes");
        return;
    }
    if !matches!(
        ask_confirm_default(opts, "Do you want to see the release notes?", true),
        Ok(true)
    ) {
        return;
    }
    for (tag, body) in &notes {
        msg!("", "{}", style(format!("Release notes for {}", tag)).bold());
        for line in body.lines() {
            msg!("", "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VersionStatus;

    fn sample_ps(repology: &str) -> Pacscript {
        let src = format!(
            "version=\"1.0\"\nurl=\"https://example.com/1.0.tar.gz\"\nrepology=({})\n",
            repology
        );
        Pacscript::parse(Path::new("foo.pacscript"), &src).unwrap()
    }

    fn record(repo: &str, version: &str) -> RemoteRecord {
        RemoteRecord {
            repo: repo.to_string(),
            name: "pkg".to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn fully_filtered_record_set_keeps_the_trace() {
        let ps = sample_ps("\"project: foo\" \"*: ignore\"");
        let filter = FilterSpec::compile(&ps.repology).unwrap();
        let records = vec![record("aur", "2.0"), record("debian_11", "2.0")];

        let (result, trace) = finish_resolution(ps, filter, &records);
        assert_eq!(result.unwrap_err(), UpdateError::NoPackageFound);
        // The compiled filters and the empty filtrate survive the failure
        let trace = trace.unwrap();
        assert_eq!(trace.filter.project, "foo");
        assert!(trace.filtrate.is_empty());
    }

    #[test]
    fn successful_resolution_has_no_failure_trace() {
        let ps = sample_ps("\"project: foo\"");
        let filter = FilterSpec::compile(&ps.repology).unwrap();
        let records = vec![record("aur", "2.0")];

        let (result, trace) = finish_resolution(ps, filter, &records);
        assert!(trace.is_none());
        let resolved = result.unwrap();
        assert_eq!(resolved.resolved.version, "2.0");
        assert_eq!(resolved.status, VersionStatus::Outdated);
    }
}
