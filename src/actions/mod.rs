pub mod error;
pub mod show;
pub mod update;

use crate::msg;
use crate::pacscript::Pacscript;
use crate::repology::filter::{FilterSpec, FiltrateRecord};
use crate::repology::resolve::ResolvedVersion;
use crate::types::VersionStatus;
use error::UpdateError;

use console::style;
use std::path::PathBuf;
use tabled::{Alignment, Full, Modify, Style, Table, Tabled};

/// A pacscript that made it through parse, filter compilation, query and
/// resolution. Patching happens later and only for outdated ones.
#[derive(Debug)]
pub struct ResolvedPacscript {
    pub ps: Pacscript,
    pub filter: FilterSpec,
    pub filtrate: Vec<FiltrateRecord>,
    pub resolved: ResolvedVersion,
    pub status: VersionStatus,
}

/// Filters and filtrate from a resolution that failed after the filters
/// compiled, kept so `--show-repology` can still explain the failure.
#[derive(Debug)]
pub struct FailureTrace {
    pub filter: FilterSpec,
    pub filtrate: Vec<FiltrateRecord>,
}

/// Outcome of one pacscript's resolution pipeline.
pub struct PipelineItem {
    pub path: PathBuf,
    pub result: Result<ResolvedPacscript, UpdateError>,
    pub failure_trace: Option<FailureTrace>,
}

impl PipelineItem {
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[header("Pacscript")]
    name: String,
    #[header("Current")]
    current: String,
    #[header("Latest")]
    latest: String,
    #[header("Maintainer")]
    maintainer: String,
}

#[derive(Tabled)]
struct UnknownRow {
    #[header("Pacscript")]
    name: String,
    #[header("Reason")]
    reason: String,
}

#[derive(Tabled)]
struct SuccessRow {
    #[header("Pacscript")]
    name: String,
    #[header("Update")]
    update: String,
}

#[derive(Tabled)]
struct FailureRow {
    #[header("Pacscript")]
    name: String,
    #[header("Reason")]
    reason: String,
}

fn print_table<T: Tabled>(rows: &[T]) {
    let table = Table::new(rows)
        .with(Modify::new(Full).with(Alignment::left()))
        .with(Modify::new(Full).with(|s: &str| format!(" {} ", s)))
        .with(Style::psql());
    println!("{}", table);
}

fn status_row(item: &ResolvedPacscript, color: console::Color) -> StatusRow {
    StatusRow {
        name: style(item.ps.stem()).fg(color).to_string(),
        current: item.ps.version.value.clone(),
        latest: item.resolved.version.clone(),
        maintainer: item.ps.maintainer.clone(),
    }
}

/// Group every pipeline outcome by version status and show the overview the
/// operator decides from.
pub fn show_status_tables(items: &[PipelineItem]) {
    let mut outdated = Vec::new();
    let mut up_to_date = Vec::new();
    let mut newer = Vec::new();
    let mut unknown = Vec::new();

    for item in items {
        match &item.result {
            Ok(resolved) => match resolved.status {
                VersionStatus::Outdated => outdated.push(status_row(resolved, console::Color::Blue)),
                VersionStatus::UpToDate => {
                    up_to_date.push(status_row(resolved, console::Color::Green))
                }
                VersionStatus::Newer => {
                    newer.push(status_row(resolved, console::Color::Magenta))
                }
            },
            Err(e) => unknown.push(UnknownRow {
                name: style(item.stem()).red().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    if !outdated.is_empty() {
        msg!("", "These pacscripts are {}:", style("outdated").blue().bold());
        print_table(&outdated);
    }
    if !up_to_date.is_empty() {
        msg!(
            "",
            "These pacscripts are {}:",
            style("up to date").green().bold()
        );
        print_table(&up_to_date);
    }
    if !newer.is_empty() {
        msg!(
            "",
            "These pacscripts are {} than repology:",
            style("newer").magenta().bold()
        );
        print_table(&newer);
    }
    if !unknown.is_empty() {
        msg!(
            "",
            "These pacscripts could {} be resolved:",
            style("not").red().bold()
        );
        print_table(&unknown);
    }
}

pub fn show_summary(succeeded: &[(String, String)], failed: &[(String, String)]) {
    if !succeeded.is_empty() {
        msg!(
            "",
            "These pacscripts were {}:",
            style("updated").green().bold()
        );
        let rows: Vec<SuccessRow> = succeeded
            .iter()
            .map(|(name, update)| SuccessRow {
                name: style(name).green().to_string(),
                update: update.clone(),
            })
            .collect();
        print_table(&rows);
    }
    if !failed.is_empty() {
        msg!(
            "",
            "These pacscripts {}:",
            style("failed to update").red().bold()
        );
        let rows: Vec<FailureRow> = failed
            .iter()
            .map(|(name, reason)| FailureRow {
                name: style(name).red().to_string(),
                reason: reason.clone(),
            })
            .collect();
        print_table(&rows);
    }
}
