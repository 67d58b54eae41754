use super::PipelineItem;
use crate::msg;
use crate::repology::filter::{FilterSpec, FiltrateRecord};

use console::style;
use tabled::{Alignment, Full, Modify, Style, Table, Tabled};

#[derive(Tabled)]
struct FiltrateRow {
    #[header("Repository")]
    repo: String,
    #[header("Package")]
    name: String,
    #[header("Version")]
    version: String,
}

/// Read-only inspection path: the compiled filter rules, the surviving
/// records and the pick, with no mutation anywhere. A failed resolution
/// still shows its filters and filtrate when those were reached, since an
/// empty filtrate is exactly what the operator needs to see.
pub fn show_repology(item: &PipelineItem) {
    match (&item.result, &item.failure_trace) {
        (Ok(resolved), _) => {
            render(&resolved.filter, &resolved.filtrate);
            msg!(
                "",
                "Selected version (most common): {}",
                style(&resolved.resolved.version).bold()
            );
        }
        (Err(e), Some(trace)) => {
            render(&trace.filter, &trace.filtrate);
            msg!("", "No version selected: {}", e);
        }
        (Err(e), None) => {
            msg!("=>", "Repology for {}: {}", style(item.stem()).bold(), e);
        }
    }
}

fn render(filter: &FilterSpec, filtrate: &[FiltrateRecord]) {
    msg!("=>", "Repology for {}", style(&filter.project).bold());

    msg!("", "Filters:");
    for (key, rule) in filter.describe() {
        msg!("", "  {}: {}", style(key).bold(), rule);
    }

    msg!("", "Filtrate ({} records):", filtrate.len());
    let rows: Vec<FiltrateRow> = filtrate
        .iter()
        .map(|record| FiltrateRow {
            repo: record.repo.clone(),
            name: record.name.clone(),
            version: record.version.clone(),
        })
        .collect();
    let table = Table::new(&rows)
        .with(Modify::new(Full).with(Alignment::left()))
        .with(Modify::new(Full).with(|s: &str| format!(" {} ", s)))
        .with(Style::psql());
    println!("{}", table);
}
