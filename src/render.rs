//! Text, JSON and Markdown rendering of run results.

use std::fmt::Write;

use faultline_core::{OutputFormat, RunReport, Skipped};
use faultline_metrics::CommitMetrics;
use faultline_szz::LinkReport;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::classify::ClassifiedCommit;
use crate::commits::CommitRecord;

fn json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value).into_diagnostic()?;
    out.push('\n');
    Ok(out)
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn skipped_section(out: &mut String, skipped: &[Skipped], markdown: bool) {
    if skipped.is_empty() {
        return;
    }
    if markdown {
        let _ = writeln!(out, "\n### Skipped\n");
        for item in skipped {
            let _ = writeln!(out, "- `{}`: {}", short(&item.id), item.reason);
        }
    } else {
        let _ = writeln!(out, "\nSkipped:");
        for item in skipped {
            let _ = writeln!(out, "  {:<8}  {}", short(&item.id), item.reason);
        }
    }
}

/// Render a metrics run.
pub fn metrics(report: &RunReport<Vec<CommitMetrics>>, format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Json => return json(report),
        OutputFormat::Markdown => {
            let _ = writeln!(out, "## Change metrics\n");
            let _ = writeln!(
                out,
                "| Commit | Author | la | ld | lt | nf | ns | nd | entropy | exp | sexp | rexp | ndev | age | nuc |"
            );
            let _ = writeln!(out, "|---|---|---|---|---|---|---|---|---|---|---|---|---|---|---|");
            for m in &report.items {
                let _ = writeln!(
                    out,
                    "| `{}` | {} | {} | {} | {:.1} | {} | {} | {} | {:.3} | {} | {} | {:.2} | {} | {:.1} | {} |",
                    short(&m.hash),
                    m.author,
                    m.la,
                    m.ld,
                    m.lt,
                    m.nf,
                    m.ns,
                    m.nd,
                    m.entropy,
                    m.exp,
                    m.sexp,
                    m.rexp,
                    m.ndev,
                    m.age,
                    m.nuc
                );
            }
            skipped_section(&mut out, &report.skipped, true);
        }
        OutputFormat::Text => {
            let _ = writeln!(
                out,
                "{:<8}  {:<16}  {:>6} {:>6} {:>8} {:>4} {:>4} {:>4} {:>7} {:>5} {:>5} {:>6} {:>5} {:>7} {:>5}",
                "COMMIT", "AUTHOR", "LA", "LD", "LT", "NF", "NS", "ND", "ENTROPY", "EXP", "SEXP", "REXP", "NDEV", "AGE", "NUC"
            );
            for m in &report.items {
                let author: String = m.author.chars().take(16).collect();
                let _ = writeln!(
                    out,
                    "{:<8}  {:<16}  {:>6} {:>6} {:>8.1} {:>4} {:>4} {:>4} {:>7.3} {:>5} {:>5} {:>6.2} {:>5} {:>7.1} {:>5}",
                    short(&m.hash),
                    author,
                    m.la,
                    m.ld,
                    m.lt,
                    m.nf,
                    m.ns,
                    m.nd,
                    m.entropy,
                    m.exp,
                    m.sexp,
                    m.rexp,
                    m.ndev,
                    m.age,
                    m.nuc
                );
            }
            let _ = writeln!(
                out,
                "\n{} commits measured, {} skipped",
                report.processed,
                report.skipped.len()
            );
            skipped_section(&mut out, &report.skipped, false);
        }
    }
    Ok(out)
}

/// Render a link run.
pub fn links(report: &RunReport<LinkReport>, format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    let links = &report.items.links;
    match format {
        OutputFormat::Json => return json(report),
        OutputFormat::Markdown => {
            let _ = writeln!(out, "## Bug-inducing commits\n");
            if links.is_empty() {
                let _ = writeln!(out, "No bug-inducing commits found.");
            } else {
                let _ = writeln!(out, "| Origin | Fixes |");
                let _ = writeln!(out, "|---|---|");
                for (origin, fixes) in links.iter() {
                    let fixes: Vec<String> = fixes.iter().map(|f| format!("`{}`", short(f))).collect();
                    let _ = writeln!(out, "| `{}` | {} |", short(origin), fixes.join(", "));
                }
            }
            skipped_section(&mut out, &report.skipped, true);
        }
        OutputFormat::Text => {
            for (origin, fixes) in links.iter() {
                let fixes: Vec<&str> = fixes.iter().map(|f| short(f)).collect();
                let _ = writeln!(out, "{}  <-  {}", short(origin), fixes.join(", "));
            }
            let _ = writeln!(
                out,
                "\n{} fixes analysed, {} skipped, {} bug-inducing commits",
                report.processed,
                report.skipped.len(),
                links.len()
            );
            skipped_section(&mut out, &report.skipped, false);
        }
    }
    Ok(out)
}

/// Render classified commits.
pub fn classified(commits: &[ClassifiedCommit], format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Json => return json(&commits),
        OutputFormat::Markdown => {
            let _ = writeln!(out, "| Commit | Category | Message |");
            let _ = writeln!(out, "|---|---|---|");
            for commit in commits {
                let _ = writeln!(
                    out,
                    "| `{}` | {} | {} |",
                    short(&commit.hash),
                    commit.category,
                    commit.message.replace('|', "\\|")
                );
            }
        }
        OutputFormat::Text => {
            for commit in commits {
                let _ = writeln!(
                    out,
                    "{:<8}  {:<16}  {}",
                    short(&commit.hash),
                    commit.category.to_string(),
                    commit.message
                );
            }
        }
    }
    Ok(out)
}

/// Render a commit metadata export.
pub fn commits(report: &RunReport<Vec<CommitRecord>>, format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Json => return json(report),
        OutputFormat::Markdown => {
            let _ = writeln!(out, "## Commits\n");
            let _ = writeln!(out, "| Commit | Author | Committer | Parents | Files | + | - | Message |");
            let _ = writeln!(out, "|---|---|---|---|---|---|---|---|");
            for c in &report.items {
                let summary = c.message.lines().next().unwrap_or("");
                let _ = writeln!(
                    out,
                    "| `{}` | {} | {} | {} | {} | {} | {} | {} |",
                    short(&c.hash),
                    c.author_name,
                    c.committer_name,
                    c.parent_hashes.len(),
                    c.files_changed.len(),
                    c.lines_added,
                    c.lines_deleted,
                    summary.replace('|', "\\|")
                );
            }
            skipped_section(&mut out, &report.skipped, true);
        }
        OutputFormat::Text => {
            for c in &report.items {
                let summary = c.message.lines().next().unwrap_or("");
                let merge = if c.is_merge { " (merge)" } else { "" };
                let _ = writeln!(
                    out,
                    "{:<8}  {}  {:<16}  +{:<5} -{:<5} {}{}",
                    short(&c.hash),
                    c.authored_date.format("%Y-%m-%d"),
                    c.author_name.chars().take(16).collect::<String>(),
                    c.lines_added,
                    c.lines_deleted,
                    summary,
                    merge
                );
            }
            let _ = writeln!(
                out,
                "\n{} commits, {} skipped",
                report.processed,
                report.skipped.len()
            );
            skipped_section(&mut out, &report.skipped, false);
        }
    }
    Ok(out)
}
