use crate::commands::load_page;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_blocks::{SequentialIds, UuidIds};
use pagecraft_editor::{Mutation, PageDocument};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Landing page JSON file
    pub page: String,

    /// JSON array of mutations, e.g. `[{"op": "add_block", "kind": "heading"}]`
    pub script: String,

    /// Deterministic ids for new blocks (`<seed>-1`, `<seed>-2`, ...)
    #[arg(long)]
    pub seed: Option<String>,

    /// Write the result here instead of stdout
    #[arg(short, long, conflicts_with = "in_place")]
    pub out: Option<String>,

    /// Overwrite the page file
    #[arg(long)]
    pub in_place: bool,
}

/// Outcome of a script run
#[derive(Debug, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: usize,
    pub unchanged: usize,
    pub rejected: usize,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let page_path = cwd.join(&args.page);
    let script_path = cwd.join(&args.script);

    let script = fs::read_to_string(&script_path)
        .with_context(|| format!("Cannot read {}", script_path.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid mutation script {}", script_path.display()))?;

    let page = match &args.seed {
        Some(seed) => load_page(&page_path, &mut SequentialIds::new(format!("{}-load", seed)))?,
        None => load_page(&page_path, &mut UuidIds)?,
    };
    let mut document = PageDocument::new(page, config.registry()?, config.entitlement());
    if let Some(seed) = &args.seed {
        document = document.with_ids(SequentialIds::new(seed.clone()));
    }

    // Progress goes to stderr so stdout stays valid JSON
    eprintln!("{}", format!("✏️  Applying {} mutations...", mutations.len()).bright_blue().bold());
    let report = run_script(&mut document, &mutations);

    let json = serde_json::to_string_pretty(document.page())?;
    let target: Option<PathBuf> = match (&args.out, args.in_place) {
        (Some(out), _) => Some(cwd.join(out)),
        (None, true) => Some(page_path),
        (None, false) => None,
    };
    match target {
        Some(path) => {
            fs::write(&path, json)?;
            eprintln!("  {} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }

    eprintln!();
    if report.rejected == 0 {
        eprintln!(
            "{} {} applied, {} unchanged (version {})",
            "✅".green(),
            report.applied,
            report.unchanged,
            document.version()
        );
    } else {
        eprintln!(
            "{} {} applied, {} unchanged, {} rejected",
            "⚠️".yellow(),
            report.applied,
            report.unchanged,
            report.rejected
        );
    }
    Ok(())
}

/// Apply each mutation in order; a rejected one is reported and skipped
pub fn run_script(document: &mut PageDocument, mutations: &[Mutation]) -> ApplyReport {
    let mut report = ApplyReport::default();
    for (index, mutation) in mutations.iter().enumerate() {
        match document.apply(mutation) {
            Ok(result) if result.changed => {
                report.applied += 1;
                eprintln!("  {} #{} {}", "✓".green(), index, mutation.name());
            }
            Ok(_) => {
                report.unchanged += 1;
                eprintln!("  {} #{} {} (no change)", "·".dimmed(), index, mutation.name());
            }
            Err(err) => {
                report.rejected += 1;
                eprintln!("  {} #{} {} - {}", "✗".red(), index, mutation.name(), err.to_string().red());
            }
        }
    }
    report
}
