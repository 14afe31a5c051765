//! # Catalog Subcommands
//!
//! `seed`, `reset`, `rules` and `import`: everything that reads or writes
//! the rule store without evaluating a shipment.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use shipcomply_rules::{reset, seed_if_empty, SeedReport};
use shipcomply_store::{import_reference_data, ImportOutcome, ReferenceImport, RuleCatalog};

use crate::config::ShipcomplyConfig;
use crate::setup::{flush, open_store};

/// Arguments for the rules subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Print the rules as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the import subcommand.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Reference data document, YAML or JSON (by extension).
    pub file: PathBuf,
}

/// Install the default catalog into an empty store.
pub async fn run_seed(config: &ShipcomplyConfig) -> Result<u8> {
    let store = open_store(config)?;
    let report = seed_if_empty(&store)
        .await
        .context("failed to seed default catalog")?;
    flush(&store)?;
    print_seed_report(&report, &config.store_path);
    Ok(0)
}

/// Clear the store and reinstall the default catalog.
pub async fn run_reset(config: &ShipcomplyConfig) -> Result<u8> {
    let store = open_store(config)?;
    let report = reset(&store).await.context("failed to reset rule store")?;
    flush(&store)?;
    print_seed_report(&report, &config.store_path);
    Ok(0)
}

fn print_seed_report(report: &SeedReport, path: &Path) {
    if report.is_noop() {
        println!("{} already holds a catalog; nothing seeded", path.display());
        return;
    }
    for (kind, count) in &report.seeded {
        println!("  {:<26} {count}", kind.as_str());
    }
    println!("Seeded {} records into {}", report.total(), path.display());
}

/// List active rules in priority order.
pub async fn run_rules(args: &RulesArgs, config: &ShipcomplyConfig) -> Result<u8> {
    let catalog = RuleCatalog::new(open_store(config)?);
    let rules = catalog.active_rules().await.context("failed to read rules")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(0);
    }
    if rules.is_empty() {
        println!("No active rules. Run `shipcomply seed` to install the defaults.");
        return Ok(0);
    }
    for rule in &rules {
        let required = if rule.is_required { "required" } else { "" };
        println!(
            "  {:<4} {:<22} {:<8} {}",
            rule.priority, rule.field_key, required, rule.display_name
        );
    }
    println!();
    println!("Total: {} active rules", rules.len());
    Ok(0)
}

/// Bulk-import reference data. Exits 2 if any kind failed.
pub async fn run_import(args: &ImportArgs, config: &ShipcomplyConfig) -> Result<u8> {
    let doc = read_import(&args.file)?;
    let store = open_store(config)?;
    let report = import_reference_data(&store, doc).await;
    flush(&store)?;

    if report.kinds.is_empty() {
        bail!("{} contains no reference data", args.file.display());
    }
    for (kind, outcome) in &report.kinds {
        match outcome {
            ImportOutcome::Imported { count } => println!("  {:<26} imported {count}", kind.as_str()),
            ImportOutcome::Failed { error } => println!("  {:<26} FAILED: {error}", kind.as_str()),
        }
    }
    println!("Imported {} records", report.imported());
    Ok(if report.is_complete() { 0 } else { 2 })
}

/// Parse an import document; `.json` files as JSON, anything else as YAML.
pub fn read_import(path: &Path) -> Result<ReferenceImport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let doc = if is_json {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))?
    };
    Ok(doc)
}
