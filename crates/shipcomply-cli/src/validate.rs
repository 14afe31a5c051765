//! # Validate Subcommand
//!
//! Runs field validation and cross-border checks over a shipment file. The
//! file holds one shipment object or an array of them, as JSON or YAML.
//!
//! Exit codes: 0 when every shipment is compliant, 2 otherwise.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use shipcomply_core::{ClassifierStatus, ComplianceStatus, ReferenceSource, Shipment};
use shipcomply_crossborder::ShipmentReport;

use crate::config::ShipcomplyConfig;
use crate::setup;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Shipment document (JSON or YAML).
    pub file: PathBuf,

    /// Override the recipient country of every shipment.
    #[arg(long)]
    pub destination: Option<String>,

    /// Apply regional rule overrides for this region.
    #[arg(long)]
    pub region: Option<String>,

    /// Print full reports as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ShipmentInput {
    One(Shipment),
    Many(Vec<Shipment>),
}

pub async fn run_validate(args: &ValidateArgs, config: &ShipcomplyConfig) -> Result<u8> {
    let mut shipments = read_shipments(&args.file)?;
    if let Some(destination) = &args.destination {
        for shipment in &mut shipments {
            shipment.insert("recipientCountry", destination.as_str());
        }
    }

    let context = Arc::new(setup::context(config).await?);
    let reports = context
        .evaluate_many(shipments, args.region.clone())
        .await
        .context("shipment evaluation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (index, report) in reports.iter().enumerate() {
            print_report(index + 1, report);
        }
    }

    let failing = reports.iter().filter(|r| !r.is_compliant()).count();
    tracing::info!(shipments = reports.len(), failing, "validation finished");
    Ok(if failing == 0 { 0 } else { 2 })
}

/// Parse a shipment document; `.json` files as JSON, anything else as YAML.
pub fn read_shipments(path: &Path) -> Result<Vec<Shipment>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let input: ShipmentInput = if is_json {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))?
    };
    Ok(match input {
        ShipmentInput::One(shipment) => vec![shipment],
        ShipmentInput::Many(shipments) => shipments,
    })
}

fn print_report(number: usize, report: &ShipmentReport) {
    let verdict = if report.is_compliant() { "COMPLIANT" } else { "NOT COMPLIANT" };
    println!("Shipment {number}: {verdict}");

    for finding in &report.validation.findings {
        println!("  [{}] {}: {}", finding.level, finding.field_key, finding.message);
    }
    for skipped in &report.validation.unevaluated {
        println!(
            "  [skipped] {}: no handler registered for `{}`",
            skipped.field_key, skipped.handler
        );
    }

    let compliance = &report.compliance;
    if !compliance.international {
        println!("  domestic shipment; no cross-border checks");
        println!();
        return;
    }
    println!(
        "  international shipment to {}",
        compliance.destination.as_deref().unwrap_or("unknown destination")
    );
    for finding in &compliance.findings {
        let tag = match finding.status {
            ComplianceStatus::NonCompliant => "violation",
            ComplianceStatus::Warning => "warning",
            ComplianceStatus::Compliant => "ok",
        };
        println!("  [{tag}] {}", finding.message);
    }
    if let ClassifierStatus::Degraded { reason } = &compliance.classifier {
        println!("  note: content classifier unavailable ({reason}); keyword screening only");
    }
    if compliance.reference_source == ReferenceSource::Defaults {
        println!("  note: rule store unavailable; built-in reference tables used");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object_or_array() {
        let dir = tempfile::tempdir().unwrap();

        let one = dir.path().join("one.json");
        std::fs::write(&one, r#"{"trackingNumber": "1Z999AA10123456784", "weight": 2.5}"#).unwrap();
        let shipments = read_shipments(&one).unwrap();
        assert_eq!(shipments.len(), 1);
        assert_eq!(shipments[0].get("weight"), Some("2.5"));

        let many = dir.path().join("batch.yaml");
        std::fs::write(
            &many,
            "- recipientCountry: Germany\n- recipientCountry: Cuba\n  declaredValue: 120\n",
        )
        .unwrap();
        let shipments = read_shipments(&many).unwrap();
        assert_eq!(shipments.len(), 2);
        assert_eq!(shipments[1].get("recipientCountry"), Some("Cuba"));
    }
}
