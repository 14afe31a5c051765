//! Store, classifier and context construction shared by the subcommands.

use anyhow::{Context, Result};
use shipcomply_classifier::HttpClassifier;
use shipcomply_crossborder::ComplianceContext;
use shipcomply_store::{MemoryStore, TimedStore};

use crate::config::ShipcomplyConfig;

pub type CliStore = TimedStore<MemoryStore>;
pub type CliClassifier = Option<HttpClassifier>;
pub type CliContext = ComplianceContext<CliStore, CliClassifier>;

/// Open the file-backed store named by the configuration.
pub fn open_store(config: &ShipcomplyConfig) -> Result<CliStore> {
    let store = MemoryStore::open(&config.store_path)
        .with_context(|| format!("failed to open rule store {}", config.store_path.display()))?;
    Ok(TimedStore::new(store, config.store_timeout()))
}

/// The HTTP classifier when enabled, otherwise `None`.
pub fn classifier(config: &ShipcomplyConfig) -> Result<CliClassifier> {
    let classifier = config
        .classifier
        .http_config()
        .map(HttpClassifier::new)
        .transpose()
        .context("invalid classifier configuration")?;
    if classifier.is_none() {
        tracing::debug!("classifier disabled; restricted-content screening is keyword-only");
    }
    Ok(classifier)
}

/// Seed if needed, load snapshots and persist any seeded records.
pub async fn context(config: &ShipcomplyConfig) -> Result<CliContext> {
    let store = open_store(config)?;
    let classifier = classifier(config)?;
    let context = ComplianceContext::bootstrap(store, classifier, config.engine.options())
        .await
        .context("failed to initialise compliance context")?;
    flush(context.store())?;
    Ok(context)
}

pub fn flush(store: &CliStore) -> Result<()> {
    store.inner().flush().context("failed to write rule store")
}
