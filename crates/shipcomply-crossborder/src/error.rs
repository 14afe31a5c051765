//! Errors from building or driving a [`ComplianceContext`].
//!
//! [`ComplianceContext`]: crate::ComplianceContext

use shipcomply_rules::LoaderError;
use shipcomply_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    /// Seeding the default catalog failed.
    #[error("failed to seed default catalog: {0}")]
    Loader(#[from] LoaderError),

    /// Rules could not be loaded.
    #[error("failed to load rules: {0}")]
    Store(#[from] StoreError),

    /// A batch evaluation task panicked or was cancelled.
    #[error("evaluation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
