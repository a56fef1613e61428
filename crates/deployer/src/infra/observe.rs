//! This module implements the observability for the deployer. It exposes
//! functions which represent events that are meaningful to the deployment
//! sequence. These functions are called when the corresponding events occur
//! and log them in a consistent format.

use {
    crate::domain::{deployment, eth},
    std::path::Path,
    tracing::level_filters::LevelFilter,
};

/// Setup the observability. The log argument configures the tokio tracing
/// framework.
pub fn init(log: &str, stderr_threshold: LevelFilter) {
    observe::tracing::initialize(log, stderr_threshold);
}

/// Like [`init`], but safe to call repeatedly. Useful for tests, which share
/// one process-wide subscriber per test binary.
#[cfg(test)]
pub fn init_for_tests(log: &str) {
    observe::tracing::initialize_reentrant(log);
}

/// Observe that a deployment run is starting.
pub fn deploying(artifact: &deployment::ArtifactName, network: &eth::NetworkId) {
    tracing::info!(%artifact, %network, "deploying contract");
}

/// Observe the resolved artifact.
pub fn artifact_resolved(artifact: &deployment::Artifact) {
    tracing::info!(
        name = %artifact.name,
        bytecode_bytes = artifact.bytecode.len(),
        "resolved artifact"
    );
}

/// Observe that the creation transaction was accepted by the node.
pub fn submitted(pending: &deployment::PendingDeployment) {
    tracing::info!(transaction = %pending.transaction, "submitted creation transaction");
}

/// Observe a confirmed deployment.
pub fn confirmed(deployment: &deployment::Deployment) {
    tracing::info!(
        contract = %deployment.contract,
        transaction = %deployment.transaction,
        "deployment confirmed"
    );
}

/// Observe that the deployment failed.
pub fn failed(err: &deployment::Failure) {
    tracing::error!(stage = %err.stage(), ?err, "deployment failed");
}

/// Observe that the deployment was recorded in the journal.
pub fn recorded(path: &Path) {
    tracing::debug!(?path, "deployment recorded");
}

/// Observe that recording the deployment failed. The deployment itself is
/// confirmed on chain; only the local record is missing.
pub fn record_failed(err: &anyhow::Error) {
    tracing::warn!(?err, "failed to record deployment");
}
