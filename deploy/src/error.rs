use thiserror::Error;

use crate::types::Environment;

/// Errors produced by the deployment tasks and their collaborators
#[derive(Debug, Error)]
pub enum DeployError {
    /// The requested network is not in the allow-list
    #[error("invalid network `{0}`")]
    InvalidNetwork(String),

    /// The contract name does not match any known contract kind
    #[error("unsupported contract `{0}`")]
    UnsupportedContract(String),

    /// No address is recorded for the requested key
    #[error("no {contract} deployment recorded for {environment}/{network}")]
    NotFound {
        environment: Environment,
        network: String,
        contract: String,
    },

    #[error("error reading deployments: {0}")]
    ReadDeployments(String),

    #[error("error writing deployments: {0}")]
    WriteDeployments(String),

    /// A compiled contract artifact is missing or malformed
    #[error("error loading artifact: {0}")]
    Artifact(String),

    /// Compilation output, signing, submission or a contract call failed
    #[error("external call failed: {0}")]
    ExternalCallFailure(String),
}

impl DeployError {
    pub fn external(err: impl ToString) -> Self {
        DeployError::ExternalCallFailure(err.to_string())
    }
}
