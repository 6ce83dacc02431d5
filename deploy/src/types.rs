//! Type definitions shared by the tasks

use std::fmt::{self, Display};

use clap::ValueEnum;
use ethers::utils::{hex, keccak256};

/// Deployment partition; every recorded address is scoped by one
#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Environment {
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CREATE2 salt derived from a secret seed and an environment.
///
/// The same `(seed, environment)` pair always yields the same salt, so
/// identical init code lands at the same address on every re-run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeploymentSalt([u8; 32]);

impl DeploymentSalt {
    pub fn derive(seed: &str, environment: Environment) -> Self {
        Self(keccak256(format!("{seed}{environment}")))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for DeploymentSalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_is_deterministic() {
        let first = DeploymentSalt::derive("seed", Environment::Prod);
        let second = DeploymentSalt::derive("seed", Environment::Prod);
        assert_eq!(first, second);
        assert_eq!(first.as_bytes(), &keccak256("seedprod"));
    }

    #[test]
    fn salt_depends_on_environment_and_seed() {
        let prod = DeploymentSalt::derive("seed", Environment::Prod);
        assert_ne!(prod, DeploymentSalt::derive("seed", Environment::Test));
        assert_ne!(prod, DeploymentSalt::derive("other", Environment::Prod));
    }

    #[test]
    fn salt_displays_as_prefixed_hex() {
        let salt = DeploymentSalt::derive("seed", Environment::Dev);
        let shown = salt.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.len(), 66);
    }
}
