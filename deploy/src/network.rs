//! Allow-list check applied before a task touches a chain

use ethers::types::H160;

use crate::{
    constants::{MAIN_LZ_ENDPOINT, MAIN_NETWORKS, TEST_LZ_ENDPOINT, TEST_NETWORKS},
    error::DeployError,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NetworkTier {
    Test,
    Main,
}

impl NetworkTier {
    /// Cross-chain messaging endpoint deployed on every network of this tier
    pub fn lz_endpoint(&self) -> H160 {
        match self {
            NetworkTier::Test => TEST_LZ_ENDPOINT,
            NetworkTier::Main => MAIN_LZ_ENDPOINT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub tier: NetworkTier,
}

#[derive(Debug, Clone)]
pub struct NetworkGuard {
    networks: Vec<NetworkConfig>,
}

impl Default for NetworkGuard {
    fn default() -> Self {
        Self::new(TEST_NETWORKS, MAIN_NETWORKS)
    }
}

impl NetworkGuard {
    /// Builds the allow-list from `(name, chain_id)` pairs of each tier
    pub fn new<T, M, S>(test: T, main: M) -> Self
    where
        T: IntoIterator<Item = (S, u64)>,
        M: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let tiered = |tier| {
            move |(name, chain_id): (S, u64)| NetworkConfig {
                name: name.into(),
                chain_id,
                tier,
            }
        };
        let test = test.into_iter().map(tiered(NetworkTier::Test));
        let main = main.into_iter().map(tiered(NetworkTier::Main));
        Self {
            networks: test.chain(main).collect(),
        }
    }

    /// Accepts `network` only on an exact, case-sensitive match.
    pub fn validate(&self, network: &str) -> Result<&NetworkConfig, DeployError> {
        self.networks
            .iter()
            .find(|config| config.name == network)
            .ok_or_else(|| DeployError::InvalidNetwork(network.to_string()))
    }

    /// Like [`NetworkGuard::validate`], and also requires the connected
    /// chain to be the one the name stands for.
    pub fn validate_chain(
        &self,
        network: &str,
        chain_id: u64,
    ) -> Result<&NetworkConfig, DeployError> {
        let config = self.validate(network)?;
        if config.chain_id != chain_id {
            log::error!(
                "{network} is chain {} but the RPC endpoint serves chain {chain_id}",
                config.chain_id
            );
            return Err(DeployError::InvalidNetwork(network.to_string()));
        }
        Ok(config)
    }

    pub fn networks(&self) -> &[NetworkConfig] {
        &self.networks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_allowed_network() {
        let guard = NetworkGuard::default();
        for (name, chain_id) in TEST_NETWORKS {
            let config = guard.validate(name).unwrap();
            assert_eq!(config.tier, NetworkTier::Test);
            assert_eq!(config.chain_id, chain_id);
        }
        for (name, chain_id) in MAIN_NETWORKS {
            let config = guard.validate_chain(name, chain_id).unwrap();
            assert_eq!(config.tier, NetworkTier::Main);
        }
        assert_eq!(
            guard.networks().len(),
            TEST_NETWORKS.len() + MAIN_NETWORKS.len()
        );
    }

    #[test]
    fn rejects_unknown_empty_and_case_mismatched_names() {
        let guard = NetworkGuard::default();
        for name in ["", "mainnet", "Sepolia", "SEPOLIA", " sepolia", "sepolia "] {
            assert!(
                matches!(guard.validate(name), Err(DeployError::InvalidNetwork(n)) if n == name),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_name_served_by_another_chain() {
        let guard = NetworkGuard::default();
        assert!(guard.validate_chain("sepolia", 11_155_111).is_ok());
        assert!(matches!(
            guard.validate_chain("sepolia", 1),
            Err(DeployError::InvalidNetwork(n)) if n == "sepolia"
        ));
        assert!(matches!(
            guard.validate_chain("bogus-net", 1),
            Err(DeployError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn custom_allow_list() {
        let guard = NetworkGuard::new([("chainX", 31_337)], Vec::<(&str, u64)>::new());
        let config = guard.validate("chainX").unwrap();
        assert_eq!(config.chain_id, 31_337);
        assert_eq!(config.tier.lz_endpoint(), TEST_LZ_ENDPOINT);
        assert!(guard.validate("sepolia").is_err());
    }
}
