//! Address store: deployed addresses keyed by environment, network and contract.
//!
//! The store is the only owner of the recorded addresses. Persistence is
//! delegated to a [`DeploymentsBackend`], so tasks never touch the
//! deployments file directly. There is no cross-process locking: two
//! invocations writing the same key race and the last write wins.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use ethers::types::H160;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{contracts::ContractKind, error::DeployError, types::Environment};

/// `environment -> network -> contract -> address`, as laid out on disk
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployments(BTreeMap<String, BTreeMap<String, BTreeMap<String, H160>>>);

impl Deployments {
    pub fn get(&self, environment: &str, network: &str, contract: &str) -> Option<H160> {
        self.0.get(environment)?.get(network)?.get(contract).copied()
    }

    pub fn insert(&mut self, environment: &str, network: &str, contract: &str, address: H160) {
        self.0
            .entry(environment.to_string())
            .or_default()
            .entry(network.to_string())
            .or_default()
            .insert(contract.to_string(), address);
    }
}

pub trait DeploymentsBackend {
    fn read(&self) -> Result<Deployments, DeployError>;

    fn write(&mut self, deployments: &Deployments) -> Result<(), DeployError>;
}

/// Pretty-printed JSON file; a missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeploymentsBackend for JsonFileBackend {
    fn read(&self) -> Result<Deployments, DeployError> {
        if !self.path.exists() {
            return Ok(Deployments::default());
        }
        let file =
            File::open(&self.path).map_err(|e| DeployError::ReadDeployments(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DeployError::ReadDeployments(e.to_string()))
    }

    fn write(&mut self, deployments: &Deployments) -> Result<(), DeployError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| DeployError::WriteDeployments(e.to_string()))?;

        // Write next to the target and rename, so a crash never leaves a torn file
        let mut file =
            NamedTempFile::new_in(&dir).map_err(|e| DeployError::WriteDeployments(e.to_string()))?;
        serde_json::to_writer_pretty(&mut file, deployments)
            .map_err(|e| DeployError::WriteDeployments(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| DeployError::WriteDeployments(e.to_string()))?;
        file.persist(&self.path)
            .map_err(|e| DeployError::WriteDeployments(e.to_string()))?;

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    deployments: Deployments,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeploymentsBackend for MemoryBackend {
    fn read(&self) -> Result<Deployments, DeployError> {
        Ok(self.deployments.clone())
    }

    fn write(&mut self, deployments: &Deployments) -> Result<(), DeployError> {
        self.deployments = deployments.clone();
        Ok(())
    }
}

pub struct AddressStore<B> {
    backend: B,
}

impl<B: DeploymentsBackend> AddressStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Records `address`, replacing whatever was stored under the same key.
    pub fn save(
        &mut self,
        environment: Environment,
        network: &str,
        contract: ContractKind,
        address: H160,
    ) -> Result<(), DeployError> {
        let mut deployments = self.backend.read()?;
        deployments.insert(environment.as_str(), network, contract.name(), address);
        self.backend.write(&deployments)?;

        log::info!("recorded {contract} at {address:?} for {environment}/{network}");
        Ok(())
    }

    pub fn load(
        &self,
        environment: Environment,
        network: &str,
        contract: ContractKind,
    ) -> Result<H160, DeployError> {
        self.backend
            .read()?
            .get(environment.as_str(), network, contract.name())
            .ok_or_else(|| DeployError::NotFound {
                environment,
                network: network.to_string(),
                contract: contract.to_string(),
            })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> H160 {
        H160::repeat_byte(byte)
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = AddressStore::new(MemoryBackend::new());
        store
            .save(Environment::Prod, "chainX", ContractKind::SolCCMock, address(0xab))
            .unwrap();

        assert_eq!(
            store
                .load(Environment::Prod, "chainX", ContractKind::SolCCMock)
                .unwrap(),
            address(0xab)
        );
        assert!(matches!(
            store.load(Environment::Prod, "chainY", ContractKind::SolCCMock),
            Err(DeployError::NotFound { .. })
        ));
    }

    #[test]
    fn environments_are_isolated() {
        let mut store = AddressStore::new(MemoryBackend::new());
        store
            .save(Environment::Test, "chainX", ContractKind::SolCCMock, address(1))
            .unwrap();
        store
            .save(Environment::Prod, "chainX", ContractKind::SolCCMock, address(2))
            .unwrap();

        let test = store.load(Environment::Test, "chainX", ContractKind::SolCCMock);
        assert_eq!(test.unwrap(), address(1));
        assert!(store
            .load(Environment::Dev, "chainX", ContractKind::SolCCMock)
            .is_err());
    }

    #[test]
    fn later_save_overwrites() {
        let mut store = AddressStore::new(MemoryBackend::new());
        store
            .save(Environment::Dev, "sepolia", ContractKind::SolCCMock, address(1))
            .unwrap();
        store
            .save(Environment::Dev, "sepolia", ContractKind::SolCCMock, address(2))
            .unwrap();

        let loaded = store.load(Environment::Dev, "sepolia", ContractKind::SolCCMock);
        assert_eq!(loaded.unwrap(), address(2));
    }

    #[test]
    fn missing_key_is_not_found() {
        let store = AddressStore::new(MemoryBackend::new());
        let err = store
            .load(Environment::Prod, "sepolia", ContractKind::SolCCMock)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no SolCCMock deployment recorded for prod/sepolia"
        );
    }

    #[test]
    fn json_file_persists_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deployments.json");

        let mut store = AddressStore::new(JsonFileBackend::new(&path));
        assert!(store
            .load(Environment::Prod, "base", ContractKind::SolCCMock)
            .is_err());
        store
            .save(Environment::Prod, "base", ContractKind::SolCCMock, address(0x11))
            .unwrap();

        let reopened = AddressStore::new(JsonFileBackend::new(&path));
        assert_eq!(
            reopened
                .load(Environment::Prod, "base", ContractKind::SolCCMock)
                .unwrap(),
            address(0x11)
        );

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw["prod"]["base"]["SolCCMock"],
            serde_json::json!(format!("{:?}", address(0x11)))
        );
    }

    #[test]
    fn malformed_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, "not json").unwrap();

        let store = AddressStore::new(JsonFileBackend::new(&path));
        assert!(matches!(
            store.load(Environment::Prod, "base", ContractKind::SolCCMock),
            Err(DeployError::ReadDeployments(_))
        ));
        assert_eq!(store.backend().path(), path.as_path());
    }
}
