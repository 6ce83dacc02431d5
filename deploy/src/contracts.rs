use std::{
    fmt::{self, Display},
    fs::File,
    io::BufReader,
    path::Path,
    str::FromStr,
};

use ethers::{
    abi::{Abi, AbiEncode, Token},
    contract::abigen,
    types::{Bytes, H160},
};
use serde::Deserialize;

use crate::{constants::ARTIFACT_EXTENSION, error::DeployError};

abigen!(
    SolCCMock,
    r#"[
        function initialize(address endpoint, address delegate) external
        function upgradeToAndCall(address newImplementation, bytes data) external payable
        function quote(uint32 dstEid, string message, bytes options, bool payInLzToken) external view returns (uint256 nativeFee, uint256 lzTokenFee)
    ]"#,
);

/// Contracts this tool knows how to deploy
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContractKind {
    SolCCMock,
}

impl ContractKind {
    pub const ALL: [ContractKind; 1] = [ContractKind::SolCCMock];

    /// Artifact name, also the key under which the address is recorded
    pub fn name(&self) -> &'static str {
        match self {
            ContractKind::SolCCMock => "SolCCMock",
        }
    }

    pub fn is_upgradeable(&self) -> bool {
        match self {
            ContractKind::SolCCMock => true,
        }
    }

    /// How a fresh deployment of this contract is shaped on a network whose
    /// messaging endpoint is `lz_endpoint`, deployed by `deployer`.
    pub fn plan(&self, lz_endpoint: H160, deployer: H160) -> DeployPlan {
        match self {
            ContractKind::SolCCMock => DeployPlan::Proxy {
                init_calldata: InitializeCall {
                    endpoint: lz_endpoint,
                    delegate: deployer,
                }
                .encode()
                .into(),
            },
        }
    }

    /// Shape of the bare implementation, deployed on its own by upgrades and
    /// underneath the proxy by [`ContractKind::plan`].
    pub fn implementation_plan(&self) -> DeployPlan {
        match self {
            ContractKind::SolCCMock => DeployPlan::Plain {
                constructor_args: Vec::new(),
            },
        }
    }
}

impl Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContractKind {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| DeployError::UnsupportedContract(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeployPlan {
    /// Implementation behind a UUPS proxy whose constructor calls the
    /// initializer; ownership goes to the initializer's `delegate`
    Proxy { init_calldata: Bytes },
    Plain { constructor_args: Vec<Token> },
}

/// Compilation output for a single contract, in the Hardhat artifact shape
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn load(dir: &Path, name: &str) -> Result<Self, DeployError> {
        let path = dir.join(name).with_extension(ARTIFACT_EXTENSION);
        let file = File::open(&path)
            .map_err(|e| DeployError::Artifact(format!("{}: {e}", path.display())))?;
        let artifact: Artifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DeployError::Artifact(format!("{}: {e}", path.display())))?;
        if artifact.bytecode.is_empty() {
            return Err(DeployError::Artifact(format!(
                "{name} has no bytecode (abstract contract or interface?)"
            )));
        }
        Ok(artifact)
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments
    pub fn init_code(&self, constructor_args: &[Token]) -> Result<Bytes, DeployError> {
        match (&self.abi.constructor, constructor_args.is_empty()) {
            (None, true) => Ok(self.bytecode.clone()),
            (None, false) => Err(DeployError::Artifact(format!(
                "{} has no constructor but {} arguments were given",
                self.contract_name,
                constructor_args.len()
            ))),
            (Some(constructor), _) => constructor
                .encode_input(self.bytecode.to_vec(), constructor_args)
                .map(Bytes::from)
                .map_err(|e| DeployError::Artifact(format!("{}: {e}", self.contract_name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ethers::{abi::Address, utils::id};

    use super::*;

    const PROXY_ARTIFACT_JSON: &str = r#"{
        "contractName": "ERC1967Proxy",
        "abi": [
            {
                "type": "constructor",
                "stateMutability": "payable",
                "inputs": [
                    { "name": "implementation", "type": "address", "internalType": "address" },
                    { "name": "_data", "type": "bytes", "internalType": "bytes" }
                ]
            }
        ],
        "bytecode": "0x6080"
    }"#;

    #[test]
    fn parses_known_names_only() {
        assert_eq!(
            "SolCCMock".parse::<ContractKind>().unwrap(),
            ContractKind::SolCCMock
        );
        for name in ["", "solccmock", "OFT"] {
            assert!(matches!(
                name.parse::<ContractKind>(),
                Err(DeployError::UnsupportedContract(n)) if n == name
            ));
        }
    }

    #[test]
    fn sol_cc_mock_is_proxied_and_initialized_with_endpoint_and_deployer() {
        let endpoint = Address::repeat_byte(0x01);
        let deployer = Address::repeat_byte(0x02);
        assert!(ContractKind::SolCCMock.is_upgradeable());

        let DeployPlan::Proxy { init_calldata } = ContractKind::SolCCMock.plan(endpoint, deployer)
        else {
            panic!("SolCCMock must deploy behind a proxy");
        };
        assert_eq!(&init_calldata[..4], &id("initialize(address,address)")[..]);
        assert_eq!(&init_calldata[16..36], endpoint.as_bytes());
        assert_eq!(&init_calldata[48..68], deployer.as_bytes());
    }

    #[test]
    fn implementation_is_deployed_without_constructor_args() {
        assert_eq!(
            ContractKind::SolCCMock.implementation_plan(),
            DeployPlan::Plain {
                constructor_args: Vec::new()
            }
        );
    }

    #[test]
    fn loads_artifact_and_appends_constructor_args() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ERC1967Proxy.json"), PROXY_ARTIFACT_JSON).unwrap();

        let artifact = Artifact::load(dir.path(), "ERC1967Proxy").unwrap();
        assert_eq!(artifact.contract_name, "ERC1967Proxy");

        let implementation = Address::repeat_byte(0x33);
        let init_code = artifact
            .init_code(&[Token::Address(implementation), Token::Bytes(vec![])])
            .unwrap();
        assert_eq!(&init_code[..2], &[0x60, 0x80]);
        assert_eq!(&init_code[14..34], implementation.as_bytes());
    }

    #[test]
    fn missing_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Artifact::load(dir.path(), "SolCCMock"),
            Err(DeployError::Artifact(_))
        ));
    }

    #[test]
    fn constructorless_artifact_rejects_arguments() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("SolCCMock.json"),
            r#"{ "contractName": "SolCCMock", "abi": [], "bytecode": "0x6080" }"#,
        )
        .unwrap();

        let artifact = Artifact::load(dir.path(), "SolCCMock").unwrap();
        assert_eq!(artifact.init_code(&[]).unwrap(), artifact.bytecode);
        assert!(artifact
            .init_code(&[Token::Address(Address::zero())])
            .is_err());
    }
}
