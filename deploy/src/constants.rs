//! Constants used by the deploy tasks

use ethers::types::H160;

/// Seed used for the deployment salt when `ORDER_DEPLOYMENT_SALT` is unset
pub const DEFAULT_SALT_SEED: &str = "deterministicDeployment";

/// Default location of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// Default directory holding the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Extension of a compiled contract artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// Artifact name of the UUPS proxy wrapping upgradeable contracts
pub const PROXY_ARTIFACT: &str = "ERC1967Proxy";

/// The canonical CREATE2 deployer, present at the same address on most EVM chains
pub const CREATE2_FACTORY: H160 = H160([
    0x4e, 0x59, 0xb4, 0x48, 0x47, 0xb3, 0x79, 0x57, 0x85, 0x88, 0x92, 0x0c, 0xa7, 0x8f, 0xbf, 0x26,
    0xc0, 0xb4, 0x95, 0x6c,
]);

/// LayerZero V2 endpoint shared by the supported testnets
pub const TEST_LZ_ENDPOINT: H160 = H160([
    0x6e, 0xdc, 0xe6, 0x54, 0x03, 0x99, 0x2e, 0x31, 0x0a, 0x62, 0x46, 0x08, 0x08, 0xc4, 0xb9, 0x10,
    0xd9, 0x72, 0xf1, 0x0f,
]);

/// LayerZero V2 endpoint shared by the supported mainnets
pub const MAIN_LZ_ENDPOINT: H160 = H160([
    0x1a, 0x44, 0x07, 0x60, 0x50, 0x12, 0x58, 0x25, 0x90, 0x0e, 0x73, 0x6c, 0x50, 0x1f, 0x85, 0x9c,
    0x50, 0xfe, 0x72, 0x8c,
]);

/// Networks accepted as test tier, with their EIP-155 chain ids
pub const TEST_NETWORKS: [(&str, u64); 5] = [
    ("sepolia", 11_155_111),
    ("arbitrum-sepolia", 421_614),
    ("base-sepolia", 84_532),
    ("optimism-sepolia", 11_155_420),
    ("bsc-testnet", 97),
];

/// Networks accepted as main tier, with their EIP-155 chain ids
pub const MAIN_NETWORKS: [(&str, u64); 5] = [
    ("ethereum", 1),
    ("arbitrum", 42_161),
    ("base", 8_453),
    ("optimism", 10),
    ("bsc", 56),
];

/// Name of the initializer invoked through the proxy constructor
pub const INITIALIZER_METHOD: &str = "initialize";

/// Number of one-second polls for a transaction receipt before giving up
pub const RECEIPT_POLL_ATTEMPTS: usize = 120;

/// Gas limit granted to the executor for `lzReceive` on the destination
pub const GAS_LIMIT: u128 = 500_000;

/// `msg.value` for `lzReceive` on the destination, in wei
pub const MSG_VALUE: u128 = 0;

/// Message body quoted by the send task
pub const SAMPLE_MESSAGE: &str = "Hello World";

/// Destination endpoint id quoted by the send task
pub const SAMPLE_DST_EID: u32 = 40200;
