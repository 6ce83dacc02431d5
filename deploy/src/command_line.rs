use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ethers::types::H160;

use crate::{
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_SALT_SEED},
    contracts::ContractKind,
    deploy::Deploy,
    network::NetworkGuard,
    store::{AddressStore, JsonFileBackend},
    tasks::Tasks,
    types::Environment,
};

#[derive(Debug, Parser)]
#[clap(version, about = "Deploy, upgrade and quote cross-chain messaging contracts")]
pub struct CommandLine {
    /// JSON-RPC endpoint of the target network
    #[clap(short, long, env = "RPC_URL")]
    rpc: String,

    /// Deployer private key in hex
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    sk: String,

    /// Name of the target network, checked against the allow-list
    #[clap(short, long, env = "NETWORK")]
    network: String,

    /// File the deployed addresses are recorded in
    #[clap(long, env = "DEPLOYMENTS_PATH", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    deployments: PathBuf,

    /// Directory holding `<ContractName>.json` compilation artifacts
    #[clap(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    artifacts: PathBuf,

    /// Seed the deployment salt is derived from
    #[clap(long, env = "ORDER_DEPLOYMENT_SALT", hide_env_values = true)]
    salt_seed: Option<String>,

    /// Messaging endpoint passed to initializers instead of the tier default
    #[clap(long, env = "LZ_ENDPOINT")]
    lz_endpoint: Option<H160>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy a contract, behind a proxy when it is upgradeable
    Deploy(DeployArgs),
    /// Point an existing proxy at a freshly deployed implementation
    Upgrade(UpgradeArgs),
    /// Quote the fee of a sample cross-chain message
    Send(SendArgs),
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    #[clap(short, long)]
    env: Environment,

    #[clap(short, long)]
    contract: ContractKind,

    /// Print the predicted address before submitting anything
    #[clap(long, visible_alias = "preAddress")]
    pre_address: bool,
}

#[derive(Debug, Args)]
pub struct UpgradeArgs {
    #[clap(short, long)]
    env: Environment,

    #[clap(short, long)]
    contract: ContractKind,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[clap(short, long)]
    env: Environment,

    #[clap(short, long)]
    contract: ContractKind,

    /// Also check the network against the allow-list
    #[clap(long)]
    check_network: bool,
}

impl Command {
    /// Whether the network name must be allow-listed before connecting
    fn checks_network(&self) -> bool {
        match self {
            Command::Deploy(_) | Command::Upgrade(_) => true,
            Command::Send(args) => args.check_network,
        }
    }
}

/// Seed from `ORDER_DEPLOYMENT_SALT`, or the fixed fallback when unset
pub fn resolve_salt_seed(seed: Option<String>) -> String {
    seed.unwrap_or_else(|| {
        log::warn!("ORDER_DEPLOYMENT_SALT is not set, using `{DEFAULT_SALT_SEED}`");
        DEFAULT_SALT_SEED.to_string()
    })
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        let guard = NetworkGuard::default();
        // Reject unknown names before the RPC endpoint is contacted
        if self.command.checks_network() {
            guard.validate(&self.network)?;
        }

        let deploy = Deploy::new(&self.rpc, &self.sk, self.artifacts).await?;
        let salt_seed = resolve_salt_seed(self.salt_seed);

        let store = AddressStore::new(JsonFileBackend::new(self.deployments));
        let mut tasks = Tasks::new(&deploy, store, guard, self.network, salt_seed);
        if let Some(lz_endpoint) = self.lz_endpoint {
            tasks = tasks.with_lz_endpoint(lz_endpoint);
        }

        match self.command {
            Command::Deploy(args) => {
                tasks
                    .deploy(args.env, args.contract, args.pre_address)
                    .await?;
            }
            Command::Upgrade(args) => {
                tasks.upgrade(args.env, args.contract).await?;
            }
            Command::Send(args) => {
                tasks
                    .send(args.env, args.contract, args.check_network)
                    .await?;
            }
        }
        Ok(())
    }
}
