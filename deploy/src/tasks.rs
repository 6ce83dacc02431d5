//! The deploy, upgrade and send tasks.
//!
//! Each task is a straight line: check the network, derive the salt, call
//! into the chain once or twice, then read or write the address store.
//! Results are printed for the operator and returned to the caller; errors
//! are returned untouched so the CLI boundary can log them and pick the
//! exit code.

use ethers::{
    types::{Bytes, H160, H256},
    utils::format_ether,
};

use crate::{
    constants::{GAS_LIMIT, MSG_VALUE, SAMPLE_DST_EID, SAMPLE_MESSAGE},
    contracts::ContractKind,
    deploy::{ChainClient, DeployRequest, Deployment, MessagingFee},
    error::DeployError,
    network::NetworkGuard,
    options::Options,
    store::{AddressStore, DeploymentsBackend},
    types::{DeploymentSalt, Environment},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub salt: DeploymentSalt,
    pub predicted: Option<H160>,
    pub deployment: Deployment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub proxy: H160,
    pub implementation: H160,
    pub transaction_hash: H256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteOutcome {
    pub options: Bytes,
    pub fee: MessagingFee,
}

pub struct Tasks<'a, C, B> {
    client: &'a C,
    store: AddressStore<B>,
    guard: NetworkGuard,
    network: String,
    salt_seed: String,
    lz_endpoint: Option<H160>,
}

impl<'a, C, B> Tasks<'a, C, B>
where
    C: ChainClient,
    B: DeploymentsBackend,
{
    pub fn new(
        client: &'a C,
        store: AddressStore<B>,
        guard: NetworkGuard,
        network: impl Into<String>,
        salt_seed: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            guard,
            network: network.into(),
            salt_seed: salt_seed.into(),
            lz_endpoint: None,
        }
    }

    /// Overrides the messaging endpoint otherwise implied by the network tier
    pub fn with_lz_endpoint(mut self, lz_endpoint: H160) -> Self {
        self.lz_endpoint = Some(lz_endpoint);
        self
    }

    pub fn store(&self) -> &AddressStore<B> {
        &self.store
    }

    fn salt(&self, environment: Environment) -> DeploymentSalt {
        DeploymentSalt::derive(&self.salt_seed, environment)
    }

    pub async fn deploy(
        &mut self,
        environment: Environment,
        contract: ContractKind,
        pre_address: bool,
    ) -> Result<DeployOutcome, DeployError> {
        let tier = self
            .guard
            .validate_chain(&self.network, self.client.chain_id())?
            .tier;
        println!("Deploying contract to {environment} network");

        let lz_endpoint = self.lz_endpoint.unwrap_or_else(|| tier.lz_endpoint());
        let salt = self.salt(environment);
        log::info!("deployment salt:{}", salt);
        let request = DeployRequest {
            contract,
            salt,
            plan: contract.plan(lz_endpoint, self.client.sender()),
        };

        let predicted = if pre_address {
            let address = self.client.predict_address(&request)?;
            println!("{contract} predicted address {address:?}");
            Some(address)
        } else {
            None
        };

        let deployment = self.client.deploy(&request).await?;
        match deployment.transaction_hash {
            Some(hash) => println!(
                "{contract} contract deployed to {:?} with tx hash {hash:?}",
                deployment.address
            ),
            None => println!(
                "{contract} contract already deployed at {:?}",
                deployment.address
            ),
        }
        if let Some(implementation) = deployment.implementation {
            log::info!("{contract} implementation at {:?}", implementation);
        }

        // The address has been reported even if recording it fails
        self.store
            .save(environment, &self.network, contract, deployment.address)?;

        Ok(DeployOutcome {
            salt,
            predicted,
            deployment,
        })
    }

    pub async fn upgrade(
        &mut self,
        environment: Environment,
        contract: ContractKind,
    ) -> Result<UpgradeOutcome, DeployError> {
        self.guard.validate_chain(&self.network, self.client.chain_id())?;
        println!("Running on {}", self.network);
        if !contract.is_upgradeable() {
            log::error!("{contract} is not deployed behind a proxy");
            return Err(DeployError::UnsupportedContract(contract.to_string()));
        }

        let proxy = self.store.load(environment, &self.network, contract)?;

        let request = DeployRequest {
            contract,
            salt: self.salt(environment),
            plan: contract.implementation_plan(),
        };
        let implementation = self.client.deploy(&request).await?;
        match implementation.transaction_hash {
            Some(hash) => println!(
                "{contract} implementation deployed to {:?} with tx hash {hash:?}",
                implementation.address
            ),
            None => println!(
                "{contract} implementation already deployed at {:?}",
                implementation.address
            ),
        }

        let transaction_hash = self
            .client
            .upgrade_to_and_call(proxy, implementation.address, Bytes::new())
            .await?;
        println!(
            "Upgrading contract {contract} to {:?} with tx hash {transaction_hash:?}",
            implementation.address
        );

        Ok(UpgradeOutcome {
            proxy,
            implementation: implementation.address,
            transaction_hash,
        })
    }

    /// Quotes the fee of a fixed sample message. The network name and chain
    /// are only checked against the allow-list when `check_network` is set.
    pub async fn send(
        &self,
        environment: Environment,
        contract: ContractKind,
        check_network: bool,
    ) -> Result<QuoteOutcome, DeployError> {
        if check_network {
            self.guard.validate_chain(&self.network, self.client.chain_id())?;
        }
        println!("Running on {}", self.network);

        let address = self.store.load(environment, &self.network, contract)?;

        let options = Options::new()
            .add_executor_lz_receive_option(GAS_LIMIT, MSG_VALUE)
            .to_bytes();
        println!("Options: {options}");

        let fee = self
            .client
            .quote(
                address,
                SAMPLE_DST_EID,
                SAMPLE_MESSAGE,
                options.clone(),
                false,
            )
            .await?;
        println!("Fee: {}", format_ether(fee.native_fee));

        Ok(QuoteOutcome { options, fee })
    }
}
