use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use ethers::{
    abi::Token,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Bytes, H160, H256, U256},
    utils::hex,
};

use crate::{
    constants::{CREATE2_FACTORY, INITIALIZER_METHOD, PROXY_ARTIFACT},
    contracts::{Artifact, ContractKind, DeployPlan, SolCCMock},
    error::DeployError,
    types::DeploymentSalt,
    utils::{
        create2_address, create2_calldata, ensure_success, send_transaction, wait_transaction,
        Client,
    },
};

/// A single deterministic deployment to perform
#[derive(Debug, Clone, PartialEq)]
pub struct DeployRequest {
    pub contract: ContractKind,
    pub salt: DeploymentSalt,
    pub plan: DeployPlan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Address callers interact with; the proxy for proxied deployments
    pub address: H160,
    pub implementation: Option<H160>,
    /// `None` when the code was already on chain and nothing was sent
    pub transaction_hash: Option<H256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagingFee {
    pub native_fee: U256,
    pub lz_token_fee: U256,
}

/// The chain-side capabilities the tasks sequence
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Identity transactions are signed with
    fn sender(&self) -> H160;

    /// EIP-155 chain id of the connected network
    fn chain_id(&self) -> u64;

    fn predict_address(&self, request: &DeployRequest) -> Result<H160, DeployError>;

    async fn deploy(&self, request: &DeployRequest) -> Result<Deployment, DeployError>;

    async fn upgrade_to_and_call(
        &self,
        proxy: H160,
        implementation: H160,
        data: Bytes,
    ) -> Result<H256, DeployError>;

    async fn quote(
        &self,
        contract: H160,
        dst_eid: u32,
        message: &str,
        options: Bytes,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee, DeployError>;
}

/// Init code and CREATE2 address of every contract a request creates
struct Resolved {
    implementation: (H160, Bytes),
    proxy: Option<(H160, Bytes)>,
}

/// Label under which the non-proxy part of `contract` is logged
pub fn implementation_label(contract: ContractKind) -> String {
    if contract.is_upgradeable() {
        format!("{}_Implementation", contract.name())
    } else {
        contract.name().to_string()
    }
}

pub struct Deploy {
    client: Arc<Client>,
    chain_id: u64,
    artifacts: PathBuf,
}

impl Deploy {
    pub async fn new(
        rpc: &str,
        sk: &str,
        artifacts: impl Into<PathBuf>,
    ) -> Result<Self, DeployError> {
        let key =
            hex::decode(sk.strip_prefix("0x").unwrap_or(sk)).map_err(DeployError::external)?;
        let wallet = LocalWallet::from_bytes(&key).map_err(DeployError::external)?;
        let provider = Provider::<Http>::try_from(rpc).map_err(DeployError::external)?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(DeployError::external)?
            .as_u64();

        let client = Arc::new(SignerMiddleware::new(provider, wallet.with_chain_id(chain_id)));
        log::info!(
            "deployer address:{:?} chain id:{}",
            client.address(),
            chain_id
        );

        Ok(Self {
            client,
            chain_id,
            artifacts: artifacts.into(),
        })
    }

    fn resolve(&self, request: &DeployRequest) -> Result<Resolved, DeployError> {
        let artifact = Artifact::load(&self.artifacts, request.contract.name())?;
        match &request.plan {
            DeployPlan::Plain { constructor_args } => {
                let init_code = artifact.init_code(constructor_args)?;
                Ok(Resolved {
                    implementation: (create2_address(&request.salt, &init_code), init_code),
                    proxy: None,
                })
            }
            DeployPlan::Proxy { init_calldata } => {
                artifact.abi.function(INITIALIZER_METHOD).map_err(|_| {
                    DeployError::Artifact(format!(
                        "{} has no `{INITIALIZER_METHOD}` method",
                        artifact.contract_name
                    ))
                })?;
                let init_code = match request.contract.implementation_plan() {
                    DeployPlan::Plain { constructor_args } => {
                        artifact.init_code(&constructor_args)?
                    }
                    DeployPlan::Proxy { .. } => {
                        return Err(DeployError::Artifact(format!(
                            "{} implementation cannot itself be proxied",
                            artifact.contract_name
                        )))
                    }
                };
                let implementation = create2_address(&request.salt, &init_code);

                let proxy_code = Artifact::load(&self.artifacts, PROXY_ARTIFACT)?.init_code(&[
                    Token::Address(implementation),
                    Token::Bytes(init_calldata.to_vec()),
                ])?;

                Ok(Resolved {
                    implementation: (implementation, init_code),
                    proxy: Some((create2_address(&request.salt, &proxy_code), proxy_code)),
                })
            }
        }
    }

    async fn ensure_factory(&self) -> Result<(), DeployError> {
        let code = self
            .client
            .get_code(CREATE2_FACTORY, None)
            .await
            .map_err(DeployError::external)?;
        if code.is_empty() {
            return Err(DeployError::ExternalCallFailure(format!(
                "CREATE2 factory {CREATE2_FACTORY:?} is not deployed on this network"
            )));
        }
        Ok(())
    }

    /// Sends `init_code` through the CREATE2 factory unless `address` already
    /// holds code.
    async fn deploy_deterministic(
        &self,
        label: &str,
        salt: &DeploymentSalt,
        address: H160,
        init_code: &Bytes,
    ) -> Result<Option<H256>, DeployError> {
        let existing = self
            .client
            .get_code(address, None)
            .await
            .map_err(DeployError::external)?;
        if !existing.is_empty() {
            log::info!("reusing {} at {:?}", label, address);
            return Ok(None);
        }

        let transaction_hash = send_transaction(
            self.client.clone(),
            create2_calldata(salt, init_code),
            Some(CREATE2_FACTORY),
            U256::zero(),
        )
        .await?;
        wait_transaction(self.client.clone(), transaction_hash).await?;

        let deployed = self
            .client
            .get_code(address, None)
            .await
            .map_err(DeployError::external)?;
        if deployed.is_empty() {
            return Err(DeployError::ExternalCallFailure(format!(
                "{label} not found at {address:?} after {transaction_hash:?}"
            )));
        }
        log::info!("{} deployed at {:?}", label, address);
        Ok(Some(transaction_hash))
    }
}

#[async_trait]
impl ChainClient for Deploy {
    fn sender(&self) -> H160 {
        self.client.address()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn predict_address(&self, request: &DeployRequest) -> Result<H160, DeployError> {
        let resolved = self.resolve(request)?;
        Ok(match resolved.proxy {
            Some((proxy, _)) => proxy,
            None => resolved.implementation.0,
        })
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<Deployment, DeployError> {
        let Resolved {
            implementation,
            proxy,
        } = self.resolve(request)?;
        self.ensure_factory().await?;

        let name = request.contract.name();
        let (implementation_address, implementation_code) = implementation;
        let implementation_label = implementation_label(request.contract);
        let implementation_tx = self
            .deploy_deterministic(
                &implementation_label,
                &request.salt,
                implementation_address,
                &implementation_code,
            )
            .await?;

        match proxy {
            Some((proxy_address, proxy_code)) => {
                let proxy_tx = self
                    .deploy_deterministic(
                        &format!("{name}_Proxy"),
                        &request.salt,
                        proxy_address,
                        &proxy_code,
                    )
                    .await?;
                Ok(Deployment {
                    address: proxy_address,
                    implementation: Some(implementation_address),
                    transaction_hash: proxy_tx,
                })
            }
            None => Ok(Deployment {
                address: implementation_address,
                implementation: None,
                transaction_hash: implementation_tx,
            }),
        }
    }

    async fn upgrade_to_and_call(
        &self,
        proxy: H160,
        implementation: H160,
        data: Bytes,
    ) -> Result<H256, DeployError> {
        let contract = SolCCMock::new(proxy, self.client.clone());
        let call = contract.upgrade_to_and_call(implementation, data).legacy();
        let pending = call.send().await.map_err(DeployError::external)?;
        let transaction_hash = pending.tx_hash();

        let receipt = pending.await.map_err(DeployError::external)?.ok_or_else(|| {
            DeployError::ExternalCallFailure(format!(
                "upgrade transaction {transaction_hash:?} was dropped"
            ))
        })?;
        ensure_success(receipt)?;

        Ok(transaction_hash)
    }

    async fn quote(
        &self,
        contract: H160,
        dst_eid: u32,
        message: &str,
        options: Bytes,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee, DeployError> {
        let (native_fee, lz_token_fee) = SolCCMock::new(contract, self.client.clone())
            .quote(dst_eid, message.to_string(), options, pay_in_lz_token)
            .call()
            .await
            .map_err(DeployError::external)?;

        Ok(MessagingFee {
            native_fee,
            lz_token_fee,
        })
    }
}
