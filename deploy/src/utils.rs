use std::{sync::Arc, time::Duration};

use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::LocalWallet,
    types::{
        transaction::eip2718::TypedTransaction, Bytes, TransactionReceipt, TransactionRequest,
        H160, H256, U256, U64,
    },
    utils::get_create2_address,
};

use crate::{
    constants::{CREATE2_FACTORY, RECEIPT_POLL_ATTEMPTS},
    error::DeployError,
    types::DeploymentSalt,
};

pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Address `init_code` lands at when deployed through the CREATE2 factory
pub fn create2_address(salt: &DeploymentSalt, init_code: &[u8]) -> H160 {
    get_create2_address(CREATE2_FACTORY, salt.as_bytes(), init_code)
}

/// Calldata understood by the CREATE2 factory: `salt ++ init_code`
pub fn create2_calldata(salt: &DeploymentSalt, init_code: &[u8]) -> Bytes {
    let mut data = salt.as_bytes().to_vec();
    data.extend_from_slice(init_code);
    data.into()
}

pub async fn send_transaction(
    client: Arc<Client>,
    data: Bytes,
    to: Option<H160>,
    value: U256,
) -> Result<H256, DeployError> {
    let mut tx = TransactionRequest::new().data(data).value(value);
    if let Some(to) = to {
        tx = tx.to(to);
    }
    let mut tx = TypedTransaction::Legacy(tx);

    client
        .fill_transaction(&mut tx, None)
        .await
        .map_err(DeployError::external)?;

    let transaction_hash = client
        .send_transaction(tx, None)
        .await
        .map_err(DeployError::external)?
        .tx_hash();
    log::info!("transaction hash:{:?}", transaction_hash);
    Ok(transaction_hash)
}

/// Polls for the receipt of `transaction_hash`, failing if it never shows up
/// or if the transaction reverted.
pub async fn wait_transaction(
    client: Arc<Client>,
    transaction_hash: H256,
) -> Result<TransactionReceipt, DeployError> {
    for _ in 0..RECEIPT_POLL_ATTEMPTS {
        let receipt = client
            .get_transaction_receipt(transaction_hash)
            .await
            .map_err(DeployError::external)?;
        if let Some(receipt) = receipt {
            return ensure_success(receipt);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Err(DeployError::ExternalCallFailure(format!(
        "transaction receipt not found for {transaction_hash:?}"
    )))
}

pub fn ensure_success(receipt: TransactionReceipt) -> Result<TransactionReceipt, DeployError> {
    if receipt.status == Some(U64::zero()) {
        return Err(DeployError::ExternalCallFailure(format!(
            "transaction {:?} reverted",
            receipt.transaction_hash
        )));
    }
    Ok(receipt)
}
