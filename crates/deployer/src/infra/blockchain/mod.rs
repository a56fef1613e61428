//! Access to the Ethereum (or Ethereum-compatible) blockchain deployments
//! are submitted to.

use {
    crate::domain::{deployment, eth},
    alloy::{
        network::{EthereumWallet, TransactionBuilder},
        providers::{DynProvider, PendingTransactionConfig, Provider, ProviderBuilder},
        rpc::{client::ClientBuilder, types::TransactionRequest},
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context as _, anyhow},
    std::time::Duration,
    thiserror::Error,
    url::Url,
};

pub mod arguments;

/// An Ethereum RPC connection.
pub struct Rpc {
    provider: DynProvider,
    chain: eth::ChainId,
}

impl Rpc {
    /// Instantiate an RPC client to an Ethereum (or Ethereum-compatible) node
    /// at the specified URL. Transactions are signed locally with the given
    /// key before submission.
    pub async fn new(url: &Url, signer: PrivateKeySigner) -> Result<Self, Error> {
        let client = ClientBuilder::default().http(url.clone());
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::new(signer))
            .connect_client(client)
            .erased();
        let chain = provider.get_chain_id().await?.into();

        Ok(Self { provider, chain })
    }

    /// The chain ID reported by the connected node.
    pub fn chain(&self) -> eth::ChainId {
        self.chain
    }
}

/// Confirmation policy for submitted creation transactions.
#[derive(Clone, Copy, Debug)]
pub struct Submission {
    /// Number of blocks a transaction must be included under before it
    /// counts as confirmed.
    pub confirmations: u64,
    /// Give up waiting for confirmation after this long. `None` waits for as
    /// long as the chain takes.
    pub max_confirm_time: Option<Duration>,
}

/// The Ethereum blockchain.
#[derive(Clone)]
pub struct Ethereum {
    provider: DynProvider,
    submission: Submission,
}

impl Ethereum {
    /// Access the Ethereum blockchain through an RPC API.
    pub fn new(rpc: Rpc, submission: Submission) -> Self {
        let Rpc { provider, .. } = rpc;
        Self {
            provider,
            submission,
        }
    }
}

#[async_trait::async_trait]
impl deployment::Chain for Ethereum {
    async fn submit(
        &self,
        artifact: &deployment::Artifact,
        constructor_args: &[String],
    ) -> anyhow::Result<deployment::PendingDeployment> {
        let input = arguments::encode(artifact, constructor_args)?;
        let tx = TransactionRequest::default().with_deploy_code(input);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("sending creation transaction")?;

        Ok(deployment::PendingDeployment {
            transaction: eth::TxId(*pending.tx_hash()),
        })
    }

    async fn confirm(
        &self,
        pending: &deployment::PendingDeployment,
    ) -> anyhow::Result<deployment::Confirmed> {
        let watch = PendingTransactionConfig::new(pending.transaction.0)
            .with_required_confirmations(self.submission.confirmations)
            .with_timeout(self.submission.max_confirm_time);
        let transaction = self
            .provider
            .watch_pending_transaction(watch)
            .await
            .context("registering transaction watcher")?
            .await
            .context("awaiting transaction inclusion")?;

        let receipt = self
            .provider
            .get_transaction_receipt(transaction)
            .await
            .context("fetching transaction receipt")?
            .ok_or_else(|| anyhow!("no receipt for included transaction {transaction}"))?;
        if !receipt.status() {
            return Err(anyhow!("creation transaction {transaction} reverted"));
        }
        let contract = receipt
            .contract_address
            .ok_or_else(|| anyhow!("transaction {transaction} did not create a contract"))?;

        Ok(deployment::Confirmed {
            contract: contract.into(),
            transaction: eth::TxId(transaction),
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0:?}")]
    Transport(#[from] alloy::transports::TransportError),
}
