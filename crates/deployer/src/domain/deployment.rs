//! A single deployment run: the data model, the collaborator seams it drives
//! and the orchestrator sequencing them.

use {
    crate::{domain::eth, infra::observe},
    alloy_json_abi::JsonAbi,
    std::sync::Arc,
    thiserror::Error,
};

/// Name of a compiled contract artifact, e.g. "PredictionMarket".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(pub String);

impl ArtifactName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ArtifactName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ArtifactName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl std::fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The deployment to perform. Created once per invocation from the
/// configuration, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub artifact: ArtifactName,
    /// Constructor arguments as human-readable strings. They are coerced
    /// against the artifact's constructor ABI when the creation transaction
    /// is built.
    pub constructor_args: Vec<String>,
}

/// A compiled, deployable contract.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: ArtifactName,
    pub abi: JsonAbi,
    /// Creation bytecode, without constructor arguments.
    pub bytecode: eth::Bytes,
}

/// A creation transaction accepted by the node but not yet known to be
/// included in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeployment {
    pub transaction: eth::TxId,
}

/// The confirmed outcome of a creation transaction as reported by the chain
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    pub contract: eth::ContractAddress,
    pub transaction: eth::TxId,
}

/// The terminal record of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub artifact: ArtifactName,
    pub contract: eth::ContractAddress,
    pub transaction: eth::TxId,
    pub network: eth::NetworkId,
}

/// The stage of the deployment sequence a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BuildLookup,
    Submit,
    Confirm,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Self::BuildLookup => "build-lookup",
            Self::Submit => "submit",
            Self::Confirm => "confirm",
        };
        write!(f, "{stage}")
    }
}

/// A failed run. One variant per stage; the run aborts at the first failure
/// and no stage is retried.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("artifact lookup failed")]
    BuildLookup(#[source] anyhow::Error),
    #[error("transaction submission failed")]
    Submit(#[source] anyhow::Error),
    #[error("confirmation failed")]
    Confirm(#[source] anyhow::Error),
}

impl Failure {
    pub fn stage(&self) -> Stage {
        match self {
            Self::BuildLookup(_) => Stage::BuildLookup,
            Self::Submit(_) => Stage::Submit,
            Self::Confirm(_) => Stage::Confirm,
        }
    }
}

/// Resolves compiled artifacts by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Artifacts: Send + Sync {
    /// Returns the compiled artifact with the given name. Fails if no such
    /// artifact exists or it has no deployable bytecode.
    async fn resolve(&self, name: &ArtifactName) -> anyhow::Result<Artifact>;
}

/// Submits creation transactions and awaits their inclusion.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// Signs and submits the creation transaction for the artifact, returning
    /// as soon as the node accepts the transaction.
    async fn submit(
        &self,
        artifact: &Artifact,
        constructor_args: &[String],
    ) -> anyhow::Result<PendingDeployment>;

    /// Waits until the pending transaction is included and sufficiently
    /// confirmed. Does not return until the chain client reports either
    /// confirmation or definitive failure; any wait bound is the client's,
    /// not the caller's.
    async fn confirm(&self, pending: &PendingDeployment) -> anyhow::Result<Confirmed>;
}

/// Orchestrates a single deployment: artifact lookup, submission,
/// confirmation. Holds no state across runs, so every invocation is an
/// independent deployment.
pub struct Deployer {
    artifacts: Arc<dyn Artifacts>,
    chain: Arc<dyn Chain>,
    network: eth::NetworkId,
}

impl Deployer {
    pub fn new(
        artifacts: Arc<dyn Artifacts>,
        chain: Arc<dyn Chain>,
        network: eth::NetworkId,
    ) -> Self {
        Self {
            artifacts,
            chain,
            network,
        }
    }

    /// Runs the deployment sequence for the request: resolve the artifact,
    /// submit the creation transaction, await its confirmation. Aborts at the
    /// first failing stage. A failed submission is never resubmitted here:
    /// resubmitting without nonce and fee adjustment risks duplicate or stuck
    /// transactions, so retrying is left to the caller.
    ///
    /// Exactly one of [`Deployment`] or [`Failure`] is produced per call.
    pub async fn deploy(&self, request: &Request) -> Result<Deployment, Failure> {
        observe::deploying(&request.artifact, &self.network);
        let artifact = self
            .artifacts
            .resolve(&request.artifact)
            .await
            .map_err(Failure::BuildLookup)?;
        observe::artifact_resolved(&artifact);

        let pending = self
            .chain
            .submit(&artifact, &request.constructor_args)
            .await
            .map_err(Failure::Submit)?;
        observe::submitted(&pending);

        let confirmed = self
            .chain
            .confirm(&pending)
            .await
            .map_err(Failure::Confirm)?;
        let deployment = Deployment {
            artifact: artifact.name,
            contract: confirmed.contract,
            transaction: confirmed.transaction,
            network: self.network.clone(),
        };
        observe::confirmed(&deployment);
        Ok(deployment)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::{address, b256},
        mockall::predicate,
    };

    fn test_artifact(name: &str) -> Artifact {
        Artifact {
            name: name.into(),
            abi: JsonAbi::default(),
            bytecode: eth::Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
        }
    }

    fn request(name: &str, args: &[&str]) -> Request {
        Request {
            artifact: name.into(),
            constructor_args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn network() -> eth::NetworkId {
        "core_testnet2".to_string().into()
    }

    fn deployer(artifacts: MockArtifacts, chain: MockChain) -> Deployer {
        Deployer::new(Arc::new(artifacts), Arc::new(chain), network())
    }

    #[tokio::test]
    async fn reports_exactly_the_confirmed_values() {
        let transaction = eth::TxId(b256!(
            "abc0000000000000000000000000000000000000000000000000000000000000"
        ));
        let contract = eth::ContractAddress(address!("1230000000000000000000000000000000000000"));

        let mut artifacts = MockArtifacts::new();
        artifacts
            .expect_resolve()
            .with(predicate::eq(ArtifactName::from("PredictionMarket")))
            .times(1)
            .returning(|_| Ok(test_artifact("PredictionMarket")));
        let mut chain = MockChain::new();
        chain
            .expect_submit()
            .times(1)
            .returning(move |_, _| Ok(PendingDeployment { transaction }));
        chain
            .expect_confirm()
            .with(predicate::eq(PendingDeployment { transaction }))
            .times(1)
            .returning(move |_| {
                Ok(Confirmed {
                    contract,
                    transaction,
                })
            });

        let deployment = deployer(artifacts, chain)
            .deploy(&request("PredictionMarket", &[]))
            .await
            .unwrap();

        assert_eq!(deployment.artifact.as_str(), "PredictionMarket");
        assert_eq!(deployment.contract, contract);
        assert_eq!(deployment.transaction, transaction);
        assert_eq!(deployment.network, network());
    }

    #[tokio::test]
    async fn unknown_artifact_never_touches_the_chain() {
        let mut artifacts = MockArtifacts::new();
        artifacts
            .expect_resolve()
            .times(1)
            .returning(|name| Err(anyhow::anyhow!("no artifact named {name}")));
        let mut chain = MockChain::new();
        chain.expect_submit().never();
        chain.expect_confirm().never();

        let failure = deployer(artifacts, chain)
            .deploy(&request("Nope", &[]))
            .await
            .unwrap_err();

        assert_eq!(failure.stage(), Stage::BuildLookup);
        assert!(matches!(failure, Failure::BuildLookup(_)));
    }

    #[tokio::test]
    async fn failed_submission_aborts_before_confirmation() {
        let mut artifacts = MockArtifacts::new();
        artifacts
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(test_artifact("PredictionMarket")));
        let mut chain = MockChain::new();
        chain
            .expect_submit()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("nonce too low")));
        chain.expect_confirm().never();

        let failure = deployer(artifacts, chain)
            .deploy(&request("PredictionMarket", &[]))
            .await
            .unwrap_err();

        assert_eq!(failure.stage(), Stage::Submit);
    }

    #[tokio::test]
    async fn reverted_confirmation_fails_the_run() {
        let transaction = eth::TxId(b256!(
            "abc0000000000000000000000000000000000000000000000000000000000000"
        ));

        let mut artifacts = MockArtifacts::new();
        artifacts
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(test_artifact("PredictionMarket")));
        let mut chain = MockChain::new();
        chain
            .expect_submit()
            .times(1)
            .returning(move |_, _| Ok(PendingDeployment { transaction }));
        chain
            .expect_confirm()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("creation transaction reverted")));

        let failure = deployer(artifacts, chain)
            .deploy(&request("PredictionMarket", &[]))
            .await
            .unwrap_err();

        assert_eq!(failure.stage(), Stage::Confirm);
    }

    #[tokio::test]
    async fn constructor_arguments_reach_the_chain_client() {
        let transaction = eth::TxId(b256!(
            "abc0000000000000000000000000000000000000000000000000000000000000"
        ));
        let contract = eth::ContractAddress(address!("1230000000000000000000000000000000000000"));
        let args = ["0x1111111111111111111111111111111111111111", "42"];

        let mut artifacts = MockArtifacts::new();
        artifacts
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(test_artifact("PredictionMarket")));
        let mut chain = MockChain::new();
        let expected: Vec<_> = args.iter().map(|arg| arg.to_string()).collect();
        chain
            .expect_submit()
            .withf(move |_, got| got == expected.as_slice())
            .times(1)
            .returning(move |_, _| Ok(PendingDeployment { transaction }));
        chain.expect_confirm().times(1).returning(move |_| {
            Ok(Confirmed {
                contract,
                transaction,
            })
        });

        deployer(artifacts, chain)
            .deploy(&request("PredictionMarket", &args))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn repeated_requests_deploy_independent_instances() {
        fn nth(n: u8) -> (PendingDeployment, Confirmed) {
            let transaction = eth::TxId(eth::B256::with_last_byte(n));
            (
                PendingDeployment { transaction },
                Confirmed {
                    contract: eth::ContractAddress(eth::Address::with_last_byte(n)),
                    transaction,
                },
            )
        }

        let mut artifacts = MockArtifacts::new();
        artifacts
            .expect_resolve()
            .times(2)
            .returning(|_| Ok(test_artifact("PredictionMarket")));
        let mut chain = MockChain::new();
        let mut seq = mockall::Sequence::new();
        for n in 1..=2 {
            let (pending, confirmed) = nth(n);
            chain
                .expect_submit()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Ok(pending.clone()));
            chain
                .expect_confirm()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(confirmed.clone()));
        }

        let deployer = deployer(artifacts, chain);
        let request = request("PredictionMarket", &[]);
        let first = deployer.deploy(&request).await.unwrap();
        let second = deployer.deploy(&request).await.unwrap();

        assert_ne!(first.contract, second.contract);
        assert_ne!(first.transaction, second.transaction);
    }
}
