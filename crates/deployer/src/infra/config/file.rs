use {
    crate::{
        domain::{deployment, eth},
        infra::{self, blockchain},
    },
    alloy::signers::local::PrivateKeySigner,
    serde::Deserialize,
    std::{
        path::{Path, PathBuf},
        time::Duration,
    },
    tokio::fs,
    url::Url,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// Optionally specify the chain ID the deployer is configured for. Note
    /// that the actual chain ID is fetched from the configured Ethereum RPC
    /// endpoint, and the deployer will exit if it does not match this value.
    chain_id: Option<u64>,

    /// Name of the network this configuration targets. Used for the journal
    /// file and the verification hint, not for routing.
    network: String,

    /// URL of the Ethereum RPC endpoint deployments are submitted to.
    node_url: Url,

    /// Directory holding the compiled contract artifacts.
    #[serde(default = "default_artifacts_dir")]
    artifacts_dir: PathBuf,

    /// Directory the deployment journal is written to.
    #[serde(default = "default_journal_dir")]
    journal_dir: PathBuf,

    /// Name of the artifact to deploy.
    artifact: String,

    /// Constructor arguments for the contract, in declaration order.
    #[serde(default)]
    constructor_args: Vec<String>,

    /// The account funding and signing the deployment.
    account: Account,

    /// Parameters related to creation transaction submission.
    #[serde(default)]
    submission: Submission,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Account {
    /// The private key used to sign the creation transaction.
    private_key: eth::B256,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Submission {
    /// The number of blocks to wait for a creation transaction to be
    /// considered confirmed.
    #[serde(default = "default_confirmations")]
    confirmations: u64,

    /// The maximum time to spend waiting for the creation transaction to
    /// appear on chain. Unset means waiting indefinitely.
    #[serde(default, with = "humantime_serde")]
    max_confirm_time: Option<Duration>,
}

impl Default for Submission {
    fn default() -> Self {
        Self {
            confirmations: default_confirmations(),
            max_confirm_time: None,
        }
    }
}

fn default_confirmations() -> u64 {
    1
}

fn default_artifacts_dir() -> PathBuf {
    "artifacts".into()
}

fn default_journal_dir() -> PathBuf {
    "deployments".into()
}

/// Load the deployer configuration from a TOML file.
///
/// # Panics
///
/// This method panics if the config is invalid or on I/O errors.
pub async fn load(path: &Path) -> infra::Config {
    let data = fs::read_to_string(path)
        .await
        .unwrap_or_else(|e| panic!("I/O error while reading {path:?}: {e:?}"));
    // Not printing detailed error because it could leak private keys.
    let config: Config = toml::de::from_str(&data)
        .unwrap_or_else(|_| panic!("TOML syntax error while reading {path:?}"));

    infra::Config {
        network: eth::NetworkId(config.network),
        chain_id: config.chain_id.map(eth::ChainId),
        node_url: config.node_url,
        signer: PrivateKeySigner::from_bytes(&config.account.private_key)
            .unwrap_or_else(|_| panic!("invalid private key in {path:?}")),
        artifacts_dir: config.artifacts_dir,
        journal_dir: config.journal_dir,
        submission: blockchain::Submission {
            confirmations: config.submission.confirmations,
            max_confirm_time: config.submission.max_confirm_time,
        },
        request: deployment::Request {
            artifact: config.artifact.into(),
            constructor_args: config.constructor_args,
        },
    }
}
