use {
    crate::{
        domain::{self, deployment},
        infra::{
            self,
            artifacts,
            blockchain::{self, Ethereum},
            cli,
            config,
            journal,
            observe,
        },
    },
    clap::Parser,
    std::{process::ExitCode, sync::Arc},
    tracing::level_filters::LevelFilter,
};

pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = cli::Args::parse_from(args);
    observe::init(
        &args.log,
        args.stderr_threshold
            .map(Into::into)
            .unwrap_or(LevelFilter::ERROR),
    );
    tracing::info!("running deployer with validated arguments:\n{args}");
    let config = config::load(&args.config).await;
    run(config).await
}

/// Performs a single deployment and translates its outcome into the process
/// exit code.
async fn run(config: infra::Config) -> ExitCode {
    let journal = journal::Journal::new(config.journal_dir.clone());
    let deployer = domain::Deployer::new(
        Arc::new(artifacts::Store::new(config.artifacts_dir.clone())),
        Arc::new(ethereum(&config).await),
        config.network.clone(),
    );
    conclude(&journal, deployer.deploy(&config.request).await).await
}

/// A confirmed deployment is journaled and summarized on stdout and exits 0,
/// a failed one is reported on stderr in full detail and exits 1.
async fn conclude(
    journal: &journal::Journal,
    outcome: Result<deployment::Deployment, deployment::Failure>,
) -> ExitCode {
    match outcome {
        Ok(deployment) => {
            record(journal, &deployment).await;
            summarize(&deployment);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            observe::failed(&failure);
            eprintln!("deployment failed: {:#}", anyhow::Error::from(failure));
            ExitCode::FAILURE
        }
    }
}

/// Connects to the Ethereum node and checks it serves the configured chain.
async fn ethereum(config: &infra::Config) -> Ethereum {
    let rpc = blockchain::Rpc::new(&config.node_url, config.signer.clone())
        .await
        .expect("initialize ethereum RPC API");
    if let Some(chain) = config.chain_id {
        assert_eq!(
            rpc.chain(),
            chain,
            "The configured chain ID does not match connected Ethereum node"
        );
    }
    Ethereum::new(rpc, config.submission)
}

/// Journal write failures are reported but do not fail the run: the contract
/// is already live on chain at this point.
async fn record(journal: &journal::Journal, deployment: &deployment::Deployment) {
    match journal.record(deployment).await {
        Ok(path) => observe::recorded(&path),
        Err(err) => observe::record_failed(&err),
    }
}

fn summarize(deployment: &deployment::Deployment) {
    println!(
        "{} deployed to: {}",
        deployment.artifact, deployment.contract
    );
    println!("Deployment transaction: {}", deployment.transaction);
    println!();
    println!("Verify with:");
    println!(
        "verify --network {} {}",
        deployment.network, deployment.contract
    );
}

#[cfg(test)]
mod tests {
    use {super::*, crate::domain::eth};

    fn deployment() -> deployment::Deployment {
        deployment::Deployment {
            artifact: "PredictionMarket".into(),
            contract: eth::ContractAddress(eth::Address::with_last_byte(0x42)),
            transaction: eth::TxId(eth::B256::with_last_byte(7)),
            network: "core_testnet2".to_string().into(),
        }
    }

    /// [`ExitCode`] carries no `PartialEq` impl.
    fn assert_exit_code(actual: ExitCode, expected: ExitCode) {
        assert_eq!(format!("{actual:?}"), format!("{expected:?}"));
    }

    #[tokio::test]
    async fn confirmed_deployments_exit_zero() {
        observe::init_for_tests("debug");
        let dir = tempfile::tempdir().unwrap();
        let journal = journal::Journal::new(dir.path().to_owned());

        let exit = conclude(&journal, Ok(deployment())).await;

        assert_exit_code(exit, ExitCode::SUCCESS);
        assert!(dir.path().join("core_testnet2.json").exists());
    }

    #[tokio::test]
    async fn failed_deployments_exit_nonzero() {
        observe::init_for_tests("debug");
        let dir = tempfile::tempdir().unwrap();
        let journal = journal::Journal::new(dir.path().to_owned());

        let outcome = Err(deployment::Failure::Submit(anyhow::anyhow!(
            "nonce too low"
        )));
        let exit = conclude(&journal, outcome).await;

        assert_exit_code(exit, ExitCode::FAILURE);
        assert!(!dir.path().join("core_testnet2.json").exists());
    }
}
