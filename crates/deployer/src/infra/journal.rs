//! On-disk journal of confirmed deployments.

use {
    crate::domain::{deployment, eth},
    anyhow::Context as _,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::path::{Path, PathBuf},
    tokio::fs,
};

/// Records confirmed deployments in `<dir>/<network>.json`, a JSON array in
/// chronological order. The journal is advisory: a deployment that is already
/// confirmed on chain does not fail because its record could not be written.
pub struct Journal {
    dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    contract_name: String,
    address: eth::Address,
    transaction_hash: eth::B256,
    network: String,
    deployed_at: DateTime<Utc>,
}

impl Journal {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Appends the deployment to its network's journal file, creating the
    /// directory and the file on first use. Returns the path written to.
    pub async fn record(&self, deployment: &deployment::Deployment) -> anyhow::Result<PathBuf> {
        let path = self.path(&deployment.network);
        let mut records = read(&path).await?;
        records.push(Record {
            contract_name: deployment.artifact.to_string(),
            address: deployment.contract.0,
            transaction_hash: deployment.transaction.0,
            network: deployment.network.to_string(),
            deployed_at: Utc::now(),
        });

        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating journal directory {:?}", self.dir))?;
        let data = serde_json::to_string_pretty(&records)?;
        // Written to the side and renamed into place, which keeps the previous
        // records intact if the process dies mid-write.
        let staged = path.with_extension("json.tmp");
        fs::write(&staged, data)
            .await
            .with_context(|| format!("writing journal {staged:?}"))?;
        fs::rename(&staged, &path)
            .await
            .with_context(|| format!("replacing journal {path:?}"))?;
        Ok(path)
    }

    fn path(&self, network: &eth::NetworkId) -> PathBuf {
        self.dir.join(format!("{network}.json"))
    }
}

async fn read(path: &Path) -> anyhow::Result<Vec<Record>> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err).with_context(|| format!("reading journal {path:?}")),
    };
    serde_json::from_slice(&data).with_context(|| format!("journal {path:?} is not valid JSON"))
}
