//! Compiled-artifact lookup over a build tool's output directory.
//!
//! The build writes one JSON file per contract in nested per-source folders
//! (e.g. `artifacts/contracts/Market.sol/PredictionMarket.json`), with
//! `<Name>.dbg.json` siblings pointing at debug output. An artifact file
//! carries the contract ABI and its creation bytecode; the bytecode is the
//! empty `0x` string for abstract or not yet compiled contracts.

use {
    crate::domain::{deployment, eth},
    anyhow::{Context as _, anyhow, bail},
    serde::Deserialize,
    std::path::{Path, PathBuf},
    tokio::fs,
};

/// Store of compiled contract artifacts under a local directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

/// The subset of the artifact file format the deployer needs.
#[derive(Debug, Deserialize)]
struct File {
    abi: alloy_json_abi::JsonAbi,
    bytecode: eth::Bytes,
}

impl Store {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait::async_trait]
impl deployment::Artifacts for Store {
    async fn resolve(
        &self,
        name: &deployment::ArtifactName,
    ) -> anyhow::Result<deployment::Artifact> {
        let mut matches = find(&self.dir, &format!("{name}.json"))
            .await
            .with_context(|| format!("scanning artifacts directory {:?}", self.dir))?;
        let path = match matches.len() {
            0 => bail!("no artifact named {name} under {:?}", self.dir),
            1 => matches.remove(0),
            _ => bail!("artifact name {name} is ambiguous, it matches {matches:?}"),
        };
        let data = fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {path:?}"))?;
        let file: File =
            serde_json::from_str(&data).with_context(|| format!("malformed artifact {path:?}"))?;
        if file.bytecode.is_empty() {
            return Err(anyhow!(
                "artifact {name} has no creation bytecode, the contract is abstract or was not \
                 compiled"
            ));
        }
        Ok(deployment::Artifact {
            name: name.clone(),
            abi: file.abi,
            bytecode: file.bytecode,
        })
    }
}

/// Walks the directory tree collecting every file with the exact name. The
/// caller needs all matches to reject ambiguous names, and exact matching is
/// also what keeps `<Name>.dbg.json` debug output from matching
/// `<Name>.json`.
async fn find(root: &Path, file_name: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut pending = vec![root.to_owned()];
    let mut found = Vec::new();
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("reading directory {dir:?}"))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("reading directory {dir:?}"))?
        {
            let path = entry.path();
            if entry
                .file_type()
                .await
                .with_context(|| format!("inspecting {path:?}"))?
                .is_dir()
            {
                pending.push(path);
            } else if path.file_name().and_then(|name| name.to_str()) == Some(file_name) {
                found.push(path);
            }
        }
    }
    Ok(found)
}
