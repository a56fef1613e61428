use {
    crate::{
        domain::{deployment, eth},
        infra::blockchain,
    },
    alloy::signers::local::PrivateKeySigner,
    std::path::PathBuf,
    url::Url,
};

pub mod file;

pub use file::load;

/// Configuration of infrastructural components.
#[derive(Debug)]
pub struct Config {
    pub network: eth::NetworkId,
    pub chain_id: Option<eth::ChainId>,
    pub node_url: Url,
    pub signer: PrivateKeySigner,
    pub artifacts_dir: PathBuf,
    pub journal_dir: PathBuf,
    pub submission: blockchain::Submission,
    pub request: deployment::Request,
}
