pub mod deployment;
pub mod eth;

pub use deployment::Deployer;
