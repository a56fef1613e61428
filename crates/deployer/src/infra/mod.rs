pub mod artifacts;
pub mod blockchain;
pub mod cli;
pub mod config;
pub mod journal;
pub mod observe;

pub use {blockchain::Ethereum, config::Config};
