//! Types and procedures defined by the Ethereum blockchain.

pub use alloy::primitives::{Address, B256, Bytes, U256};

/// Chain ID as defined by EIP-155.
///
/// https://eips.ethereum.org/EIPS/eip-155
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable name of the target network, e.g. "core_testnet2". This is
/// a label used for reporting and journaling, never interpreted by the
/// deployer itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkId(pub String);

impl NetworkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NetworkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An address of a contract created on the blockchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddress(pub Address);

impl From<Address> for ContractAddress {
    fn from(value: Address) -> Self {
        Self(value)
    }
}

impl From<ContractAddress> for Address {
    fn from(value: ContractAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transaction ID, AKA transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxId(pub B256);

impl From<B256> for TxId {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
