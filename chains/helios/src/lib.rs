//! Helios chain shim for the core-logic batch engine: TOML/env config, the
//! ethers-backed operation provider and address derivation.

pub mod config;
pub mod provider;
pub mod signer;
pub mod utils;

pub use config::HeliosConfig;
pub use provider::HeliosOperations;
pub use signer::EthersAddressDeriver;
