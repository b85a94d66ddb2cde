use anyhow::Result;
use core_logic::{AddressDeriver, WalletError};
use ethers::prelude::*;
use ethers::utils::to_checksum;

/// Derives checksummed EVM addresses with `LocalWallet`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EthersAddressDeriver;

impl AddressDeriver for EthersAddressDeriver {
    fn derive_address(&self, private_key: &str) -> Result<String> {
        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| WalletError::DerivationFailed {
                reason: e.to_string(),
            })?;
        Ok(to_checksum(&wallet.address(), None))
    }
}

/// Signing wallet for a credential on the given chain.
pub fn signer_for(private_key: &str, chain_id: u64) -> Result<LocalWallet> {
    let wallet = private_key
        .parse::<LocalWallet>()
        .map_err(|e| WalletError::DerivationFailed {
            reason: e.to_string(),
        })?;
    Ok(wallet.with_chain_id(chain_id))
}
