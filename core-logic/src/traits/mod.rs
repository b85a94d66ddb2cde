use crate::batch::Credential;
use anyhow::Result;
use async_trait::async_trait;

/// Balance snapshot returned by [`OperationProvider::get_wallet_state`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WalletState {
    pub balance: f64,
    pub pending_rewards: f64,
}

/// Remote operations the batch engine drives for each wallet.
///
/// Submissions return `Ok(None)` when the provider declines to send a
/// transaction (gas ceiling, missing contract, reverted receipt). `Err` is
/// reserved for transport and confirmation failures; the runner retries
/// those according to its [`RetryConfig`](crate::RetryConfig).
#[async_trait]
pub trait OperationProvider: Send + Sync {
    async fn get_wallet_state(&self, address: &str) -> Result<WalletState>;

    async fn submit_stake(&self, credential: &Credential, amount: f64) -> Result<Option<String>>;

    async fn submit_compound(&self, credential: &Credential) -> Result<Option<String>>;

    /// Bridging is optional; providers without a bridge decline.
    async fn submit_bridge(
        &self,
        _credential: &Credential,
        _amount: f64,
        _target_chain: &str,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Turns a normalised private key into the address it controls.
pub trait AddressDeriver: Send + Sync {
    fn derive_address(&self, private_key: &str) -> Result<String>;
}
