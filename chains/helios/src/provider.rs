use crate::config::HeliosConfig;
use crate::signer::signer_for;
use crate::utils::gas::{parse_units, wei_to_ether, GasLimits, GasManager};
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{ConfigError, Credential, NetworkError, OperationProvider, WalletState};
use ethers::prelude::*;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const REWARDS_ABI: &str = r#"[
    {"type":"function","name":"pendingRewards","stateMutability":"view","inputs":[{"name":"account","type":"address"}],"outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"compound","stateMutability":"nonpayable","inputs":[],"outputs":[]}
]"#;

const BRIDGE_ABI: &str = r#"[
    {"type":"function","name":"bridge","stateMutability":"payable","inputs":[{"name":"targetChain","type":"string"}],"outputs":[]}
]"#;

/// Stake, compound and bridge against a Helios JSON-RPC endpoint.
pub struct HeliosOperations {
    provider: Provider<Http>,
    chain_id: u64,
    gas: GasManager,
    limits: GasLimits,
    staking: Address,
    rewards: Option<Contract<Provider<Http>>>,
    bridge: Option<Contract<Provider<Http>>>,
    receipt_timeout: Duration,
}

impl HeliosOperations {
    /// Builds the HTTP transport and resolves the chain id (from config, or
    /// by asking the node).
    pub async fn connect(config: &HeliosConfig) -> Result<Self> {
        let url = Url::parse(&config.rpc_url).map_err(|_| ConfigError::InvalidRpcUrl {
            url: config.rpc_url.clone(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        let provider = Provider::new(Http::new_with_client(url, client));

        let chain_id = match config.chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .map_err(|e| NetworkError::InvalidResponse {
                    endpoint: config.rpc_url.clone(),
                    reason: format!("eth_chainId: {}", e),
                })?
                .as_u64(),
        };
        info!("Connected to Helios network, chain id {}", chain_id);

        let client = Arc::new(provider.clone());
        let rewards = match optional_address("rewards_contract", &config.rewards_contract)? {
            Some(address) => Some(Contract::new(
                address,
                parse_abi(REWARDS_ABI)?,
                Arc::clone(&client),
            )),
            None => None,
        };
        let bridge = match optional_address("bridge_contract", &config.bridge_contract)? {
            Some(address) => Some(Contract::new(
                address,
                parse_abi(BRIDGE_ABI)?,
                Arc::clone(&client),
            )),
            None => None,
        };

        Ok(Self {
            gas: GasManager::new(client, config.max_gas_price_gwei)?,
            limits: GasLimits {
                stake: config.gas_limit_stake,
                compound: config.gas_limit_compound,
                bridge: config.gas_limit_bridge,
            },
            staking: parse_address("staking_contract", &config.staking_contract)?,
            receipt_timeout: config.receipt_timeout(),
            provider,
            chain_id,
            rewards,
            bridge,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn pending_rewards(&self, address: Address) -> Result<f64> {
        let Some(contract) = &self.rewards else {
            return Ok(0.0);
        };
        let raw: U256 = contract
            .method("pendingRewards", address)?
            .call()
            .await
            .context("pendingRewards call failed")?;
        wei_to_ether(raw)
    }

    fn compound_calldata(&self) -> Result<Option<(Address, Bytes)>> {
        let Some(contract) = &self.rewards else {
            return Ok(None);
        };
        Ok(Some((contract.address(), contract.encode("compound", ())?)))
    }

    fn bridge_calldata(&self, target_chain: &str) -> Result<Option<(Address, Bytes)>> {
        let Some(contract) = &self.bridge else {
            return Ok(None);
        };
        let data = contract.encode("bridge", target_chain.to_string())?;
        Ok(Some((contract.address(), data)))
    }

    fn transaction(
        &self,
        credential: &Credential,
        to: Address,
        gas_price: U256,
        gas_limit: U256,
    ) -> Result<TransactionRequest> {
        let from = parse_address("wallet", &credential.address)?;
        Ok(TransactionRequest::new()
            .from(from)
            .to(to)
            .gas(gas_limit)
            .gas_price(gas_price))
    }

    /// Signs, sends and waits for the receipt. A reverted receipt is `None`.
    async fn send_and_confirm(
        &self,
        credential: &Credential,
        label: &str,
        tx: TransactionRequest,
    ) -> Result<Option<String>> {
        let wallet = signer_for(credential.secret.expose(), self.chain_id)?;
        let client = SignerMiddleware::new(self.provider.clone(), wallet);

        let pending = client
            .send_transaction(tx, None)
            .await
            .with_context(|| format!("Failed to send {} transaction", label))?;
        let tx_hash = format!("{:?}", pending.tx_hash());
        debug!("{} tx sent for {}: {}", label, credential.id, tx_hash);

        let receipt = match tokio::time::timeout(self.receipt_timeout, pending).await {
            Ok(receipt) => {
                receipt.with_context(|| format!("Receipt lookup failed for {}", tx_hash))?
            }
            Err(_) => {
                return Err(NetworkError::ConfirmationTimeout {
                    tx_hash,
                    timeout_secs: self.receipt_timeout.as_secs(),
                }
                .into())
            }
        };

        let Some(receipt) = receipt else {
            anyhow::bail!("{} transaction {} was dropped", label, tx_hash);
        };

        if receipt.status == Some(U64::from(1)) {
            info!("{} confirmed for {} - TX: {}", label, credential.id, tx_hash);
            Ok(Some(tx_hash))
        } else {
            warn!("{} reverted for {} - TX: {}", label, credential.id, tx_hash);
            Ok(None)
        }
    }
}

#[async_trait]
impl OperationProvider for HeliosOperations {
    async fn get_wallet_state(&self, address: &str) -> Result<WalletState> {
        let address = parse_address("wallet", address)?;
        let balance = self
            .provider
            .get_balance(address, None)
            .await
            .with_context(|| format!("Failed to fetch balance for {:?}", address))?;

        Ok(WalletState {
            balance: wei_to_ether(balance)?,
            pending_rewards: self.pending_rewards(address).await?,
        })
    }

    async fn submit_stake(&self, credential: &Credential, amount: f64) -> Result<Option<String>> {
        let Some(gas_price) = self.gas.price_within_ceiling().await? else {
            return Ok(None);
        };

        let tx = self
            .transaction(credential, self.staking, gas_price, self.limits.stake())?
            .value(parse_units(amount, "ether")?);
        self.send_and_confirm(credential, "Stake", tx).await
    }

    async fn submit_compound(&self, credential: &Credential) -> Result<Option<String>> {
        let Some((rewards, data)) = self.compound_calldata()? else {
            debug!("No rewards contract configured, skipping compound");
            return Ok(None);
        };

        let gas_price = self.gas.current_price().await?;
        let tx = self
            .transaction(credential, rewards, gas_price, self.limits.compound())?
            .data(data);
        self.send_and_confirm(credential, "Compound", tx).await
    }

    async fn submit_bridge(
        &self,
        credential: &Credential,
        amount: f64,
        target_chain: &str,
    ) -> Result<Option<String>> {
        let Some((bridge, data)) = self.bridge_calldata(target_chain)? else {
            debug!("No bridge contract configured, skipping bridge");
            return Ok(None);
        };

        let gas_price = self.gas.current_price().await?;
        let tx = self
            .transaction(credential, bridge, gas_price, self.limits.bridge())?
            .value(parse_units(amount, "ether")?)
            .data(data);
        self.send_and_confirm(credential, "Bridge", tx).await
    }
}

fn parse_abi(json: &str) -> Result<abi::Abi> {
    serde_json::from_str(json).context("Invalid contract ABI")
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    value.trim().parse::<Address>().map_err(|_| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' is not an address", value),
        }
        .into()
    })
}

fn optional_address(field: &str, value: &Option<String>) -> Result<Option<Address>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_address(field, v).map(Some),
    }
}
