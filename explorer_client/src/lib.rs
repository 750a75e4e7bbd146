//! Etherscan-compatible block explorer client.
//!
//! Covers the two endpoints the analyzer needs: the ERC-20 token balance of a
//! wallet (`module=account&action=tokenbalance`) and read-only contract calls
//! through the JSON-RPC proxy (`module=proxy&action=eth_call`).

use analyzer_core::models::DEFAULT_DECIMALS;
use analyzer_core::{Address, BalanceProvider, BalanceResult, ContractReader, Network, SourceError};
use async_trait::async_trait;
use config_manager::{NetworksConfig, SystemConfig, BASESCAN_API_KEY_VAR, ETHERSCAN_API_KEY_VAR};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Explorer rejected request: {0}")]
    NotOk(String),
    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("{0} is required")]
    MissingApiKey(&'static str),
}

impl From<ExplorerError> for SourceError {
    fn from(err: ExplorerError) -> Self {
        match err {
            ExplorerError::HttpError(e) => SourceError::Http(e.to_string()),
            ExplorerError::JsonError(e) => SourceError::Json(e.to_string()),
            ExplorerError::ApiError { status, message } => SourceError::Status { status, message },
            ExplorerError::NotOk(detail) => SourceError::Api(detail),
            ExplorerError::RpcError { code, message } => {
                SourceError::Api(format!("{} (code {})", message, code))
            }
            ExplorerError::UnexpectedResponse(detail) => SourceError::NoData(detail),
            missing @ ExplorerError::MissingApiKey(_) => SourceError::Api(missing.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Apply the explorer's error conventions to a response body and return its
/// `result` field as a string.
///
/// A body is rejected when it carries a JSON-RPC `error` object, or when
/// `message == "NOTOK"` with any `status` other than `"1"`.
pub fn interpret_response(body: &str) -> Result<String, ExplorerError> {
    let response: ExplorerResponse = serde_json::from_str(body)?;

    if let Some(rpc_error) = response.error {
        return Err(ExplorerError::RpcError {
            code: rpc_error.code,
            message: rpc_error.message,
        });
    }

    let not_ok =
        response.status.as_deref() != Some("1") && response.message.as_deref() == Some("NOTOK");
    if not_ok {
        let detail = match response.result {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => "NOTOK".to_string(),
        };
        return Err(ExplorerError::NotOk(detail));
    }

    match response.result {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(ExplorerError::UnexpectedResponse(format!(
            "result is not a string: {}",
            other
        ))),
        None => Err(ExplorerError::UnexpectedResponse("missing result".to_string())),
    }
}

/// Query pairs for the token balance endpoint, without the API key
pub fn token_balance_query(wallet: &Address, token: &Address) -> Vec<(&'static str, String)> {
    vec![
        ("module", "account".to_string()),
        ("action", "tokenbalance".to_string()),
        ("contractaddress", token.to_string()),
        ("address", wallet.to_string()),
        ("tag", "latest".to_string()),
    ]
}

/// Query pairs for a proxied `eth_call`, without the API key
pub fn eth_call_query(contract: &Address, data: &str) -> Vec<(&'static str, String)> {
    vec![
        ("module", "proxy".to_string()),
        ("action", "eth_call".to_string()),
        ("to", contract.to_string()),
        ("data", data.to_string()),
        ("tag", "latest".to_string()),
    ]
}

fn api_key_var(network: Network) -> &'static str {
    match network {
        Network::Ethereum => ETHERSCAN_API_KEY_VAR,
        Network::Base => BASESCAN_API_KEY_VAR,
    }
}

/// Explorer client for every configured network
pub struct ExplorerClient {
    client: Client,
    networks: NetworksConfig,
}

impl ExplorerClient {
    /// Fails when the primary network has no API key
    pub fn new(config: &SystemConfig) -> Result<Self, ExplorerError> {
        if !config.networks.ethereum.has_api_key() {
            error!("❌ {} is not set, explorer client cannot start", ETHERSCAN_API_KEY_VAR);
            return Err(ExplorerError::MissingApiKey(ETHERSCAN_API_KEY_VAR));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.explorer.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            networks: config.networks.clone(),
        })
    }

    async fn make_api_call(
        &self,
        network: Network,
        params: &[(&'static str, String)],
    ) -> Result<String, ExplorerError> {
        let network_config = network.config(&self.networks);
        if !network_config.has_api_key() {
            return Err(ExplorerError::MissingApiKey(api_key_var(network)));
        }

        debug!(
            "Explorer call on {}: {:?}",
            network_config.name,
            params.iter().take(2).map(|(_, v)| v.as_str()).collect::<Vec<_>>()
        );

        let response = self
            .client
            .get(&network_config.api_url)
            .query(params)
            .query(&[("apikey", network_config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("⚠️ {} explorer returned HTTP {}", network_config.name, status);
            return Err(ExplorerError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        interpret_response(&body)
    }

    /// Raw integer balance of `token` held by `wallet`
    pub async fn get_token_balance(
        &self,
        wallet: &Address,
        token: &Address,
        network: Network,
    ) -> Result<String, ExplorerError> {
        let raw = self.make_api_call(network, &token_balance_query(wallet, token)).await?;
        debug!("Balance of {} in {}: {}", token.short(), wallet.short(), raw);
        Ok(raw)
    }

    /// Hex result of a read-only call with the given calldata
    pub async fn eth_call(
        &self,
        contract: &Address,
        data: &str,
        network: Network,
    ) -> Result<String, ExplorerError> {
        self.make_api_call(network, &eth_call_query(contract, data)).await
    }
}

#[async_trait]
impl BalanceProvider for ExplorerClient {
    async fn token_balance(
        &self,
        wallet: &Address,
        token: &Address,
        network: Network,
    ) -> Result<BalanceResult, SourceError> {
        let raw = self.get_token_balance(wallet, token, network).await?;
        BalanceResult::parse(&raw, DEFAULT_DECIMALS)
    }
}

#[async_trait]
impl ContractReader for ExplorerClient {
    async fn call(
        &self,
        contract: &Address,
        selector: &str,
        network: Network,
    ) -> Result<String, SourceError> {
        Ok(self.eth_call(contract, selector, network).await?)
    }
}
