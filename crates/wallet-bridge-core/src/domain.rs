use serde::{Deserialize, Serialize};

pub const JSONRPC_VERSION: &str = "2.0";

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<String>,
    pub id: RequestId,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<String>, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default)]
    pub id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn success(id: RequestId, result: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: Some(result.into()),
            id,
            error: None,
        }
    }

    pub fn failure(id: RequestId, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: None,
            id,
            error: Some(RpcErrorObject {
                message: message.into(),
                code,
            }),
        }
    }

    /// Error object with an empty message counts as no error at all.
    pub fn effective_error(&self) -> Option<&RpcErrorObject> {
        self.error.as_ref().filter(|e| !e.message.is_empty())
    }

    pub fn effective_result(&self) -> Option<&str> {
        self.result.as_deref().filter(|r| !r.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectionResult {
    pub success: bool,
    pub address: Option<String>,
    pub chain_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub success: bool,
    pub balance: String,
    pub formatted_balance: String,
    pub currency_symbol: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub to: String,
    pub value: String,
    pub data: String,
}

/// Network parameters read from the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    pub network_name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub currency_symbol: String,
    pub is_testnet: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_name: "sepolia".to_owned(),
            chain_id: 11_155_111,
            rpc_url: "https://sepolia.infura.io/v3/YOUR_PROJECT_ID".to_owned(),
            currency_symbol: "SepoliaETH".to_owned(),
            is_testnet: true,
        }
    }
}

impl NetworkConfig {
    pub fn hex_chain_id(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    pub fn display_name(&self) -> String {
        format!("{} ({})", self.network_name, self.currency_symbol)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub address: Option<String>,
    pub chain_id: Option<String>,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}
