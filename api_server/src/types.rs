use analyzer_core::{
    Address, AnalysisCounts, AnalysisReport, Network, ValidationSummary, WalletOutcome,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard API error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_wallets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_tokens: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            invalid_wallets: None,
            invalid_tokens: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
    pub analysis_running: bool,
    pub explorer_keys: ExplorerKeyStatus,
}

/// Whether each network has an explorer key; never the key itself
#[derive(Debug, Serialize)]
pub struct ExplorerKeyStatus {
    pub ethereum: bool,
    pub base: bool,
}

/// Body of `POST /api/analyze`; lists stay untyped so non-arrays can be rejected
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub wallets: Value,
    #[serde(default)]
    pub tokens: Value,
    #[serde(default)]
    pub network: Option<String>,
}

/// Body of `POST /api/validate`
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub addresses: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSize {
    pub wallet_count: usize,
    pub token_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    pub all_tokens: Vec<WalletOutcome>,
    pub some_tokens: Vec<WalletOutcome>,
    pub no_tokens: Vec<WalletOutcome>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub network: Network,
    pub analysis: AnalysisSize,
    pub results: AnalysisResults,
    pub counts: AnalysisCounts,
}

impl From<AnalysisReport> for AnalyzeResponse {
    fn from(report: AnalysisReport) -> Self {
        Self {
            success: true,
            network: report.network,
            analysis: AnalysisSize {
                wallet_count: report.wallet_count,
                token_count: report.token_count,
            },
            results: AnalysisResults {
                all_tokens: report.all_tokens,
                some_tokens: report.some_tokens,
                no_tokens: report.no_tokens,
            },
            counts: report.counts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub valid: Vec<Address>,
    pub invalid: Vec<String>,
    pub summary: ValidationSummary,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AbortResponse {
    pub success: bool,
    pub aborted: bool,
}
