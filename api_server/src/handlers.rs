use analyzer_core::{json_string_list, validate_json, Address, Network};
use axum::{
    extract::{Path, State},
    response::Json,
};
use job_orchestrator::ValidationReport;
use tracing::{debug, info};

use crate::{types::*, ApiError, AppState};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<SuccessResponse<HealthResponse>> {
    let networks = &state.config.networks;
    let health = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now(),
        analysis_running: state.orchestrator.is_running(),
        explorer_keys: ExplorerKeyStatus {
            ethereum: networks.ethereum.has_api_key(),
            base: networks.base.has_api_key(),
        },
    };

    Json(SuccessResponse::new(health))
}

/// Analyze wallets against a token list
pub async fn analyze_wallets(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let (wallets, tokens) = match (
        json_string_list(&request.wallets),
        json_string_list(&request.tokens),
    ) {
        (Some(wallets), Some(tokens)) => (wallets, tokens),
        _ => return Err(ApiError::BadRequest("Wallets and tokens must be arrays".to_string())),
    };
    let network = match request.network.as_deref() {
        Some(name) => name.parse::<Network>().map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Network::default(),
    };

    info!(
        "📥 Analysis request: {} wallets × {} tokens on {}",
        wallets.len(),
        tokens.len(),
        network
    );

    let report = state.orchestrator.analyze(&wallets, &tokens, network).await?;
    Ok(Json(report.into()))
}

/// Ask a running analysis to stop
pub async fn abort_analysis(State(state): State<AppState>) -> Json<AbortResponse> {
    let aborted = state.orchestrator.abort();
    Json(AbortResponse { success: true, aborted })
}

/// Split an address list into valid and invalid entries
pub async fn validate_addresses(Json(request): Json<ValidateRequest>) -> Json<ValidateResponse> {
    let total = request.addresses.as_array().map(|a| a.len()).unwrap_or(0);
    let report = ValidationReport::new(validate_json(&request.addresses), total);
    debug!("Validated {} addresses ({} invalid)", total, report.summary.invalid_count);

    Json(ValidateResponse {
        success: true,
        valid: report.valid,
        invalid: report.invalid,
        summary: report.summary,
    })
}

/// Orchestrator status, including the last run
pub async fn get_status(
    State(state): State<AppState>,
) -> Json<SuccessResponse<job_orchestrator::OrchestratorStatus>> {
    Json(SuccessResponse::new(state.orchestrator.get_status().await))
}

pub async fn clear_caches(State(state): State<AppState>) -> Json<ActionResponse> {
    state.orchestrator.clear_caches();
    info!("🧹 Metadata and price caches cleared");
    Json(ActionResponse {
        success: true,
        message: "Caches cleared".to_string(),
    })
}

pub async fn cache_stats(
    State(state): State<AppState>,
) -> Json<SuccessResponse<job_orchestrator::CacheReport>> {
    Json(SuccessResponse::new(state.orchestrator.cache_stats()))
}

/// Every metadata tier's raw answer for one token
pub async fn debug_token(
    State(state): State<AppState>,
    Path((network, address)): Path<(String, String)>,
) -> Result<Json<SuccessResponse<token_resolver::TokenDebugReport>>, ApiError> {
    let network = network
        .parse::<Network>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let address = Address::parse(&address).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let report = state.orchestrator.debug_token(&address, network).await;
    Ok(Json(SuccessResponse::new(report)))
}
