use analyzer_core::InputError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use config_manager::{ConfigurationError, SystemConfig};
use job_orchestrator::{AnalysisOrchestrator, OrchestratorError};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

mod handlers;
mod types;

use handlers::*;
use types::*;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: SystemConfig,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub started_at: Instant,
}

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),
    #[error("{0}")]
    Orchestrator(#[from] OrchestratorError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Orchestrator(OrchestratorError::Input(InputError::InvalidAddresses {
                invalid_wallets,
                invalid_tokens,
            })) => {
                let mut body = ErrorResponse::new("Invalid addresses found");
                body.invalid_wallets = Some(invalid_wallets);
                body.invalid_tokens = Some(invalid_tokens);
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::Orchestrator(OrchestratorError::Input(e)) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string()))
            }
            ApiError::Orchestrator(OrchestratorError::AnalysisInProgress) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("Analysis already in progress")
                    .with_message("Wait for the current analysis to finish or abort it"),
            ),
            ApiError::Orchestrator(e @ OrchestratorError::Aborted { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("Analysis aborted").with_message(e.to_string()),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, ErrorResponse::new(message)),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal server error").with_message(other.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,api_server=debug".into()),
        )
        .init();

    info!("Starting Wallet Analyzer API Server...");

    // Load configuration
    let config = SystemConfig::load()?;
    info!("Configuration loaded successfully");
    info!(
        "Explorer keys: ethereum={} base={}",
        config.networks.ethereum.has_api_key(),
        config.networks.base.has_api_key()
    );

    let orchestrator = Arc::new(AnalysisOrchestrator::new(config.clone())?);

    let app_state = AppState {
        config: config.clone(),
        orchestrator,
        started_at: Instant::now(),
    };

    let app = create_router(app_state);

    info!("🎯 API Server ready");
    info!("📋 Available endpoints:");
    info!("   • POST /api/analyze - Analyze wallets for token holdings");
    info!("   • POST /api/analyze/abort - Abort the running analysis");
    info!("   • POST /api/validate - Validate addresses");
    info!("   • GET /api/status - Analysis status");
    info!("   • POST /api/cache/clear - Clear metadata and price caches");
    info!("   • GET /api/cache/stats - Cache statistics");
    info!("   • GET /api/tokens/:network/:address/debug - Metadata tier diagnostics");
    info!("   • GET /health - Health check");

    // Bind and serve
    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze_wallets))
        .route("/api/analyze/abort", post(abort_analysis))
        .route("/api/validate", post(validate_addresses))
        .route("/api/status", get(get_status))
        .route("/api/cache/clear", post(clear_caches))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/tokens/:network/:address/debug", get(debug_token))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()).into_inner())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_core::{
        Address, BalanceProvider, BalanceResult, CacheStats, ContractReader, ManualClock, Network,
        PriceProvider, PriceQuote, SourceError,
    };
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use job_orchestrator::NoDelayScheduler;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
    const WALLET: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA1111";

    struct OneUsdtHolder;

    #[async_trait]
    impl BalanceProvider for OneUsdtHolder {
        async fn token_balance(
            &self,
            _wallet: &Address,
            token: &Address,
            _network: Network,
        ) -> Result<BalanceResult, SourceError> {
            if token.as_str() == USDT.to_lowercase() {
                BalanceResult::parse("2500000", 18)
            } else {
                BalanceResult::parse("0", 18)
            }
        }
    }

    struct Reverting;

    #[async_trait]
    impl ContractReader for Reverting {
        async fn call(
            &self,
            _contract: &Address,
            _selector: &str,
            _network: Network,
        ) -> Result<String, SourceError> {
            Err(SourceError::Api("execution reverted".to_string()))
        }
    }

    struct DollarPrices;

    #[async_trait]
    impl PriceProvider for DollarPrices {
        async fn resolve_price(
            &self,
            token: &Address,
            network: Network,
        ) -> Result<PriceQuote, SourceError> {
            Ok(PriceQuote {
                address: token.clone(),
                symbol: Some("USDT".to_string()),
                name: Some("Tether USD".to_string()),
                price_usd: Some(1.0),
                price_change_24h: None,
                volume_24h: Some(0.0),
                dex_id: Some("uniswap".to_string()),
                pair_address: None,
                network,
                fetched_at: Utc::now(),
            })
        }

        fn clear_cache(&self) {}

        fn cache_stats(&self) -> CacheStats {
            CacheStats {
                size: 0,
                entries: Vec::new(),
            }
        }
    }

    fn test_router() -> Router {
        let mut config = SystemConfig::default();
        config.networks.ethereum.api_key = "test-key".to_string();
        let orchestrator = AnalysisOrchestrator::with_components(
            config.clone(),
            Arc::new(OneUsdtHolder),
            Arc::new(Reverting),
            Arc::new(DollarPrices),
            Arc::new(NoDelayScheduler),
            Arc::new(ManualClock::new(Utc::now())),
        );
        create_router(AppState {
            config,
            orchestrator: Arc::new(orchestrator),
            started_at: Instant::now(),
        })
    }

    async fn send(
        router: Router,
        method: &str,
        uri: &str,
        body: Option<Value>) -> (StatusCode, Value,
    ) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_reports_key_presence_only() {
        let (status, body) = send(test_router(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["explorerKeys"]["ethereum"], true);
        assert_eq!(body["data"]["explorerKeys"]["base"], false);
        assert!(!body.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn test_analyze_returns_categorized_wallets() {
        let request = json!({ "wallets": [WALLET], "tokens": [USDT] });
        let (status, body) = send(test_router(), "POST", "/api/analyze", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["network"], "ethereum");
        assert_eq!(body["analysis"]["walletCount"], 1);
        assert_eq!(body["counts"]["allTokens"], 1);
        let holding = &body["results"]["allTokens"][0]["foundTokens"][0];
        assert_eq!(holding["balance"], "2.5");
        assert_eq!(holding["usdValue"], 2.5);
    }

    #[tokio::test]
    async fn test_analyze_rejects_invalid_addresses() {
        let request = json!({ "wallets": ["0x123"], "tokens": [USDT, "nope"], "network": "base" });
        let (status, body) = send(test_router(), "POST", "/api/analyze", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["invalidWallets"], json!(["0x123"]));
        assert_eq!(body["invalidTokens"], json!(["nope"]));
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_arrays_and_unknown_networks() {
        let request = json!({ "wallets": WALLET, "tokens": [USDT] });
        let (status, body) = send(test_router(), "POST", "/api/analyze", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("must be arrays"));

        let request = json!({ "wallets": [WALLET], "tokens": [USDT], "network": "solana" });
        let (status, _) = send(test_router(), "POST", "/api/analyze", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let request = json!({ "addresses": [USDT, "bad", 42] });
        let (status, body) = send(test_router(), "POST", "/api/validate", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["total"], 3);
        assert_eq!(body["summary"]["validCount"], 1);
        assert_eq!(body["summary"]["invalidCount"], 2);

        let (_, body) = send(
            test_router(),
            "POST",
            "/api/validate",
            Some(json!({ "addresses": "x" })),
        )
        .await;
        assert_eq!(body["valid"], json!([]));
        assert_eq!(body["invalid"], json!([]));
        assert_eq!(body["summary"]["total"], 0);
    }

    #[tokio::test]
    async fn test_abort_without_run_and_cache_endpoints() {
        let router = test_router();
        let (status, body) = send(router.clone(), "POST", "/api/analyze/abort", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["aborted"], false);

        let (status, body) = send(router.clone(), "POST", "/api/cache/clear", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send(router, "GET", "/api/cache/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["metadata"]["size"], 0);
    }

    #[tokio::test]
    async fn test_debug_token_endpoint() {
        let uri = format!("/api/tokens/ethereum/{}/debug", USDT);
        let (status, body) = send(test_router(), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["curated"]["symbol"], "USDT");

        let (status, _) = send(test_router(), "GET", "/api/tokens/ethereum/0x12/debug", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
