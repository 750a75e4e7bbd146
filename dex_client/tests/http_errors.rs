use analyzer_core::{Address, Network, PriceProvider, SourceError};
use config_manager::{DexScreenerConfig, SystemConfig};
use dex_client::{DexScreenerClient, DexScreenerError, PairFetcher, PriceSource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

/// Answers every request with the same status line and body
async fn serve(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}

fn config(api_base_url: String) -> DexScreenerConfig {
    DexScreenerConfig {
        api_base_url,
        request_timeout_seconds: 5,
        price_cache_ttl_seconds: 300,
        enabled: true,
    }
}

fn usdt() -> Address {
    Address::parse(USDT).unwrap()
}

#[tokio::test]
async fn test_429_is_rate_limit_exceeded() {
    let base_url = serve("429 Too Many Requests", r#"{"error":"slow down"}"#).await;

    let client = DexScreenerClient::new(config(base_url.clone())).unwrap();
    let err = client.get_token_pairs(&usdt()).await.unwrap_err();
    assert!(matches!(err, DexScreenerError::RateLimitExceeded));

    let prices =
        PriceSource::from_config(&config(base_url), &SystemConfig::default().networks).unwrap();
    let err = prices.resolve_price(&usdt(), Network::Ethereum).await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 429, .. }));
    assert_eq!(prices.cache_stats().size, 0);
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let base_url = serve("503 Service Unavailable", "maintenance").await;

    let client = DexScreenerClient::new(config(base_url)).unwrap();
    match client.get_token_pairs(&usdt()).await {
        Err(DexScreenerError::ApiError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("unexpected result: {:?}", other.map(|pairs| pairs.len())),
    }
}

#[tokio::test]
async fn test_null_pairs_is_an_empty_list() {
    let base_url = serve("200 OK", r#"{"schemaVersion":"1.0.0","pairs":null}"#).await;

    let client = DexScreenerClient::new(config(base_url.clone())).unwrap();
    assert!(client.get_token_pairs(&usdt()).await.unwrap().is_empty());

    let prices =
        PriceSource::from_config(&config(base_url), &SystemConfig::default().networks).unwrap();
    let err = prices.resolve_price(&usdt(), Network::Ethereum).await.unwrap_err();
    assert_eq!(err, SourceError::NoData("No trading pairs found".to_string()));
}
