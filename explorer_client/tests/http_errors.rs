use analyzer_core::{Address, BalanceProvider, Network, SourceError};
use config_manager::SystemConfig;
use explorer_client::{ExplorerClient, ExplorerError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const WALLET: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA1111";
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

    format!("http://{}/api", addr)
}

fn client(api_url: String) -> ExplorerClient {
    let mut config = SystemConfig::default();
    config.networks.ethereum.api_key = "test-key".to_string();
    config.networks.ethereum.api_url = api_url;
    ExplorerClient::new(&config).unwrap()
}

fn addr(s: &str) -> Address {
    Address::parse(s).unwrap()
}

#[tokio::test]
async fn test_server_error_becomes_status_error() {
    let explorer = client(serve("500 Internal Server Error", "upstream down").await);

    let err = explorer
        .get_token_balance(&addr(WALLET), &addr(USDT), Network::Ethereum)
        .await
        .unwrap_err();
    assert!(matches!(err, ExplorerError::ApiError { status: 500, .. }));

    let err = explorer
        .token_balance(&addr(WALLET), &addr(USDT), Network::Ethereum)
        .await
        .unwrap_err();
    match err {
        SourceError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream down");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_notok_body_is_rejected() {
    let explorer = client(
        serve(
            "200 OK",
            r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#,
        )
        .await,
    );

    let err = explorer
        .token_balance(&addr(WALLET), &addr(USDT), Network::Ethereum)
        .await
        .unwrap_err();
    assert_eq!(err, SourceError::Api("Max rate limit reached".to_string()));
}

#[tokio::test]
async fn test_non_integer_balance_is_a_decode_error() {
    let explorer = client(serve("200 OK", r#"{"status":"1","message":"OK","result":"abc"}"#).await);

    let err = explorer
        .token_balance(&addr(WALLET), &addr(USDT), Network::Ethereum)
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn test_integer_balance_is_parsed() {
    let explorer = client(
        serve(
            "200 OK",
            r#"{"status":"1","message":"OK","result":"1245670000"}"#,
        )
        .await,
    );

    let balance = explorer
        .token_balance(&addr(WALLET), &addr(USDT), Network::Ethereum)
        .await
        .unwrap();
    assert!(balance.has_balance);
    assert_eq!(balance.raw_balance, "1245670000");
}
