mod common;

use analyzer_core::Network;
use common::*;
use job_orchestrator::{JobStatus, NoDelayScheduler, OrchestratorError};
use std::sync::Arc;

#[tokio::test]
async fn concurrent_analysis_is_rejected() {
    let balances = Arc::new(GatedBalances::new());
    let started = balances.started.clone();
    let release = balances.release.clone();
    let orchestrator = Arc::new(orchestrator(
        balances,
        Arc::new(FakePrices::default()),
        Arc::new(NoDelayScheduler),
    ));

    let runner = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move {
            orchestrator
                .analyze(&strings(&[WALLET_A]), &strings(&[USDT]), Network::Ethereum)
                .await
        }
    });

    started.notified().await;
    assert!(orchestrator.is_running());
    let running = orchestrator.get_status().await.last_job.unwrap();
    assert_eq!(running.status, JobStatus::Running);
    assert!(running.completed_at.is_none());

    let second = orchestrator
        .analyze(&strings(&[WALLET_B]), &strings(&[USDT]), Network::Ethereum)
        .await;
    assert!(matches!(second, Err(OrchestratorError::AnalysisInProgress)));

    release.notify_one();
    let first = runner.await.unwrap().unwrap();
    assert_eq!(first.no_tokens.len(), 1);
    assert!(!orchestrator.is_running());

    let status = orchestrator.get_status().await;
    assert_eq!(status.last_job.unwrap().status, JobStatus::Completed);
}

#[tokio::test]
async fn abort_stops_before_the_next_wallet() {
    let balances = Arc::new(GatedBalances::new());
    let started = balances.started.clone();
    let release = balances.release.clone();
    let orchestrator = Arc::new(orchestrator(
        balances,
        Arc::new(FakePrices::default()),
        Arc::new(NoDelayScheduler),
    ));

    let runner = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move {
            orchestrator
                .analyze(&strings(&[WALLET_A, WALLET_B]), &strings(&[USDT]), Network::Ethereum)
                .await
        }
    });

    started.notified().await;
    assert!(orchestrator.abort());
    release.notify_one();

    let result = runner.await.unwrap();
    assert!(matches!(result, Err(OrchestratorError::Aborted { processed: 1 })));
    assert!(!orchestrator.is_running());

    let status = orchestrator.get_status().await;
    assert_eq!(status.last_job.unwrap().status, JobStatus::Cancelled);
}

#[tokio::test]
async fn abort_without_a_run_is_a_no_op() {
    let orchestrator = orchestrator(
        Arc::new(FakeBalances::default()),
        Arc::new(FakePrices::default()),
        Arc::new(NoDelayScheduler),
    );

    assert!(!orchestrator.abort());
    let report = orchestrator
        .analyze(&strings(&[WALLET_A]), &strings(&[USDT]), Network::Ethereum)
        .await
        .unwrap();
    assert_eq!(report.no_tokens.len(), 1);
}
