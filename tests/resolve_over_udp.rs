//! End-to-end: orchestrator contents → refresh → snapshot → DNS reply over loopback UDP.

mod common;

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use trust_dns_proto::op::ResponseCode;
use trust_dns_proto::rr::RecordType;

use nomad_dns::metrics::FacadeMetrics;
use nomad_dns::{RefreshLoop, SnapshotCell};

use common::*;

fn refresh_loop(cell: &SnapshotCell, stop: &CancellationToken) -> (RefreshLoop, nomad_dns::StaticOrchestrator) {
    let orchestrator = cluster();
    let refresh = RefreshLoop::new(
        Arc::new(orchestrator.clone()),
        cell.clone(),
        Arc::new(FacadeMetrics),
        Duration::from_secs(3600),
        stop.clone(),
    );
    (refresh, orchestrator)
}

#[tokio::test]
async fn running_job_is_answered_with_node_address() {
    let cell = SnapshotCell::new();
    let (refresh, _) = refresh_loop(&cell, &CancellationToken::new());
    refresh.refresh_once().await.unwrap();
    let server = serve(resolver(cell)).await;

    let reply = query(server, "web.service.nomad.", RecordType::A).await;
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert!(reply.authoritative());
    assert_eq!(
        reply.answers(),
        &[a_record("web.service.nomad.", Ipv4Addr::new(10, 0, 0, 5))]
    );
}

#[tokio::test]
async fn orphaned_allocation_is_left_out_of_the_answer() {
    let cell = SnapshotCell::new();
    let (refresh, _) = refresh_loop(&cell, &CancellationToken::new());
    refresh.refresh_once().await.unwrap();
    let server = serve(resolver(cell)).await;

    let reply = query(server, "api.service.nomad.", RecordType::A).await;
    assert_eq!(
        reply.answers(),
        &[a_record("api.service.nomad.", Ipv4Addr::new(10, 0, 0, 5))]
    );

    // Every allocation of `worker` is on the unknown node.
    let reply = query(server, "worker.service.nomad.", RecordType::A).await;
    assert_eq!(reply.response_code(), ResponseCode::NXDomain);
    assert!(reply.answers().is_empty());
}

#[tokio::test]
async fn negative_outcomes_are_nxdomain_with_the_question_echoed() {
    let cell = SnapshotCell::new();
    let (refresh, _) = refresh_loop(&cell, &CancellationToken::new());
    refresh.refresh_once().await.unwrap();
    let server = serve(resolver(cell)).await;

    for (name, record_type) in [
        ("unknownjob.service.nomad.", RecordType::A),
        ("web.other.domain.", RecordType::A),
        ("evilservice.nomad.", RecordType::A),
        ("web.service.nomad.", RecordType::AAAA),
        ("web.service.nomad.", RecordType::TXT),
    ] {
        let reply = query(server, name, record_type).await;
        assert_eq!(reply.response_code(), ResponseCode::NXDomain, "{name} {record_type}");
        assert!(reply.answers().is_empty(), "{name} {record_type}");
        assert_eq!(reply.queries().len(), 1);
        assert_eq!(reply.queries()[0].query_type(), record_type);
    }
}

#[tokio::test]
async fn answers_survive_an_orchestrator_outage_and_follow_recovery() {
    let cell = SnapshotCell::new();
    let (refresh, orchestrator) = refresh_loop(&cell, &CancellationToken::new());
    refresh.refresh_once().await.unwrap();
    let server = serve(resolver(cell.clone())).await;

    orchestrator.fail("nomad down").await;
    assert!(refresh.refresh_once().await.is_err());
    let reply = query(server, "web.service.nomad.", RecordType::A).await;
    assert_eq!(
        reply.answers(),
        &[a_record("web.service.nomad.", Ipv4Addr::new(10, 0, 0, 5))]
    );

    orchestrator.recover().await;
    orchestrator.remove_job("web").await;
    refresh.refresh_once().await.unwrap();
    let reply = query(server, "web.service.nomad.", RecordType::A).await;
    assert_eq!(reply.response_code(), ResponseCode::NXDomain);
}

#[tokio::test]
async fn queries_before_the_first_refresh_are_empty() {
    let server = serve(resolver(SnapshotCell::new())).await;
    let reply = query(server, "web.service.nomad.", RecordType::A).await;
    assert_eq!(reply.response_code(), ResponseCode::NXDomain);
    assert!(reply.answers().is_empty());
}
