//! Shared test infrastructure for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use trust_dns_proto::op::{Message, MessageType, OpCode, Query};
use trust_dns_proto::rr::{Name, RData, Record, RecordType};
use trust_dns_proto::serialize::binary::BinEncodable;

use nomad_dns::metrics::FacadeMetrics;
use nomad_dns::orchestrator::{AllocationDescriptor, NodeDescriptor};
use nomad_dns::{DomainSuffix, Resolver, SnapshotCell, StaticOrchestrator};

// --- Constants ---

pub const SUFFIX: &str = ".service.nomad";
pub const TTL: u32 = 60;

// --- Cluster fixtures ---

/// `web` runs once on `n1` (10.0.0.5); `api` runs on `n1` and on `n2`, which is not registered.
pub fn cluster() -> StaticOrchestrator {
    StaticOrchestrator::new(
        vec![NodeDescriptor::new("n1", "10.0.0.5")],
        BTreeMap::from([
            (
                "web".to_string(),
                vec![
                    AllocationDescriptor::new("n1", "running"),
                    AllocationDescriptor::new("n1", "failed"),
                ],
            ),
            (
                "api".to_string(),
                vec![
                    AllocationDescriptor::new("n1", "running"),
                    AllocationDescriptor::new("n2", "running"),
                ],
            ),
            (
                "worker".to_string(),
                vec![AllocationDescriptor::new("n2", "running")],
            ),
        ]),
    )
}

pub fn resolver(cell: SnapshotCell) -> Resolver {
    Resolver::new(
        cell,
        DomainSuffix::parse(SUFFIX).unwrap(),
        TTL,
        Arc::new(FacadeMetrics),
    )
}

pub fn a_record(name: &str, ip: Ipv4Addr) -> Record {
    Record::from_rdata(Name::from_str(name).unwrap(), TTL, RData::A(ip))
}

// --- DNS over loopback UDP ---

/// Serve `resolver` on an ephemeral loopback port, returning the address to query.
pub async fn serve(resolver: Resolver) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let server = nomad_dns::dns::with_socket(resolver, socket);
    tokio::spawn(server.block_until_done());
    addr
}

/// Send one query and wait for its reply.
pub async fn query(server: SocketAddr, name: &str, record_type: RecordType) -> Message {
    let mut request = Message::new();
    request
        .set_id(0x4e44)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(Name::from_str(name).unwrap(), record_type));

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket
        .send_to(&request.to_bytes().unwrap(), server)
        .await
        .unwrap();

    let mut buf = vec![0u8; 4096];
    let (len, _) = tokio::time::timeout(Duration::from_secs(5), socket.recv_from(&mut buf))
        .await
        .expect("no reply within 5s")
        .unwrap();
    let reply = Message::from_vec(&buf[..len]).expect("failed to parse DNS reply");
    assert_eq!(reply.id(), 0x4e44);
    assert_eq!(reply.message_type(), MessageType::Response);
    reply
}
