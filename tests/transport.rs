use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use snmp2::Pdu;
use tokio::net::UdpSocket;

use snmp_inventory::collector::fleet::collect_fleet;
use snmp_inventory::snmp::client::{CLOSED_TEXT, TIMEOUT_TEXT};
use snmp_inventory::snmp::{FetchError, SnmpClient, SnmpConnector, SnmpVersion, Transport};
use snmp_inventory::{DeviceReport, MetricCatalog};

const SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";
const SYS_SERVICES: &str = "1.3.6.1.2.1.1.7.0";
const UPTIME: &str = "1.3.6.1.2.1.25.1.1.0";
const DATE: &str = "1.3.6.1.2.1.25.1.2.0";

/// How the agent treats one request.
#[derive(Debug, Clone, Copy)]
enum Reply {
    Answer,
    AnswerAfter(Duration),
    Status(i64),
    Silent,
}

/// Loopback SNMPv2c agent. Every answered GET carries the text
/// `value of <oid>` for the requested OID.
struct FakeAgent {
    address: SocketAddr,
    seen: Arc<Mutex<HashMap<String, usize>>>,
}

impl FakeAgent {
    async fn start<F>(behaviour: F) -> Self
    where
        F: Fn(&str, usize) -> Reply + Send + Sync + 'static,
    {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let address = socket.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(HashMap::new()));

        let counts = Arc::clone(&seen);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 65_535];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    continue;
                };
                let Ok(request) = Pdu::from_bytes(&buf[..len]) else {
                    continue;
                };
                let req_id = request.req_id;
                let community = request.community.to_vec();
                let Some((oid, _)) = request.varbinds.clone().next() else {
                    continue;
                };
                let name = oid.to_string();
                let raw_oid = oid.as_bytes().to_vec();

                let attempt = {
                    let mut counts = counts.lock().unwrap();
                    let count = counts.entry(name.clone()).or_insert(0);
                    *count += 1;
                    *count - 1
                };

                let value = format!("value of {}", name);
                let (packet, delay) = match behaviour(&name, attempt) {
                    Reply::Answer => (response(&community, req_id, 0, &raw_oid, value.as_bytes()), Duration::ZERO),
                    Reply::AnswerAfter(delay) => (response(&community, req_id, 0, &raw_oid, value.as_bytes()), delay),
                    Reply::Status(status) => (response(&community, req_id, status, &raw_oid, b""), Duration::ZERO),
                    Reply::Silent => continue,
                };

                let socket = Arc::clone(&socket);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = socket.send_to(&packet, peer).await;
                });
            }
        });

        Self { address, seen }
    }

    fn requests_for(&self, oid: &str) -> usize {
        self.seen.lock().unwrap().get(oid).copied().unwrap_or(0)
    }

    async fn client(&self, timeout: Duration, retries: u32) -> SnmpClient {
        SnmpClient::new(&self.address.to_string(), b"public", SnmpVersion::V2c, timeout, retries)
            .await
            .unwrap()
    }
}

fn tlv(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = body.len();
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xff {
        out.extend([0x81, len as u8]);
    } else {
        out.extend([0x82, (len >> 8) as u8, len as u8]);
    }
    out.extend_from_slice(body);
    out
}

fn integer(n: i64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let mut start = 0;
    while start < 7
        && ((bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0))
    {
        start += 1;
    }
    tlv(0x02, &bytes[start..])
}

/// SNMPv2c GetResponse with one OCTET STRING varbind.
fn response(community: &[u8], req_id: i32, error_status: i64, oid: &[u8], value: &[u8]) -> Vec<u8> {
    let varbind = tlv(0x30, &[tlv(0x06, oid), tlv(0x04, value)].concat());
    let pdu = tlv(
        0xa2,
        &[
            integer(i64::from(req_id)),
            integer(error_status),
            integer(0),
            tlv(0x30, &varbind),
        ]
        .concat(),
    );
    tlv(0x30, &[integer(1), tlv(0x04, community), pdu].concat())
}

fn answered(oid: &str) -> String {
    format!("value of {}", oid)
}

#[tokio::test]
async fn late_reply_does_not_leak_into_later_requests() {
    let agent = FakeAgent::start(|oid, attempt| {
        if oid == SYS_DESCR && attempt == 0 {
            Reply::AnswerAfter(Duration::from_millis(150))
        } else {
            Reply::Answer
        }
    })
    .await;
    let client = agent.client(Duration::from_millis(100), 0).await;

    assert_eq!(
        client.get(SYS_DESCR).await,
        Err(FetchError::Transport(TIMEOUT_TEXT.to_string()))
    );

    for oid in [SYS_SERVICES, UPTIME, DATE] {
        let varbind = client.get(oid).await.unwrap();
        assert_eq!(varbind.oid, oid);
        assert_eq!(varbind.value, answered(oid));
    }
}

#[tokio::test]
async fn retry_after_timeout_gets_the_answer() {
    let agent = FakeAgent::start(|_, attempt| if attempt == 0 { Reply::Silent } else { Reply::Answer }).await;
    let client = agent.client(Duration::from_millis(100), 1).await;

    let varbind = client.get(SYS_DESCR).await.unwrap();

    assert_eq!(varbind.value, answered(SYS_DESCR));
    assert_eq!(agent.requests_for(SYS_DESCR), 2);
}

#[tokio::test]
async fn exhausted_retries_report_timeout() {
    let agent = FakeAgent::start(|_, _| Reply::Silent).await;
    let client = agent.client(Duration::from_millis(50), 2).await;

    let err = client.get(SYS_DESCR).await.unwrap_err();

    assert_eq!(err.to_string(), TIMEOUT_TEXT);
    assert_eq!(agent.requests_for(SYS_DESCR), 3);
}

#[tokio::test]
async fn error_status_becomes_status_name() {
    let agent = FakeAgent::start(|oid, _| if oid == SYS_DESCR { Reply::Status(5) } else { Reply::Status(2) }).await;
    let client = agent.client(Duration::from_millis(500), 0).await;

    let err = client.get(SYS_DESCR).await.unwrap_err();
    assert_eq!(err, FetchError::Status("genErr".to_string()));
    assert_eq!(err.to_string(), "Error: genErr");

    let err = client.get(SYS_SERVICES).await.unwrap_err();
    assert_eq!(err.to_string(), "Error: noSuchName");
}

#[tokio::test]
async fn get_after_close_is_rejected() {
    let agent = FakeAgent::start(|_, _| Reply::Answer).await;
    let client = agent.client(Duration::from_millis(500), 0).await;
    assert!(client.get(SYS_DESCR).await.is_ok());

    client.close().await;

    assert_eq!(
        client.get(SYS_SERVICES).await,
        Err(FetchError::Transport(CLOSED_TEXT.to_string()))
    );
    assert_eq!(agent.requests_for(SYS_SERVICES), 0);
}

#[tokio::test]
async fn concurrent_requests_are_in_flight_together() {
    let delay = Duration::from_millis(200);
    let agent = FakeAgent::start(move |_, _| Reply::AnswerAfter(delay)).await;
    let client = agent.client(Duration::from_secs(2), 0).await;
    let oids: Vec<String> = (1..=6).map(|i| format!("1.3.6.1.2.1.2.2.1.2.{}", i)).collect();

    let started = Instant::now();
    let results = join_all(oids.iter().map(|oid| client.get(oid))).await;
    let elapsed = started.elapsed();

    for (oid, result) in oids.iter().zip(results) {
        assert_eq!(result.unwrap().value, answered(oid));
    }
    // one after another would take at least 6 × 200 ms
    assert!(elapsed < delay * 3, "requests were serialized: {:?}", elapsed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fleet_over_udp_collects_every_device() {
    let agent = FakeAgent::start(|_, _| Reply::Answer).await;
    let connector = SnmpConnector {
        port: 161,
        community: b"public".to_vec(),
        version: SnmpVersion::V2c,
        timeout: Duration::from_secs(1),
        retries: 0,
    };
    let addresses = vec![agent.address.to_string(), agent.address.to_string()];

    let reports = collect_fleet(
        Arc::new(connector),
        Arc::new(MetricCatalog::builtin()),
        &addresses,
        2,
    )
    .await;

    assert_eq!(reports.len(), 2);
    for report in &reports {
        match report {
            DeviceReport::Collected { data, .. } => {
                assert_eq!(data.get("sysDescr").unwrap().value, answered(SYS_DESCR));
                assert_eq!(data.get("hrSystemUptime").unwrap().value, answered(UPTIME));
            }
            other => panic!("expected a record, got {:?}", other),
        }
    }
}
