use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snmp2::AsyncSession;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use tokio::time::{Duration, timeout};

use super::oid::parse_oid;
use super::transport::{Connector, FetchError, Transport, Varbind};
use super::value::{error_status_name, render};

pub const TIMEOUT_TEXT: &str = "No SNMP response received before timeout";
pub const CLOSED_TEXT: &str = "SNMP session is closed";

/// Сколько простаивающих сессий клиент держит открытыми
pub const MAX_IDLE_SESSIONS: usize = 8;

/// Шаг между стартовыми request-id соседних сессий
const REQ_ID_STRIDE: i32 = 1 << 20;

/// Версии протокола с community-аутентификацией
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnmpVersion {
    V1,
    #[default]
    V2c,
}

/// Асинхронный SNMP клиент для одного агента.
///
/// `AsyncSession::get` требует `&mut self`, поэтому каждый запрос берёт
/// свою сессию из пула и возвращает её после ответа. Параллельные запросы
/// получают разные сокеты. Сессия, на которой истёк таймаут, не
/// возвращается в пул: опоздавший ответ уходит в закрытый сокет.
pub struct SnmpClient {
    target: String,
    community: Vec<u8>,
    version: SnmpVersion,
    timeout: Duration,
    retries: u32,
    idle: Mutex<Vec<AsyncSession>>,
    next_req_id: AtomicI32,
    closed: AtomicBool,
}

impl SnmpClient {
    pub async fn new(
        target: &str,
        community: &[u8],
        version: SnmpVersion,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self> {
        // Первая сессия сразу проверяет, что адрес разрешается
        let session = Self::connect(target, community, version, 1)
            .await
            .context(format!("Failed to create SNMP session for {}", target))?;

        Ok(Self {
            target: target.to_string(),
            community: community.to_vec(),
            version,
            timeout,
            retries,
            idle: Mutex::new(vec![session]),
            next_req_id: AtomicI32::new(1 + REQ_ID_STRIDE),
            closed: AtomicBool::new(false),
        })
    }

    async fn connect(
        target: &str,
        community: &[u8],
        version: SnmpVersion,
        req_id: i32,
    ) -> std::io::Result<AsyncSession> {
        match version {
            SnmpVersion::V1 => AsyncSession::new_v1(target, community, req_id).await,
            SnmpVersion::V2c => AsyncSession::new_v2c(target, community, req_id).await,
        }
    }

    /// Открывает новую сессию (новый сокет, новый диапазон request-id)
    async fn open_session(&self) -> Result<AsyncSession, FetchError> {
        let req_id = self.next_req_id.fetch_add(REQ_ID_STRIDE, Ordering::Relaxed);
        Self::connect(&self.target, &self.community, self.version, req_id)
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to create SNMP session for {}: {}", self.target, e)))
    }

    async fn checkout(&self) -> Result<AsyncSession, FetchError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FetchError::Transport(CLOSED_TEXT.to_string()));
        }
        let pooled = match self.idle.lock() {
            Ok(mut idle) => idle.pop(),
            Err(_) => None,
        };
        match pooled {
            Some(session) => Ok(session),
            None => self.open_session().await,
        }
    }

    fn checkin(&self, session: AsyncSession) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < MAX_IDLE_SESSIONS {
                idle.push(session);
            }
        }
    }

    /// Число открытых простаивающих сессий
    pub fn idle_sessions(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for SnmpClient {
    async fn get(&self, oid: &str) -> Result<Varbind, FetchError> {
        let parsed = parse_oid(oid).map_err(|e| FetchError::InvalidOid(e.to_string()))?;

        let mut attempt = 0;
        loop {
            let mut session = self.checkout().await?;

            let outcome = match timeout(self.timeout, session.get(&parsed)).await {
                Ok(Ok(pdu)) => {
                    if pdu.error_status != 0 {
                        let status = error_status_name(pdu.error_status);
                        Some(Err(FetchError::Status(status.to_string())))
                    } else {
                        Some(match pdu.varbinds.into_iter().next() {
                            Some((answered, value)) => Ok(Varbind {
                                oid: answered.to_string(),
                                value: render(&value),
                            }),
                            None => Err(FetchError::Empty),
                        })
                    }
                }
                // Состояние сессии неизвестно, в пул она не вернётся
                Ok(Err(e)) => return Err(FetchError::Transport(e.to_string())),
                Err(_) => None,
            };

            match outcome {
                Some(result) => {
                    self.checkin(session);
                    return result;
                }
                None => {
                    drop(session);
                    if attempt >= self.retries {
                        return Err(FetchError::Transport(TIMEOUT_TEXT.to_string()));
                    }
                    attempt += 1;
                    tracing::debug!(oid, attempt, "SNMP GET timed out, retrying on a fresh session");
                }
            }
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        if let Ok(mut idle) = self.idle.lock() {
            idle.clear();
        }
    }
}

/// Открывает [`SnmpClient`] с общими параметрами подключения
#[derive(Debug, Clone)]
pub struct SnmpConnector {
    pub port: u16,
    pub community: Vec<u8>,
    pub version: SnmpVersion,
    pub timeout: Duration,
    pub retries: u32,
}

impl SnmpConnector {
    /// Принимает `host` и `host:port`; без порта берётся порт из настроек
    pub fn target_for(&self, address: &str) -> String {
        if address.parse::<std::net::SocketAddr>().is_ok() {
            return address.to_string();
        }
        if address.parse::<std::net::Ipv6Addr>().is_ok() {
            return format!("[{}]:{}", address, self.port);
        }
        if address.contains(':') {
            return address.to_string();
        }
        format!("{}:{}", address, self.port)
    }
}

#[async_trait]
impl Connector for SnmpConnector {
    async fn open(&self, address: &str) -> Result<Box<dyn Transport>> {
        let target = self.target_for(address);
        let client = SnmpClient::new(
            &target,
            &self.community,
            self.version,
            self.timeout,
            self.retries,
        )
        .await?;
        Ok(Box::new(client))
    }
}
