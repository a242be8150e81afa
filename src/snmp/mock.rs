//! Агент в памяти со сценарием ответов, для тестов.
//!
//! На OID без сценария отвечает как v2c агент на отсутствующую строку:
//! успешный varbind с текстом исключения `noSuchInstance`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::transport::{Connector, FetchError, Transport, Varbind};
use super::value::NO_SUCH_INSTANCE;

#[derive(Debug, Clone)]
enum Scripted {
    Value(String),
    Fail(FetchError),
    Panic,
}

#[derive(Debug, Default)]
struct MockState {
    script: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<String>>,
    closed: AtomicBool,
}

/// Фейковый агент. Клоны делят состояние: тест оставляет себе один, а
/// другой отдаёт проверяемому коду.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(self, oid: &str, entry: Scripted) -> Self {
        if let Ok(mut script) = self.state.script.lock() {
            script.insert(oid.to_string(), entry);
        }
        self
    }

    /// Отвечает на `oid` значением `value`
    pub fn with_value(self, oid: &str, value: impl Into<String>) -> Self {
        self.script(oid, Scripted::Value(value.into()))
    }

    /// Завершает `oid` ошибкой `error`
    pub fn with_error(self, oid: &str, error: FetchError) -> Self {
        self.script(oid, Scripted::Fail(error))
    }

    /// Паникует при запросе `oid`
    pub fn with_panic(self, oid: &str) -> Self {
        self.script(oid, Scripted::Panic)
    }

    /// Все запрошенные OID в порядке запросов
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn was_requested(&self, oid: &str) -> bool {
        self.requests().iter().any(|r| r == oid)
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, oid: &str) -> Result<Varbind, FetchError> {
        if let Ok(mut requests) = self.state.requests.lock() {
            requests.push(oid.to_string());
        }

        if self.is_closed() {
            return Err(FetchError::Transport("SNMP session is closed".to_string()));
        }

        let scripted = self
            .state
            .script
            .lock()
            .ok()
            .and_then(|script| script.get(oid).cloned());

        match scripted {
            Some(Scripted::Value(value)) => Ok(Varbind {
                oid: oid.to_string(),
                value,
            }),
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Panic) => panic!("scripted panic for {}", oid),
            None => Ok(Varbind {
                oid: oid.to_string(),
                value: NO_SUCH_INSTANCE.to_string(),
            }),
        }
    }

    async fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }
}

/// Выдаёт транспорт по адресу; неизвестные адреса не открываются
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    devices: HashMap<String, MockTransport>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, address: &str, transport: MockTransport) -> Self {
        self.devices.insert(address.to_string(), transport);
        self
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(&self, address: &str) -> anyhow::Result<Box<dyn Transport>> {
        match self.devices.get(address) {
            Some(transport) => Ok(Box::new(transport.clone())),
            None => anyhow::bail!("Failed to create SNMP session for {}: host unreachable", address),
        }
    }
}
