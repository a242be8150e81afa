use anyhow::Result;

use super::catalog::MetricCatalog;
use super::cpu::CpuDiscoverer;
use super::interface::InterfaceDiscoverer;
use super::scalar_collector::ScalarCollector;
use super::storage::StorageDiscoverer;
use super::types::ResultSet;
use crate::snmp::{Connector, Transport};

/// Один опрос устройства: транспорт открыт для одного адреса, общий для
/// всех коллекторов и закрывается по окончании опроса.
///
/// Если сессия уничтожена без [`close`](Self::close) (например, при панике
/// в коллекторе), транспорт и его сокеты всё равно освобождаются.
pub struct CollectionSession {
    address: String,
    transport: Box<dyn Transport>,
}

impl CollectionSession {
    pub async fn open(connector: &dyn Connector, address: &str) -> Result<Self> {
        let transport = connector.open(address).await?;
        tracing::debug!(address, "SNMP session opened");

        Ok(Self {
            address: address.to_string(),
            transport,
        })
    }

    /// Запускает скаляры и три обнаружителя параллельно. Каждый возвращает
    /// свой частичный результат, они сливаются после завершения всех
    pub async fn run(&self, catalog: &MetricCatalog) -> ResultSet {
        let transport = self.transport.as_ref();

        let (scalars, cpu, storage, interface) = tokio::join!(
            ScalarCollector::collect_scalars(transport, catalog),
            CpuDiscoverer::discover(transport),
            StorageDiscoverer::discover(transport),
            InterfaceDiscoverer::discover(transport),
        );

        let mut results = scalars;
        for partial in [cpu, storage, interface] {
            results.merge(partial);
        }
        results
    }

    pub async fn close(self) {
        self.transport.close().await;
        tracing::debug!(address = %self.address, "SNMP session closed");
    }
}

/// Собирает всё для одного устройства. Ошибкой считается только
/// неудачное открытие транспорта, остальные ошибки попадают в записи
pub async fn collect(
    connector: &dyn Connector,
    address: &str,
    catalog: &MetricCatalog,
) -> Result<ResultSet> {
    let session = CollectionSession::open(connector, address).await?;
    let results = session.run(catalog).await;
    session.close().await;

    tracing::info!(address, metrics = results.len(), "Collection finished");
    Ok(results)
}
