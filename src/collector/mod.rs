use anyhow::Result;
use std::sync::Arc;

pub mod catalog;
pub mod cpu;
pub mod fleet;
pub mod interface;
pub mod scalar_collector;
pub mod session;
pub mod storage;
pub mod types;

pub use catalog::MetricCatalog;
pub use session::CollectionSession;
pub use types::{DeviceReport, MetricEntry, ResultSet};

use crate::config::AppConfig;
use crate::snmp::Connector;

/// Коллектор для сбора SNMP данных: знает, как достучаться до устройств
/// и какие скаляры у них запрашивать
#[derive(Clone)]
pub struct SnmpCollector {
    connector: Arc<dyn Connector>,
    catalog: Arc<MetricCatalog>,
    concurrency: usize,
}

impl SnmpCollector {
    pub fn new(connector: Arc<dyn Connector>, catalog: MetricCatalog) -> Self {
        Self {
            connector,
            catalog: Arc::new(catalog),
            concurrency: 16,
        }
    }

    /// Настоящий SNMP транспорт; параметры подключения, community и каталог
    /// берутся из конфигурации
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(config.connector()), config.catalog()).with_concurrency(config.get_concurrency())
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Собирает все метрики одного устройства
    pub async fn collect(&self, address: &str) -> Result<ResultSet> {
        session::collect(self.connector.as_ref(), address, &self.catalog).await
    }

    /// Собирает несколько устройств параллельно, см. [`fleet::collect_fleet`]
    pub async fn collect_fleet(&self, addresses: &[String]) -> Vec<DeviceReport> {
        fleet::collect_fleet(
            Arc::clone(&self.connector),
            Arc::clone(&self.catalog),
            addresses,
            self.concurrency,
        )
        .await
    }
}
