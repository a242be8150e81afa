use futures_util::future::join_all;

use super::catalog::MetricCatalog;
use super::types::{MetricEntry, ResultSet};
use crate::snmp::Transport;

/// Модуль для сбора скалярных SNMP значений
pub struct ScalarCollector;

impl ScalarCollector {
    /// Собирает все скалярные значения каталога. Все GET уходят сразу,
    /// каждый результат попадает в свою запись
    pub async fn collect_scalars(transport: &dyn Transport, catalog: &MetricCatalog) -> ResultSet {
        let requests = catalog
            .iter()
            .map(|(name, oid)| Self::collect_single_scalar(transport, name, oid));

        join_all(requests).await.into_iter().collect()
    }

    async fn collect_single_scalar(
        transport: &dyn Transport,
        name: &str,
        oid: &str,
    ) -> (String, MetricEntry) {
        let outcome = transport.get(oid).await;
        if let Err(e) = &outcome {
            tracing::debug!(metric = name, oid, error = %e, "Scalar fetch failed");
        }

        (name.to_string(), MetricEntry::from_fetch(oid, outcome))
    }
}
