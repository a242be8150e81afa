use std::sync::Arc;
use tokio::sync::Semaphore;

use super::catalog::MetricCatalog;
use super::session;
use super::types::DeviceReport;
use crate::snmp::Connector;

/// Собирает несколько устройств, не больше `concurrency` одновременно.
///
/// Каждое устройство опрашивается в своей задаче: недоступное устройство
/// или паника при сборе дают один отчёт `Failed`, остальные устройства не
/// затрагиваются. Отчёты возвращаются в порядке адресов.
pub async fn collect_fleet(
    connector: Arc<dyn Connector>,
    catalog: Arc<MetricCatalog>,
    addresses: &[String],
    concurrency: usize,
) -> Vec<DeviceReport> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(addresses.len());

    for address in addresses {
        let sem = Arc::clone(&semaphore);
        let connector = Arc::clone(&connector);
        let catalog = Arc::clone(&catalog);
        let device = address.clone();

        let task = tokio::spawn(async move {
            let _permit = match sem.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    return DeviceReport::Failed {
                        address: device,
                        error: e.to_string(),
                    };
                }
            };

            match session::collect(connector.as_ref(), &device, &catalog).await {
                Ok(data) => DeviceReport::Collected {
                    address: device,
                    data,
                },
                Err(e) => {
                    tracing::warn!(address = %device, error = %e, "Device collection failed");
                    DeviceReport::Failed {
                        address: device,
                        error: format!("{:#}", e),
                    }
                }
            }
        });

        tasks.push((address.clone(), task));
    }

    let mut reports = Vec::with_capacity(tasks.len());
    for (address, task) in tasks {
        match task.await {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(address = %address, "Device task panicked: {}", e);
                reports.push(DeviceReport::Failed {
                    address,
                    error: format!("Collection task failed: {}", e),
                });
            }
        }
    }

    let failed = reports
        .iter()
        .filter(|r| matches!(r, DeviceReport::Failed { .. }))
        .count();
    tracing::info!(devices = reports.len(), failed, "Fleet collection finished");

    reports
}
