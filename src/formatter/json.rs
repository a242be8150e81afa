use serde::{Deserialize, Serialize};

use crate::collector::{DeviceReport, MetricEntry, ResultSet};

// TODO: Добавить в отчёт время сбора и количество выполненных GET запросов

/// Отчёт по устройству: когда снят и сколько метрик не удалось получить
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringReport {
    pub address: String,
    pub timestamp: String,
    pub summary: ResultSummary,
    pub metrics: ResultSet,
    pub errors: Vec<ErrorInfo>,
}

/// `failed` считает только ошибки и таймауты; "missing" попадает в
/// `errors`, но неудачей не считается
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub metric: String,
    pub status: String, // "error" | "timeout" | "missing"
    pub message: String,
}

/// JSON форматтер для результатов сбора
pub struct JsonFormatter;

impl JsonFormatter {
    /// Определяет статус записи по тексту: "success", "timeout", "missing"
    /// (исключения v2c и заглушки) или "error"
    pub fn entry_status(entry: &MetricEntry) -> &'static str {
        let value = entry.value.as_str();
        if value.to_lowercase().contains("timeout") {
            "timeout"
        } else if value.starts_with("Error") || value.starts_with("Invalid OID") {
            "error"
        } else if value.starts_with("No Such")
            || value.starts_with("No more variables")
            || value.contains("not found")
        {
            "missing"
        } else {
            "success"
        }
    }

    pub fn format_report(address: &str, results: &ResultSet) -> MonitoringReport {
        let errors: Vec<ErrorInfo> = results
            .iter()
            .filter_map(|(name, entry)| match Self::entry_status(entry) {
                "success" => None,
                status => Some(ErrorInfo {
                    metric: name.clone(),
                    status: status.to_string(),
                    message: entry.value.clone(),
                }),
            })
            .collect();

        let failed = errors
            .iter()
            .filter(|e| e.status == "error" || e.status == "timeout")
            .count();
        let summary = ResultSummary {
            total: results.len(),
            failed,
        };

        MonitoringReport {
            address: address.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            metrics: results.clone(),
            errors,
        }
    }

    /// Плоский документ `{name: {OID, Value}}`
    pub fn to_json_string(results: &ResultSet) -> anyhow::Result<String> {
        serde_json::to_string_pretty(results)
            .map_err(|e| anyhow::anyhow!("JSON serialization failed: {}", e))
    }

    pub fn report_to_json_string(address: &str, results: &ResultSet) -> anyhow::Result<String> {
        let report = Self::format_report(address, results);
        serde_json::to_string_pretty(&report)
            .map_err(|e| anyhow::anyhow!("JSON serialization failed: {}", e))
    }

    /// JSON массив, по объекту на устройство: `{address, data}` или
    /// `{address, error}`
    pub fn fleet_to_json_string(reports: &[DeviceReport]) -> anyhow::Result<String> {
        serde_json::to_string_pretty(reports)
            .map_err(|e| anyhow::anyhow!("JSON serialization failed: {}", e))
    }
}
