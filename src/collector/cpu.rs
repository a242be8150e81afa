//! Поиск процессора по таблицам устройств HOST-RESOURCES-MIB.
//!
//! Агенты нумеруют процессоры по-разному: Net-SNMP начинает hrProcessorTable
//! с 196608, Windows с 1 или выше, у некоторых устройств есть пропуски.
//! Загрузка опрашивается по фиксированному списку кандидатов, а метка
//! выбирается перебором hrDeviceDescr в поисках чего-то похожего на CPU.

use super::types::{MetricEntry, ResultSet};
use crate::snmp::{Transport, indexed};

pub const PROCESSOR_LOAD_BASE: &str = "1.3.6.1.2.1.25.3.3.1.2";
pub const DEVICE_DESCR_BASE: &str = "1.3.6.1.2.1.25.3.2.1.3";

pub const LOAD_KEY: &str = "hrProcessorLoad";
pub const DESCR_KEY: &str = "hrDeviceDescr";

pub const LOAD_NOT_FOUND: &str = "CPU load not found (no valid index)";
pub const DESCR_NOT_FOUND: &str = "CPU description not found (no valid index)";

/// Первый hrDeviceIndex на хосте с Net-SNMP (тип устройства 3, индекс 0)
const NET_SNMP_PROCESSOR_INDEX: u32 = 196_608;
const MAX_PROCESSOR_INDEX: u32 = 32;
const MAX_DEVICE_INDEX: u32 = 64;

/// Признаки значения без описания
const UNUSABLE_LABEL_MARKERS: &[&str] = &["No Such", "not found", "Error"];

/// Ключевые слова метки процессора в нижнем регистре, по порядку
pub const PROCESSOR_KEYWORDS: &[&str] = &["cpu", "processor", "procesador"];

pub fn load_candidates() -> impl Iterator<Item = u32> {
    std::iter::once(NET_SNMP_PROCESSOR_INDEX).chain(1..=MAX_PROCESSOR_INDEX)
}

pub fn is_processor_label(text: &str) -> bool {
    let lower = text.to_lowercase();
    PROCESSOR_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn is_usable_label(text: &str) -> bool {
    !UNUSABLE_LABEL_MARKERS.iter().any(|marker| text.contains(marker))
}

pub struct CpuDiscoverer;

impl CpuDiscoverer {
    pub async fn discover(transport: &dyn Transport) -> ResultSet {
        let mut results = ResultSet::new();

        match Self::scan_loads(transport, &mut results).await {
            Some(first) => {
                let oid = indexed(DEVICE_DESCR_BASE, first);
                let outcome = transport.get(&oid).await;
                results.insert(DESCR_KEY, MetricEntry::from_fetch(&oid, outcome));
            }
            None => {
                tracing::debug!("No hrProcessorLoad index answered");
                results.insert(LOAD_KEY, MetricEntry::new(PROCESSOR_LOAD_BASE, LOAD_NOT_FOUND));
                results.insert(DESCR_KEY, MetricEntry::new(DEVICE_DESCR_BASE, DESCR_NOT_FOUND));
            }
        }

        if let Some(label) = Self::find_label(transport).await {
            results.insert(DESCR_KEY, label);
        }

        results
    }

    /// Записывает каждый ответивший индекс загрузки и возвращает первый
    async fn scan_loads(transport: &dyn Transport, results: &mut ResultSet) -> Option<u32> {
        let mut first = None;

        for index in load_candidates() {
            let oid = indexed(PROCESSOR_LOAD_BASE, index);
            let Ok(varbind) = transport.get(&oid).await else {
                continue;
            };
            if varbind.value.contains("No Such") {
                continue;
            }

            tracing::debug!(index, load = %varbind.value, "Processor load found");
            results.insert(
                format!("{}.{}", LOAD_KEY, index),
                MetricEntry::new(varbind.oid, varbind.value),
            );
            first.get_or_insert(index);
        }

        first
    }

    /// Первый пригодный hrDeviceDescr; если встретилась метка процессора,
    /// берётся она и перебор заканчивается
    async fn find_label(transport: &dyn Transport) -> Option<MetricEntry> {
        let mut fallback = None;

        for index in 1..=MAX_DEVICE_INDEX {
            let oid = indexed(DEVICE_DESCR_BASE, index);
            let Ok(varbind) = transport.get(&oid).await else {
                continue;
            };
            if !is_usable_label(&varbind.value) {
                continue;
            }

            if is_processor_label(&varbind.value) {
                return Some(MetricEntry::new(varbind.oid, varbind.value));
            }
            if fallback.is_none() {
                fallback = Some(MetricEntry::new(varbind.oid, varbind.value));
            }
        }

        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::FetchError;
    use crate::snmp::mock::MockTransport;

    fn load(index: u32) -> String {
        indexed(PROCESSOR_LOAD_BASE, index)
    }

    fn descr(index: u32) -> String {
        indexed(DEVICE_DESCR_BASE, index)
    }

    #[test]
    fn candidates_start_with_net_snmp_index() {
        let candidates: Vec<u32> = load_candidates().collect();
        assert_eq!(candidates.len(), 33);
        assert_eq!(candidates[0], 196_608);
        assert_eq!(candidates[1], 1);
        assert_eq!(candidates[32], 32);
    }

    #[test]
    fn matches_processor_keywords_case_insensitively() {
        assert!(is_processor_label("GenuineIntel: Intel(R) Core(TM) i7 CPU"));
        assert!(is_processor_label("AMD Ryzen PROCESSOR"));
        assert!(is_processor_label("Procesador ARM"));
        assert!(!is_processor_label("Network Interface eth0"));
    }

    #[tokio::test]
    async fn every_answering_index_is_recorded() {
        let mock = MockTransport::new()
            .with_value(&load(196_608), "12")
            .with_value(&load(196_609), "7")
            .with_value(&load(2), "30")
            .with_value(&descr(196_608), "GenuineIntel: Intel(R) Xeon(R)");

        let results = CpuDiscoverer::discover(&mock).await;

        assert_eq!(results.get("hrProcessorLoad.196608").unwrap().value, "12");
        assert_eq!(results.get("hrProcessorLoad.2").unwrap().value, "30");
        // 196609 не входит в кандидаты
        assert!(!results.contains_key("hrProcessorLoad.196609"));
        assert!(!results.contains_key(LOAD_KEY));
        assert_eq!(
            results.get(DESCR_KEY).unwrap().value,
            "GenuineIntel: Intel(R) Xeon(R)"
        );
    }

    #[tokio::test]
    async fn errored_indices_are_skipped() {
        let mock = MockTransport::new()
            .with_error(&load(1), FetchError::Status("genErr".to_string()))
            .with_error(&load(2), FetchError::Transport("No SNMP response received before timeout".to_string()))
            .with_value(&load(3), "55");

        let results = CpuDiscoverer::discover(&mock).await;

        let loads: Vec<_> = results.keys().filter(|k| k.starts_with("hrProcessorLoad")).collect();
        assert_eq!(loads, vec!["hrProcessorLoad.3"]);
    }

    #[tokio::test]
    async fn descriptor_error_is_recorded_when_no_label_found() {
        let mock = MockTransport::new()
            .with_value(&load(4), "9")
            .with_error(&descr(4), FetchError::Status("noSuchName".to_string()));

        let results = CpuDiscoverer::discover(&mock).await;

        let entry = results.get(DESCR_KEY).unwrap();
        assert_eq!(entry.oid, descr(4));
        assert_eq!(entry.value, "Error: noSuchName");
    }

    #[tokio::test]
    async fn processor_label_beats_earlier_fallback_and_stops_scan() {
        let mock = MockTransport::new()
            .with_value(&load(1), "3")
            .with_value(&descr(1), "Network interface")
            .with_value(&descr(3), "Intel(R) Core(TM) i5 CPU @ 2.40GHz")
            .with_value(&descr(4), "Another CPU");

        let results = CpuDiscoverer::discover(&mock).await;

        let entry = results.get(DESCR_KEY).unwrap();
        assert_eq!(entry.value, "Intel(R) Core(TM) i5 CPU @ 2.40GHz");
        assert_eq!(entry.oid, descr(3));
        assert!(!mock.was_requested(&descr(4)));
    }

    #[tokio::test]
    async fn first_usable_label_is_the_fallback() {
        let mock = MockTransport::new()
            .with_value(&load(1), "3")
            .with_value(&descr(1), "Error: something odd")
            .with_value(&descr(2), "Printer")
            .with_value(&descr(5), "Disk controller");

        let results = CpuDiscoverer::discover(&mock).await;

        assert_eq!(results.get(DESCR_KEY).unwrap().value, "Printer");
        assert!(mock.was_requested(&descr(64)));
        assert!(!mock.was_requested(&descr(65)));
    }

    #[tokio::test]
    async fn label_scan_overrides_placeholder() {
        let mock = MockTransport::new().with_value(&descr(2), "ARM Cortex-A53 processor");

        let results = CpuDiscoverer::discover(&mock).await;

        assert_eq!(results.get(LOAD_KEY).unwrap().value, LOAD_NOT_FOUND);
        assert_eq!(results.get(DESCR_KEY).unwrap().value, "ARM Cortex-A53 processor");
    }
}
