use super::types::{MetricEntry, ResultSet};
use crate::snmp::{Transport, indexed};

pub const IF_DESCR: &str = "1.3.6.1.2.1.2.2.1.2";
pub const IF_OPER_STATUS: &str = "1.3.6.1.2.1.2.2.1.8";
pub const IF_IN_OCTETS: &str = "1.3.6.1.2.1.2.2.1.10";
pub const IF_OUT_OCTETS: &str = "1.3.6.1.2.1.2.2.1.16";
pub const IF_HC_IN_OCTETS: &str = "1.3.6.1.2.1.31.1.1.1.6";
pub const IF_HC_OUT_OCTETS: &str = "1.3.6.1.2.1.31.1.1.1.10";

pub const NO_INTERFACE: &str = "No suitable interface found";

const MAX_INTERFACE_INDEX: u32 = 64;
const OPER_STATUS_UP: &str = "1";
const LOOPBACK_PREFIX: &str = "lo";

/// Направление трафика: 64-битная колонка ifXTable и 32-битная
/// колонка ifTable на замену
#[derive(Debug, Clone, Copy)]
pub struct OctetCounter {
    pub key: &'static str,
    pub wide: &'static str,
    pub narrow: &'static str,
}

pub const INBOUND: OctetCounter = OctetCounter {
    key: "ifInOctets",
    wide: IF_HC_IN_OCTETS,
    narrow: IF_IN_OCTETS,
};

pub const OUTBOUND: OctetCounter = OctetCounter {
    key: "ifOutOctets",
    wide: IF_HC_OUT_OCTETS,
    narrow: IF_OUT_OCTETS,
};

/// Интерфейс, по которому отдаётся трафик
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedInterface {
    pub index: u32,
    pub descr: String,
}

pub fn is_loopback(descr: &str) -> bool {
    descr
        .get(..LOOPBACK_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(LOOPBACK_PREFIX))
}

/// Счётчик это беззнаковое целое; всё остальное (текст исключения,
/// пустое значение) значит, что колонки нет
pub fn is_counter_value(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

pub struct InterfaceDiscoverer;

impl InterfaceDiscoverer {
    pub async fn discover(transport: &dyn Transport) -> ResultSet {
        let mut results = ResultSet::new();

        let Some(selected) = Self::select(transport).await else {
            tracing::debug!("No up, non-loopback interface found");
            results.insert("ifDescr", MetricEntry::new(IF_DESCR, NO_INTERFACE));
            return results;
        };

        let index = selected.index;
        tracing::debug!(index, descr = %selected.descr, "Interface selected");

        results.insert(
            format!("ifDescr.{}", index),
            MetricEntry::new(indexed(IF_DESCR, index), selected.descr),
        );
        for counter in [INBOUND, OUTBOUND] {
            results.insert(
                format!("{}.{}", counter.key, index),
                Self::read_counter(transport, counter, index).await,
            );
        }

        results
    }

    /// Первый интерфейс в состоянии up, не loopback
    pub async fn select(transport: &dyn Transport) -> Option<SelectedInterface> {
        // TODO: ifDescr и ifOperStatus одного индекса можно запрашивать одним GET на два OID
        for index in 1..=MAX_INTERFACE_INDEX {
            let Ok(descr) = transport.get(&indexed(IF_DESCR, index)).await else {
                continue;
            };
            let Ok(status) = transport.get(&indexed(IF_OPER_STATUS, index)).await else {
                continue;
            };

            if status.value != OPER_STATUS_UP || is_loopback(&descr.value) {
                continue;
            }

            return Some(SelectedInterface {
                index,
                descr: descr.value,
            });
        }

        None
    }

    /// OID записи указывает колонку, из которой реально взято значение
    async fn read_counter(transport: &dyn Transport, counter: OctetCounter, index: u32) -> MetricEntry {
        let wide = indexed(counter.wide, index);
        if let Ok(varbind) = transport.get(&wide).await {
            if is_counter_value(&varbind.value) {
                return MetricEntry::new(wide, varbind.value);
            }
        }

        let narrow = indexed(counter.narrow, index);
        match transport.get(&narrow).await {
            Ok(varbind) if is_counter_value(&varbind.value) => MetricEntry::new(narrow, varbind.value),
            _ => MetricEntry::new(narrow, "0"),
        }
    }
}
