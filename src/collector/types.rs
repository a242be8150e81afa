use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::snmp::{FetchError, Varbind};

/// Одна собранная метрика: OID и значение текстом либо текст ошибки
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricEntry {
    #[serde(rename = "OID")]
    pub oid: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl MetricEntry {
    pub fn new(oid: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            value: value.into(),
        }
    }

    /// При успехе сохраняется OID из ответа агента, при ошибке
    /// запрошенный OID и текст ошибки
    pub fn from_fetch(requested_oid: &str, outcome: Result<Varbind, FetchError>) -> Self {
        match outcome {
            Ok(varbind) => Self::new(varbind.oid, varbind.value),
            Err(e) => Self::new(requested_oid, e.to_string()),
        }
    }
}

/// Собранные метрики по имени. Табличные имена несут индекс строки
/// (`hrProcessorLoad.3`). Обход отсортирован по имени.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet(BTreeMap<String, MetricEntry>);

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет или заменяет запись `name`
    pub fn insert(&mut self, name: impl Into<String>, entry: MetricEntry) {
        self.0.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&MetricEntry> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetricEntry)> {
        self.0.iter()
    }

    /// Вливает частичный результат. У коллекторов непересекающиеся
    /// пространства имён, поэтому на практике ничего не перезаписывается
    pub fn merge(&mut self, other: ResultSet) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(String, MetricEntry)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (String, MetricEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = (&'a String, &'a MetricEntry);
    type IntoIter = std::collections::btree_map::Iter<'a, String, MetricEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Результат одного устройства при сборе с нескольких устройств
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceReport {
    Collected { address: String, data: ResultSet },
    Failed { address: String, error: String },
}

impl DeviceReport {
    pub fn address(&self) -> &str {
        match self {
            DeviceReport::Collected { address, .. } | DeviceReport::Failed { address, .. } => address,
        }
    }
}
