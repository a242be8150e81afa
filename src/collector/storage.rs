use super::types::{MetricEntry, ResultSet};
use crate::snmp::{Transport, indexed};

/// Колонки hrStorageEntry
pub const STORAGE_ENTRY_BASE: &str = "1.3.6.1.2.1.25.2.3.1";
pub const STORAGE_TYPE_COLUMN: &str = "1.3.6.1.2.1.25.2.3.1.2";

pub const STORAGE_TYPE_RAM: &str = "1.3.6.1.2.1.25.2.1.2";
pub const STORAGE_TYPE_FIXED_DISK: &str = "1.3.6.1.2.1.25.2.1.4";

const MAX_STORAGE_INDEX: u32 = 64;

/// Суффикс поля и колонка hrStorageEntry, в порядке запроса
const STORAGE_FIELDS: [(&str, u32); 4] = [
    ("AllocationUnits", 4),
    ("Size", 5),
    ("Used", 6),
    ("Descr", 3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Ram,
    FixedDisk,
}

impl StorageClass {
    pub fn key_prefix(self) -> &'static str {
        match self {
            StorageClass::Ram => "ramStorage",
            StorageClass::FixedDisk => "diskStorage",
        }
    }

    pub fn from_type_oid(type_oid: &str) -> Option<Self> {
        match type_oid {
            STORAGE_TYPE_RAM => Some(StorageClass::Ram),
            STORAGE_TYPE_FIXED_DISK => Some(StorageClass::FixedDisk),
            _ => None,
        }
    }
}

/// Первый индекс каждого класса хранилища
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageSlots {
    pub ram: Option<u32>,
    pub disk: Option<u32>,
}

impl StorageSlots {
    fn record(&mut self, class: StorageClass, index: u32) {
        match class {
            StorageClass::Ram => {
                self.ram.get_or_insert(index);
            }
            StorageClass::FixedDisk => {
                self.disk.get_or_insert(index);
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.ram.is_some() && self.disk.is_some()
    }
}

pub struct StorageDiscoverer;

impl StorageDiscoverer {
    pub async fn discover(transport: &dyn Transport) -> ResultSet {
        let slots = Self::locate(transport).await;
        tracing::debug!(ram = ?slots.ram, disk = ?slots.disk, "Storage slots located");

        let mut results = ResultSet::new();
        if let Some(index) = slots.ram {
            results.merge(Self::read_fields(transport, StorageClass::Ram, index).await);
        }
        if let Some(index) = slots.disk {
            results.merge(Self::read_fields(transport, StorageClass::FixedDisk, index).await);
        }
        results
    }

    /// Перебирает hrStorageType, пока не найдены и RAM, и жёсткий диск
    pub async fn locate(transport: &dyn Transport) -> StorageSlots {
        let mut slots = StorageSlots::default();

        for index in 1..=MAX_STORAGE_INDEX {
            let oid = indexed(STORAGE_TYPE_COLUMN, index);
            let Ok(varbind) = transport.get(&oid).await else {
                continue;
            };

            if let Some(class) = StorageClass::from_type_oid(&varbind.value) {
                slots.record(class, index);
            }
            if slots.is_complete() {
                break;
            }
        }

        slots
    }

    async fn read_fields(transport: &dyn Transport, class: StorageClass, index: u32) -> ResultSet {
        let mut results = ResultSet::new();

        for (suffix, column) in STORAGE_FIELDS {
            let oid = format!("{}.{}.{}", STORAGE_ENTRY_BASE, column, index);
            let outcome = transport.get(&oid).await;
            results.insert(
                format!("{}{}", class.key_prefix(), suffix),
                MetricEntry::from_fetch(&oid, outcome),
            );
        }

        results
    }
}
