use serde::{Deserialize, Serialize};

use crate::snmp::SnmpVersion;

/// Базовые настройки коллектора
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Настройки подключения
    pub connection: ConnectionSettings,
    /// Настройки аутентификации
    pub auth: AuthSettings,
    /// Сбор с нескольких устройств
    pub fleet: FleetSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// UDP порт агента, если в адресе порт не указан
    pub port: u16,
    /// Таймаут одного запроса (секунды)
    pub timeout: u64,
    /// Дополнительные попытки после таймаута
    pub retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub version: SnmpVersion,
    /// Community строка
    pub community: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetSettings {
    /// Сколько устройств опрашивается одновременно
    pub concurrency: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: 161,
            timeout: 10,
            retries: 2,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            version: SnmpVersion::V2c,
            community: "public".to_string(),
        }
    }
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self { concurrency: 16 }
    }
}
