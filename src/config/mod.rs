use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub mod profile;
pub mod settings;

pub use profile::Profile;
pub use settings::Settings;

use crate::collector::MetricCatalog;
use crate::snmp::SnmpConnector;

/// Конфигурация приложения
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Профиль скаляров; без него используется встроенный каталог
    pub profile: Option<Profile>,
    /// Базовые настройки
    pub settings: Settings,
}

impl AppConfig {
    /// Загружает необязательные YAML файлы настроек и профиля.
    /// Без путей берутся значения по умолчанию
    pub fn load(settings_path: Option<&Path>, profile_path: Option<&Path>) -> Result<Self> {
        let settings = match settings_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .context(format!("Failed to read settings: {}", path.display()))?;
                serde_yml::from_str(&content).context("Failed to parse settings YAML")?
            }
            None => Settings::default(),
        };

        let profile = profile_path.map(Profile::load).transpose()?;

        Ok(Self { profile, settings })
    }

    /// Порт агента из окружения или из настроек
    pub fn get_port(&self) -> u16 {
        env::var("SNMP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.settings.connection.port)
    }

    /// Таймаут в секундах из окружения или из настроек
    pub fn get_timeout(&self) -> u64 {
        env::var("SNMP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.settings.connection.timeout)
    }

    /// Community строка
    pub fn get_community(&self) -> Vec<u8> {
        env::var("SNMP_COMMUNITY")
            .unwrap_or_else(|_| self.settings.auth.community.clone())
            .into_bytes()
    }

    /// Адрес по умолчанию, если он не передан в командной строке
    pub fn get_target(&self) -> Option<String> {
        env::var("SNMP_TARGET").ok()
    }

    pub fn get_concurrency(&self) -> usize {
        self.settings.fleet.concurrency
    }

    pub fn catalog(&self) -> MetricCatalog {
        self.profile
            .as_ref()
            .map(MetricCatalog::from_profile)
            .unwrap_or_default()
    }

    pub fn connector(&self) -> SnmpConnector {
        SnmpConnector {
            port: self.get_port(),
            community: self.get_community(),
            version: self.settings.auth.version,
            timeout: Duration::from_secs(self.get_timeout()),
            retries: self.settings.connection.retries,
        }
    }

    pub fn log_summary(&self) {
        tracing::debug!(
            profile = self.profile.as_ref().map(|p| p.name.as_str()).unwrap_or("builtin"),
            port = self.get_port(),
            timeout_secs = self.get_timeout(),
            version = ?self.settings.auth.version,
            scalars = self.catalog().len(),
            "Configuration loaded"
        );
    }
}
