//! Сбор метрик состояния и инвентаризации по SNMP.
//!
//! [`SnmpCollector`] запрашивает у устройства каталог скаляров, находит
//! строки процессора, хранилищ и основного интерфейса и возвращает плоский
//! [`ResultSet`], который [`formatter`] выводит в JSON или XML.

pub mod collector;
pub mod config;
pub mod formatter;
pub mod snmp;

pub use collector::{DeviceReport, MetricCatalog, MetricEntry, ResultSet, SnmpCollector};
pub use config::AppConfig;
