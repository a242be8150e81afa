use async_trait::async_trait;

/// Разобранный varbind: OID из ответа агента и значение текстом
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varbind {
    pub oid: String,
    pub value: String,
}

/// Почему GET не дал пригодного varbind.
///
/// Текст `Display` попадает в запись метрики как есть (`Error: <status>`
/// для ошибок агента).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Нет ответа, ошибка сокета или неразборчивый пакет
    #[error("{0}")]
    Transport(String),

    /// Агент ответил с ненулевым error-status
    #[error("Error: {0}")]
    Status(String),

    /// Агент ответил без varbind
    #[error("Error: empty response")]
    Empty,

    #[error("Invalid OID: {0}")]
    InvalidOid(String),
}

/// Канал запрос/ответ к одному устройству с одной community.
///
/// Реализация должна допускать параллельные вызовы: все коллекторы сессии
/// работают через один транспорт.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Выполняет один GET для `oid`
    async fn get(&self, oid: &str) -> Result<Varbind, FetchError>;

    /// Освобождает сокеты. Последующие `get` завершаются ошибкой
    async fn close(&self);
}

/// Открывает транспорт для адреса устройства
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, address: &str) -> anyhow::Result<Box<dyn Transport>>;
}
