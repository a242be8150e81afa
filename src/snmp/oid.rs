use anyhow::{Context, Result};
use snmp2::Oid;

pub fn parse_oid(s: &str) -> Result<Oid<'static>> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.context(format!("Invalid OID: {}", s))?;
    if parts.is_empty() {
        anyhow::bail!("Invalid OID: {}", s);
    }

    Oid::from(&parts).map_err(|e| anyhow::anyhow!("Failed to build Oid from {}: {:?}", s, e))
}

/// Добавляет индекс строки к OID колонки: `column.index`
pub fn indexed(column: &str, index: u32) -> String {
    format!("{}.{}", column, index)
}
