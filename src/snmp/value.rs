//! Текстовое представление SNMP значений и кодов error-status.
//!
//! Значения выводятся так же, как их печатают SNMP утилиты: тип хранилища
//! сравнивается с OID через точку, счётчик проверяется на цифры.

use snmp2::Value;
use std::net::Ipv4Addr;

pub const NO_SUCH_OBJECT: &str = "No Such Object currently exists at this OID";
pub const NO_SUCH_INSTANCE: &str = "No Such Instance currently exists at this OID";
pub const END_OF_MIB_VIEW: &str = "No more variables left in this MIB View";

/// Преобразует значение varbind в строку
pub fn render(value: &Value<'_>) -> String {
    match value {
        Value::Boolean(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Integer(n) => n.to_string(),
        Value::OctetString(bytes) => render_octets(bytes),
        Value::ObjectIdentifier(oid) => oid.to_string(),
        Value::IpAddress(octets) => Ipv4Addr::from(*octets).to_string(),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        Value::Opaque(bytes) => hex(bytes),
        Value::NoSuchObject => NO_SUCH_OBJECT.to_string(),
        Value::NoSuchInstance => NO_SUCH_INSTANCE.to_string(),
        Value::EndOfMibView => END_OF_MIB_VIEW.to_string(),
        other => format!("{:?}", other),
    }
}

/// Печатные строки возвращаются текстом, двоичные данные (DateAndTime,
/// MAC адреса) как hex с префиксом `0x`
pub fn render_octets(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if text.chars().all(|c| !c.is_control() || matches!(c, '\r' | '\n' | '\t')) => {
            text.to_string()
        }
        _ => hex(bytes),
    }
}

fn hex(bytes: &[u8]) -> String {
    let digits: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("0x{}", digits)
}

/// Имена error-status по RFC 3416
pub fn error_status_name(status: u32) -> &'static str {
    match status {
        0 => "noError",
        1 => "tooBig",
        2 => "noSuchName",
        3 => "badValue",
        4 => "readOnly",
        5 => "genErr",
        6 => "noAccess",
        7 => "wrongType",
        8 => "wrongLength",
        9 => "wrongEncoding",
        10 => "wrongValue",
        11 => "noCreation",
        12 => "inconsistentValue",
        13 => "resourceUnavailable",
        14 => "commitFailed",
        15 => "undoFailed",
        16 => "authorizationError",
        17 => "notWritable",
        18 => "inconsistentName",
        _ => "unknownError",
    }
}
